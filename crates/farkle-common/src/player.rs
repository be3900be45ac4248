use serde::{Deserialize, Serialize};

/// Opaque player identity handed over by the host.
pub type PlayerId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Banked points. Only ever grows.
    pub score: u32,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0,
        }
    }

    pub fn bank(&mut self, points: u32) -> u32 {
        self.score += points;
        self.score
    }
}
