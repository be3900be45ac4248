use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::game::{ChannelId, Game, GameError, GameSnapshot, TurnEvent};
use crate::player::Player;

/// Monotonic time source for activity tracking.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Result of one applied action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    pub event: TurnEvent,
    pub game: GameSnapshot,
}

/// Every live game, keyed by channel.
pub struct GameStore<C = SystemClock> {
    games: HashMap<ChannelId, Game>,
    clock: C,
}

impl GameStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for GameStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> GameStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            games: HashMap::new(),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Opens a table in `channel` with `host` seated.
    pub fn create(&mut self, channel: &str, host: Player) -> Result<Transition, GameError> {
        if self.games.contains_key(channel) {
            return Err(GameError::ChannelBusy);
        }
        tracing::info!("'{}' opened a table in channel {}", host.name, channel);
        let event = TurnEvent::Opened {
            host: host.id.clone(),
        };
        let game = Game::new(channel, host, self.clock.now());
        let snapshot = game.snapshot();
        self.games.insert(channel.to_string(), game);
        Ok(Transition {
            event,
            game: snapshot,
        })
    }

    pub fn get(&self, channel: &str) -> Option<&Game> {
        self.games.get(channel)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.games.contains_key(channel)
    }

    pub fn remove(&mut self, channel: &str) -> Option<Game> {
        self.games.remove(channel)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Runs one transition against the game in `channel`. A game that ends
    /// is dropped from the store once its final snapshot is taken.
    pub fn apply<F>(&mut self, channel: &str, action: F) -> Result<Transition, GameError>
    where
        F: FnOnce(&mut Game, Instant) -> Result<TurnEvent, GameError>,
    {
        let now = self.clock.now();
        let game = self.games.get_mut(channel).ok_or(GameError::GameNotFound)?;
        let event = action(game, now)?;
        let snapshot = game.snapshot();
        if snapshot.is_over() {
            self.games.remove(channel);
        }
        Ok(Transition {
            event,
            game: snapshot,
        })
    }

    /// Ends and removes every game idle for longer than `timeout`.
    pub fn expire_idle(&mut self, timeout: Duration) -> Vec<Transition> {
        let now = self.clock.now();
        let stale: Vec<ChannelId> = self
            .games
            .iter()
            .filter(|(_, g)| g.idle_for(now) > timeout)
            .map(|(id, _)| id.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|channel| self.games.remove(&channel))
            .map(|mut game| {
                tracing::info!("Cleaning up inactive game in channel {}", game.channel_id);
                let event = game.time_out();
                Transition {
                    event,
                    game: game.snapshot(),
                }
            })
            .collect()
    }
}
