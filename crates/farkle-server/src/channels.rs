use std::collections::HashMap;

use uuid::Uuid;

use farkle_common::game::ChannelId;

/// Who hears about what happens in each channel.
pub struct ChannelDirectory {
    pub watchers: HashMap<ChannelId, Vec<Uuid>>,
}

impl ChannelDirectory {
    pub fn new() -> Self {
        Self {
            watchers: HashMap::new(),
        }
    }

    pub fn watch(&mut self, channel: &str, player_id: Uuid) {
        let list = self.watchers.entry(channel.to_string()).or_default();
        if !list.contains(&player_id) {
            list.push(player_id);
        }
    }

    pub fn watchers(&self, channel: &str) -> Vec<Uuid> {
        self.watchers.get(channel).cloned().unwrap_or_default()
    }

    /// Drops a player from every channel and forgets channels nobody watches.
    pub fn leave_all(&mut self, player_id: Uuid) {
        for list in self.watchers.values_mut() {
            list.retain(|id| *id != player_id);
        }
        self.watchers.retain(|_, list| !list.is_empty());
    }
}

impl Default for ChannelDirectory {
    fn default() -> Self {
        Self::new()
    }
}
