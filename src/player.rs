//! Tracked players: the connected, human-controlled actors the tracker knows.

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// A connected player known to the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPlayer {
    pub id: Uuid,
    pub name: String,
    /// World the player is currently in
    pub world: String,
}

impl TrackedPlayer {
    pub fn new(id: Uuid, name: impl Into<String>, world: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            world: world.into(),
        }
    }
}

/// Registry of currently connected players
#[derive(Debug, Default)]
pub struct PlayerTracker {
    players: DashMap<Uuid, TrackedPlayer>,
}

impl PlayerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a player (called on join)
    pub fn track(&self, player: TrackedPlayer) {
        debug!("Tracking player {} ({})", player.name, player.id);
        self.players.insert(player.id, player);
    }

    /// Stop tracking a player (called on disconnect)
    pub fn untrack(&self, id: Uuid) -> Option<TrackedPlayer> {
        self.players.remove(&id).map(|(_, player)| player)
    }

    /// Record a world change
    pub fn set_world(&self, id: Uuid, world: impl Into<String>) -> bool {
        match self.players.get_mut(&id) {
            Some(mut player) => {
                player.world = world.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<TrackedPlayer> {
        self.players.get(&id).map(|p| p.value().clone())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
