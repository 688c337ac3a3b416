//! Movement mode classification.
//!
//! Maps an actor's composite physical state onto one of the mode keywords a
//! walking task may require.

use std::fmt;

use crate::events::{ActorState, VehicleKind};
use crate::platform::VersionSpecificHandler;

/// Movement modes a task can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementMode {
    Boat,
    Horse,
    Pig,
    Minecart,
    Strider,
    Sneaking,
    Walking,
    Running,
    Swimming,
    Flying,
    Elytra,
}

impl MovementMode {
    pub const ALL: [MovementMode; 11] = [
        MovementMode::Boat,
        MovementMode::Horse,
        MovementMode::Pig,
        MovementMode::Minecart,
        MovementMode::Strider,
        MovementMode::Sneaking,
        MovementMode::Walking,
        MovementMode::Running,
        MovementMode::Swimming,
        MovementMode::Flying,
        MovementMode::Elytra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementMode::Boat => "boat",
            MovementMode::Horse => "horse",
            MovementMode::Pig => "pig",
            MovementMode::Minecart => "minecart",
            MovementMode::Strider => "strider",
            MovementMode::Sneaking => "sneaking",
            MovementMode::Walking => "walking",
            MovementMode::Running => "running",
            MovementMode::Swimming => "swimming",
            MovementMode::Flying => "flying",
            MovementMode::Elytra => "elytra",
        }
    }

    /// Mode named by a config keyword (case-sensitive)
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == s)
    }

    /// Keywords accepted in task config
    pub fn keywords() -> Vec<&'static str> {
        Self::ALL.iter().map(MovementMode::as_str).collect()
    }

    /// Check whether the actor is currently moving in this mode
    pub fn matches(&self, actor: &ActorState, handler: &dyn VersionSpecificHandler) -> bool {
        match self {
            MovementMode::Boat => actor.vehicle.is_some_and(|v| v.is_boat()),
            MovementMode::Horse => handler.is_player_on_horse(actor),
            MovementMode::Pig => actor.vehicle == Some(VehicleKind::Pig),
            MovementMode::Minecart => actor.vehicle == Some(VehicleKind::Minecart),
            MovementMode::Strider => handler.is_player_on_strider(actor),
            // sprinting does not matter
            MovementMode::Sneaking => {
                actor.sneaking
                    && !actor.swimming
                    && !actor.flying
                    && !handler.is_player_gliding(actor)
            }
            MovementMode::Walking => {
                !actor.sneaking
                    && !actor.swimming
                    && !actor.sprinting
                    && !actor.flying
                    && !handler.is_player_gliding(actor)
            }
            MovementMode::Running => {
                !actor.sneaking
                    && !actor.swimming
                    && actor.sprinting
                    && !actor.flying
                    && !handler.is_player_gliding(actor)
            }
            // sprinting and sneaking do not matter, flying is not possible
            MovementMode::Swimming => actor.swimming && !handler.is_player_gliding(actor),
            MovementMode::Flying => actor.flying,
            MovementMode::Elytra => handler.is_player_gliding(actor),
        }
    }
}

impl fmt::Display for MovementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate a configured mode keyword. Unknown keywords never match.
pub fn mode_matches(mode: &str, actor: &ActorState, handler: &dyn VersionSpecificHandler) -> bool {
    MovementMode::from_keyword(mode).is_some_and(|m| m.matches(actor, handler))
}
