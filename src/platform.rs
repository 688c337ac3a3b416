//! Version-specific player state queries.
//!
//! Some movement states only exist on newer game versions (gliding, striders,
//! llama-style mounts). The tracker asks a [`VersionSpecificHandler`] instead of
//! checking the actor directly, so the right answer for the running version can
//! be injected.

use serde::{Deserialize, Serialize};

use crate::events::{ActorState, VehicleKind};

/// Boolean state queries whose answer depends on the game version
pub trait VersionSpecificHandler: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn is_player_on_horse(&self, actor: &ActorState) -> bool;

    fn is_player_on_strider(&self, actor: &ActorState) -> bool;

    fn is_player_gliding(&self, actor: &ActorState) -> bool;
}

/// Current versions: every horse-family mount, striders and elytra exist
#[derive(Debug, Clone, Copy, Default)]
pub struct ModernHandler;

impl VersionSpecificHandler for ModernHandler {
    fn name(&self) -> &'static str {
        "modern"
    }

    fn is_player_on_horse(&self, actor: &ActorState) -> bool {
        matches!(
            actor.vehicle,
            Some(
                VehicleKind::Horse
                    | VehicleKind::Donkey
                    | VehicleKind::Mule
                    | VehicleKind::SkeletonHorse
                    | VehicleKind::ZombieHorse
                    | VehicleKind::Llama
                    | VehicleKind::TraderLlama
                    | VehicleKind::Camel
            )
        )
    }

    fn is_player_on_strider(&self, actor: &ActorState) -> bool {
        actor.vehicle == Some(VehicleKind::Strider)
    }

    fn is_player_gliding(&self, actor: &ActorState) -> bool {
        actor.gliding
    }
}

/// Old versions: only horse variants, no striders, no gliding
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyHandler;

impl VersionSpecificHandler for LegacyHandler {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn is_player_on_horse(&self, actor: &ActorState) -> bool {
        matches!(
            actor.vehicle,
            Some(
                VehicleKind::Horse
                    | VehicleKind::Donkey
                    | VehicleKind::Mule
                    | VehicleKind::SkeletonHorse
                    | VehicleKind::ZombieHorse
            )
        )
    }

    fn is_player_on_strider(&self, _actor: &ActorState) -> bool {
        false
    }

    fn is_player_gliding(&self, _actor: &ActorState) -> bool {
        false
    }
}

/// Which handler to use, as written in the tracker config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformVersion {
    #[default]
    Modern,
    Legacy,
}

impl PlatformVersion {
    pub fn handler(&self) -> Box<dyn VersionSpecificHandler> {
        match self {
            PlatformVersion::Modern => Box::new(ModernHandler),
            PlatformVersion::Legacy => Box::new(LegacyHandler),
        }
    }
}
