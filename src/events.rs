//! Host Event Types
//!
//! Movement observations delivered by the host, plus the actor snapshots they
//! carry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A world position with fractional coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Grid cell containing this position
    pub fn cell(&self) -> BlockPos {
        BlockPos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    /// True when both positions share the same horizontal cell
    pub fn same_column(&self, other: &Location) -> bool {
        let (a, b) = (self.cell(), other.cell());
        a.x == b.x && a.z == b.z
    }
}

/// Integer grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Kind of vehicle or mount an actor can ride
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    Boat,
    ChestBoat,
    Minecart,
    Pig,
    Horse,
    Donkey,
    Mule,
    SkeletonHorse,
    ZombieHorse,
    Llama,
    TraderLlama,
    Camel,
    Strider,
    Other,
}

impl VehicleKind {
    pub fn is_boat(&self) -> bool {
        matches!(self, VehicleKind::Boat | VehicleKind::ChestBoat)
    }
}

/// What kind of entity an actor is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A connected player
    Player,
    /// Player-shaped entity driven by automation
    Npc,
    /// Any other entity
    Entity,
}

/// Snapshot of an actor's physical state at the time of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub id: Uuid,
    pub kind: ActorKind,
    /// Vehicle the actor is currently riding
    #[serde(default)]
    pub vehicle: Option<VehicleKind>,
    #[serde(default)]
    pub sneaking: bool,
    #[serde(default)]
    pub sprinting: bool,
    #[serde(default)]
    pub swimming: bool,
    #[serde(default)]
    pub flying: bool,
    #[serde(default)]
    pub gliding: bool,
    #[serde(default = "default_on_ground")]
    pub on_ground: bool,
}

fn default_on_ground() -> bool {
    true
}

impl ActorState {
    /// A player standing still on the ground
    pub fn player(id: Uuid) -> Self {
        Self {
            id,
            kind: ActorKind::Player,
            vehicle: None,
            sneaking: false,
            sprinting: false,
            swimming: false,
            flying: false,
            gliding: false,
            on_ground: true,
        }
    }

    pub fn npc(id: Uuid) -> Self {
        Self {
            kind: ActorKind::Npc,
            ..Self::player(id)
        }
    }

    pub fn entity(id: Uuid) -> Self {
        Self {
            kind: ActorKind::Entity,
            ..Self::player(id)
        }
    }

    pub fn riding(mut self, vehicle: VehicleKind) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player | ActorKind::Npc)
    }

    pub fn is_npc(&self) -> bool {
        self.kind == ActorKind::Npc
    }

    pub fn is_inside_vehicle(&self) -> bool {
        self.vehicle.is_some()
    }
}

/// Events the host delivers to the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    /// An actor moved on its own
    PlayerMove {
        actor: ActorState,
        from: Location,
        to: Location,
    },

    /// A vehicle moved, carrying its passengers along
    VehicleMove {
        vehicle: VehicleKind,
        from: Location,
        to: Location,
        passengers: Vec<ActorState>,
    },
}

impl HostEvent {
    /// Get event type as string (for logging/debugging)
    pub fn event_type(&self) -> &'static str {
        match self {
            HostEvent::PlayerMove { .. } => "player_move",
            HostEvent::VehicleMove { .. } => "vehicle_move",
        }
    }

    /// True when the move stays within one horizontal cell
    pub fn is_vertical_only(&self) -> bool {
        match self {
            HostEvent::PlayerMove { from, to, .. } | HostEvent::VehicleMove { from, to, .. } => {
                from.same_column(to)
            }
        }
    }
}
