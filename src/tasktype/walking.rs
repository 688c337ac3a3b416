//! Walking task type
//!
//! Counts the horizontal cells a player crosses, on foot or as a passenger.
//! `distance` is the number of qualifying moves, not a measured distance.

use tracing::trace;

use super::mode::{MovementMode, mode_matches};
use super::validator::{AcceptedValues, BooleanValue, ConfigValidator, IntegerValue, RequiredKey};
use super::TaskType;
use crate::engine::TaskContext;
use crate::events::{ActorState, HostEvent};
use crate::quest::resolver::ConstraintSet;

pub struct WalkingTaskType {
    validators: Vec<Box<dyn ConfigValidator>>,
}

impl WalkingTaskType {
    pub const NAME: &'static str = "walking";

    pub fn new() -> Self {
        let validators: Vec<Box<dyn ConfigValidator>> = vec![
            Box::new(RequiredKey::new("distance")),
            Box::new(IntegerValue::new("distance")),
            Box::new(AcceptedValues::new("mode", MovementMode::keywords())),
            Box::new(BooleanValue::new("force-ground-walking")),
        ];
        Self { validators }
    }

    fn handle(&self, actor: &ActorState, passenger: bool, ctx: &TaskContext<'_>) {
        if actor.is_npc() {
            trace!("Ignoring movement of NPC {}", actor.id);
            return;
        }

        let Some(player) = ctx.players.get(actor.id) else {
            trace!("Ignoring movement of untracked actor {}", actor.id);
            return;
        };

        for pending in ctx.applicable_tasks(&player, Self::NAME, ConstraintSet::ALL) {
            let quest = &pending.quest;
            let task = pending.task();
            let debug = |message: &str| ctx.debug(Self::NAME, message, &quest.id, &task.id, player.id);

            debug("Player moved");

            if let Some(mode) = task.config.string("mode") {
                if !mode_matches(mode, actor, ctx.platform) {
                    debug("Player's mode does not match required mode, continuing...");
                    continue;
                }
            }

            if !passenger && task.config.boolean_or("force-ground-walking", false) && !actor.on_ground {
                debug("Player is not on the ground, continuing...");
                continue;
            }

            let Some(distance) = task.config.integer("distance") else {
                debug("Task has no distance, continuing...");
                continue;
            };

            ctx.advance(Self::NAME, &player, &pending, distance);
        }
    }
}

impl Default for WalkingTaskType {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskType for WalkingTaskType {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Walk a set distance."
    }

    fn config_validators(&self) -> &[Box<dyn ConfigValidator>] {
        &self.validators
    }

    fn handle_event(&self, event: &HostEvent, ctx: &TaskContext<'_>) {
        // Jumping or falling in place is not movement
        if event.is_vertical_only() {
            return;
        }

        match event {
            HostEvent::PlayerMove { actor, .. } => {
                if actor.is_inside_vehicle() {
                    return;
                }
                self.handle(actor, false, ctx);
            }
            HostEvent::VehicleMove {
                vehicle, passengers, ..
            } => {
                for passenger in passengers.iter().filter(|p| p.is_player()) {
                    // A passenger is riding this vehicle even if its snapshot omits it
                    let passenger = ActorState {
                        vehicle: passenger.vehicle.or(Some(*vehicle)),
                        ..passenger.clone()
                    };
                    self.handle(&passenger, true, ctx);
                }
            }
        }
    }
}
