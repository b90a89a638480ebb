//! Inbound commands for units.
//!
//! These are written by whatever feeds the simulation (network sessions,
//! scripted bots, tests) and consumed by the systems in
//! [`crate::systems::input`] and [`crate::systems::motion`] during the next
//! tick. Commands for entities that are not units are ignored.

use bevy_ecs::prelude::{Entity, Message};

use crate::components::directionalmovement::MoveDirection;
use crate::events::packets::TalkType;
use crate::movement::MotionType;

/// A direction pressed or released by the unit's controller.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveInput {
    pub entity: Entity,
    pub direction: MoveDirection,
    /// `true` starts the direction, `false` stops it.
    pub pressed: bool,
}

/// Chat line spoken by a unit.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ChatInput {
    pub entity: Entity,
    pub kind: TalkType,
    pub text: String,
}

/// Request to change what drives a unit.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Walk to `(x, y)` under a point movement generator.
    MoveToPoint {
        entity: Entity,
        target_id: u32,
        x: f32,
        y: f32,
    },
    /// Cancel the unit's generator. With `only` set, only a generator of
    /// that type is cancelled.
    Terminate {
        entity: Entity,
        only: Option<MotionType>,
    },
}
