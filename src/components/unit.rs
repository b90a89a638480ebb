//! Unit identity and the bundle used to spawn units.

use bevy_ecs::prelude::{Bundle, Component};

use crate::components::directionalmovement::DirectionalMovement;
use crate::components::mapposition::MapPosition;
use crate::components::motionmaster::MotionMaster;
use crate::components::updatefields::UpdateFields;

/// Globally unique identity of a world object.
pub type Guid = u64;

/// Marks an entity as a mobile unit and carries its identity.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unit {
    pub guid: Guid,
}

/// Everything a unit needs to move, in free movement mode.
#[derive(Bundle)]
pub struct UnitBundle {
    pub unit: Unit,
    pub position: MapPosition,
    pub movement: DirectionalMovement,
    pub fields: UpdateFields,
    pub motion: MotionMaster,
}

impl UnitBundle {
    pub fn new(guid: Guid, x: f32, y: f32, movement_speed: f32) -> Self {
        Self {
            unit: Unit { guid },
            position: MapPosition::new(x, y),
            movement: DirectionalMovement::default(),
            fields: UpdateFields::for_new_unit(movement_speed),
            motion: MotionMaster::default(),
        }
    }
}
