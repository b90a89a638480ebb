//! Per-tick extrapolation of unit positions.
//!
//! Every moving unit advances by its move vector times the milliseconds
//! elapsed since its last update, then sends its heartbeat when due. Units
//! under a movement generator move the same way; the generator only picks
//! the vector.

use bevy_ecs::prelude::*;

use crate::components::directionalmovement::DirectionalMovement;
use crate::components::mapposition::MapPosition;
use crate::components::unit::Unit;
use crate::components::updatefields::UpdateFields;
use crate::movement::context::{UnitContext, UnitEnv};
use crate::resources::broadcast::Broadcaster;
use crate::resources::gameconfig::GameConfig;
use crate::resources::pathplanner::PathPlanner;
use crate::resources::worldtime::WorldTime;

pub fn unit_movement(
    mut query: Query<(
        Entity,
        &Unit,
        &mut MapPosition,
        &mut DirectionalMovement,
        &mut UpdateFields,
    )>,
    time: Res<WorldTime>,
    config: Res<GameConfig>,
    broadcaster: Res<Broadcaster>,
    planner: Res<PathPlanner>,
) {
    let env = UnitEnv::new(&config, &broadcaster, planner.get(), time.now_ms);
    for (entity, unit, mut position, mut movement, mut fields) in query.iter_mut() {
        if !movement.is_moving() {
            continue;
        }
        let mut ctx = UnitContext::new(
            env,
            entity,
            unit.guid,
            &mut position,
            &mut movement,
            &mut fields,
        );
        ctx.update_movement();
    }
}
