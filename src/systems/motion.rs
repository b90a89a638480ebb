//! Systems driving top-level movement generators.
//!
//! - [`motion_commands`] applies [`MotionCommand`] messages: starts a point
//!   movement generator or cancels the current one.
//! - [`motion_master_update`] runs every installed generator once per tick
//!   and hands finished units back to free movement.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, error};

use crate::components::directionalmovement::DirectionalMovement;
use crate::components::mapposition::MapPosition;
use crate::components::motionmaster::MotionMaster;
use crate::components::unit::Unit;
use crate::components::updatefields::UpdateFields;
use crate::events::input::MotionCommand;
use crate::movement::context::{UnitContext, UnitEnv};
use crate::movement::point::PointMovementGenerator;
use crate::resources::broadcast::Broadcaster;
use crate::resources::gameconfig::GameConfig;
use crate::resources::pathplanner::PathPlanner;
use crate::resources::worldtime::WorldTime;

pub fn motion_commands(
    mut reader: MessageReader<MotionCommand>,
    mut query: Query<(
        &Unit,
        &mut MapPosition,
        &mut DirectionalMovement,
        &mut UpdateFields,
        &mut MotionMaster,
    )>,
    time: Res<WorldTime>,
    config: Res<GameConfig>,
    broadcaster: Res<Broadcaster>,
    planner: Res<PathPlanner>,
) {
    let env = UnitEnv::new(&config, &broadcaster, planner.get(), time.now_ms);
    for command in reader.read() {
        let entity = match *command {
            MotionCommand::MoveToPoint { entity, .. } => entity,
            MotionCommand::Terminate { entity, .. } => entity,
        };
        let Ok((unit, mut position, mut movement, mut fields, mut master)) =
            query.get_mut(entity)
        else {
            debug!("motion command for non-unit {:?} ignored", entity);
            continue;
        };
        let mut ctx = UnitContext::new(
            env,
            entity,
            unit.guid,
            &mut position,
            &mut movement,
            &mut fields,
        );

        match *command {
            MotionCommand::MoveToPoint {
                target_id, x, y, ..
            } => {
                let generator = PointMovementGenerator::new(entity, target_id, Vec2::new(x, y));
                if let Err(err) = master.start(&mut ctx, Box::new(generator)) {
                    error!("unit {}: cannot start point movement: {}", unit.guid, err);
                }
            }
            MotionCommand::Terminate { only: None, .. } => master.terminate(&mut ctx),
            MotionCommand::Terminate {
                only: Some(motion_type),
                ..
            } => {
                master.terminate_if(&mut ctx, motion_type);
            }
        }
    }
}

pub fn motion_master_update(
    mut query: Query<(
        Entity,
        &Unit,
        &mut MapPosition,
        &mut DirectionalMovement,
        &mut UpdateFields,
        &mut MotionMaster,
    )>,
    time: Res<WorldTime>,
    config: Res<GameConfig>,
    broadcaster: Res<Broadcaster>,
    planner: Res<PathPlanner>,
) {
    let env = UnitEnv::new(&config, &broadcaster, planner.get(), time.now_ms);
    for (entity, unit, mut position, mut movement, mut fields, mut master) in query.iter_mut() {
        if !master.is_driven() {
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
        master.update(&mut ctx);
    }
}
