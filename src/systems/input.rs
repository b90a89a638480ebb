//! Apply inbound unit commands.
//!
//! [`movement_input`] turns [`MoveInput`] messages into start/stop calls and
//! [`chat_input`] turns [`ChatInput`] into chat broadcasts. Both run before
//! [`crate::systems::movement::unit_movement`] so a direction pressed this
//! tick starts extrapolating from this tick's time.
//!
//! Call [`update_input_messages`] once per tick, after the readers ran, to
//! rotate the message buffers.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::directionalmovement::DirectionalMovement;
use crate::components::mapposition::MapPosition;
use crate::components::unit::Unit;
use crate::components::updatefields::UpdateFields;
use crate::events::input::{ChatInput, MotionCommand, MoveInput};
use crate::movement::context::{UnitContext, UnitEnv, UnitView};
use crate::resources::broadcast::Broadcaster;
use crate::resources::gameconfig::GameConfig;
use crate::resources::pathplanner::PathPlanner;
use crate::resources::worldtime::WorldTime;

pub fn movement_input(
    mut reader: MessageReader<MoveInput>,
    mut query: Query<(
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
    for input in reader.read() {
        let Ok((unit, mut position, mut movement, mut fields)) = query.get_mut(input.entity)
        else {
            debug!("move input for non-unit {:?} ignored", input.entity);
            continue;
        };
        let mut ctx = UnitContext::new(
            env,
            input.entity,
            unit.guid,
            &mut position,
            &mut movement,
            &mut fields,
        );
        if input.pressed {
            ctx.start_moving(input.direction);
        } else {
            ctx.stop_moving(input.direction);
        }
    }
}

pub fn chat_input(
    mut reader: MessageReader<ChatInput>,
    query: Query<(&Unit, &MapPosition, &DirectionalMovement)>,
    broadcaster: Res<Broadcaster>,
) {
    for chat in reader.read() {
        let Ok((unit, position, movement)) = query.get(chat.entity) else {
            debug!("chat from non-unit {:?} ignored", chat.entity);
            continue;
        };
        UnitView::new(&broadcaster, unit.guid, position, movement).talk(chat.kind, &chat.text);
    }
}

/// Rotate the inbound message buffers.
pub fn update_input_messages(
    mut moves: ResMut<Messages<MoveInput>>,
    mut chats: ResMut<Messages<ChatInput>>,
    mut motions: ResMut<Messages<MotionCommand>>,
) {
    moves.update();
    chats.update();
    motions.update();
}
