//! World setup, tick schedule and the demo bots.
//!
//! [`setup_world`] inserts every resource and message queue the movement
//! systems read. [`tick_schedule`] returns the per-tick system order:
//!
//! 1. announce units spawned since the last tick
//! 2. apply [`MoveInput`] and [`ChatInput`]
//! 3. apply [`MotionCommand`]
//! 4. extrapolate positions and send heartbeats
//! 5. drive movement generators
//! 6. drain field changes and rotate message buffers
//!
//! The bots are random controllers used by the headless binary; they write
//! the same messages a network session would.

use bevy_ecs::prelude::*;
use log::info;

use crate::components::directionalmovement::{DirectionalMovement, MoveDirection};
use crate::components::mapposition::MapPosition;
use crate::components::motionmaster::MotionMaster;
use crate::components::unit::{Guid, UnitBundle};
use crate::events::input::{ChatInput, MotionCommand, MoveInput};
use crate::events::packets::TalkType;
use crate::movement::MotionType;
use crate::resources::gameconfig::GameConfig;
use crate::resources::pathplanner::PathPlanner;
use crate::resources::worldtime::{WorldTime, get_ms_time_diff};
use crate::systems::input::{chat_input, movement_input, update_input_messages};
use crate::systems::motion::{motion_commands, motion_master_update};
use crate::systems::movement::unit_movement;
use crate::systems::replication::{announce_new_units, flush_field_changes};

/// Insert the resources and message queues used by the tick schedule.
///
/// The [`Broadcaster`](crate::resources::broadcast::Broadcaster) is not part
/// of it: use [`setup_transport`](crate::resources::broadcast::setup_transport)
/// or insert one built with `Broadcaster::channel`.
pub fn setup_world(world: &mut World, config: GameConfig) {
    world.insert_resource(WorldTime::default());
    world.insert_resource(config);
    world.insert_resource(PathPlanner::default());
    world.init_resource::<Messages<MoveInput>>();
    world.init_resource::<Messages<ChatInput>>();
    world.init_resource::<Messages<MotionCommand>>();
}

/// Spawn a unit in free movement mode with the configured default speed.
pub fn spawn_unit(world: &mut World, guid: Guid, x: f32, y: f32) -> Entity {
    let speed = world.resource::<GameConfig>().default_movement_speed;
    world.spawn(UnitBundle::new(guid, x, y, speed)).id()
}

pub fn tick_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            announce_new_units,
            movement_input,
            chat_input,
            motion_commands,
            unit_movement,
            motion_master_update,
            flush_field_changes,
            update_input_messages,
        )
            .chain(),
    );
    update
}

// ---------------- demo bots ----------------

/// Randomly steered demo unit.
#[derive(Component, Debug, Clone, Copy)]
pub struct Bot {
    pub last_decision_ms: u32,
    pub decision_interval_ms: u32,
    pub next_target_id: u32,
}

#[derive(Resource)]
pub struct BotRng(pub fastrand::Rng);

/// Spawn `count` bots scattered around the origin.
pub fn spawn_bots(world: &mut World, count: u32, seed: u64) {
    let mut rng = fastrand::Rng::with_seed(seed);
    for i in 0..count {
        let guid = 1000 + i as Guid;
        let x = rng.f32() * 40.0 - 20.0;
        let y = rng.f32() * 40.0 - 20.0;
        let entity = spawn_unit(world, guid, x, y);
        world.entity_mut(entity).insert(Bot {
            last_decision_ms: 0,
            decision_interval_ms: 500 + rng.u32(0..1500),
            next_target_id: 1,
        });
        info!("bot {} spawned at ({:.1}, {:.1})", guid, x, y);
    }
    world.insert_resource(BotRng(rng));
}

/// Let every bot whose decision timer elapsed pick a new action.
pub fn drive_bots(
    mut bots: Query<(
        Entity,
        &mut Bot,
        &MapPosition,
        &DirectionalMovement,
        &MotionMaster,
    )>,
    time: Res<WorldTime>,
    mut rng: ResMut<BotRng>,
    mut moves: MessageWriter<MoveInput>,
    mut chats: MessageWriter<ChatInput>,
    mut motions: MessageWriter<MotionCommand>,
) {
    let now = time.now_ms;
    let rng = &mut rng.0;
    for (entity, mut bot, position, movement, master) in bots.iter_mut() {
        if get_ms_time_diff(bot.last_decision_ms, now) < bot.decision_interval_ms {
            continue;
        }
        bot.last_decision_ms = now;

        match rng.u8(0..10) {
            0..=3 => {
                let direction = MoveDirection::ALL[rng.usize(0..4)];
                moves.write(MoveInput {
                    entity,
                    direction,
                    pressed: !movement.move_mask.contains(direction.mask()),
                });
            }
            4 | 5 => {
                for direction in movement.move_mask.directions() {
                    moves.write(MoveInput {
                        entity,
                        direction,
                        pressed: false,
                    });
                }
            }
            6 | 7 => {
                let target_id = bot.next_target_id;
                bot.next_target_id += 1;
                motions.write(MotionCommand::MoveToPoint {
                    entity,
                    target_id,
                    x: position.x() + rng.f32() * 20.0 - 10.0,
                    y: position.y() + rng.f32() * 20.0 - 10.0,
                });
            }
            8 => {
                if master.is(MotionType::Point) {
                    motions.write(MotionCommand::Terminate {
                        entity,
                        only: Some(MotionType::Point),
                    });
                }
            }
            _ => {
                let kind = if rng.bool() {
                    TalkType::Say
                } else {
                    TalkType::Emote
                };
                chats.write(ChatInput {
                    entity,
                    kind,
                    text: "hello there".to_string(),
                });
            }
        }
    }
}
