//! Borrowed view of one unit during its tick.
//!
//! [`UnitContext`] bundles the components a unit's movement touches with the
//! shared resources it needs (clock, config, broadcaster, path planner). All
//! unit-level movement operations live here: starting and stopping
//! directions, the per-tick extrapolation and heartbeat, chat, and the leg
//! services used by movement generators.
//!
//! Systems build one context per unit and per tick; generators receive it as
//! `&mut UnitContext` instead of holding a pointer to their owner.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::debug;

use crate::components::directionalmovement::{
    DirectionalMovement, LegBound, MotionAuthority, MoveDirection, MoveMask, movement_vector,
};
use crate::components::mapposition::MapPosition;
use crate::components::unit::Guid;
use crate::components::updatefields::{UnitField, UpdateFields};
use crate::events::packets::{ServerPacket, TalkType};
use crate::movement::pathfinder::Pathfinder;
use crate::resources::broadcast::Broadcaster;
use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::get_ms_time_diff;

/// Shared, read-only part of a [`UnitContext`].
#[derive(Clone, Copy)]
pub struct UnitEnv<'a> {
    pub config: &'a GameConfig,
    pub broadcaster: &'a Broadcaster,
    pub pathfinder: &'a dyn Pathfinder,
    /// Current simulation time in milliseconds.
    pub now: u32,
}

impl<'a> UnitEnv<'a> {
    pub fn new(
        config: &'a GameConfig,
        broadcaster: &'a Broadcaster,
        pathfinder: &'a dyn Pathfinder,
        now: u32,
    ) -> Self {
        Self {
            config,
            broadcaster,
            pathfinder,
            now,
        }
    }
}

/// Mutable view of one unit's movement state.
pub struct UnitContext<'a> {
    env: UnitEnv<'a>,
    entity: Entity,
    guid: Guid,
    position: &'a mut MapPosition,
    movement: &'a mut DirectionalMovement,
    fields: &'a mut UpdateFields,
}

impl<'a> UnitContext<'a> {
    pub fn new(
        env: UnitEnv<'a>,
        entity: Entity,
        guid: Guid,
        position: &'a mut MapPosition,
        movement: &'a mut DirectionalMovement,
        fields: &'a mut UpdateFields,
    ) -> Self {
        Self {
            env,
            entity,
            guid,
            position,
            movement,
            fields,
        }
    }

    pub fn now(&self) -> u32 {
        self.env.now
    }
    pub fn entity(&self) -> Entity {
        self.entity
    }
    pub fn guid(&self) -> Guid {
        self.guid
    }
    pub fn config(&self) -> &'a GameConfig {
        self.env.config
    }
    pub fn pathfinder(&self) -> &'a dyn Pathfinder {
        self.env.pathfinder
    }
    pub fn position(&self) -> Vec2 {
        self.position.pos
    }
    pub fn set_position(&mut self, pos: Vec2) {
        self.position.pos = pos;
    }
    pub fn movement(&self) -> &DirectionalMovement {
        &*self.movement
    }
    pub fn fields(&self) -> &UpdateFields {
        &*self.fields
    }
    pub fn is_moving(&self) -> bool {
        self.movement.is_moving()
    }

    /// Movement speed attribute in world units per second.
    pub fn movement_speed(&self) -> f32 {
        self.fields.movement_speed()
    }

    /// Displacement per millisecond at the current speed.
    pub fn speed_per_ms(&self) -> f32 {
        self.movement_speed() * self.env.config.unit_fraction
    }

    /// Change the movement speed attribute.
    ///
    /// A free-moving unit picks up the new speed immediately. Generator legs
    /// keep the speed they were committed with until their next leg.
    pub fn set_movement_speed(&mut self, speed: f32) {
        self.fields.set_float_value(UnitField::MovementSpeed, speed);
        if self.movement.is_free() {
            self.update_movement_vector();
        }
    }

    // ---------------- free movement ----------------

    /// Start holding `direction`.
    ///
    /// Returns `false` without side effects when the direction is already
    /// held or a movement generator drives the unit.
    pub fn start_moving(&mut self, direction: MoveDirection) -> bool {
        if !self.movement.is_free() {
            debug!(
                "unit {}: start {:?} ignored, generator in control",
                self.guid, direction
            );
            return false;
        }
        self.start_direction(direction)
    }

    /// Release `direction`.
    ///
    /// Returns `false` without side effects when the direction is not held
    /// or a movement generator drives the unit.
    pub fn stop_moving(&mut self, direction: MoveDirection) -> bool {
        if !self.movement.is_free() {
            debug!(
                "unit {}: stop {:?} ignored, generator in control",
                self.guid, direction
            );
            return false;
        }
        self.stop_direction(direction)
    }

    fn start_direction(&mut self, direction: MoveDirection) -> bool {
        if self.movement.move_mask.contains(direction.mask()) {
            return false;
        }

        self.send(ServerPacket::MoveStartDirection {
            guid: self.guid,
            direction: direction as u8,
        });

        // first held direction starts the extrapolation and heartbeat clocks
        if self.movement.move_mask.is_empty() {
            self.movement.last_movement_update = self.env.now;
            self.movement.heartbeat_timer = self.env.now;
        }

        self.movement.move_mask |= direction.mask();
        self.update_movement_vector();
        true
    }

    fn stop_direction(&mut self, direction: MoveDirection) -> bool {
        if !self.movement.move_mask.contains(direction.mask()) {
            return false;
        }

        self.send(ServerPacket::MoveStopDirection {
            guid: self.guid,
            direction: direction as u8,
            x: self.position.x(),
            y: self.position.y(),
        });

        self.movement.move_mask.remove(direction.mask());
        self.update_movement_vector();
        true
    }

    fn update_movement_vector(&mut self) {
        self.movement.move_vector = movement_vector(
            self.movement.move_mask,
            self.movement_speed(),
            self.env.config.unit_fraction,
        );
    }

    // ---------------- per tick ----------------

    /// Extrapolate position from the move vector and send the heartbeat
    /// when due.
    ///
    /// While a generator leg is in flight the unit travels at most the
    /// leg's remaining time and rests on the leg's destination once that
    /// runs out, so a heartbeat never reports a point past it.
    pub fn update_movement(&mut self) {
        if !self.is_moving() {
            return;
        }
        let now = self.env.now;

        let ms_diff = get_ms_time_diff(self.movement.last_movement_update, now);
        if ms_diff >= 1 {
            let vector = self.movement.move_vector;
            match self.movement.leg.as_mut() {
                Some(leg) => {
                    let travel = ms_diff.min(leg.remaining_ms);
                    leg.remaining_ms -= travel;
                    if leg.remaining_ms == 0 {
                        self.position.pos = leg.dest;
                    } else {
                        self.position.pos += vector * travel as f32;
                    }
                }
                None => self.position.pos += vector * ms_diff as f32,
            }
            self.movement.last_movement_update = now;
        }

        if get_ms_time_diff(self.movement.heartbeat_timer, now)
            >= self.env.config.heartbeat_interval_ms
        {
            self.send_heartbeat();
        }
    }

    fn send_heartbeat(&mut self) {
        self.send(ServerPacket::MoveHeartbeat {
            guid: self.guid,
            move_mask: self.movement.move_mask.bits(),
            x: self.position.x(),
            y: self.position.y(),
        });
        self.movement.heartbeat_timer = self.env.now;
    }

    // ---------------- generator services ----------------

    /// Hand the unit to a movement generator, releasing any held input.
    pub(crate) fn claim_for_generator(&mut self) {
        if self.movement.is_free() {
            self.halt();
        }
        self.movement.authority = MotionAuthority::Generator;
    }

    /// Return the unit to free movement, standing still.
    pub(crate) fn release_to_free(&mut self) {
        self.halt();
        self.movement.authority = MotionAuthority::Free;
    }

    /// Release every held direction, broadcasting a stop for each.
    pub(crate) fn halt(&mut self) {
        for direction in self.movement.move_mask.directions() {
            self.stop_direction(direction);
        }
        self.movement.move_vector = Vec2::ZERO;
        self.movement.leg = None;
    }

    /// Start a generator leg from the current position.
    ///
    /// Directions leaving the mask are stopped and new ones started, so
    /// observers see the usual start/stop messages; the exact leg vector
    /// then replaces the table heading and a heartbeat re-anchors observers.
    /// Extrapolation is bounded to `duration_ms` of travel towards `dest`.
    pub(crate) fn apply_leg(
        &mut self,
        mask: MoveMask,
        vector: Vec2,
        dest: Vec2,
        duration_ms: u32,
    ) {
        let current = self.movement.move_mask;
        for direction in current.difference(mask).directions() {
            self.stop_direction(direction);
        }
        for direction in mask.difference(current).directions() {
            self.start_direction(direction);
        }

        self.movement.last_movement_update = self.env.now;
        if self.is_moving() {
            self.movement.move_vector = vector;
            self.movement.leg = Some(LegBound {
                remaining_ms: duration_ms,
                dest,
            });
            self.send_heartbeat();
        } else {
            self.movement.move_vector = Vec2::ZERO;
            self.movement.leg = None;
        }
    }

    // ---------------- misc ----------------

    /// Read-only view of the same unit.
    pub fn view(&self) -> UnitView<'_> {
        UnitView::new(
            self.env.broadcaster,
            self.guid,
            &*self.position,
            &*self.movement,
        )
    }

    /// Say something to the units around.
    pub fn talk(&self, kind: TalkType, text: &str) {
        self.view().talk(kind, text);
    }

    /// Movement part of the create block observers receive for this unit.
    pub fn create_block(&self) -> ServerPacket {
        self.view().create_block()
    }

    fn send(&self, packet: ServerPacket) {
        self.env.broadcaster.send_to_nearby(self.guid, packet);
    }
}

/// Read-only view of a unit, for operations that broadcast without moving it.
///
/// Systems that only talk or announce build this from shared component
/// borrows, leaving the unit's change ticks untouched.
pub struct UnitView<'a> {
    broadcaster: &'a Broadcaster,
    guid: Guid,
    position: &'a MapPosition,
    movement: &'a DirectionalMovement,
}

impl<'a> UnitView<'a> {
    pub fn new(
        broadcaster: &'a Broadcaster,
        guid: Guid,
        position: &'a MapPosition,
        movement: &'a DirectionalMovement,
    ) -> Self {
        Self {
            broadcaster,
            guid,
            position,
            movement,
        }
    }

    pub fn talk(&self, kind: TalkType, text: &str) {
        self.broadcaster.send_to_nearby(
            self.guid,
            ServerPacket::ChatMessage {
                kind,
                guid: self.guid,
                text: text.to_string(),
            },
        );
    }

    pub fn create_block(&self) -> ServerPacket {
        ServerPacket::UnitCreate {
            guid: self.guid,
            x: self.position.x(),
            y: self.position.y(),
            move_mask: self.movement.move_mask.bits(),
        }
    }
}
