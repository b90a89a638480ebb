//! Standalone unit and generators for unit tests of the movement module.

use bevy_ecs::prelude::Entity;
use crossbeam_channel::Receiver;

use crate::components::directionalmovement::DirectionalMovement;
use crate::components::mapposition::MapPosition;
use crate::components::unit::Guid;
use crate::components::updatefields::UpdateFields;
use crate::events::packets::ServerPacket;
use crate::movement::base::GeneratorCore;
use crate::movement::context::{UnitContext, UnitEnv};
use crate::movement::motionpoint::MotionPoint;
use crate::movement::pathfinder::{Pathfinder, PathfinderFlags, StraightLinePathfinder};
use crate::movement::{MotionType, MovementGenerator};
use crate::resources::broadcast::{Broadcaster, TransportCmd};
use crate::resources::gameconfig::GameConfig;

/// A unit outside any world, with a captured broadcast channel.
pub struct TestUnit {
    pub entity: Entity,
    pub position: MapPosition,
    pub movement: DirectionalMovement,
    pub fields: UpdateFields,
    pub config: GameConfig,
    pub broadcaster: Broadcaster,
    pub rx: Receiver<TransportCmd>,
    pub pathfinder: Box<dyn Pathfinder>,
    pub now: u32,
}

impl TestUnit {
    pub const GUID: Guid = 42;

    pub fn at(x: f32, y: f32) -> Self {
        let config = GameConfig::new();
        let (broadcaster, rx) = Broadcaster::channel();
        Self {
            entity: Entity::PLACEHOLDER,
            position: MapPosition::new(x, y),
            movement: DirectionalMovement::default(),
            fields: UpdateFields::for_new_unit(config.default_movement_speed),
            config,
            broadcaster,
            rx,
            pathfinder: Box::new(StraightLinePathfinder),
            now: 0,
        }
    }

    pub fn ctx(&mut self) -> UnitContext<'_> {
        let env = UnitEnv::new(
            &self.config,
            &self.broadcaster,
            self.pathfinder.as_ref(),
            self.now,
        );
        UnitContext::new(
            env,
            self.entity,
            Self::GUID,
            &mut self.position,
            &mut self.movement,
            &mut self.fields,
        )
    }

    /// Hand the unit to a generator and forget the packets that produced.
    pub fn claim(&mut self) {
        self.ctx().claim_for_generator();
        self.packets();
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }

    /// Drain every packet broadcast so far.
    pub fn packets(&mut self) -> Vec<ServerPacket> {
        self.rx
            .try_iter()
            .filter_map(|cmd| match cmd {
                TransportCmd::Broadcast(b) => Some(b.packet),
                TransportCmd::Shutdown => None,
            })
            .collect()
    }
}

/// Generator that walks a fixed path using only the base behavior.
pub struct PathWalker {
    core: GeneratorCore,
}

impl PathWalker {
    pub fn new(owner: Entity, path: Vec<MotionPoint>) -> Self {
        let mut core = GeneratorCore::new(owner, MotionType::Waypoint);
        core.set_full_path(path, PathfinderFlags::default());
        Self { core }
    }
}

impl MovementGenerator for PathWalker {
    fn core(&self) -> &GeneratorCore {
        &self.core
    }
    fn core_mut(&mut self) -> &mut GeneratorCore {
        &mut self.core
    }

    fn initialize(&mut self, ctx: &mut UnitContext) {
        if !self.core.activate() {
            return;
        }
        match self.core.full_path().first().copied() {
            Some(first) => {
                if !self.core.commit_point(ctx, &first) {
                    self.finalize(ctx);
                }
            }
            None => self.finalize(ctx),
        }
    }
}
