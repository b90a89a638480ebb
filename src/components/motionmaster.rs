//! Top-level movement generator slot of a unit.
//!
//! A unit owns at most one top-level generator. While one is installed the
//! unit's [`DirectionalMovement`](super::directionalmovement::DirectionalMovement)
//! is under generator authority; once the generator stops or finalizes it is
//! dropped and the unit returns to free movement, standing still.

use bevy_ecs::prelude::Component;
use log::{debug, error};

use crate::movement::context::UnitContext;
use crate::movement::{MotionError, MotionType, MovementGenerator};

#[derive(Component, Default)]
pub struct MotionMaster {
    generator: Option<Box<dyn MovementGenerator>>,
}

impl MotionMaster {
    /// True while a generator drives the unit.
    pub fn is_driven(&self) -> bool {
        self.generator.is_some()
    }

    pub fn motion_type(&self) -> Option<MotionType> {
        self.generator.as_ref().map(|g| g.get_type())
    }

    /// Cheap type check before touching the generator itself.
    pub fn is(&self, motion_type: MotionType) -> bool {
        self.motion_type() == Some(motion_type)
    }

    pub fn current(&self) -> Option<&dyn MovementGenerator> {
        self.generator.as_deref()
    }

    /// Install `generator` as the unit's top-level generator and initialize it.
    ///
    /// A generator already in place is terminated first. The new one may
    /// finish during initialization (already at its goal, unreachable); it is
    /// then dropped immediately and the unit stays free.
    pub fn start(
        &mut self,
        ctx: &mut UnitContext,
        mut generator: Box<dyn MovementGenerator>,
    ) -> Result<(), MotionError> {
        if generator.core().owner() != ctx.entity() {
            error!(
                "unit {}: generator {:?} belongs to another unit",
                ctx.guid(),
                generator.id()
            );
            return Err(MotionError::ForeignOwner);
        }
        if generator.is_composite_child() {
            error!(
                "unit {}: composite child {:?} refused as top-level generator",
                ctx.guid(),
                generator.id()
            );
            return Err(MotionError::CompositeAtTopLevel);
        }

        if let Some(mut old) = self.generator.take() {
            debug!(
                "unit {}: {:?} replaced by {:?}",
                ctx.guid(),
                old.get_type(),
                generator.get_type()
            );
            old.terminate_movement(ctx);
        }

        ctx.claim_for_generator();
        generator.initialize(ctx);
        self.generator = Some(generator);
        self.reap(ctx);
        Ok(())
    }

    /// Drive the generator for one tick.
    pub fn update(&mut self, ctx: &mut UnitContext) {
        if let Some(generator) = self.generator.as_mut() {
            if !generator.is_stopped() {
                generator.update(ctx);
            }
        }
        self.reap(ctx);
    }

    /// Cancel the current generator, if any.
    pub fn terminate(&mut self, ctx: &mut UnitContext) {
        if let Some(generator) = self.generator.as_mut() {
            generator.terminate_movement(ctx);
        }
        self.reap(ctx);
    }

    /// Cancel the current generator only when it is of `motion_type`.
    pub fn terminate_if(&mut self, ctx: &mut UnitContext, motion_type: MotionType) -> bool {
        if !self.is(motion_type) {
            return false;
        }
        self.terminate(ctx);
        true
    }

    /// Drop a stopped generator and hand the unit back to free movement.
    fn reap(&mut self, ctx: &mut UnitContext) {
        let stopped = self.generator.as_ref().is_some_and(|g| g.is_stopped());
        if stopped {
            if let Some(generator) = self.generator.take() {
                debug!(
                    "unit {}: generator {:?} ({:?}) done, free movement",
                    ctx.guid(),
                    generator.id(),
                    generator.get_type()
                );
            }
        }
        if self.generator.is_none() && !ctx.movement().is_free() {
            ctx.release_to_free();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::directionalmovement::MoveDirection;
    use crate::movement::point::PointMovementGenerator;
    use crate::movement::testing::TestUnit;
    use crate::movement::GeneratorId;
    use glam::Vec2;

    fn point(unit: &TestUnit, x: f32, y: f32) -> Box<dyn MovementGenerator> {
        Box::new(PointMovementGenerator::new(unit.entity, 1, Vec2::new(x, y)))
    }

    // ==================== START ====================

    #[test]
    fn test_start_takes_authority_and_releases_input() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.ctx().start_moving(MoveDirection::Left);
        unit.packets();

        let mut master = MotionMaster::default();
        let generator = point(&unit, 0.0, 4.0);
        master.start(&mut unit.ctx(), generator).unwrap();

        assert!(master.is_driven());
        assert!(master.is(MotionType::Point));
        assert!(!unit.movement.is_free());
        assert_eq!(unit.movement.move_mask.bits(), 1);
        assert!(!unit.ctx().start_moving(MoveDirection::Right));
    }

    #[test]
    fn test_start_rejects_composite_child() {
        let mut unit = TestUnit::at(0.0, 0.0);
        let mut generator = point(&unit, 1.0, 0.0);
        generator
            .set_composite_child_flag(true, Some(GeneratorId::next()))
            .unwrap();
        let mut master = MotionMaster::default();
        assert_eq!(
            master.start(&mut unit.ctx(), generator),
            Err(MotionError::CompositeAtTopLevel)
        );
        assert!(!master.is_driven());
        assert!(unit.movement.is_free());
    }

    #[test]
    fn test_start_already_at_goal_leaves_unit_free() {
        let mut unit = TestUnit::at(2.0, 2.0);
        let mut master = MotionMaster::default();
        let generator = point(&unit, 2.0, 2.0);
        master.start(&mut unit.ctx(), generator).unwrap();
        assert!(!master.is_driven());
        assert!(unit.movement.is_free());
    }

    #[test]
    fn test_start_replaces_running_generator() {
        let mut unit = TestUnit::at(0.0, 0.0);
        let mut master = MotionMaster::default();
        let first = point(&unit, 10.0, 0.0);
        master.start(&mut unit.ctx(), first).unwrap();
        let second = point(&unit, 0.0, -10.0);
        master.start(&mut unit.ctx(), second).unwrap();
        assert_eq!(unit.movement.move_mask.bits(), 4);
        assert!(master.is_driven());
    }

    // ==================== UPDATE / TERMINATE ====================

    #[test]
    fn test_finish_returns_unit_to_free_movement() {
        let mut unit = TestUnit::at(0.0, 0.0);
        let mut master = MotionMaster::default();
        let generator = point(&unit, 4.0, 0.0);
        master.start(&mut unit.ctx(), generator).unwrap();

        unit.advance(1000);
        master.update(&mut unit.ctx());
        assert!(!master.is_driven());
        assert!(unit.movement.is_free());
        assert_eq!(unit.position.pos, Vec2::new(4.0, 0.0));
        assert!(unit.ctx().start_moving(MoveDirection::Up));
    }

    #[test]
    fn test_terminate_stops_driving_next_tick() {
        let mut unit = TestUnit::at(0.0, 0.0);
        let mut master = MotionMaster::default();
        let generator = point(&unit, 40.0, 0.0);
        master.start(&mut unit.ctx(), generator).unwrap();

        unit.advance(100);
        unit.ctx().update_movement();
        master.terminate(&mut unit.ctx());
        assert!(!master.is_driven());
        assert!(unit.movement.is_free());

        let pos = unit.position.pos;
        unit.advance(1000);
        unit.ctx().update_movement();
        master.update(&mut unit.ctx());
        assert_eq!(unit.position.pos, pos);
    }

    #[test]
    fn test_terminate_if_checks_type() {
        let mut unit = TestUnit::at(0.0, 0.0);
        let mut master = MotionMaster::default();
        let generator = point(&unit, 40.0, 0.0);
        master.start(&mut unit.ctx(), generator).unwrap();

        assert!(!master.terminate_if(&mut unit.ctx(), MotionType::Chase));
        assert!(master.is_driven());
        assert!(master.terminate_if(&mut unit.ctx(), MotionType::Point));
        assert!(!master.is_driven());
    }

    #[test]
    fn test_terminate_without_generator_is_noop() {
        let mut unit = TestUnit::at(0.0, 0.0);
        let mut master = MotionMaster::default();
        master.terminate(&mut unit.ctx());
        assert!(unit.packets().is_empty());
        assert!(unit.movement.is_free());
    }
}
