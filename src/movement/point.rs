//! Move a unit to a fixed point.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::{debug, warn};

use crate::movement::base::GeneratorCore;
use crate::movement::context::UnitContext;
use crate::movement::{ChildSignal, MotionType, MovementGenerator};

/// Walks the planned route to `destination`.
///
/// At top level the generator finalizes on arrival and also when the
/// destination cannot be reached, handing the unit back to free movement.
/// As a composite child it reports `PointReached(target_id)` or
/// `CannotReachPoint(target_id)` to its parent exactly once and then waits,
/// halted, for the parent to decide.
pub struct PointMovementGenerator {
    core: GeneratorCore,
    target_id: u32,
    destination: Vec2,
}

impl PointMovementGenerator {
    pub fn new(owner: Entity, target_id: u32, destination: Vec2) -> Self {
        Self {
            core: GeneratorCore::new(owner, MotionType::Point),
            target_id,
            destination,
        }
    }

    pub fn target_id(&self) -> u32 {
        self.target_id
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    fn arrived(&mut self, ctx: &mut UnitContext) {
        debug!(
            "unit {}: reached point {} at ({}, {})",
            ctx.guid(),
            self.target_id,
            self.destination.x,
            self.destination.y
        );
        self.report_or_finalize(ctx, ChildSignal::PointReached);
    }

    fn unreachable(&mut self, ctx: &mut UnitContext) {
        warn!(
            "unit {}: cannot reach point {} at ({}, {})",
            ctx.guid(),
            self.target_id,
            self.destination.x,
            self.destination.y
        );
        self.report_or_finalize(ctx, ChildSignal::CannotReachPoint);
    }

    fn report_or_finalize(&mut self, ctx: &mut UnitContext, signal: ChildSignal) {
        if self.core.is_composite_child() {
            self.core.stop_movement(ctx);
            self.core.signal_parent(signal, self.target_id);
        } else {
            self.finalize(ctx);
        }
    }
}

impl MovementGenerator for PointMovementGenerator {
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

        let path = match ctx.pathfinder().find_path(ctx.position(), self.destination) {
            Ok(path) => path,
            Err(err) => {
                debug!("unit {}: path planning failed: {}", ctx.guid(), err);
                self.unreachable(ctx);
                return;
            }
        };
        self.core.set_full_path(path.points, path.flags);

        match self.core.full_path().first().copied() {
            Some(first) => {
                if !self.core.commit_point(ctx, &first) {
                    self.unreachable(ctx);
                }
            }
            None => self.arrived(ctx),
        }
    }

    fn point_reached(&mut self, ctx: &mut UnitContext, id: u32) {
        match self.core.next_point_after(id) {
            Some(next) => {
                if !self.core.commit_point(ctx, &next) {
                    self.unreachable(ctx);
                }
            }
            None => self.arrived(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::packets::ServerPacket;
    use crate::movement::motionpoint::MotionPoint;
    use crate::movement::pathfinder::{PathError, Pathfinder, PathfinderFlags, PlannedPath};
    use crate::movement::testing::TestUnit;
    use crate::movement::{GeneratorId, GeneratorState};
    use crate::movement::base::PendingSignal;

    struct Blocked;

    impl Pathfinder for Blocked {
        fn find_path(&self, _from: Vec2, to: Vec2) -> Result<PlannedPath, PathError> {
            Err(PathError::Unreachable { x: to.x, y: to.y })
        }
    }

    /// Goes around a corner: first along x, then along y.
    struct Corner;

    impl Pathfinder for Corner {
        fn find_path(&self, from: Vec2, to: Vec2) -> Result<PlannedPath, PathError> {
            let corner = Vec2::new(to.x, from.y);
            Ok(PlannedPath {
                points: vec![
                    MotionPoint::between(0, from, corner),
                    MotionPoint::between(1, corner, to),
                ],
                flags: PathfinderFlags(0x4),
            })
        }
    }

    // ==================== TOP LEVEL ====================

    #[test]
    fn test_walks_to_point_and_finalizes() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.claim();
        let mut generator = PointMovementGenerator::new(unit.entity, 9, Vec2::new(0.0, 8.0));
        generator.initialize(&mut unit.ctx());
        assert_eq!(generator.core().state(), GeneratorState::Active);
        assert_eq!(unit.movement.move_mask.bits(), 1);

        // 8 units at 0.004/ms
        unit.advance(1999);
        unit.ctx().update_movement();
        generator.update(&mut unit.ctx());
        assert!(!generator.is_stopped());

        unit.advance(1);
        unit.ctx().update_movement();
        generator.update(&mut unit.ctx());
        assert_eq!(generator.core().state(), GeneratorState::Terminal);
        assert_eq!(unit.position.pos, Vec2::new(0.0, 8.0));
        assert!(!unit.movement.is_moving());

        let packets = unit.packets();
        assert!(matches!(
            packets.last(),
            Some(ServerPacket::MoveStopDirection { direction: 1, .. })
        ));
    }

    #[test]
    fn test_heartbeat_on_arrival_tick_reports_destination() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.claim();
        let mut generator = PointMovementGenerator::new(unit.entity, 1, Vec2::new(0.0, 4.1));
        generator.initialize(&mut unit.ctx());
        unit.packets();

        // the leg ends mid-tick with a heartbeat due on the same tick
        unit.advance(1050);
        unit.ctx().update_movement();
        generator.update(&mut unit.ctx());

        assert_eq!(
            unit.packets(),
            vec![
                ServerPacket::MoveHeartbeat {
                    guid: TestUnit::GUID,
                    move_mask: 1,
                    x: 0.0,
                    y: 4.1
                },
                ServerPacket::MoveStopDirection {
                    guid: TestUnit::GUID,
                    direction: 1,
                    x: 0.0,
                    y: 4.1
                },
            ]
        );
        assert_eq!(generator.core().state(), GeneratorState::Terminal);
    }

    #[test]
    fn test_follows_multi_leg_path() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.pathfinder = Box::new(Corner);
        unit.claim();
        let mut generator = PointMovementGenerator::new(unit.entity, 1, Vec2::new(4.0, -4.0));
        generator.initialize(&mut unit.ctx());
        assert_eq!(generator.core().pathfinder_flags(), PathfinderFlags(0x4));
        assert_eq!(generator.core().full_path().len(), 2);
        assert_eq!(unit.movement.move_mask.bits(), 2);

        unit.advance(1000);
        generator.update(&mut unit.ctx());
        assert_eq!(unit.position.pos, Vec2::new(4.0, 0.0));
        assert_eq!(unit.movement.move_mask.bits(), 4);

        unit.advance(1000);
        generator.update(&mut unit.ctx());
        assert_eq!(unit.position.pos, Vec2::new(4.0, -4.0));
        assert!(generator.is_stopped());
    }

    #[test]
    fn test_already_there_finalizes_at_once() {
        let mut unit = TestUnit::at(3.0, 3.0);
        unit.claim();
        let mut generator = PointMovementGenerator::new(unit.entity, 1, Vec2::new(3.0, 3.0));
        generator.initialize(&mut unit.ctx());
        assert_eq!(generator.core().state(), GeneratorState::Terminal);
        assert!(unit.packets().is_empty());
    }

    #[test]
    fn test_unreachable_at_top_level_finalizes() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.pathfinder = Box::new(Blocked);
        unit.claim();
        let mut generator = PointMovementGenerator::new(unit.entity, 5, Vec2::new(10.0, 0.0));
        generator.initialize(&mut unit.ctx());
        assert_eq!(generator.core().state(), GeneratorState::Terminal);
        assert!(!unit.movement.is_moving());
    }

    #[test]
    fn test_second_initialize_ignored() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.claim();
        let mut generator = PointMovementGenerator::new(unit.entity, 1, Vec2::new(0.0, 4.0));
        generator.initialize(&mut unit.ctx());
        let leg = generator.core().current_leg().copied();
        unit.advance(300);
        generator.initialize(&mut unit.ctx());
        assert_eq!(generator.core().current_leg().copied(), leg);
        assert_eq!(generator.core().last_point_time(), 0);
    }

    // ==================== COMPOSITE CHILD ====================

    #[test]
    fn test_child_reports_target_once() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.pathfinder = Box::new(Corner);
        unit.claim();
        let parent = GeneratorId::next();
        let mut generator = PointMovementGenerator::new(unit.entity, 77, Vec2::new(2.0, 2.0));
        generator.set_composite_child_flag(true, Some(parent)).unwrap();
        generator.initialize(&mut unit.ctx());

        unit.advance(500);
        generator.update(&mut unit.ctx());
        assert!(generator.core_mut().take_signals().is_empty());

        unit.advance(500);
        generator.update(&mut unit.ctx());
        assert_eq!(
            generator.core_mut().take_signals().as_slice(),
            &[PendingSignal {
                parent,
                signal: ChildSignal::PointReached,
                param: 77
            }]
        );
        assert_eq!(generator.core().state(), GeneratorState::Active);
        assert!(!unit.movement.is_moving());

        unit.advance(500);
        generator.update(&mut unit.ctx());
        assert!(generator.core_mut().take_signals().is_empty());
    }

    #[test]
    fn test_child_reports_unreachable() {
        let mut unit = TestUnit::at(0.0, 0.0);
        unit.pathfinder = Box::new(Blocked);
        unit.claim();
        let parent = GeneratorId::next();
        let mut generator = PointMovementGenerator::new(unit.entity, 3, Vec2::new(1.0, 1.0));
        generator.set_composite_child_flag(true, Some(parent)).unwrap();
        generator.initialize(&mut unit.ctx());
        assert_eq!(
            generator.core_mut().take_signals().as_slice(),
            &[PendingSignal {
                parent,
                signal: ChildSignal::CannotReachPoint,
                param: 3
            }]
        );
        assert!(!generator.is_stopped());
    }
}
