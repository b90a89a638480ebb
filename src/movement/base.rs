//! State and services shared by every movement generator.
//!
//! [`GeneratorCore`] owns the lifecycle state, the leg in flight, the full
//! path and the outbox of signals for the parent. Variants embed one and
//! build their behavior from its methods.

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::{debug, error, warn};
use smallvec::SmallVec;

use crate::components::directionalmovement::MoveMask;
use crate::movement::context::UnitContext;
use crate::movement::motionpoint::MotionPoint;
use crate::movement::pathfinder::PathfinderFlags;
use crate::movement::{ChildSignal, GeneratorId, GeneratorState, MotionError, MotionType};
use crate::resources::worldtime::get_ms_time_diff;

/// Signal waiting to be collected by the parent's child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSignal {
    pub parent: GeneratorId,
    pub signal: ChildSignal,
    pub param: u32,
}

/// What the base point-reached behavior did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathProgress {
    /// The next leg of the full path is in flight.
    Next,
    /// Nothing left to walk; the generator should finalize.
    Finished,
    /// Reported to the parent, which decides what happens next.
    Signaled,
}

pub struct GeneratorCore {
    id: GeneratorId,
    motion_type: MotionType,
    owner: Entity,
    parent: Option<GeneratorId>,
    is_composite_child: bool,
    state: GeneratorState,
    /// Leg currently in flight.
    movement_point_id: u32,
    last_point_time: u32,
    /// `last_point_time + next_point_diff_time` is the arrival time.
    next_point_diff_time: u32,
    current_leg: Option<MotionPoint>,
    full_path: Vec<MotionPoint>,
    pathfinder_flags: PathfinderFlags,
    outbox: SmallVec<[PendingSignal; 2]>,
}

impl GeneratorCore {
    pub fn new(owner: Entity, motion_type: MotionType) -> Self {
        Self {
            id: GeneratorId::next(),
            motion_type,
            owner,
            parent: None,
            is_composite_child: false,
            state: GeneratorState::Uninitialized,
            movement_point_id: 0,
            last_point_time: 0,
            next_point_diff_time: 0,
            current_leg: None,
            full_path: Vec::new(),
            pathfinder_flags: PathfinderFlags::default(),
            outbox: SmallVec::new(),
        }
    }

    pub fn id(&self) -> GeneratorId {
        self.id
    }
    pub fn motion_type(&self) -> MotionType {
        self.motion_type
    }
    /// Entity of the unit this generator drives.
    pub fn owner(&self) -> Entity {
        self.owner
    }
    pub fn parent(&self) -> Option<GeneratorId> {
        self.parent
    }
    pub fn state(&self) -> GeneratorState {
        self.state
    }
    pub fn is_active(&self) -> bool {
        self.state == GeneratorState::Active
    }
    pub fn is_composite_child(&self) -> bool {
        self.is_composite_child
    }
    /// True once cancelled or finished.
    pub fn is_stopped(&self) -> bool {
        matches!(
            self.state,
            GeneratorState::Stopped | GeneratorState::Terminal
        )
    }
    pub fn current_leg(&self) -> Option<&MotionPoint> {
        self.current_leg.as_ref()
    }
    pub fn movement_point_id(&self) -> u32 {
        self.movement_point_id
    }
    pub fn last_point_time(&self) -> u32 {
        self.last_point_time
    }
    pub fn next_point_diff_time(&self) -> u32 {
        self.next_point_diff_time
    }
    pub fn full_path(&self) -> &[MotionPoint] {
        &self.full_path
    }
    pub fn pathfinder_flags(&self) -> PathfinderFlags {
        self.pathfinder_flags
    }

    /// Replace the whole planned path. Points are never edited in place.
    pub fn set_full_path(&mut self, points: Vec<MotionPoint>, flags: PathfinderFlags) {
        self.full_path = points;
        self.pathfinder_flags = flags;
    }

    pub fn set_composite_child(
        &mut self,
        flag: bool,
        parent: Option<GeneratorId>,
    ) -> Result<(), MotionError> {
        if !flag {
            self.is_composite_child = false;
            self.parent = None;
            return Ok(());
        }
        match parent {
            None => {
                error!(
                    "generator {:?}: composite child flag without parent refused",
                    self.id
                );
                Err(MotionError::CompositeWithoutParent)
            }
            Some(parent) if parent == self.id => Err(MotionError::SelfParent),
            Some(parent) => {
                self.is_composite_child = true;
                self.parent = Some(parent);
                Ok(())
            }
        }
    }

    /// Uninitialized -> Active. Returns `false` in any other state.
    pub fn activate(&mut self) -> bool {
        if self.state != GeneratorState::Uninitialized {
            debug!(
                "generator {:?}: initialize ignored in state {:?}",
                self.id, self.state
            );
            return false;
        }
        self.state = GeneratorState::Active;
        true
    }

    /// Stopped -> Active, for variants that allow being resumed.
    pub fn resume(&mut self) -> bool {
        if self.state != GeneratorState::Stopped {
            return false;
        }
        self.state = GeneratorState::Active;
        true
    }

    // ---------------- legs ----------------

    /// Commit the next leg.
    ///
    /// Places the unit on `source`, points it towards `dest` at its current
    /// speed and records when it will arrive. An empty `move_mask` is derived
    /// from the heading. Returns `false` when the leg cannot be travelled:
    /// the generator is not active, or the unit cannot move at all.
    pub fn set_next_movement(
        &mut self,
        ctx: &mut UnitContext,
        id: u32,
        source: Vec2,
        dest: Vec2,
        move_mask: MoveMask,
    ) -> bool {
        if !self.is_active() {
            warn!(
                "generator {:?}: leg {} refused in state {:?}",
                self.id, id, self.state
            );
            return false;
        }

        let distance = source.distance(dest);
        let per_ms = ctx.speed_per_ms();
        if !distance.is_finite() || (distance > 0.0 && per_ms <= 0.0) {
            debug!(
                "generator {:?}: leg {} not travellable (distance {}, speed {})",
                self.id, id, distance, per_ms
            );
            return false;
        }

        let (mask, vector, diff_ms) = if distance > 0.0 {
            let heading = (dest - source) / distance;
            let mask = if move_mask.is_empty() {
                MoveMask::from_vector(heading)
            } else {
                move_mask
            };
            (mask, heading * per_ms, (distance / per_ms).ceil() as u32)
        } else {
            (MoveMask::empty(), Vec2::ZERO, 0)
        };

        ctx.set_position(source);
        ctx.apply_leg(mask, vector, dest, diff_ms);

        self.movement_point_id = id;
        self.last_point_time = ctx.now();
        self.next_point_diff_time = diff_ms;
        self.current_leg = Some(MotionPoint::new(id, source, dest, mask));
        true
    }

    /// [`set_next_movement`](Self::set_next_movement) from a path point.
    pub fn commit_point(&mut self, ctx: &mut UnitContext, point: &MotionPoint) -> bool {
        self.set_next_movement(ctx, point.id, point.source, point.dest, point.move_mask)
    }

    /// Halt the unit without ending the generator.
    pub fn stop_movement(&mut self, ctx: &mut UnitContext) {
        self.current_leg = None;
        self.next_point_diff_time = 0;
        ctx.halt();
    }

    /// Id of the leg in flight once its arrival time has passed.
    pub fn arrived_point(&self, now: u32) -> Option<u32> {
        if !self.is_active() {
            return None;
        }
        let leg = self.current_leg.as_ref()?;
        (get_ms_time_diff(self.last_point_time, now) >= self.next_point_diff_time).then_some(leg.id)
    }

    /// Snap the unit onto the destination of the leg in flight.
    pub fn complete_leg(&mut self, ctx: &mut UnitContext) {
        if let Some(leg) = self.current_leg.take() {
            ctx.set_position(leg.dest);
        }
    }

    /// Point of the full path following `id`.
    pub fn next_point_after(&self, id: u32) -> Option<MotionPoint> {
        let index = self.full_path.iter().position(|p| p.id == id)?;
        self.full_path.get(index + 1).copied()
    }

    /// Base point-reached behavior.
    ///
    /// A composite child reports the point to its parent and keeps walking
    /// its own path; when the path is exhausted it halts and waits for the
    /// parent. Otherwise the next leg starts, or [`PathProgress::Finished`]
    /// tells the caller to finalize.
    pub fn advance_path(&mut self, ctx: &mut UnitContext, id: u32) -> PathProgress {
        let next = self.next_point_after(id);

        if self.is_composite_child {
            self.signal_parent(ChildSignal::PointReached, id);
            match next {
                Some(point) => {
                    if !self.commit_point(ctx, &point) {
                        self.signal_parent(ChildSignal::CannotReachPoint, point.id);
                        self.stop_movement(ctx);
                    }
                }
                None => self.stop_movement(ctx),
            }
            return PathProgress::Signaled;
        }

        match next {
            Some(point) if self.commit_point(ctx, &point) => PathProgress::Next,
            Some(point) => {
                debug!(
                    "generator {:?}: cannot reach point {}, finishing",
                    self.id, point.id
                );
                PathProgress::Finished
            }
            None => PathProgress::Finished,
        }
    }

    // ---------------- lifecycle ----------------

    /// Cancel: any state except Terminal becomes Stopped.
    pub fn terminate(&mut self, ctx: &mut UnitContext) {
        if self.state == GeneratorState::Terminal {
            return;
        }
        if self.state != GeneratorState::Stopped {
            debug!("generator {:?} terminated", self.id);
        }
        self.state = GeneratorState::Stopped;
        self.stop_movement(ctx);
    }

    /// Finish: the generator becomes Terminal and the unit halts.
    pub fn finish(&mut self, ctx: &mut UnitContext) {
        if self.state == GeneratorState::Terminal {
            return;
        }
        debug!("generator {:?} finalized", self.id);
        self.state = GeneratorState::Terminal;
        self.stop_movement(ctx);
    }

    // ---------------- parent signaling ----------------

    /// Queue a signal for the parent. Refused unless this is a composite child.
    pub fn signal_parent(&mut self, signal: ChildSignal, param: u32) -> bool {
        match (self.is_composite_child, self.parent) {
            (true, Some(parent)) => {
                self.outbox.push(PendingSignal {
                    parent,
                    signal,
                    param,
                });
                true
            }
            _ => {
                error!(
                    "generator {:?}: {:?}({}) without parent dropped",
                    self.id, signal, param
                );
                false
            }
        }
    }

    pub fn take_signals(&mut self) -> SmallVec<[PendingSignal; 2]> {
        std::mem::take(&mut self.outbox)
    }
}
