//! Movement generators.
//!
//! A movement generator is a small state machine that drives a unit along a
//! scripted trajectory instead of player input. Every variant implements
//! [`MovementGenerator`] and keeps its shared bookkeeping in a
//! [`GeneratorCore`](base::GeneratorCore):
//!
//! ```text
//! Uninitialized --initialize--> Active --terminate_movement--> Stopped
//!                                  \----finalize-------------> Terminal
//! ```
//!
//! A generator may delegate a sub-goal to a *composite child* held in a
//! [`ChildSlot`](composite::ChildSlot). The child reports back with a
//! [`ChildSignal`]; the parent receives it before its own `update` returns.
//!
//! Submodules:
//! - [`context`] – the unit operations a generator calls into
//! - [`base`] – shared generator state and leg services
//! - [`composite`] – ownership of child generators and signal delivery
//! - [`motionpoint`] – leg descriptors
//! - [`pathfinder`] – path planning collaborator
//! - [`point`] – move to a fixed point

pub mod base;
pub mod composite;
pub mod context;
pub mod motionpoint;
pub mod pathfinder;
pub mod point;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::movement::composite::ChildReports;
use crate::movement::context::UnitContext;
use crate::movement::base::{GeneratorCore, PathProgress};

/// Discriminator of the concrete generator behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionType {
    /// Walk to a fixed point.
    Point,
    /// Follow a list of waypoints.
    Waypoint,
    /// Follow another unit.
    Chase,
    /// Random roaming around a home point.
    Random,
    /// Game-specific behavior outside the built-in kinds.
    Scripted(u16),
}

/// Outcome a composite child reports to its parent.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSignal {
    /// The child finished its movement; param is the reached point id.
    PointReached = 1,
    /// The target cannot be reached; param is the failed point id.
    CannotReachPoint = 2,
}

/// Lifecycle state of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorState {
    #[default]
    Uninitialized,
    Active,
    /// Cancelled through `terminate_movement`.
    Stopped,
    /// Finished through `finalize`. Absorbing.
    Terminal,
}

/// Identity of a generator instance, used by children to address their
/// parent without holding a reference to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorId(u64);

static NEXT_GENERATOR_ID: AtomicU64 = AtomicU64::new(1);

impl GeneratorId {
    pub fn next() -> Self {
        GeneratorId(NEXT_GENERATOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Misuse of the generator API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// Composite child flag set without a parent.
    CompositeWithoutParent,
    /// A generator named itself as its parent.
    SelfParent,
    /// Generator built for another unit.
    ForeignOwner,
    /// A composite child was installed as a unit's top-level generator.
    CompositeAtTopLevel,
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::CompositeWithoutParent => {
                write!(f, "composite child flag requires a parent generator")
            }
            MotionError::SelfParent => write!(f, "a generator cannot be its own parent"),
            MotionError::ForeignOwner => write!(f, "generator belongs to another unit"),
            MotionError::CompositeAtTopLevel => {
                write!(f, "composite child cannot drive a unit directly")
            }
        }
    }
}

impl std::error::Error for MotionError {}

/// Common capability set of every movement generator.
///
/// Variants implement [`initialize`](Self::initialize) and expose their
/// [`GeneratorCore`]; the remaining methods have base behavior that variants
/// override when they need to. Overrides reach the base behavior through the
/// core's methods.
pub trait MovementGenerator: Send + Sync {
    fn core(&self) -> &GeneratorCore;
    fn core_mut(&mut self) -> &mut GeneratorCore;

    fn get_type(&self) -> MotionType {
        self.core().motion_type()
    }

    fn id(&self) -> GeneratorId {
        self.core().id()
    }

    /// Called once when the generator is applied to its unit.
    fn initialize(&mut self, ctx: &mut UnitContext);

    /// Called every tick while the generator drives its unit.
    fn update(&mut self, ctx: &mut UnitContext) {
        if let Some(id) = self.core().arrived_point(ctx.now()) {
            self.core_mut().complete_leg(ctx);
            self.point_reached(ctx, id);
        }
    }

    /// Called when the whole task is done.
    fn finalize(&mut self, ctx: &mut UnitContext) {
        self.core_mut().finish(ctx);
    }

    /// Called when the leg `id` was completed.
    fn point_reached(&mut self, ctx: &mut UnitContext, id: u32) {
        if self.core_mut().advance_path(ctx, id) == PathProgress::Finished {
            self.finalize(ctx);
        }
    }

    /// Cancel the generator. Always succeeds.
    fn terminate_movement(&mut self, ctx: &mut UnitContext) {
        self.core_mut().terminate(ctx);
    }

    /// Outcome reported by a composite child.
    fn receive_child_signal(&mut self, _ctx: &mut UnitContext, _signal: ChildSignal, _param: u32) {}

    fn set_composite_child_flag(
        &mut self,
        flag: bool,
        parent: Option<GeneratorId>,
    ) -> Result<(), MotionError> {
        self.core_mut().set_composite_child(flag, parent)
    }

    fn is_composite_child(&self) -> bool {
        self.core().is_composite_child()
    }

    fn is_stopped(&self) -> bool {
        self.core().is_stopped()
    }

    /// Hand reports collected from a child to [`receive_child_signal`].
    ///
    /// Reports left over after a handler stopped this generator are dropped.
    ///
    /// [`receive_child_signal`]: Self::receive_child_signal
    fn deliver_child_signals(&mut self, ctx: &mut UnitContext, reports: ChildReports) {
        for report in reports {
            if self.is_stopped() {
                debug!(
                    "generator {:?} stopped, dropping {:?}({})",
                    self.id(),
                    report.signal,
                    report.param
                );
                continue;
            }
            self.receive_child_signal(ctx, report.signal, report.param);
        }
    }
}
