//! Ownership of composite child generators.
//!
//! A parent keeps its child in a [`ChildSlot`]. The child never holds a
//! reference to the parent; it queues signals addressed by [`GeneratorId`]
//! and the slot hands them back to the parent as soon as the child's call
//! returns. The parent then delivers them with
//! [`MovementGenerator::deliver_child_signals`] before its own call returns,
//! so a signal never waits for the next tick.

use log::{debug, error};
use smallvec::SmallVec;

use crate::movement::context::UnitContext;
use crate::movement::{ChildSignal, GeneratorId, MotionError, MotionType, MovementGenerator};

/// A signal from the child, validated for this parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildReport {
    pub signal: ChildSignal,
    pub param: u32,
}

pub type ChildReports = SmallVec<[ChildReport; 2]>;

/// Slot holding at most one composite child of the generator `parent`.
pub struct ChildSlot {
    parent: GeneratorId,
    child: Option<Box<dyn MovementGenerator>>,
}

impl ChildSlot {
    pub fn new(parent: GeneratorId) -> Self {
        Self {
            parent,
            child: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.child.is_none()
    }

    pub fn child(&self) -> Option<&dyn MovementGenerator> {
        self.child.as_deref()
    }

    pub fn motion_type(&self) -> Option<MotionType> {
        self.child.as_ref().map(|c| c.get_type())
    }

    /// Adopt `child` and initialize it.
    ///
    /// A previous child is terminated first and its pending signals are
    /// dropped. Returns what the new child reported while initializing,
    /// e.g. an unreachable target.
    pub fn attach(
        &mut self,
        ctx: &mut UnitContext,
        mut child: Box<dyn MovementGenerator>,
    ) -> Result<ChildReports, MotionError> {
        if child.core().owner() != ctx.entity() {
            error!(
                "generator {:?}: child {:?} belongs to another unit",
                self.parent,
                child.id()
            );
            return Err(MotionError::ForeignOwner);
        }
        child.set_composite_child_flag(true, Some(self.parent))?;

        if let Some(mut old) = self.child.take() {
            old.terminate_movement(ctx);
            old.core_mut().take_signals();
        }

        debug!(
            "generator {:?}: attaching child {:?} ({:?})",
            self.parent,
            child.id(),
            child.get_type()
        );
        child.initialize(ctx);
        let reports = self.collect(&mut *child);
        self.child = Some(child);
        Ok(reports)
    }

    /// Run one tick of the child and return what it reported.
    pub fn update(&mut self, ctx: &mut UnitContext) -> ChildReports {
        let parent = self.parent;
        match self.child.as_mut() {
            Some(child) => {
                if !child.is_stopped() {
                    child.update(ctx);
                }
                Self::drain(parent, &mut **child)
            }
            None => ChildReports::new(),
        }
    }

    /// Cancel the child. Its pending signals are dropped.
    pub fn terminate(&mut self, ctx: &mut UnitContext) {
        if let Some(child) = self.child.as_mut() {
            child.terminate_movement(ctx);
            child.core_mut().take_signals();
        }
    }

    /// Give up ownership of the child.
    pub fn release(&mut self) -> Option<Box<dyn MovementGenerator>> {
        self.child.take()
    }

    fn collect(&self, child: &mut dyn MovementGenerator) -> ChildReports {
        Self::drain(self.parent, child)
    }

    fn drain(parent: GeneratorId, child: &mut dyn MovementGenerator) -> ChildReports {
        child
            .core_mut()
            .take_signals()
            .into_iter()
            .filter_map(|pending| {
                if pending.parent == parent {
                    Some(ChildReport {
                        signal: pending.signal,
                        param: pending.param,
                    })
                } else {
                    error!(
                        "generator {:?}: dropping {:?} addressed to {:?}",
                        parent, pending.signal, pending.parent
                    );
                    None
                }
            })
            .collect()
    }
}
