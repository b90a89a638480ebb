//! A single leg of a planned route.

use glam::Vec2;

use crate::components::directionalmovement::MoveMask;

/// Leg descriptor: where it starts, where it ends, and the movement mask
/// observers should see while the unit travels it.
///
/// Points are copied into a generator's full path and never edited there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPoint {
    pub id: u32,
    pub source: Vec2,
    pub dest: Vec2,
    pub move_mask: MoveMask,
}

impl MotionPoint {
    pub fn new(id: u32, source: Vec2, dest: Vec2, move_mask: MoveMask) -> Self {
        Self {
            id,
            source,
            dest,
            move_mask,
        }
    }

    /// Leg with the mask derived from its heading.
    pub fn between(id: u32, source: Vec2, dest: Vec2) -> Self {
        Self::new(id, source, dest, MoveMask::from_vector(dest - source))
    }

    pub fn length(&self) -> f32 {
        self.source.distance(self.dest)
    }
}
