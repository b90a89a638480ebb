//! Directional movement state of a unit.
//!
//! A unit moves in one of two modes:
//! - **free**: the held directions in [`MoveMask`] pick the heading from
//!   [`MOVEMENT_ANGLES`];
//! - **generator**: a movement generator owns the heading and sets both the
//!   mask and the exact leg vector.
//!
//! [`MotionAuthority`] records which of the two is in charge. Operations in
//! [`crate::movement::context`] check it before touching the vector, so
//! the two never drive position in the same tick.
//!
//! # Direction encoding
//!
//! World coordinates are y-up. The four directions occupy one bit each,
//! opposing directions two bits apart:
//!
//! | bit | direction | angle |
//! |-----|-----------|-------|
//! | 1   | up        | 90°   |
//! | 2   | right     | 0°    |
//! | 4   | down      | 270°  |
//! | 8   | left      | 180°  |
//!
//! A combination cancels when each opposing pair is either fully held or
//! fully released (see [`MoveMask::is_canceling`]). With this bit layout the
//! canceling masks happen to be 0, 5, 10 and 15.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Component;
use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Set of currently held movement directions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MoveMask: u8 {
        const UP = 0x1;
        const RIGHT = 0x2;
        const DOWN = 0x4;
        const LEFT = 0x8;
    }
}

/// A single directional input.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Up = 0x1,
    Right = 0x2,
    Down = 0x4,
    Left = 0x8,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Up,
        MoveDirection::Right,
        MoveDirection::Down,
        MoveDirection::Left,
    ];

    pub fn mask(self) -> MoveMask {
        MoveMask::from_bits_truncate(self as u8)
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| *d as u8 == bits)
    }
}

const A_RIGHT: f32 = 0.0;
const A_UP_RIGHT: f32 = FRAC_PI_4;
const A_UP: f32 = FRAC_PI_2;
const A_UP_LEFT: f32 = 3.0 * FRAC_PI_4;
const A_LEFT: f32 = PI;
const A_DOWN_LEFT: f32 = 5.0 * FRAC_PI_4;
const A_DOWN: f32 = 3.0 * FRAC_PI_2;
const A_DOWN_RIGHT: f32 = 7.0 * FRAC_PI_4;

/// Heading for every mask value; `None` for canceling combinations.
///
/// Three held directions reduce to the one whose opposite is released.
pub const MOVEMENT_ANGLES: [Option<f32>; 16] = [
    None,               // 0000
    Some(A_UP),         // 0001 U
    Some(A_RIGHT),      // 0010 R
    Some(A_UP_RIGHT),   // 0011 U+R
    Some(A_DOWN),       // 0100 D
    None,               // 0101 U+D
    Some(A_DOWN_RIGHT), // 0110 R+D
    Some(A_RIGHT),      // 0111 U+R+D
    Some(A_LEFT),       // 1000 L
    Some(A_UP_LEFT),    // 1001 U+L
    None,               // 1010 R+L
    Some(A_UP),         // 1011 U+R+L
    Some(A_DOWN_LEFT),  // 1100 D+L
    Some(A_LEFT),       // 1101 U+D+L
    Some(A_DOWN),       // 1110 R+D+L
    None,               // 1111
];

/// Octant index (counter-clockwise from +x) to mask.
const OCTANT_MASKS: [MoveMask; 8] = [
    MoveMask::RIGHT,
    MoveMask::UP.union(MoveMask::RIGHT),
    MoveMask::UP,
    MoveMask::UP.union(MoveMask::LEFT),
    MoveMask::LEFT,
    MoveMask::DOWN.union(MoveMask::LEFT),
    MoveMask::DOWN,
    MoveMask::DOWN.union(MoveMask::RIGHT),
];

impl MoveMask {
    /// True when the held directions add up to no movement at all.
    pub fn is_canceling(self) -> bool {
        self.contains(MoveMask::UP) == self.contains(MoveMask::DOWN)
            && self.contains(MoveMask::LEFT) == self.contains(MoveMask::RIGHT)
    }

    /// Heading in radians, or `None` for canceling masks.
    pub fn angle(self) -> Option<f32> {
        MOVEMENT_ANGLES[(self.bits() & 0x0F) as usize]
    }

    /// Nearest of the eight compass masks for a direction vector.
    pub fn from_vector(v: Vec2) -> MoveMask {
        if v.length_squared() <= f32::EPSILON {
            return MoveMask::empty();
        }
        let octant = (v.y.atan2(v.x) / FRAC_PI_4).round().rem_euclid(8.0) as usize;
        OCTANT_MASKS[octant % 8]
    }

    /// Individual directions held in this mask.
    pub fn directions(self) -> ArrayVec<MoveDirection, 4> {
        MoveDirection::ALL
            .into_iter()
            .filter(|d| self.contains(d.mask()))
            .collect()
    }
}

/// Per-millisecond displacement for `mask` at `speed` world units per second.
pub fn movement_vector(mask: MoveMask, speed: f32, unit_fraction: f32) -> Vec2 {
    if mask.is_canceling() {
        return Vec2::ZERO;
    }
    match mask.angle() {
        Some(angle) => Vec2::from_angle(angle) * speed * unit_fraction,
        None => Vec2::ZERO,
    }
}

/// Who currently drives a unit's move vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionAuthority {
    /// Held directions (player input) drive the unit.
    #[default]
    Free,
    /// The top-level movement generator in the unit's
    /// [`MotionMaster`](super::motionmaster::MotionMaster) drives the unit.
    Generator,
}

/// End of the generator leg in flight. Extrapolation never carries the unit
/// past `dest`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegBound {
    /// Travel time left before `dest` is reached.
    pub remaining_ms: u32,
    pub dest: Vec2,
}

/// Movement bookkeeping of a unit.
#[derive(Component, Clone, Debug, Default)]
pub struct DirectionalMovement {
    pub move_mask: MoveMask,
    /// Displacement per millisecond.
    pub move_vector: Vec2,
    pub last_movement_update: u32,
    pub heartbeat_timer: u32,
    pub authority: MotionAuthority,
    /// Set while a generator leg is in flight; `None` in free movement.
    pub leg: Option<LegBound>,
}

impl DirectionalMovement {
    pub fn is_moving(&self) -> bool {
        !self.move_mask.is_empty()
    }
    pub fn is_free(&self) -> bool {
        self.authority == MotionAuthority::Free
    }
}
