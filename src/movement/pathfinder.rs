//! Path planning collaborator.
//!
//! Movement generator variants ask a [`Pathfinder`] for the legs between the
//! unit and a goal. The base generator only stores the result: the legs go to
//! the full path, the flags are kept without interpretation.

use std::fmt;

use glam::Vec2;

use crate::movement::motionpoint::MotionPoint;

/// Opaque flags produced by the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathfinderFlags(pub u32);

/// Result of a successful planning request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannedPath {
    /// Legs in travel order. Empty when the unit already stands on the goal.
    pub points: Vec<MotionPoint>,
    pub flags: PathfinderFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// No route leads to the goal.
    Unreachable { x: f32, y: f32 },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Unreachable { x, y } => write!(f, "no route to ({}, {})", x, y),
        }
    }
}

impl std::error::Error for PathError {}

pub trait Pathfinder: Send + Sync {
    fn find_path(&self, from: Vec2, to: Vec2) -> Result<PlannedPath, PathError>;
}

/// Plans a single straight leg, ignoring obstacles.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLinePathfinder;

impl Pathfinder for StraightLinePathfinder {
    fn find_path(&self, from: Vec2, to: Vec2) -> Result<PlannedPath, PathError> {
        if !from.is_finite() || !to.is_finite() {
            return Err(PathError::Unreachable { x: to.x, y: to.y });
        }
        let points = if from == to {
            Vec::new()
        } else {
            vec![MotionPoint::between(0, from, to)]
        };
        Ok(PlannedPath {
            points,
            flags: PathfinderFlags::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::directionalmovement::MoveMask;

    #[test]
    fn test_straight_line_single_leg() {
        let path = StraightLinePathfinder
            .find_path(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0))
            .unwrap();
        assert_eq!(path.points.len(), 1);
        let leg = path.points[0];
        assert_eq!(leg.id, 0);
        assert_eq!(leg.length(), 5.0);
        assert_eq!(leg.move_mask, MoveMask::UP | MoveMask::RIGHT);
    }

    #[test]
    fn test_straight_line_already_there() {
        let path = StraightLinePathfinder
            .find_path(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0))
            .unwrap();
        assert!(path.points.is_empty());
    }

    #[test]
    fn test_straight_line_rejects_non_finite_goal() {
        let err = StraightLinePathfinder
            .find_path(Vec2::ZERO, Vec2::new(f32::NAN, 0.0))
            .unwrap_err();
        assert!(matches!(err, PathError::Unreachable { .. }));
    }
}
