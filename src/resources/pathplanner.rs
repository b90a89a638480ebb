//! Path planner shared by every movement generator.

use bevy_ecs::prelude::Resource;

use crate::movement::pathfinder::{Pathfinder, StraightLinePathfinder};

/// The world's [`Pathfinder`]. Defaults to straight lines.
#[derive(Resource)]
pub struct PathPlanner(pub Box<dyn Pathfinder>);

impl PathPlanner {
    pub fn new(pathfinder: impl Pathfinder + 'static) -> Self {
        Self(Box::new(pathfinder))
    }

    pub fn get(&self) -> &dyn Pathfinder {
        self.0.as_ref()
    }
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(StraightLinePathfinder)
    }
}
