//! World-space position of a unit.
//!
//! Only the movement core writes this component: free-mode extrapolation,
//! leg starts and arrivals of movement generators.

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
    pub fn x(&self) -> f32 {
        self.pos.x
    }
    pub fn y(&self) -> f32 {
        self.pos.y
    }
}
