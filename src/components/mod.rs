//! ECS components for units.
//!
//! Submodules overview:
//! - [`directionalmovement`] – held directions, move vector, timers, motion authority
//! - [`mapposition`] – world-space position of a unit
//! - [`motionmaster`] – top-level movement generator slot
//! - [`unit`] – unit identity and the spawn bundle
//! - [`updatefields`] – typed attribute store with change tracking

pub mod directionalmovement;
pub mod mapposition;
pub mod motionmaster;
pub mod unit;
pub mod updatefields;
