//! Unit movement core of a multiplayer world server.
//!
//! This crate exposes the ECS components, resources, systems, events and
//! movement generators of the simulation for the server binary and for
//! integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod movement;
pub mod resources;
pub mod systems;
