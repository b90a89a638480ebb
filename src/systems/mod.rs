//! Server systems.
//!
//! Submodules overview
//! - [`input`] – apply movement and chat input to units
//! - [`motion`] – start, cancel and drive movement generators
//! - [`movement`] – extrapolate positions and send heartbeats
//! - [`replication`] – announce new units, drain field changes
//! - [`time`] – advance the simulation clock
//! - [`transport`] – the packet transport thread

pub mod input;
pub mod motion;
pub mod movement;
pub mod replication;
pub mod time;
pub mod transport;
