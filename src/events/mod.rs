//! Messages exchanged with the outside world.
//!
//! Submodules:
//! - [`input`] – inbound movement, chat and motion commands
//! - [`packets`] – outbound packets broadcast to nearby observers
pub mod input;
pub mod packets;
