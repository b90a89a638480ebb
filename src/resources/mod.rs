//! ECS resources made available to systems.
//!
//! Overview
//! - `broadcast` – sending half of the packet transport and its thread bridge
//! - `gameconfig` – movement and tick settings loaded from INI
//! - `pathplanner` – pathfinder shared by movement generators
//! - `worldtime` – wrapping millisecond clock
pub mod broadcast;
pub mod gameconfig;
pub mod pathplanner;
pub mod worldtime;
