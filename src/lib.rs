//! This is a plugin for Bevy game engine to setup and handle the logic for calculating pathfinding
//! FlowFields over a navigation grid and steering groups of units along them
//!

pub mod bundle;
pub mod error;
pub mod flowfields;
pub mod plugin;
pub mod steering;

pub mod prelude;
