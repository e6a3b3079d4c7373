//! Per unit steering over a solved flow field.
//!
//! The flow field only says which neighbouring cell is closer to the target. Turning that into
//! stable group movement is the job of the controller which blends the flow with local forces:
//!
//! * separation from nearby agents, weighted above the flow so units don't overlap
//! * obstacle avoidance from a fan of short feelers
//! * a sideways nudge when a unit stops making progress
//! * soft pushes onto agents it still overlaps after moving
//!
//! The controller senses and moves through traits ([spatial::SpatialQuery],
//! [motion::MotionDriver], [motion::TerrainHeight]) so it can run inside a physics engine or
//! standalone over a [crate::prelude::NavGrid].
//!

pub mod agent;
pub mod config;
pub mod controller;
pub mod motion;
pub mod push;
pub mod registry;
pub mod spatial;
