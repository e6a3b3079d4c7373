//! Tunables of the steering controller
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Every tunable used by [crate::steering::controller::steer]. The defaults describe a small
/// infantry unit walking over unit sized cells
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Component, Clone, Debug, PartialEq)]
pub struct SteeringConfig {
	/// Horizontal speed in world units per second
	pub speed: f32,
	/// Rate at which the heading turns towards the direction of travel
	pub rotation_speed: f32,
	/// Neighbours closer than this push the agent away
	pub separation_radius: f32,
	/// How much more separation matters than following the flow
	pub separation_weight: f32,
	/// Maximum length of the separation and the obstacle avoidance forces
	pub max_avoidance_force: f32,
	/// Angles in degrees, relative to the heading, of the obstacle feelers
	pub avoidance_ray_angles: Vec<f32>,
	/// Length of each obstacle feeler
	pub avoidance_ray_length: f32,
	/// Speed below which the agent is considered stalled
	pub stuck_threshold: f32,
	/// Seconds spent stalled before a sideways nudge is tried
	pub stuck_time_limit: f32,
	/// Nudges tried within one stall before the agent gives up and stops
	pub max_unstick_attempts: u32,
	/// Other agents within this distance are pushed away
	pub push_radius: f32,
	/// Strength of a push at zero distance
	pub push_strength: f32,
	/// Multiplier applied when pushing an agent which is not moving
	pub idle_push_multiplier: f32,
	/// Horizontal distance from the target at which the agent stops
	pub arrival_distance: f32,
	/// Downward acceleration while not grounded
	pub gravity: f32,
	/// Layers the obstacle feelers collide with
	pub obstacle_mask: u32,
	/// Layers searched for neighbouring agents
	pub agent_mask: u32,
}

impl Default for SteeringConfig {
	fn default() -> Self {
		SteeringConfig {
			speed: 5.0,
			rotation_speed: 10.0,
			separation_radius: 2.0,
			separation_weight: 1.5,
			max_avoidance_force: 2.0,
			avoidance_ray_angles: vec![-30.0, -15.0, 0.0, 15.0, 30.0],
			avoidance_ray_length: 2.0,
			stuck_threshold: 0.1,
			stuck_time_limit: 1.0,
			max_unstick_attempts: 3,
			push_radius: 1.0,
			push_strength: 2.0,
			idle_push_multiplier: 2.0,
			arrival_distance: 1.0,
			gravity: 9.8,
			obstacle_mask: LAYER_TERRAIN | LAYER_OBSTACLE,
			agent_mask: LAYER_AGENT,
		}
	}
}

impl SteeringConfig {
	/// Read a [SteeringConfig] from a `ron` file, missing fields take their default
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, NavError> {
		let file = std::fs::File::open(path)?;
		let config: SteeringConfig =
			ron::de::from_reader(file).map_err(|e| NavError::Deserialize(e.to_string()))?;
		Ok(config)
	}
	/// Parse a [SteeringConfig] from a `ron` string
	#[cfg(feature = "ron")]
	pub fn from_ron_str(data: &str) -> Result<Self, NavError> {
		ron::from_str(data).map_err(|e| NavError::Deserialize(e.to_string()))
	}
}
