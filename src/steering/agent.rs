//! Per agent state mutated by the steering controller every tick
//!

use bevy::prelude::*;

/// Typed handle of an agent, used to address neighbours and pushes without looking them up by
/// scene position or type
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AgentId(u64);

impl AgentId {
	/// Create a new instance of [AgentId]
	pub fn new(id: u64) -> Self {
		AgentId(id)
	}
	pub fn get(&self) -> u64 {
		self.0
	}
}

/// Movement state of a single agent
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
	/// Current world position
	pub position: Vec3,
	/// Where the agent was last ordered to go
	pub target_position: Vec3,
	/// Velocity including the vertical component
	pub velocity: Vec3,
	/// Heading around the `y` axis in radians, `0` faces `-z`
	pub yaw: f32,
	/// Whether the agent is following the flow field
	pub is_moving: bool,
	/// Whether the agent receives move orders for the selection
	pub is_selected: bool,
	/// Whether the agent is standing on the terrain
	pub is_grounded: bool,
	/// Flow sampled on the last moving tick, `(x, z)`
	pub current_flow_direction: Vec2,
	/// Seconds spent moving slower than the stall threshold
	pub stuck_timer: f32,
	/// Position at the start of the previous tick
	pub last_position: Vec3,
	/// Nudges tried since the current stall began
	pub unstick_attempts: u32,
	/// Where the current stall began, cleared once the agent gets clear of it
	pub stall_origin: Option<Vec3>,
}

impl AgentState {
	/// Create a new instance of [AgentState] standing still at `position`
	pub fn new(position: Vec3) -> Self {
		AgentState {
			position,
			target_position: position,
			velocity: Vec3::ZERO,
			yaw: 0.0,
			is_moving: false,
			is_selected: false,
			is_grounded: false,
			current_flow_direction: Vec2::ZERO,
			stuck_timer: 0.0,
			last_position: position,
			unstick_attempts: 0,
			stall_origin: None,
		}
	}
	/// Order the agent towards `target`, any stall bookkeeping from a previous order is dropped
	pub fn command_move(&mut self, target: Vec3) {
		self.target_position = target;
		self.is_moving = true;
		self.stuck_timer = 0.0;
		self.last_position = self.position;
		self.unstick_attempts = 0;
		self.stall_origin = None;
	}
	/// Halt horizontal movement
	pub fn stop(&mut self) {
		self.is_moving = false;
		self.velocity.x = 0.0;
		self.velocity.z = 0.0;
		self.stuck_timer = 0.0;
		self.stall_origin = None;
	}
	/// Horizontal distance to the ordered target
	pub fn distance_to_target(&self) -> f32 {
		horizontal(self.target_position - self.position).length()
	}
	/// Unit vector the agent is facing on the ground plane
	pub fn heading(&self) -> Vec3 {
		heading_from_yaw(self.yaw)
	}
}

/// Outcome of a tick worth telling the rest of the game about
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SteeringEvent {
	/// The agent came within arrival distance of its target and stopped
	Arrived,
	/// The flow under the agent had no direction so it stopped short of its target
	DeadEnd,
	/// A stall was detected and the agent was nudged sideways
	StallRecovered {
		/// Nudges tried within this stall
		attempt: u32,
	},
	/// The agent stayed stalled after every nudge and has given up on its order
	StallUnresolved,
}

/// Drop the vertical component
pub fn horizontal(v: Vec3) -> Vec3 {
	Vec3::new(v.x, 0.0, v.z)
}

/// Facing direction of a yaw, matching [Transform::forward] of `Quat::from_rotation_y(yaw)`
pub fn heading_from_yaw(yaw: f32) -> Vec3 {
	Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Yaw which faces along a horizontal direction
pub fn yaw_from_direction(direction: Vec3) -> f32 {
	f32::atan2(-direction.x, -direction.z)
}

/// Turn from `from` towards `to` by a fraction `t` along the shortest arc
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
	let tau = std::f32::consts::TAU;
	let difference = (to - from).rem_euclid(tau);
	let shortest = if difference > std::f32::consts::PI {
		difference - tau
	} else {
		difference
	};
	from + shortest * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn yaw_round_trip() {
		let direction = Vec3::new(1.0, 0.0, 0.0);
		let yaw = yaw_from_direction(direction);
		assert!((heading_from_yaw(yaw) - direction).length() < 1e-5);
	}
	#[test]
	fn heading_matches_transform_forward() {
		let yaw = 0.7;
		let transform = Transform::from_rotation(Quat::from_rotation_y(yaw));
		assert!((transform.forward().as_vec3() - heading_from_yaw(yaw)).length() < 1e-5);
	}
	#[test]
	fn lerp_angle_takes_short_way() {
		let from = 170_f32.to_radians();
		let to = -170_f32.to_radians();
		let result = lerp_angle(from, to, 0.5);
		assert!((result - 180_f32.to_radians()).abs() < 1e-4);
	}
	#[test]
	fn command_resets_stall() {
		let mut state = AgentState::new(Vec3::ZERO);
		state.stuck_timer = 0.5;
		state.unstick_attempts = 2;
		state.command_move(Vec3::new(4.0, 0.0, 3.0));
		assert!(state.is_moving);
		assert_eq!(0, state.unstick_attempts);
		assert_eq!(5.0, state.distance_to_target());
	}
}
