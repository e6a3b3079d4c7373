//! The per tick update of a single agent.
//!
//! Each tick an agent:
//!
//! 1. falls under gravity unless grounded
//! 2. if it has no order, stops horizontally, settles and returns
//! 3. if it has no flow field, moves with its current velocity and returns
//! 4. samples the flow under it, no direction means it has nowhere better to go so it stops
//! 5. computes the desired (flow), separation and obstacle avoidance forces
//! 6. blends them into a single direction of travel
//! 7. checks whether it has stalled and if so nudges itself sideways
//! 8. turns towards the direction of travel and moves
//! 9. pushes away any agent it is overlapping
//! 10. stops once it is close enough to its target
//!
//! Pushes are not applied here, they are returned so the caller can apply them once every agent
//! has moved, see [crate::steering::push::PushAccumulator].
//!

use crate::prelude::*;
use bevy::prelude::*;
use rand::Rng;

/// Everything an agent senses and moves through during a tick
pub struct SteeringContext<'a> {
	/// The field to follow, [None] when the agent is not bound to one
	pub field: Option<&'a dyn FlowFieldQuery>,
	/// Obstacle and neighbour sensing
	pub spatial: &'a dyn SpatialQuery,
	/// Physical step
	pub motion: &'a dyn MotionDriver,
	/// Tunables
	pub config: &'a SteeringConfig,
	/// Fixed timestep in seconds
	pub dt: f32,
}

/// What a tick produced besides the agent's own new state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SteerOutcome {
	/// Notable changes of the agent
	pub events: Vec<SteeringEvent>,
	/// Displacements for neighbouring agents
	pub pushes: Vec<Push>,
	/// Why the agent could not be steered this tick, it still moved with its current velocity
	pub fault: Option<NavError>,
}

/// Advance one agent by a tick
pub fn steer<R: Rng + ?Sized>(
	id: AgentId,
	state: &mut AgentState,
	rng: &mut R,
	ctx: &SteeringContext,
) -> SteerOutcome {
	let config = ctx.config;
	let dt = ctx.dt;
	let mut outcome = SteerOutcome::default();
	if !state.is_grounded {
		state.velocity.y -= config.gravity * dt;
	}
	if !state.is_moving {
		state.velocity.x = 0.0;
		state.velocity.z = 0.0;
		apply_motion(state, ctx);
		return outcome;
	}
	let Some(field) = ctx.field else {
		let fault = NavError::MissingFieldReference;
		debug!("Agent {} moving unsteered: {}", id.get(), fault);
		outcome.fault = Some(fault);
		apply_motion(state, ctx);
		return outcome;
	};
	let flow = field.get_flow_direction(state.position);
	state.current_flow_direction = flow;
	if flow == Vec2::ZERO {
		debug!("Agent {} found no flow at {}", id.get(), state.position);
		state.stop();
		apply_motion(state, ctx);
		outcome.events.push(SteeringEvent::DeadEnd);
		return outcome;
	}
	let desired = Vec3::new(flow.x, 0.0, flow.y);
	let neighbours = ctx.spatial.overlap_sphere(
		state.position,
		config.separation_radius,
		config.agent_mask,
		Some(id),
	);
	let separation = separation_force(id, state.position, &neighbours, config);
	let avoidance = avoidance_force(id, state.position, state.heading(), ctx.spatial, config);
	let mut direction = (desired + separation * config.separation_weight + avoidance).normalize_or_zero();
	if direction == Vec3::ZERO {
		// forces cancelled out exactly
		direction = desired;
	}

	let displacement = horizontal(state.position - state.last_position).length();
	state.last_position = state.position;
	if displacement < config.stuck_threshold * dt {
		if state.stall_origin.is_none() {
			state.stall_origin = Some(state.position);
		}
		state.stuck_timer += dt;
	} else {
		state.stuck_timer = 0.0;
		if let Some(origin) = state.stall_origin {
			if horizontal(state.position - origin).length() > config.arrival_distance {
				state.stall_origin = None;
				state.unstick_attempts = 0;
			}
		}
	}
	if state.stuck_timer > config.stuck_time_limit {
		state.stuck_timer = 0.0;
		if state.unstick_attempts >= config.max_unstick_attempts {
			warn!(
				"Agent {} still stalled after {} nudges, abandoning its order",
				id.get(),
				state.unstick_attempts
			);
			state.stop();
			state.unstick_attempts = 0;
			apply_motion(state, ctx);
			outcome.events.push(SteeringEvent::StallUnresolved);
			return outcome;
		}
		state.unstick_attempts += 1;
		let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
		let lateral = Vec3::new(-direction.z, 0.0, direction.x) * sign;
		direction = (direction + lateral).normalize_or_zero();
		debug!(
			"Agent {} stalled, nudging sideways (attempt {})",
			id.get(),
			state.unstick_attempts
		);
		outcome.events.push(SteeringEvent::StallRecovered {
			attempt: state.unstick_attempts,
		});
	}

	if direction != Vec3::ZERO {
		let target_yaw = yaw_from_direction(direction);
		state.yaw = lerp_angle(state.yaw, target_yaw, config.rotation_speed * dt);
	}
	state.velocity.x = direction.x * config.speed;
	state.velocity.z = direction.z * config.speed;
	apply_motion(state, ctx);

	outcome.pushes = pushes_onto_neighbours(id, state.position, ctx);

	if state.distance_to_target() < config.arrival_distance {
		state.stop();
		outcome.events.push(SteeringEvent::Arrived);
	}
	outcome
}

/// Run the physical step and adopt its result
fn apply_motion(state: &mut AgentState, ctx: &SteeringContext) {
	let result = ctx
		.motion
		.move_and_slide(state.position, state.velocity, ctx.dt);
	state.position = result.position;
	state.velocity = result.velocity;
	state.is_grounded = result.is_grounded;
}

/// Direction `id` should move to get away from `other` when they occupy the same spot
fn tie_break(id: AgentId, other: ColliderRef) -> Vec3 {
	match other {
		ColliderRef::Agent(other) if id < other => Vec3::NEG_X,
		_ => Vec3::X,
	}
}

/// Repulsion from neighbours within the separation radius, each contributing
/// `(1 - distance / radius)` along the direction away from it. Clamped to
/// [SteeringConfig::max_avoidance_force]
pub fn separation_force(
	id: AgentId,
	position: Vec3,
	neighbours: &[OverlapHit],
	config: &SteeringConfig,
) -> Vec3 {
	let radius = config.separation_radius;
	if radius <= 0.0 {
		return Vec3::ZERO;
	}
	let mut force = Vec3::ZERO;
	for neighbour in neighbours.iter() {
		let offset = horizontal(position - neighbour.position);
		let distance = offset.length();
		if distance >= radius {
			continue;
		}
		let away = if distance > f32::EPSILON {
			offset / distance
		} else {
			tie_break(id, neighbour.collider)
		};
		force += away * (1.0 - distance / radius);
	}
	force.clamp_length_max(config.max_avoidance_force)
}

/// Sum of the flattened normals hit by a fan of feelers around `heading`. Clamped to
/// [SteeringConfig::max_avoidance_force]
pub fn avoidance_force(
	id: AgentId,
	position: Vec3,
	heading: Vec3,
	spatial: &dyn SpatialQuery,
	config: &SteeringConfig,
) -> Vec3 {
	let mut force = Vec3::ZERO;
	for angle in config.avoidance_ray_angles.iter() {
		let direction = Quat::from_rotation_y(angle.to_radians()) * heading;
		let end = position + direction * config.avoidance_ray_length;
		if let Some(hit) = spatial.raycast(position, end, config.obstacle_mask, Some(id)) {
			force += horizontal(hit.normal).normalize_or_zero();
		}
	}
	force.clamp_length_max(config.max_avoidance_force)
}

/// Pushes for every agent overlapping `position` within [SteeringConfig::push_radius]
fn pushes_onto_neighbours(id: AgentId, position: Vec3, ctx: &SteeringContext) -> Vec<Push> {
	let config = ctx.config;
	let mut pushes = Vec::new();
	let hits = ctx
		.spatial
		.overlap_sphere(position, config.push_radius, config.agent_mask, Some(id));
	for hit in hits.iter() {
		let ColliderRef::Agent(other) = hit.collider else {
			continue;
		};
		let multiplier = if hit.is_moving {
			1.0
		} else {
			config.idle_push_multiplier
		};
		if let Some(delta) = push_delta(
			position,
			hit.position,
			config.push_radius,
			config.push_strength,
			multiplier,
			-tie_break(id, hit.collider),
		) {
			pushes.push(Push {
				target: other,
				delta: delta * ctx.dt,
			});
		}
	}
	pushes
}
