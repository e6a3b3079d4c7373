//! Applying a velocity to an agent. The controller treats the physical step as opaque, a game
//! running a physics engine implements [MotionDriver] on top of its character controller while
//! [GridSlideMotion] provides a standalone one which slides along impassable cells
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Where an agent ended up after a physical step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionResult {
	/// Resolved position
	pub position: Vec3,
	/// Velocity after collisions removed the blocked components
	pub velocity: Vec3,
	/// Whether the agent ended the step on the ground
	pub is_grounded: bool,
}

/// Moves a body by a velocity for a timestep, resolving collisions against static geometry
pub trait MotionDriver: Send + Sync {
	/// Apply `velocity` for `dt` seconds starting at `position`
	fn move_and_slide(&self, position: Vec3, velocity: Vec3, dt: f32) -> MotionResult;
}

/// Height of the ground under a point
pub trait TerrainHeight: Send + Sync {
	/// Ground height at world `(x, z)`
	fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Level ground at a fixed height
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain {
	/// Height of the ground
	pub height: f32,
}

impl TerrainHeight for FlatTerrain {
	fn height_at(&self, _x: f32, _z: f32) -> f32 {
		self.height
	}
}

/// Moves along `x` and `z` separately so that a blocked axis slides along the other. Cells
/// outside the grid are open ground
pub struct GridSlideMotion<'a> {
	/// Impassable cells block movement, [None] means nothing blocks
	grid: Option<&'a NavGrid>,
	/// Ground to stand on
	terrain: &'a dyn TerrainHeight,
	/// Bodies this close above the ground are snapped onto it
	snap_distance: f32,
}

impl<'a> GridSlideMotion<'a> {
	/// Create a new instance of [GridSlideMotion]
	pub fn new(grid: Option<&'a NavGrid>, terrain: &'a dyn TerrainHeight) -> Self {
		GridSlideMotion {
			grid,
			terrain,
			snap_distance: 0.2,
		}
	}
	/// Whether stepping from `from` into `to` would enter an impassable cell
	fn is_blocked(&self, from: Vec3, to: Vec3) -> bool {
		let Some(grid) = self.grid else {
			return false;
		};
		let target = grid.world_to_grid(to);
		// a body already inside an obstacle may walk out of it
		target != grid.world_to_grid(from) && grid.get_cost_field().is_impassable(target)
	}
}

impl MotionDriver for GridSlideMotion<'_> {
	fn move_and_slide(&self, position: Vec3, velocity: Vec3, dt: f32) -> MotionResult {
		let mut next = position;
		let mut velocity = velocity;
		let step_x = Vec3::new(next.x + velocity.x * dt, next.y, next.z);
		if self.is_blocked(next, step_x) {
			velocity.x = 0.0;
		} else {
			next = step_x;
		}
		let step_z = Vec3::new(next.x, next.y, next.z + velocity.z * dt);
		if self.is_blocked(next, step_z) {
			velocity.z = 0.0;
		} else {
			next = step_z;
		}
		next.y += velocity.y * dt;
		let ground = self.terrain.height_at(next.x, next.z);
		let is_grounded = next.y <= ground || (velocity.y <= 0.0 && next.y - ground <= self.snap_distance);
		if is_grounded {
			next.y = ground;
			velocity.y = 0.0;
		}
		MotionResult {
			position: next,
			velocity,
			is_grounded,
		}
	}
}
