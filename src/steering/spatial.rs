//! Sensing of obstacles and neighbouring agents.
//!
//! The controller only talks to a [SpatialQuery]. [GridSpatialQuery] provides one without a
//! physics engine: feelers march over the impassable cells of a [NavGrid] and neighbours come from
//! an [AgentSpatialIndex] bucketed by position. The index is a snapshot taken before a tick so
//! every agent senses the same world regardless of update order.
//!

use std::collections::HashMap;

use crate::prelude::*;
use bevy::prelude::*;

/// Ground the agents walk on
pub const LAYER_TERRAIN: u32 = 1;
/// Static obstacles such as walls, buildings and cliffs
pub const LAYER_OBSTACLE: u32 = 1 << 1;
/// Agents
pub const LAYER_AGENT: u32 = 1 << 2;

/// What a query touched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderRef {
	/// Another agent
	Agent(AgentId),
	/// Static geometry
	Static,
}

/// First contact of a raycast
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
	/// World position of the contact
	pub point: Vec3,
	/// Surface normal at the contact
	pub normal: Vec3,
	/// Distance from the ray origin
	pub distance: f32,
	/// What was hit
	pub collider: ColliderRef,
}

/// A body found inside an overlap query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapHit {
	/// What was found
	pub collider: ColliderRef,
	/// Its world position
	pub position: Vec3,
	/// Whether it is currently following an order
	pub is_moving: bool,
}

/// Raycasts and shape overlaps used by the steering controller
pub trait SpatialQuery: Send + Sync {
	/// First hit along the segment `from -> to` against colliders in `mask`
	fn raycast(&self, from: Vec3, to: Vec3, mask: u32, exclude: Option<AgentId>) -> Option<RayHit>;
	/// Every collider in `mask` whose position lies within `radius` of `center`
	fn overlap_sphere(
		&self,
		center: Vec3,
		radius: f32,
		mask: u32,
		exclude: Option<AgentId>,
	) -> Vec<OverlapHit>;
}

/// Snapshot of agent positions bucketed into square buckets
#[derive(Component, Resource, Clone, Debug)]
pub struct AgentSpatialIndex {
	/// Edge length of a bucket
	bucket_size: f32,
	/// Agents in each bucket, `(id, position, is_moving)`
	buckets: HashMap<(i32, i32), Vec<(AgentId, Vec3, bool)>>,
	/// Number of agents inserted
	len: usize,
}

impl Default for AgentSpatialIndex {
	fn default() -> Self {
		AgentSpatialIndex::new(2.0)
	}
}

impl AgentSpatialIndex {
	/// Create a new empty instance of [AgentSpatialIndex]
	pub fn new(bucket_size: f32) -> Self {
		AgentSpatialIndex {
			bucket_size: bucket_size.max(f32::EPSILON),
			buckets: HashMap::new(),
			len: 0,
		}
	}
	/// Bucket containing a position
	fn bucket_of(&self, position: Vec3) -> (i32, i32) {
		(
			(position.x / self.bucket_size).floor() as i32,
			(position.z / self.bucket_size).floor() as i32,
		)
	}
	/// Empty the index, the bucket allocations are kept
	pub fn clear(&mut self) {
		for bucket in self.buckets.values_mut() {
			bucket.clear();
		}
		self.len = 0;
	}
	pub fn insert(&mut self, id: AgentId, position: Vec3, is_moving: bool) {
		let key = self.bucket_of(position);
		self.buckets
			.entry(key)
			.or_default()
			.push((id, position, is_moving));
		self.len += 1;
	}
	pub fn len(&self) -> usize {
		self.len
	}
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}
	/// Agents within horizontal distance `radius` of `center`
	pub fn query(&self, center: Vec3, radius: f32, exclude: Option<AgentId>) -> Vec<OverlapHit> {
		let mut hits = Vec::new();
		if !(radius >= 0.0) {
			return hits;
		}
		let reach = (radius / self.bucket_size).ceil();
		let radius_sq = radius * radius;
		let mut visit = |bucket: &Vec<(AgentId, Vec3, bool)>| {
			for (id, position, is_moving) in bucket.iter() {
				if Some(*id) == exclude {
					continue;
				}
				if horizontal(*position - center).length_squared() <= radius_sq {
					hits.push(OverlapHit {
						collider: ColliderRef::Agent(*id),
						position: *position,
						is_moving: *is_moving,
					});
				}
			}
		};
		// a window holding more buckets than are occupied is replaced by a scan of the occupied ones
		let window = (2.0 * reach as f64 + 1.0).powi(2);
		if window > self.buckets.len() as f64 {
			for bucket in self.buckets.values() {
				visit(bucket);
			}
		} else {
			let reach = reach as i32;
			let (cx, cz) = self.bucket_of(center);
			for dz in -reach..=reach {
				for dx in -reach..=reach {
					let key = (cx.saturating_add(dx), cz.saturating_add(dz));
					if let Some(bucket) = self.buckets.get(&key) {
						visit(bucket);
					}
				}
			}
		}
		// buckets are visited in hash order
		hits.sort_by_key(|h| match h.collider {
			ColliderRef::Agent(id) => id,
			ColliderRef::Static => AgentId::default(),
		});
		hits
	}
}

/// A [SpatialQuery] backed by a [NavGrid] for static geometry and an [AgentSpatialIndex] for agents
pub struct GridSpatialQuery<'a> {
	/// Impassable cells act as obstacles, [None] means there are no obstacles
	grid: Option<&'a NavGrid>,
	/// Neighbouring agents
	agents: &'a AgentSpatialIndex,
}

impl<'a> GridSpatialQuery<'a> {
	/// Create a new instance of [GridSpatialQuery]
	pub fn new(grid: Option<&'a NavGrid>, agents: &'a AgentSpatialIndex) -> Self {
		GridSpatialQuery { grid, agents }
	}
}

impl SpatialQuery for GridSpatialQuery<'_> {
	fn raycast(&self, from: Vec3, to: Vec3, mask: u32, _exclude: Option<AgentId>) -> Option<RayHit> {
		if mask & (LAYER_TERRAIN | LAYER_OBSTACLE) == 0 {
			return None;
		}
		let grid = self.grid?;
		let source = grid.world_to_grid(from);
		let target = grid.world_to_grid(to);
		// the cell the ray starts in is never a hit, an agent standing on an obstacle can still see out
		for cell in source.get_cells_between_points(&target).into_iter().skip(1) {
			if !grid.get_cost_field().is_impassable(cell) {
				continue;
			}
			if let Some(hit) = intersect_cell(grid, cell, from, to) {
				return Some(hit);
			}
		}
		None
	}
	fn overlap_sphere(
		&self,
		center: Vec3,
		radius: f32,
		mask: u32,
		exclude: Option<AgentId>,
	) -> Vec<OverlapHit> {
		if mask & LAYER_AGENT == 0 {
			return Vec::new();
		}
		self.agents.query(center, radius, exclude)
	}
}

/// Slab test of the segment `from -> to` against the square of a cell on the ground plane
fn intersect_cell(grid: &NavGrid, cell: GridCell, from: Vec3, to: Vec3) -> Option<RayHit> {
	let cell_size = grid.get_dimensions().get_cell_size();
	let min = Vec2::new(cell.get_x() as f32, cell.get_z() as f32) * cell_size;
	let max = min + Vec2::splat(cell_size);
	let origin = Vec2::new(from.x, from.z);
	let delta = Vec2::new(to.x - from.x, to.z - from.z);
	let mut t_enter = f32::NEG_INFINITY;
	let mut t_exit = f32::INFINITY;
	let mut normal = Vec2::ZERO;
	for axis in 0..2 {
		if delta[axis].abs() < f32::EPSILON {
			if origin[axis] < min[axis] || origin[axis] > max[axis] {
				return None;
			}
			continue;
		}
		let t1 = (min[axis] - origin[axis]) / delta[axis];
		let t2 = (max[axis] - origin[axis]) / delta[axis];
		let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
		if near > t_enter {
			t_enter = near;
			normal = Vec2::ZERO;
			normal[axis] = -delta[axis].signum();
		}
		t_exit = t_exit.min(far);
	}
	if t_enter > t_exit || t_exit < 0.0 || t_enter > 1.0 {
		return None;
	}
	let t = t_enter.max(0.0);
	let length = (to - from).length();
	Some(RayHit {
		point: from + (to - from) * t,
		normal: Vec3::new(normal.x, 0.0, normal.y),
		distance: length * t,
		collider: ColliderRef::Static,
	})
}
