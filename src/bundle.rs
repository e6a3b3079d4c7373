//! Map dimensions and the bundles used to spawn a navigation grid and the agents that steer over it
//!

use crate::prelude::*;
use bevy::prelude::*;

/// The number of columns `x` and rows `z` of the navigation grid along with the world size of a
/// cell edge. The grid starts at the world origin and extends along positive `x` and `z`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapDimensions {
	/// Number of columns
	width: u32,
	/// Number of rows
	depth: u32,
	/// World units per cell edge
	cell_size: f32,
}

impl Default for MapDimensions {
	fn default() -> Self {
		MapDimensions {
			width: 64,
			depth: 64,
			cell_size: 1.0,
		}
	}
}

impl MapDimensions {
	/// Create a new instance of [MapDimensions]. For 3d the recommendation is for a `unit` of
	/// space to be 1 meter, a `cell_size` of `2.0` would then make each cell 2 meters square
	pub fn new(width: u32, depth: u32, cell_size: f32) -> Self {
		match MapDimensions::try_new(width, depth, cell_size) {
			Ok(dimensions) => dimensions,
			Err(e) => panic!("{}", e),
		}
	}
	/// Create a new instance of [MapDimensions] reporting dimensions which cannot form a grid
	pub fn try_new(width: u32, depth: u32, cell_size: f32) -> Result<Self, NavError> {
		if width == 0 || depth == 0 {
			return Err(NavError::InvalidDimensions {
				reason: format!("`({}, {})` must have at least one cell on each axis", width, depth),
			});
		}
		if !(cell_size.is_finite() && cell_size > 0.0) {
			return Err(NavError::InvalidDimensions {
				reason: format!("cell size {} must be positive", cell_size),
			});
		}
		Ok(MapDimensions {
			width,
			depth,
			cell_size,
		})
	}
	pub fn get_width(&self) -> u32 {
		self.width
	}
	pub fn get_depth(&self) -> u32 {
		self.depth
	}
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Total number of cells
	pub fn cell_count(&self) -> usize {
		self.width as usize * self.depth as usize
	}
	/// The cell containing a world position. The result is not bounds checked, use
	/// [MapDimensions::is_valid_cell] before indexing a field with it
	pub fn world_to_grid(&self, position: Vec3) -> GridCell {
		GridCell::new(
			(position.x / self.cell_size).floor() as i32,
			(position.z / self.cell_size).floor() as i32,
		)
	}
	/// The world position of the centre of a cell at height `y`
	pub fn grid_to_world(&self, cell: GridCell, y: f32) -> Vec3 {
		Vec3::new(
			(cell.get_x() as f32 + 0.5) * self.cell_size,
			y,
			(cell.get_z() as f32 + 0.5) * self.cell_size,
		)
	}
	/// Whether the cell lies inside the grid
	pub fn is_valid_cell(&self, cell: GridCell) -> bool {
		let (x, z) = cell.get_xz();
		x >= 0 && z >= 0 && x < self.width as i32 && z < self.depth as i32
	}
	/// Flat index of a cell, [None] outside the grid
	pub fn get_index(&self, cell: GridCell) -> Option<usize> {
		if self.is_valid_cell(cell) {
			Some(cell.get_z() as usize * self.width as usize + cell.get_x() as usize)
		} else {
			None
		}
	}
	/// Cells whose integer offset `(dx, dz)` from `centre` satisfies `dx² + dz² <= radius²`,
	/// clipped to the grid. The radius is measured in cells, not world units
	pub fn cells_in_disk(&self, centre: GridCell, radius: f32) -> Vec<GridCell> {
		if !(radius >= 0.0) {
			return Vec::new();
		}
		// float to int casts saturate so an infinite radius becomes i64::MAX
		let reach = radius.floor() as i64;
		let radius_sq = radius as f64 * radius as f64;
		let (cx, cz) = (centre.get_x() as i64, centre.get_z() as i64);
		// only visit the part of the bounding square that lies on the grid
		let min_x = cx.saturating_sub(reach).max(0);
		let max_x = cx.saturating_add(reach).min(self.width as i64 - 1);
		let min_z = cz.saturating_sub(reach).max(0);
		let max_z = cz.saturating_add(reach).min(self.depth as i64 - 1);
		let mut cells = Vec::new();
		for z in min_z..=max_z {
			for x in min_x..=max_x {
				let (dx, dz) = ((x - cx) as f64, (z - cz) as f64);
				if dx * dx + dz * dz > radius_sq {
					continue;
				}
				cells.push(GridCell::new(x as i32, z as i32));
			}
		}
		cells
	}
}

/// Spawns a navigable grid, agents bound to the entity read its [NavGrid] and find their
/// neighbours in its [AgentSpatialIndex]
#[derive(Bundle)]
pub struct FlowFieldNavBundle {
	/// Cost, integration and flow fields
	nav_grid: NavGrid,
	/// Positions of the agents steering over the grid
	spatial_index: AgentSpatialIndex,
}

impl FlowFieldNavBundle {
	/// Create a new instance of [FlowFieldNavBundle] with every cell passable
	pub fn new(dimensions: MapDimensions) -> Self {
		FlowFieldNavBundle {
			nav_grid: NavGrid::new(dimensions),
			spatial_index: AgentSpatialIndex::new(dimensions.get_cell_size()),
		}
	}
	/// Create a new instance of [FlowFieldNavBundle] from a prepared [NavGrid]
	pub fn from_grid(nav_grid: NavGrid) -> Self {
		let cell_size = nav_grid.get_dimensions().get_cell_size();
		FlowFieldNavBundle {
			nav_grid,
			spatial_index: AgentSpatialIndex::new(cell_size),
		}
	}
	/// Create a new instance of [FlowFieldNavBundle] where the [CostField] is read from a `ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron(cell_size: f32, path: &str) -> Result<Self, NavError> {
		let cost_field = CostField::from_ron(path)?;
		Ok(FlowFieldNavBundle::from_grid(NavGrid::from_cost_field(
			cost_field, cell_size,
		)?))
	}
	/// Create a new instance of [FlowFieldNavBundle] where the [CostField] is read from a csv file
	#[cfg(feature = "csv")]
	pub fn from_csv(cell_size: f32, path: &str) -> Result<Self, NavError> {
		let cost_field = CostField::from_csv(path)?;
		Ok(FlowFieldNavBundle::from_grid(NavGrid::from_cost_field(
			cost_field, cell_size,
		)?))
	}
}

/// Spawns an agent which steers over the grid entity `field`
#[derive(Bundle)]
pub struct SteeringAgentBundle {
	/// Steering state of the agent
	agent: SteeringAgent,
	/// Tunables of the agent
	config: SteeringConfig,
	/// Where the agent is in the world
	transform: Transform,
}

impl SteeringAgentBundle {
	/// Create a new instance of [SteeringAgentBundle] standing still at `position`
	pub fn new(position: Vec3, field: Option<Entity>, config: SteeringConfig) -> Self {
		SteeringAgentBundle {
			agent: SteeringAgent::new(position, field),
			config,
			transform: Transform::from_translation(position),
		}
	}
}
