//! The [NavGrid] owns the three fields of a single navigable area and is the one place they are
//! edited and solved.
//!
//! Obstacles and graded terrain are written into the [CostField] by the editing methods, none of
//! them trigger a solve. [NavGrid::generate] then rebuilds the [IntegrationField] and [FlowField]
//! towards a target:
//!
//! ```text
//! Idle -> Reset -> Propagate -> Derive -> Idle
//! ```
//!
//! The fields are a pure function of the costs and the target so a request for the target that
//! was last solved is answered from the existing fields. After editing costs call
//! [NavGrid::invalidate] (or [NavGrid::regenerate]) so the next request is solved again.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Result of asking a [NavGrid] for a flow field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
	/// The target matches the last solve, the fields were left untouched
	Cached,
	/// The fields were rebuilt
	Solved(PropagationStats),
}

/// Read access used by agents to follow a solved field
pub trait FlowFieldQuery: Send + Sync {
	/// Unit `(x, z)` direction of travel at a world position, [Vec2::ZERO] outside the grid or
	/// where no neighbouring cell is closer to the target
	fn get_flow_direction(&self, world_pos: Vec3) -> Vec2;
	/// Cost of entering the cell under a world position, [COST_IMPASSABLE] outside the grid
	fn get_cell_cost(&self, world_pos: Vec3) -> u32;
}

/// A fixed size navigation grid with its cost, integration and flow fields
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Debug, PartialEq)]
pub struct NavGrid {
	/// Size of the grid
	dimensions: MapDimensions,
	/// Cost of entering each cell
	cost_field: CostField,
	/// Cumulative cost to the last target
	integration_field: IntegrationField,
	/// Direction of travel towards the last target
	flow_field: FlowField,
	/// The target of the fields currently held, [None] when they need solving
	last_target: Option<GridCell>,
	/// Queue discipline used when solving
	propagation: Propagation,
	/// Number of solves actually run
	solve_count: u64,
}

impl NavGrid {
	/// Create a new instance of [NavGrid] where every cell is passable and nothing is solved
	pub fn new(dimensions: MapDimensions) -> Self {
		let (width, depth) = (dimensions.get_width(), dimensions.get_depth());
		NavGrid {
			dimensions,
			cost_field: CostField::new(width, depth),
			integration_field: IntegrationField::new(width, depth),
			flow_field: FlowField::new(width, depth),
			last_target: None,
			propagation: Propagation::default(),
			solve_count: 0,
		}
	}
	/// Create a new instance of [NavGrid] around an existing [CostField]
	pub fn from_cost_field(cost_field: CostField, cell_size: f32) -> Result<Self, NavError> {
		let dimensions =
			MapDimensions::try_new(cost_field.get_width(), cost_field.get_depth(), cell_size)?;
		let mut grid = NavGrid::new(dimensions);
		grid.cost_field = cost_field;
		Ok(grid)
	}
	/// Use a different [Propagation] for subsequent solves
	pub fn with_propagation(mut self, propagation: Propagation) -> Self {
		self.propagation = propagation;
		self
	}
	pub fn get_dimensions(&self) -> &MapDimensions {
		&self.dimensions
	}
	pub fn get_cost_field(&self) -> &CostField {
		&self.cost_field
	}
	pub fn get_integration_field(&self) -> &IntegrationField {
		&self.integration_field
	}
	pub fn get_flow_field(&self) -> &FlowField {
		&self.flow_field
	}
	pub fn get_last_target(&self) -> Option<GridCell> {
		self.last_target
	}
	pub fn get_propagation(&self) -> Propagation {
		self.propagation
	}
	pub fn set_propagation(&mut self, propagation: Propagation) {
		self.propagation = propagation;
	}
	/// Number of times the fields have actually been rebuilt
	pub fn get_solve_count(&self) -> u64 {
		self.solve_count
	}
	/// See [MapDimensions::world_to_grid]
	pub fn world_to_grid(&self, position: Vec3) -> GridCell {
		self.dimensions.world_to_grid(position)
	}
	/// See [MapDimensions::grid_to_world]
	pub fn grid_to_world(&self, cell: GridCell, y: f32) -> Vec3 {
		self.dimensions.grid_to_world(cell, y)
	}
	/// See [MapDimensions::is_valid_cell]
	pub fn is_valid_cell(&self, cell: GridCell) -> bool {
		self.dimensions.is_valid_cell(cell)
	}
	/// Build the error for a cell outside the grid
	fn out_of_bounds(&self, cell: GridCell) -> NavError {
		NavError::OutOfBounds {
			cell,
			width: self.dimensions.get_width(),
			depth: self.dimensions.get_depth(),
		}
	}
	/// Mark or clear an obstacle at the cell containing `world_pos`. Positions outside the grid
	/// are rejected without changing anything
	pub fn set_obstacle(&mut self, world_pos: Vec3, is_obstacle: bool) -> Result<(), NavError> {
		let cell = self.world_to_grid(world_pos);
		let cost = if is_obstacle {
			COST_IMPASSABLE
		} else {
			COST_DEFAULT
		};
		self.cost_field.set_cost(cost, cell)
	}
	/// Mark or clear obstacles over a disk of cells around `world_pos`, see
	/// [MapDimensions::cells_in_disk]. Returns the number of cells written
	pub fn set_obstacle_area(&mut self, world_pos: Vec3, radius: f32, is_obstacle: bool) -> usize {
		let cost = if is_obstacle {
			COST_IMPASSABLE
		} else {
			COST_DEFAULT
		};
		let centre = self.world_to_grid(world_pos);
		let cells = self.dimensions.cells_in_disk(centre, radius);
		for cell in cells.iter() {
			self.cost_field.set_field_cell_value(cost, *cell);
		}
		cells.len()
	}
	/// Write a graded terrain cost over a disk of cells around `world_pos`. Returns the number of
	/// cells written
	pub fn set_cost_area(&mut self, world_pos: Vec3, radius: f32, cost: u32) -> Result<usize, NavError> {
		if !is_valid_cost(cost) {
			return Err(NavError::InvalidCost { value: cost });
		}
		let centre = self.world_to_grid(world_pos);
		let cells = self.dimensions.cells_in_disk(centre, radius);
		for cell in cells.iter() {
			self.cost_field.set_field_cell_value(cost, *cell);
		}
		Ok(cells.len())
	}
	/// Write a cost into a single cell
	pub fn set_cell_cost(&mut self, cell: GridCell, cost: u32) -> Result<(), NavError> {
		self.cost_field.set_cost(cost, cell)
	}
	/// Every cell back to [COST_DEFAULT], the next solve runs even for an unchanged target
	pub fn clear_all_obstacles(&mut self) {
		self.cost_field.reset();
		self.invalidate();
	}
	/// Forget the last target so the next [NavGrid::generate] rebuilds the fields
	pub fn invalidate(&mut self) {
		self.last_target = None;
	}
	/// Forget the last target and drop the solved fields, every cell reports no flow until the
	/// next solve
	pub fn discard_fields(&mut self) {
		let (width, depth) = (self.dimensions.get_width(), self.dimensions.get_depth());
		self.integration_field = IntegrationField::new(width, depth);
		self.flow_field = FlowField::new(width, depth);
		self.invalidate();
	}
	/// Whether the cells under two world positions are connected by passable cells
	pub fn is_reachable(&self, from: Vec3, to: Vec3) -> bool {
		self.cost_field
			.is_cell_pair_reachable(self.world_to_grid(from), self.world_to_grid(to))
	}
	/// Rebuild the fields towards the cell containing `target`. A target outside the grid or on an
	/// impassable cell is rejected and the fields are left intact. Asking for the target of the
	/// last solve is a no-op
	pub fn generate(&mut self, target: Vec3) -> Result<SolveOutcome, NavError> {
		let cell = self.world_to_grid(target);
		if !self.is_valid_cell(cell) {
			warn!("Flow field target {:?} is outside the grid", cell.get_xz());
			return Err(self.out_of_bounds(cell));
		}
		if self.last_target == Some(cell) {
			trace!("Flow field for {:?} already solved", cell.get_xz());
			return Ok(SolveOutcome::Cached);
		}
		self.solve(cell).map(SolveOutcome::Solved)
	}
	/// Rebuild the fields towards the cell containing `target` even if it was the last target
	pub fn generate_forced(&mut self, target: Vec3) -> Result<PropagationStats, NavError> {
		let cell = self.world_to_grid(target);
		if !self.is_valid_cell(cell) {
			warn!("Flow field target {:?} is outside the grid", cell.get_xz());
			return Err(self.out_of_bounds(cell));
		}
		self.solve(cell)
	}
	/// Rebuild the fields towards the last target, used after costs have been edited. Returns
	/// [None] when nothing has been solved yet
	pub fn regenerate(&mut self) -> Result<Option<PropagationStats>, NavError> {
		match self.last_target {
			Some(cell) => self.solve(cell).map(Some),
			None => Ok(None),
		}
	}
	/// Reset, propagate and derive the fields for a validated cell
	fn solve(&mut self, cell: GridCell) -> Result<PropagationStats, NavError> {
		if self.cost_field.is_impassable(cell) {
			warn!("Flow field target {:?} is impassable", cell.get_xz());
			return Err(NavError::ImpassableTarget { cell });
		}
		self.integration_field.reset(cell);
		let stats = self
			.integration_field
			.calculate_field(cell, &self.cost_field, self.propagation);
		self.flow_field
			.calculate(&self.cost_field, &self.integration_field);
		self.last_target = Some(cell);
		self.solve_count += 1;
		debug!(
			"Solved flow field for {:?}, expanded {} cells with {} relaxations",
			cell.get_xz(),
			stats.cells_expanded,
			stats.relaxations
		);
		Ok(stats)
	}
	/// Serialise the grid to a `ron` string
	#[cfg(feature = "ron")]
	pub fn to_ron(&self) -> Result<String, NavError> {
		ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
			.map_err(|e| NavError::Serialize(e.to_string()))
	}
	/// Deserialise a grid from a `ron` string, the fields must agree with the dimensions
	#[cfg(feature = "ron")]
	pub fn from_ron_str(data: &str) -> Result<Self, NavError> {
		let grid: NavGrid = ron::from_str(data).map_err(|e| NavError::Deserialize(e.to_string()))?;
		let expected = grid.dimensions.cell_count();
		if grid.cost_field.get().len() != expected
			|| grid.integration_field.get().len() != expected
			|| grid.flow_field.get().len() != expected
		{
			return Err(NavError::InvalidDimensions {
				reason: String::from("field sizes do not match the map dimensions"),
			});
		}
		Ok(grid)
	}
}

impl FlowFieldQuery for NavGrid {
	fn get_flow_direction(&self, world_pos: Vec3) -> Vec2 {
		let cell = self.world_to_grid(world_pos);
		self.flow_field.get_flow_vector(cell)
	}
	fn get_cell_cost(&self, world_pos: Vec3) -> u32 {
		let cell = self.world_to_grid(world_pos);
		match self.cost_field.get_index(cell) {
			Some(i) => self.cost_field.get()[i],
			None => COST_IMPASSABLE,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	/// A 10x10 grid of unit cells
	fn grid_10() -> NavGrid {
		NavGrid::new(MapDimensions::new(10, 10, 1.0))
	}
	#[test]
	fn discarded_fields_have_no_flow() {
		let mut grid = grid_10();
		grid.generate(Vec3::new(5.5, 0.0, 5.5)).unwrap();
		assert!(grid.get_flow_field().count_directed() > 0);
		grid.discard_fields();
		assert_eq!(0, grid.get_flow_field().count_directed());
		assert_eq!(None, grid.get_last_target());
		assert_eq!(Vec2::ZERO, grid.get_flow_direction(Vec3::new(1.5, 0.0, 1.5)));
	}
	#[test]
	fn repeat_target_is_cached() {
		let mut grid = grid_10();
		let target = Vec3::new(9.5, 0.0, 9.5);
		assert!(matches!(grid.generate(target), Ok(SolveOutcome::Solved(_))));
		assert_eq!(Ok(SolveOutcome::Cached), grid.generate(target));
		// a different point within the same cell is the same target
		assert_eq!(Ok(SolveOutcome::Cached), grid.generate(Vec3::new(9.1, 3.0, 9.9)));
		assert_eq!(1, grid.get_solve_count());
	}
	#[test]
	fn forced_solve_is_deterministic() {
		let mut grid = grid_10();
		grid.set_obstacle_area(Vec3::new(5.5, 0.0, 5.5), 2.0, true);
		grid.set_cost_area(Vec3::new(2.5, 0.0, 7.5), 1.0, 4).unwrap();
		let target = Vec3::new(0.5, 0.0, 0.5);
		grid.generate(target).unwrap();
		let first = grid.get_flow_field().clone();
		grid.generate_forced(target).unwrap();
		assert_eq!(&first, grid.get_flow_field());
		assert_eq!(2, grid.get_solve_count());
	}
	#[test]
	fn outside_target_leaves_fields_intact() {
		let mut grid = grid_10();
		grid.generate(Vec3::new(3.5, 0.0, 3.5)).unwrap();
		let before = grid.clone();
		let result = grid.generate(Vec3::new(10.5, 0.0, 3.5));
		assert!(matches!(result, Err(NavError::OutOfBounds { .. })));
		let result = grid.generate(Vec3::new(-0.5, 0.0, 3.5));
		assert!(matches!(result, Err(NavError::OutOfBounds { .. })));
		assert_eq!(before, grid);
	}
	#[test]
	fn impassable_target_rejected() {
		let mut grid = grid_10();
		grid.set_obstacle(Vec3::new(4.5, 0.0, 4.5), true).unwrap();
		let before = grid.clone();
		let result = grid.generate(Vec3::new(4.5, 0.0, 4.5));
		assert_eq!(
			Err(NavError::ImpassableTarget {
				cell: GridCell::new(4, 4)
			}),
			result
		);
		assert_eq!(before, grid);
	}
	#[test]
	fn obstacles_have_no_flow() {
		let mut grid = grid_10();
		let written = grid.set_obstacle_area(Vec3::new(5.5, 0.0, 5.5), 1.5, true);
		assert_eq!(9, written);
		grid.generate(Vec3::new(0.5, 0.0, 9.5)).unwrap();
		for (i, cost) in grid.get_cost_field().get().iter().enumerate() {
			if *cost == COST_IMPASSABLE {
				assert_eq!(Ordinal::Zero, grid.get_flow_field().get()[i]);
				assert_eq!(INTEGRATION_UNSOLVED, grid.get_integration_field().get()[i]);
			}
		}
	}
	#[test]
	fn set_obstacle_outside_is_noop() {
		let mut grid = grid_10();
		let before = grid.clone();
		assert!(grid.set_obstacle(Vec3::new(-3.0, 0.0, 2.0), true).is_err());
		assert_eq!(before, grid);
	}
	#[test]
	fn obstacle_edit_does_not_solve() {
		let mut grid = grid_10();
		let target = Vec3::new(9.5, 0.0, 0.5);
		grid.generate(target).unwrap();
		grid.set_obstacle(Vec3::new(8.5, 0.0, 0.5), true).unwrap();
		// the memo still answers until the grid is invalidated
		assert_eq!(Ok(SolveOutcome::Cached), grid.generate(target));
		assert_eq!(Ordinal::East, grid.get_flow_field().get_field_cell_value(GridCell::new(7, 0)));
		grid.invalidate();
		assert!(matches!(grid.generate(target), Ok(SolveOutcome::Solved(_))));
		assert_ne!(Ordinal::East, grid.get_flow_field().get_field_cell_value(GridCell::new(7, 0)));
	}
	#[test]
	fn clear_all_obstacles_forces_next_solve() {
		let mut grid = grid_10();
		grid.set_obstacle_area(Vec3::new(3.5, 0.0, 3.5), 1.0, true);
		let target = Vec3::new(1.5, 0.0, 1.5);
		grid.generate(target).unwrap();
		grid.clear_all_obstacles();
		assert_eq!(0, grid.get_cost_field().count_impassable());
		assert_eq!(None, grid.get_last_target());
		assert!(matches!(grid.generate(target), Ok(SolveOutcome::Solved(_))));
		assert_eq!(2, grid.get_solve_count());
	}
	#[test]
	fn regenerate_uses_last_target() {
		let mut grid = grid_10();
		assert_eq!(Ok(None), grid.regenerate());
		grid.generate(Vec3::new(9.5, 0.0, 0.5)).unwrap();
		grid.set_obstacle(Vec3::new(8.5, 0.0, 0.5), true).unwrap();
		assert!(matches!(grid.regenerate(), Ok(Some(_))));
		assert_eq!(Some(GridCell::new(9, 0)), grid.get_last_target());
		assert_ne!(Ordinal::East, grid.get_flow_field().get_field_cell_value(GridCell::new(7, 0)));
	}
	#[test]
	fn graded_cost_rejects_invalid_values() {
		let mut grid = grid_10();
		let result = grid.set_cost_area(Vec3::new(2.5, 0.0, 2.5), 1.0, 0);
		assert_eq!(Err(NavError::InvalidCost { value: 0 }), result);
		let result = grid.set_cost_area(Vec3::new(2.5, 0.0, 2.5), 1.0, 7);
		assert_eq!(Ok(5), result);
		assert_eq!(7, grid.get_cell_cost(Vec3::new(3.5, 0.0, 2.5)));
	}
	#[test]
	fn query_outside_grid() {
		let mut grid = grid_10();
		grid.generate(Vec3::new(5.5, 0.0, 5.5)).unwrap();
		assert_eq!(Vec2::ZERO, grid.get_flow_direction(Vec3::new(-1.0, 0.0, 5.0)));
		assert_eq!(COST_IMPASSABLE, grid.get_cell_cost(Vec3::new(5.0, 0.0, 12.0)));
		assert_eq!(COST_DEFAULT, grid.get_cell_cost(Vec3::new(5.0, 0.0, 5.0)));
	}
	#[test]
	fn query_follows_flow() {
		let mut grid = grid_10();
		grid.generate(Vec3::new(9.5, 0.0, 2.5)).unwrap();
		let result = grid.get_flow_direction(Vec3::new(1.2, 0.0, 2.7));
		assert_eq!(Vec2::X, result);
	}
	#[test]
	fn dijkstra_grid_matches_default() {
		let mut wave = grid_10();
		wave.set_obstacle_area(Vec3::new(4.5, 0.0, 4.5), 2.0, true);
		wave.set_cost_area(Vec3::new(8.5, 0.0, 1.5), 1.0, 6).unwrap();
		let mut heap = wave.clone().with_propagation(Propagation::Dijkstra);
		let target = Vec3::new(0.5, 0.0, 9.5);
		wave.generate(target).unwrap();
		heap.generate(target).unwrap();
		assert_eq!(wave.get_integration_field(), heap.get_integration_field());
		assert_eq!(wave.get_flow_field(), heap.get_flow_field());
	}
	#[test]
	fn reachability() {
		let mut grid = grid_10();
		for z in 0..10 {
			grid.set_obstacle(Vec3::new(5.5, 0.0, z as f32 + 0.5), true).unwrap();
		}
		assert!(!grid.is_reachable(Vec3::new(0.5, 0.0, 0.5), Vec3::new(9.5, 0.0, 9.5)));
		grid.set_obstacle(Vec3::new(5.5, 0.0, 9.5), false).unwrap();
		assert!(grid.is_reachable(Vec3::new(0.5, 0.0, 0.5), Vec3::new(9.5, 0.0, 9.5)));
	}
	#[test]
	#[cfg(feature = "ron")]
	fn ron_keeps_solved_fields() {
		let mut grid = grid_10();
		grid.set_obstacle_area(Vec3::new(5.5, 0.0, 5.5), 1.0, true);
		grid.generate(Vec3::new(1.5, 0.0, 8.5)).unwrap();
		let data = grid.to_ron().unwrap();
		let result = NavGrid::from_ron_str(&data).unwrap();
		assert_eq!(grid, result);
	}
}
