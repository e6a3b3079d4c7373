//! Logic for handling changes to the [CostField] of a [NavGrid] and re-solving any flow field
//! which may of been made invalid by the cost change
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A single change to the costs of a grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostEdit {
	/// Mark or clear an obstacle at the cell containing a world position
	Obstacle {
		/// World position within the cell
		position: Vec3,
		/// Whether the cell becomes impassable
		is_obstacle: bool,
	},
	/// Mark or clear obstacles over a disk of cells
	ObstacleArea {
		/// World position of the centre
		position: Vec3,
		/// Radius in cells
		radius: f32,
		/// Whether the cells become impassable
		is_obstacle: bool,
	},
	/// Write a graded cost over a disk of cells
	CostArea {
		/// World position of the centre
		position: Vec3,
		/// Radius in cells
		radius: f32,
		/// Cost to write
		cost: u32,
	},
	/// Write a cost into one cell
	Cell {
		/// The cell to update
		cell: GridCell,
		/// Cost to write
		cost: u32,
	},
	/// Every cell back to the default cost
	ClearAll,
}

/// Used to update the [CostField] of the [NavGrid] on entity `grid`
#[derive(Event)]
pub struct EventEditCosts {
	/// Entity holding the [NavGrid]
	grid: Entity,
	/// Change to apply
	edit: CostEdit,
}

impl EventEditCosts {
	/// Create a new instance of [EventEditCosts]
	#[cfg(not(tarpaulin_include))]
	pub fn new(grid: Entity, edit: CostEdit) -> Self {
		EventEditCosts { grid, edit }
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_grid(&self) -> Entity {
		self.grid
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_edit(&self) -> CostEdit {
		self.edit
	}
}

/// Apply an edit, returns whether any cost was written
pub fn apply_cost_edit(grid: &mut NavGrid, edit: CostEdit) -> Result<bool, NavError> {
	match edit {
		CostEdit::Obstacle {
			position,
			is_obstacle,
		} => grid.set_obstacle(position, is_obstacle).map(|_| true),
		CostEdit::ObstacleArea {
			position,
			radius,
			is_obstacle,
		} => Ok(grid.set_obstacle_area(position, radius, is_obstacle) > 0),
		CostEdit::CostArea {
			position,
			radius,
			cost,
		} => grid.set_cost_area(position, radius, cost).map(|n| n > 0),
		CostEdit::Cell { cell, cost } => grid.set_cell_cost(cell, cost).map(|_| true),
		CostEdit::ClearAll => {
			grid.clear_all_obstacles();
			Ok(true)
		}
	}
}

/// Read [EventEditCosts] and update the values within the [CostField]s
#[cfg(not(tarpaulin_include))]
pub fn process_cost_edits(
	mut events: EventReader<EventEditCosts>,
	mut grids: Query<&mut NavGrid>,
	mut event_cache_clean: EventWriter<EventCleanCaches>,
) {
	// coalesce edits so each grid is re-solved once
	let mut edited_grids = Vec::new();
	for event in events.read() {
		let Ok(mut grid) = grids.get_mut(event.get_grid()) else {
			warn!("Cost edit sent to {:?} which has no NavGrid", event.get_grid());
			continue;
		};
		match apply_cost_edit(&mut grid, event.get_edit()) {
			Ok(true) => {
				if !edited_grids.contains(&event.get_grid()) {
					edited_grids.push(event.get_grid());
				}
			}
			Ok(false) => {}
			Err(e) => warn!("Ignoring cost edit {:?}: {}", event.get_edit(), e),
		}
	}
	for grid in edited_grids {
		event_cache_clean.write(EventCleanCaches(grid));
	}
}

/// The costs of the [NavGrid] on an entity changed so its flow field may be stale
#[derive(Event)]
pub struct EventCleanCaches(pub Entity);

/// Re-solve the last target of every grid whose costs changed. When the target itself became
/// impassable the fields are discarded until a new target is requested
#[cfg(not(tarpaulin_include))]
pub fn clean_cache(mut events: EventReader<EventCleanCaches>, mut grids: Query<&mut NavGrid>) {
	let mut cleaned = Vec::new();
	for event in events.read() {
		if cleaned.contains(&event.0) {
			continue;
		}
		cleaned.push(event.0);
		if let Ok(mut grid) = grids.get_mut(event.0) {
			match grid.regenerate() {
				Ok(Some(_)) => debug!("Re-solved flow field of {:?} after a cost change", event.0),
				Ok(None) => {}
				Err(_) => grid.discard_fields(),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn edits_report_whether_anything_changed() {
		let mut grid = NavGrid::new(MapDimensions::new(8, 8, 1.0));
		let outside = CostEdit::ObstacleArea {
			position: Vec3::new(-20.0, 0.0, -20.0),
			radius: 2.0,
			is_obstacle: true,
		};
		assert_eq!(Ok(false), apply_cost_edit(&mut grid, outside));
		let inside = CostEdit::Cell {
			cell: GridCell::new(3, 3),
			cost: 9,
		};
		assert_eq!(Ok(true), apply_cost_edit(&mut grid, inside));
		let invalid = CostEdit::CostArea {
			position: Vec3::new(2.0, 0.0, 2.0),
			radius: 1.0,
			cost: 0,
		};
		assert!(apply_cost_edit(&mut grid, invalid).is_err());
		assert_eq!(9, grid.get_cell_cost(Vec3::new(3.5, 0.0, 3.5)));
		assert_eq!(Ok(true), apply_cost_edit(&mut grid, CostEdit::ClearAll));
		assert_eq!(1, grid.get_cell_cost(Vec3::new(3.5, 0.0, 3.5)));
	}
}
