//! Load grids from the files under `assets/`
//!

#![cfg(feature = "csv")]

use bevy::prelude::*;
use bevy_flowfield_nav_plugin::prelude::*;

/// Path of a file under `assets/`
fn asset(name: &str) -> String {
	env!("CARGO_MANIFEST_DIR").to_string() + "/assets/" + name
}

#[test]
fn csv_grid_solves_around_walls() {
	let cost_field = CostField::from_csv(&asset("cost_field_12x8.csv")).unwrap();
	assert_eq!(12, cost_field.get_width());
	assert_eq!(8, cost_field.get_depth());
	assert_eq!(10, cost_field.count_impassable());
	let mut grid = NavGrid::from_cost_field(cost_field, 0.5).unwrap();
	// the walled pocket opens to the east so the route from the west goes around
	let target = grid.grid_to_world(GridCell::new(5, 3), 0.0);
	grid.generate(target).unwrap();
	let int_field = grid.get_integration_field();
	assert_eq!(0, int_field.get_field_cell_value(GridCell::new(5, 3)));
	assert!(int_field.get_field_cell_value(GridCell::new(3, 3)) > 4);
	assert_eq!(4, grid.get_cell_cost(grid.grid_to_world(GridCell::new(2, 2), 0.0)));
}

#[test]
fn missing_file_is_an_error() {
	let result = CostField::from_csv(&asset("does_not_exist.csv"));
	assert!(matches!(result, Err(NavError::Io(_))));
}

#[cfg(feature = "ron")]
#[test]
fn grid_survives_ron() {
	let cost_field = CostField::from_csv(&asset("cost_field_12x8.csv")).unwrap();
	let mut grid = NavGrid::from_cost_field(cost_field, 1.0).unwrap();
	grid.generate(Vec3::new(0.5, 0.0, 7.5)).unwrap();
	let data = grid.to_ron().unwrap();
	assert_eq!(grid, NavGrid::from_ron_str(&data).unwrap());
}
