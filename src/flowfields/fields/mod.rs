//! The kinds of fields used by the algorithm
//!

pub mod cost_field;
pub mod flow_field;
pub mod integration_field;

use crate::prelude::*;

/// Defines required access to field arrays. Every field is a flat array of
/// `width * depth` values indexed by `z * width + x`
pub trait Field<T: Copy> {
	/// Get a reference to the field array
	fn get(&self) -> &[T];
	/// Get a mutable reference to the field array
	fn get_mut(&mut self) -> &mut [T];
	/// Number of columns (`x`) of the field
	fn get_width(&self) -> u32;
	/// Number of rows (`z`) of the field
	fn get_depth(&self) -> u32;
	/// Flat index of a cell, [None] when the cell lies outside the field
	fn get_index(&self, cell: GridCell) -> Option<usize> {
		let (x, z) = cell.get_xz();
		if x < 0 || z < 0 || x >= self.get_width() as i32 || z >= self.get_depth() as i32 {
			None
		} else {
			Some(z as usize * self.get_width() as usize + x as usize)
		}
	}
	/// Retrieve a field cell value
	fn get_field_cell_value(&self, cell: GridCell) -> T {
		match self.get_index(cell) {
			Some(i) => self.get()[i],
			None => panic!(
				"Cannot get a field value, index out of bounds. Asked for x {}, z {}, field width is {}, field depth is {}",
				cell.get_x(),
				cell.get_z(),
				self.get_width(),
				self.get_depth()
			),
		}
	}
	/// Set a field cell to a value
	fn set_field_cell_value(&mut self, value: T, cell: GridCell) {
		match self.get_index(cell) {
			Some(i) => self.get_mut()[i] = value,
			None => panic!(
				"Cannot set a field value, index out of bounds. Asked for x {}, z {}, field width is {}, field depth is {}",
				cell.get_x(),
				cell.get_z(),
				self.get_width(),
				self.get_depth()
			),
		}
	}
}

/// ID of a cell within the navigation grid, `(x, z)`. Coordinates are signed
/// so that world positions outside the grid still map to a cell which can
/// then be rejected
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct GridCell((i32, i32));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(x: i32, z: i32) -> Self {
		GridCell((x, z))
	}
	/// Get the `(x, z)` tuple
	pub fn get_xz(&self) -> (i32, i32) {
		self.0
	}
	/// Get the column
	pub fn get_x(&self) -> i32 {
		self.0 .0
	}
	/// Get the row
	pub fn get_z(&self) -> i32 {
		self.0 .1
	}
	/// The cell one step away in the direction of `ordinal`
	pub fn step(&self, ordinal: Ordinal) -> GridCell {
		let (dx, dz) = ordinal.offset();
		GridCell::new(self.get_x() + dx, self.get_z() + dz)
	}
	/// All 8 neighbouring cells paired with the direction to reach them, in
	/// [Ordinal::ALL] order. Bounds are not checked
	pub fn neighbours(&self) -> impl Iterator<Item = (Ordinal, GridCell)> + '_ {
		Ordinal::ALL.iter().map(move |ord| (*ord, self.step(*ord)))
	}
	/// Using the Bresenham line algorithm get a list of [GridCell] that lie along a line between two points
	pub fn get_cells_between_points(&self, target: &GridCell) -> Vec<GridCell> {
		let (source_x, source_z) = self.get_xz();
		let (target_x, target_z) = target.get_xz();

		// optimise for orthognal line (horizontal or vertical)
		if source_x == target_x {
			let mut cells: Vec<GridCell> = (source_z.min(target_z)..=source_z.max(target_z))
				.map(|z| GridCell::new(source_x, z))
				.collect();
			if source_z > target_z {
				cells.reverse();
			}
			cells
		} else if source_z == target_z {
			let mut cells: Vec<GridCell> = (source_x.min(target_x)..=source_x.max(target_x))
				.map(|x| GridCell::new(x, source_z))
				.collect();
			if source_x > target_x {
				cells.reverse();
			}
			cells
		} else if (target_z - source_z).abs() < (target_x - source_x).abs() {
			if source_x > target_x {
				let mut cells = walk_bresenham_shallow(target_x, target_z, source_x, source_z);
				// ensure list points in the direction of source to target
				cells.reverse();
				cells
			} else {
				walk_bresenham_shallow(source_x, source_z, target_x, target_z)
			}
		} else if source_z > target_z {
			let mut cells = walk_bresenham_steep(target_x, target_z, source_x, source_z);
			cells.reverse();
			cells
		} else {
			walk_bresenham_steep(source_x, source_z, target_x, target_z)
		}
	}
}
/// When finding a shallow raster representation of a line we step through the x-dimension and increment z based on an error bound which indicates which cells lie on the line
fn walk_bresenham_shallow(x_0: i32, z_0: i32, x_1: i32, z_1: i32) -> Vec<GridCell> {
	let mut cells = Vec::new();

	let delta_x = x_1 - x_0;
	let mut delta_z = z_1 - z_0;

	let mut z_increment = 1;
	if delta_z < 0 {
		z_increment = -1;
		delta_z *= -1;
	}
	let mut difference = 2 * delta_z - delta_x;
	let mut z = z_0;

	for x in x_0..=x_1 {
		cells.push(GridCell::new(x, z));
		if difference > 0 {
			z += z_increment;
			difference += 2 * (delta_z - delta_x);
		} else {
			difference += 2 * delta_z;
		}
	}
	cells
}
/// When finding a steep raster representation of a line we step through the z-dimension and increment x based on an error bound which indicates which cells lie on the line
fn walk_bresenham_steep(x_0: i32, z_0: i32, x_1: i32, z_1: i32) -> Vec<GridCell> {
	let mut cells = Vec::new();

	let mut delta_x = x_1 - x_0;
	let delta_z = z_1 - z_0;

	let mut x_increment = 1;
	if delta_x < 0 {
		x_increment = -1;
		delta_x *= -1;
	}
	let mut difference = 2 * delta_x - delta_z;
	let mut x = x_0;

	for z in z_0..=z_1 {
		cells.push(GridCell::new(x, z));
		if difference > 0 {
			x += x_increment;
			difference += 2 * (delta_x - delta_z);
		} else {
			difference += 2 * delta_x;
		}
	}
	cells
}
