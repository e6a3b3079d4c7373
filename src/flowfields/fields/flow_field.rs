//! A [FlowField] stores one [Ordinal] per cell pointing at the neighbour an actor should move
//! into to descend the [IntegrationField] towards the target. A steering pipeline/character
//! controller should read and interpret a [FlowField] to provide movement.
//!
//! [Ordinal::Zero] marks a cell with no strictly better neighbour: the target itself, an
//! impassable cell or an unreachable pocket.
//!

use crate::prelude::*;
use bevy::prelude::*;

#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
	/// Number of columns
	width: u32,
	/// Number of rows
	depth: u32,
	/// Direction of travel out of each cell
	values: Vec<Ordinal>,
}

impl Field<Ordinal> for FlowField {
	fn get(&self) -> &[Ordinal] {
		&self.values
	}
	fn get_mut(&mut self) -> &mut [Ordinal] {
		&mut self.values
	}
	fn get_width(&self) -> u32 {
		self.width
	}
	fn get_depth(&self) -> u32 {
		self.depth
	}
}

impl FlowField {
	/// Creates a new [FlowField] where every cell is [Ordinal::Zero]
	pub fn new(width: u32, depth: u32) -> Self {
		FlowField {
			width,
			depth,
			values: vec![Ordinal::Zero; width as usize * depth as usize],
		}
	}
	/// Calculate the [FlowField] from an [IntegrationField]. Every passable cell points at its
	/// cheapest neighbour provided it is strictly cheaper than the cell itself, ties go to the
	/// neighbour found first in [Ordinal::ALL] order
	pub fn calculate(&mut self, cost_field: &CostField, integration_field: &IntegrationField) {
		let width = self.width as i32;
		for (i, value) in self.values.iter_mut().enumerate() {
			let cell = GridCell::new(i as i32 % width, i as i32 / width);
			// mark impassable
			if cost_field.get()[i] == COST_IMPASSABLE {
				*value = Ordinal::Zero;
				continue;
			}
			let mut cheapest_value = integration_field.get()[i];
			let mut cheapest_ordinal = Ordinal::Zero;
			for (ord, n) in cell.neighbours() {
				if let Some(n_index) = integration_field.get_index(n) {
					let neighbour_cost = integration_field.get()[n_index];
					if neighbour_cost < cheapest_value {
						cheapest_value = neighbour_cost;
						cheapest_ordinal = ord;
					}
				}
			}
			*value = cheapest_ordinal;
		}
	}
	/// Unit `(x, z)` direction of travel out of a cell, [Vec2::ZERO] when the cell has no better
	/// neighbour or lies outside the field
	pub fn get_flow_vector(&self, cell: GridCell) -> Vec2 {
		match self.get_index(cell) {
			Some(i) => self.values[i].to_vec2(),
			None => Vec2::ZERO,
		}
	}
	/// Number of cells with a direction of travel
	pub fn count_directed(&self) -> usize {
		self.values.iter().filter(|v| **v != Ordinal::Zero).count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	/// Build the fields for a target on a prepared cost field
	fn solve(cost_field: &CostField, target: GridCell) -> (IntegrationField, FlowField) {
		let mut int_field =
			IntegrationField::new(cost_field.get_width(), cost_field.get_depth());
		int_field.reset(target);
		int_field.calculate_field(target, cost_field, Propagation::Wavefront);
		let mut flow_field = FlowField::new(cost_field.get_width(), cost_field.get_depth());
		flow_field.calculate(cost_field, &int_field);
		(int_field, flow_field)
	}
	#[test]
	fn target_has_no_direction() {
		let cost_field = CostField::new(5, 5);
		let (_, flow_field) = solve(&cost_field, GridCell::new(2, 2));
		assert_eq!(Ordinal::Zero, flow_field.get_field_cell_value(GridCell::new(2, 2)));
		assert_eq!(24, flow_field.count_directed());
	}
	#[test]
	fn ties_prefer_first_ordinal() {
		let cost_field = CostField::new(3, 5);
		let (_, flow_field) = solve(&cost_field, GridCell::new(1, 2));
		// (0, 0) can reach cost 1 via South (0, 1) or South-East (1, 1), South is scanned first
		assert_eq!(Ordinal::South, flow_field.get_field_cell_value(GridCell::new(0, 0)));
		// (2, 4) can reach cost 1 via North (2, 3) or North-West (1, 3), North is scanned first
		assert_eq!(Ordinal::North, flow_field.get_field_cell_value(GridCell::new(2, 4)));
	}
	#[test]
	fn lowest_neighbour_wins_over_first() {
		//  ________
		// |5_|3_|__|
		// |__|__|T_|
		// (0, 0) is expensive so East (3), South (2) and South-East (1) all improve on it, the
		// cheapest is kept even though East and South are scanned before South-East
		let mut cost_field = CostField::new(3, 2);
		cost_field.set_cost(5, GridCell::new(0, 0)).unwrap();
		cost_field.set_cost(3, GridCell::new(1, 0)).unwrap();
		let (int_field, flow_field) = solve(&cost_field, GridCell::new(2, 1));
		assert_eq!(6, int_field.get_field_cell_value(GridCell::new(0, 0)));
		assert_eq!(3, int_field.get_field_cell_value(GridCell::new(1, 0)));
		assert_eq!(Ordinal::SouthEast, flow_field.get_field_cell_value(GridCell::new(0, 0)));
	}
	#[test]
	fn impassable_and_unreachable_have_no_direction() {
		let mut cost_field = CostField::new(5, 3);
		for z in 0..3 {
			cost_field.set_cost(COST_IMPASSABLE, GridCell::new(2, z)).unwrap();
		}
		let (int_field, flow_field) = solve(&cost_field, GridCell::new(0, 1));
		for z in 0..3 {
			assert_eq!(Ordinal::Zero, flow_field.get_field_cell_value(GridCell::new(2, z)));
			assert_eq!(Ordinal::Zero, flow_field.get_field_cell_value(GridCell::new(4, z)));
			assert_eq!(INTEGRATION_UNSOLVED, int_field.get_field_cell_value(GridCell::new(4, z)));
		}
	}
	#[test]
	fn vector_outside_field_is_zero() {
		let flow_field = FlowField::new(2, 2);
		assert_eq!(Vec2::ZERO, flow_field.get_flow_vector(GridCell::new(5, 5)));
	}
}
