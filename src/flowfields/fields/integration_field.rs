//! The IntegrationField contains a flat array of 32-bit values and it uses a [CostField] to
//! produce a cumulative cost of reaching the target. It is rebuilt wholesale for each new target.
//!
//! When a new target needs to be processed the field is reset to [INTEGRATION_UNSOLVED] and the cell
//! containing the target is set to `0`. A wavefront then expands from the target:
//!
//! 1. Pop a cell from the queue
//! 2. For each of its 8 neighbours (diagonals included) lookup their `CostField` value, impassable
//!    neighbours are skipped
//! 3. Add the neighbour's cost to the integration cost of the current cell
//! 4. If that is cheaper than what the neighbour currently holds then record it and push the
//!    neighbour onto the queue so its own neighbours get revisited
//!
//! The cost is per cell entered, diagonal steps are not scaled by √2, so on a uniform field the
//! result is the Chebyshev distance from the target (target at `(4, 4)`):
//!
//! ```text
//!  ___________________________________________________________
//! |     |     |     |     |     |     |     |     |     |     |
//! |  4  |  4  |  4  |  4  |  4  |  4  |  4  |  4  |  4  |  5  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  4  |  3  |  3  |  3  |  3  |  3  |  3  |  3  |  4  |  5  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  4  |  3  |  2  |  2  |  2  |  2  |  2  |  3  |  4  |  5  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  4  |  3  |  2  |  1  |  1  |  1  |  2  |  3  |  4  |  5  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  4  |  3  |  2  |  1  |  0  |  1  |  2  |  3  |  4  |  5  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! ```
//!
//! The default [Propagation::Wavefront] uses a plain FIFO queue, a cell may be queued several times
//! before it settles but as costs are positive it converges on the true minimum. For large grids
//! [Propagation::Dijkstra] swaps the queue for a binary heap so every cell is settled once, the
//! resulting field is identical.
//!

use std::{
	cmp::Reverse,
	collections::{BinaryHeap, VecDeque},
};

use crate::prelude::*;

/// Queue discipline used when propagating an [IntegrationField]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
	/// FIFO requeue relaxation, simple and fine for small grids
	#[default]
	Wavefront,
	/// Priority queue relaxation, each cell is expanded once it is settled
	Dijkstra,
}

/// Work done by a single propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationStats {
	/// Number of cells taken off the queue
	pub cells_expanded: usize,
	/// Number of times a neighbour's integration cost was lowered
	pub relaxations: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationField {
	/// Number of columns
	width: u32,
	/// Number of rows
	depth: u32,
	/// Accumulated cost to reach the target from each cell
	values: Vec<u32>,
}

impl Field<u32> for IntegrationField {
	fn get(&self) -> &[u32] {
		&self.values
	}
	fn get_mut(&mut self) -> &mut [u32] {
		&mut self.values
	}
	fn get_width(&self) -> u32 {
		self.width
	}
	fn get_depth(&self) -> u32 {
		self.depth
	}
}

impl IntegrationField {
	/// Creates a new unsolved [IntegrationField], every cell is [INTEGRATION_UNSOLVED]
	pub fn new(width: u32, depth: u32) -> Self {
		IntegrationField {
			width,
			depth,
			values: vec![INTEGRATION_UNSOLVED; width as usize * depth as usize],
		}
	}
	/// Reset all the cells of the [IntegrationField] to [INTEGRATION_UNSOLVED] apart from the `goal`
	/// which is the starting point of calculating the field and is set to `0`
	pub fn reset(&mut self, goal: GridCell) {
		self.values.fill(INTEGRATION_UNSOLVED);
		self.set_field_cell_value(0, goal);
	}
	/// From the `goal` iterate over successive neighbouring cells and calculate the field values
	/// from the `cost_field`. The field must have been [IntegrationField::reset] for `goal` first
	pub fn calculate_field(
		&mut self,
		goal: GridCell,
		cost_field: &CostField,
		propagation: Propagation,
	) -> PropagationStats {
		match propagation {
			Propagation::Wavefront => self.propagate_wavefront(goal, cost_field),
			Propagation::Dijkstra => self.propagate_dijkstra(goal, cost_field),
		}
	}
	/// FIFO relaxation, a cell is requeued every time it is improved
	fn propagate_wavefront(&mut self, goal: GridCell, cost_field: &CostField) -> PropagationStats {
		let mut stats = PropagationStats::default();
		let mut queue = VecDeque::from([goal]);
		while let Some(cell) = queue.pop_front() {
			stats.cells_expanded += 1;
			let current = self.get_field_cell_value(cell);
			for (_, n) in cell.neighbours() {
				if self.relax(current, n, cost_field).is_some() {
					stats.relaxations += 1;
					queue.push_back(n);
				}
			}
		}
		stats
	}
	/// Binary heap relaxation, stale heap entries are skipped when popped
	fn propagate_dijkstra(&mut self, goal: GridCell, cost_field: &CostField) -> PropagationStats {
		let mut stats = PropagationStats::default();
		let mut heap = BinaryHeap::from([Reverse((0_u32, goal))]);
		while let Some(Reverse((cost, cell))) = heap.pop() {
			if cost > self.get_field_cell_value(cell) {
				continue;
			}
			stats.cells_expanded += 1;
			for (_, n) in cell.neighbours() {
				if let Some(int_cost) = self.relax(cost, n, cost_field) {
					stats.relaxations += 1;
					heap.push(Reverse((int_cost, n)));
				}
			}
		}
		stats
	}
	/// Try to lower the integration cost of `neighbour` by entering it from a cell costing
	/// `current`. Returns the new cost when the neighbour improved
	fn relax(&mut self, current: u32, neighbour: GridCell, cost_field: &CostField) -> Option<u32> {
		let i = self.get_index(neighbour)?;
		let cell_cost = cost_field.get()[i];
		// ignore impassable cells
		if cell_cost == COST_IMPASSABLE {
			return None;
		}
		let int_cost = current
			.saturating_add(cell_cost)
			.min(INTEGRATION_UNSOLVED - 1);
		// don't overwrite an int cell with a better cost
		if int_cost < self.values[i] {
			self.values[i] = int_cost;
			Some(int_cost)
		} else {
			None
		}
	}
}
