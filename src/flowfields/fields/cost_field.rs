//! The CostField contains a flat array of 32-bit values. The values correspond to the cost of
//! entering that cell. A value of `1` is the default, a value of [COST_IMPASSABLE] is a special case
//! that idicates that the cell is strictly forbidden from being used in a pathing calculation
//! (effectively saying there is a wall, building or cliff there). Any other value indicates a harder
//! cost of movement which could be from a slope or marshland or others.
//!
//! An example cost field may look (`X` being impassable):
//!
//! ```text
//!  ___________________________________________________________
//! |     |     |     |     |     |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  1  |  1  |  1  |  1  |  1  |  X  |  X  |  X  |  X  |  X  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  1  |  1  |  5  |  5  |  1  |  1  |  1  |  X  |  X  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  1  |  1  |  5  |  5  |  1  |  1  |  1  |  1  |  1  |  1  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! ```
//!

use std::collections::{HashSet, VecDeque};

use crate::prelude::*;

#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CostField {
	/// Number of columns
	width: u32,
	/// Number of rows
	depth: u32,
	/// Cost of entering each cell
	values: Vec<u32>,
}

impl Field<u32> for CostField {
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

/// Whether `value` may be stored in a [CostField]
pub fn is_valid_cost(value: u32) -> bool {
	(COST_DEFAULT..=COST_IMPASSABLE).contains(&value)
}

impl CostField {
	/// Creates a new [CostField] where every cell costs [COST_DEFAULT]
	pub fn new(width: u32, depth: u32) -> Self {
		CostField {
			width,
			depth,
			values: vec![COST_DEFAULT; width as usize * depth as usize],
		}
	}
	/// Write a cost into a cell, rejecting values which would break the
	/// `cost >= 1 or impassable` invariant
	pub fn set_cost(&mut self, value: u32, cell: GridCell) -> Result<(), NavError> {
		if !is_valid_cost(value) {
			return Err(NavError::InvalidCost { value });
		}
		match self.get_index(cell) {
			Some(i) => {
				self.values[i] = value;
				Ok(())
			}
			None => Err(NavError::OutOfBounds {
				cell,
				width: self.width,
				depth: self.depth,
			}),
		}
	}
	/// Whether the cell is inside the field and marked impassable
	pub fn is_impassable(&self, cell: GridCell) -> bool {
		self.get_index(cell)
			.is_some_and(|i| self.values[i] == COST_IMPASSABLE)
	}
	/// Set every cell back to [COST_DEFAULT]
	pub fn reset(&mut self) {
		self.values.fill(COST_DEFAULT);
	}
	/// Number of cells marked impassable
	pub fn count_impassable(&self) -> usize {
		self.values.iter().filter(|v| **v == COST_IMPASSABLE).count()
	}
	/// Tests whether `target` can be reached from `source` by walking over
	/// passable 8-connected neighbours
	pub fn is_cell_pair_reachable(&self, source: GridCell, target: GridCell) -> bool {
		if self.get_index(source).is_none() || self.get_index(target).is_none() {
			return false;
		}
		if self.is_impassable(source) || self.is_impassable(target) {
			return false;
		}
		if source == target {
			return true;
		}
		let mut queue = VecDeque::from([source]);
		// as nodes are visted we add them here to prevent the exploration from getting stuck in an infinite loop
		let mut visited = HashSet::from([source]);
		while let Some(cell) = queue.pop_front() {
			for (_, n) in cell.neighbours() {
				if n == target {
					return true;
				}
				if self.get_index(n).is_some() && !self.is_impassable(n) && visited.insert(n) {
					queue.push_back(n);
				}
			}
		}
		false
	}
	/// From a `ron` file generate the [CostField]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> Result<Self, NavError> {
		let file = std::fs::File::open(path)?;
		let field: CostField =
			ron::de::from_reader(file).map_err(|e| NavError::Deserialize(e.to_string()))?;
		field.validate()?;
		Ok(field)
	}
	/// From a headerless CSV file where each record is a row (`z`) and each
	/// value a column (`x`) generate the [CostField]
	#[cfg(feature = "csv")]
	pub fn from_csv(path: &str) -> Result<Self, NavError> {
		let data = std::fs::File::open(path)?;
		Self::from_csv_reader(data)
	}
	/// Read a [CostField] from any CSV source, see [CostField::from_csv]
	#[cfg(feature = "csv")]
	pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, NavError> {
		let mut rdr = csv::ReaderBuilder::new()
			.has_headers(false)
			.trim(csv::Trim::All)
			.from_reader(reader);
		let mut rows: Vec<Vec<u32>> = Vec::new();
		for record in rdr.records() {
			let record = record.map_err(|e| NavError::Deserialize(e.to_string()))?;
			let mut row = Vec::with_capacity(record.len());
			for value in record.iter() {
				let cost: u32 = value
					.parse()
					.map_err(|_| NavError::Deserialize(format!("`{value}` is not a cost")))?;
				row.push(cost);
			}
			rows.push(row);
		}
		let depth = rows.len() as u32;
		let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
		if width == 0 || depth == 0 {
			return Err(NavError::InvalidDimensions {
				reason: String::from("CSV contains no costs"),
			});
		}
		if rows.iter().any(|r| r.len() as u32 != width) {
			return Err(NavError::InvalidDimensions {
				reason: String::from("CSV rows have differing lengths"),
			});
		}
		let field = CostField {
			width,
			depth,
			values: rows.into_iter().flatten().collect(),
		};
		field.validate()?;
		Ok(field)
	}
	/// Ensure a loaded field is consistent with its dimensions and holds only valid costs
	#[cfg(any(feature = "ron", feature = "csv"))]
	fn validate(&self) -> Result<(), NavError> {
		if self.values.len() != self.width as usize * self.depth as usize {
			return Err(NavError::InvalidDimensions {
				reason: format!(
					"{} costs cannot fill a {}x{} field",
					self.values.len(),
					self.width,
					self.depth
				),
			});
		}
		if let Some(bad) = self.values.iter().find(|v| !is_valid_cost(**v)) {
			return Err(NavError::InvalidCost { value: *bad });
		}
		Ok(())
	}
}
