//! Errors reported by the navigation grid and its loaders
//!

use std::fmt;

use crate::prelude::GridCell;

/// Failures of grid construction, editing, solving and (de)serialisation.
///
/// None of these are fatal to a running simulation, they are reported at the
/// component boundary and the operation that raised them leaves prior state
/// intact
#[derive(Debug, Clone, PartialEq)]
pub enum NavError {
	/// A target or queried position maps outside the grid extents
	OutOfBounds {
		/// The offending cell
		cell: GridCell,
		/// Number of columns of the grid
		width: u32,
		/// Number of rows of the grid
		depth: u32,
	},
	/// A flow field was requested towards a cell that cannot be entered
	ImpassableTarget {
		/// The impassable cell
		cell: GridCell,
	},
	/// A cost outside `1..=COST_IMPASSABLE` was written to a cost field
	InvalidCost {
		/// The rejected value
		value: u32,
	},
	/// Grid dimensions that cannot describe a grid
	InvalidDimensions {
		/// What went wrong
		reason: String,
	},
	/// An agent tried to steer without a bound navigation grid
	MissingFieldReference,
	/// Reading a file failed
	Io(String),
	/// Parsing a file failed
	Deserialize(String),
	/// Writing a structure out failed
	Serialize(String),
}

impl fmt::Display for NavError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::OutOfBounds { cell, width, depth } => write!(
				f,
				"cell ({}, {}) is outside the {}x{} grid",
				cell.get_x(),
				cell.get_z(),
				width,
				depth
			),
			Self::ImpassableTarget { cell } => write!(
				f,
				"cell ({}, {}) is impassable and cannot be a target",
				cell.get_x(),
				cell.get_z()
			),
			Self::InvalidCost { value } => write!(f, "cost {value} is not a valid cell cost"),
			Self::InvalidDimensions { reason } => write!(f, "invalid map dimensions: {reason}"),
			Self::MissingFieldReference => write!(f, "agent has no navigation grid bound"),
			Self::Io(e) => write!(f, "io failure: {e}"),
			Self::Deserialize(e) => write!(f, "failed deserializing: {e}"),
			Self::Serialize(e) => write!(f, "failed serializing: {e}"),
		}
	}
}

impl std::error::Error for NavError {}

impl From<std::io::Error> for NavError {
	fn from(e: std::io::Error) -> Self {
		NavError::Io(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn out_of_bounds_message() {
		let err = NavError::OutOfBounds {
			cell: GridCell::new(-1, 4),
			width: 10,
			depth: 10,
		};
		assert_eq!("cell (-1, 4) is outside the 10x10 grid", err.to_string());
	}
}
