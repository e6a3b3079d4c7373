//! Useful structures and tools used by the fields
//!

use bevy::prelude::*;

/// Cost of a cell that can be walked over with no penalty
pub const COST_DEFAULT: u32 = 1;
/// Sentinel cost marking a cell as impassable
pub const COST_IMPASSABLE: u32 = 999_999;
/// Value of an [crate::prelude::IntegrationField] cell the target cannot be reached from. Path
/// sums saturate one below it so a reachable cell never reads as unsolved
pub const INTEGRATION_UNSOLVED: u32 = u32::MAX;

/// The 8 directions of movement between neighbouring grid cells used by the
/// [crate::prelude::IntegrationField] wavefront and the [crate::prelude::FlowField]
///
/// Rows (`z`) grow towards the South so North is `z - 1`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
	/// Special case, used to indicate a cell with no better neighbour in the
	/// [crate::prelude::FlowField] (goal, obstacle or isolated plateau)
	#[default]
	Zero,
}

impl Ordinal {
	/// Every direction of movement in the fixed order used to examine
	/// neighbours. When two neighbours are equally cheap the one appearing
	/// first in this list wins
	pub const ALL: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::East,
		Ordinal::South,
		Ordinal::West,
		Ordinal::NorthEast,
		Ordinal::SouthEast,
		Ordinal::SouthWest,
		Ordinal::NorthWest,
	];
	/// The `(x, z)` cell offset of moving one step in this direction
	pub fn offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, -1),
			Ordinal::East => (1, 0),
			Ordinal::South => (0, 1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthEast => (1, -1),
			Ordinal::SouthEast => (1, 1),
			Ordinal::SouthWest => (-1, 1),
			Ordinal::NorthWest => (-1, -1),
			Ordinal::Zero => (0, 0),
		}
	}
	/// Unit vector of the direction on the ground plane, `x` is world X and
	/// `y` is world Z. [Ordinal::Zero] gives [Vec2::ZERO]
	pub fn to_vec2(&self) -> Vec2 {
		let (x, z) = self.offset();
		Vec2::new(x as f32, z as f32).normalize_or_zero()
	}
	/// Whether this direction moves along both axes at once
	pub fn is_diagonal(&self) -> bool {
		let (x, z) = self.offset();
		x != 0 && z != 0
	}
	/// Returns the opposite [Ordinal] of the current
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::East => Ordinal::West,
			Ordinal::South => Ordinal::North,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::NorthWest => Ordinal::SouthEast,
			Ordinal::Zero => Ordinal::Zero,
		}
	}
	/// For two cells next to each other find the [Ordinal] pointing from the
	/// `source` to the `target`. Returns [None] if they are not adjacent
	pub fn cell_to_cell_direction(target: (i32, i32), source: (i32, i32)) -> Option<Self> {
		let direction = (target.0 - source.0, target.1 - source.1);
		Ordinal::ALL
			.iter()
			.find(|ord| ord.offset() == direction)
			.copied()
	}
}
