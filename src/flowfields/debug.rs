//! Turns the state of a [NavGrid] into draw commands. Nothing here is read back by the solver or
//! the agents, a [DebugSink] only observes.
//!

use std::f32::consts::PI;

use crate::prelude::*;
use bevy::prelude::*;

/// Receives draw commands
pub trait DebugSink {
	/// A line segment in world space
	fn line(&mut self, start: Vec3, end: Vec3, color: Color);
	/// A flat quad lying on the ground plane centred on `centre`
	fn quad(&mut self, centre: Vec3, size: Vec2, color: Color);
}

/// A recorded draw command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugDraw {
	/// Line segment
	Line {
		/// Start of the segment
		start: Vec3,
		/// End of the segment
		end: Vec3,
		/// Colour to draw with
		color: Color,
	},
	/// Flat quad
	Quad {
		/// Centre of the quad
		centre: Vec3,
		/// Edge lengths along `x` and `z`
		size: Vec2,
		/// Colour to draw with
		color: Color,
	},
}

/// A [DebugSink] which keeps every command it is given
#[derive(Debug, Clone, Default)]
pub struct DebugDrawBuffer {
	/// Commands in the order they were issued
	commands: Vec<DebugDraw>,
}

impl DebugDrawBuffer {
	pub fn get_commands(&self) -> &[DebugDraw] {
		&self.commands
	}
	pub fn clear(&mut self) {
		self.commands.clear();
	}
	pub fn count_lines(&self) -> usize {
		self.commands
			.iter()
			.filter(|c| matches!(c, DebugDraw::Line { .. }))
			.count()
	}
	pub fn count_quads(&self) -> usize {
		self.commands
			.iter()
			.filter(|c| matches!(c, DebugDraw::Quad { .. }))
			.count()
	}
}

impl DebugSink for DebugDrawBuffer {
	fn line(&mut self, start: Vec3, end: Vec3, color: Color) {
		self.commands.push(DebugDraw::Line { start, end, color });
	}
	fn quad(&mut self, centre: Vec3, size: Vec2, color: Color) {
		self.commands.push(DebugDraw::Quad {
			centre,
			size,
			color,
		});
	}
}

/// Draws obstacles, graded terrain, the target and an arrow per directed cell of a [NavGrid]
#[derive(Debug, Clone, Copy)]
pub struct FlowFieldVisualiser {
	/// Height above the ground plane to draw at
	pub height: f32,
	/// Arrow length as a fraction of the cell size
	pub arrow_scale: f32,
	/// Colour of impassable cells
	pub obstacle_color: Color,
	/// Colour of cells costing more than [COST_DEFAULT]
	pub cost_color: Color,
	/// Colour of the target cell
	pub target_color: Color,
	/// Colour of the flow arrows
	pub arrow_color: Color,
}

impl Default for FlowFieldVisualiser {
	fn default() -> Self {
		FlowFieldVisualiser {
			height: 0.05,
			arrow_scale: 0.6,
			obstacle_color: Color::srgb(0.8, 0.1, 0.1),
			cost_color: Color::srgb(0.8, 0.6, 0.1),
			target_color: Color::srgb(0.1, 0.8, 0.2),
			arrow_color: Color::srgb(0.2, 0.4, 0.9),
		}
	}
}

impl FlowFieldVisualiser {
	/// Emit the draw commands describing `grid` into `sink`
	pub fn draw<S: DebugSink + ?Sized>(&self, grid: &NavGrid, sink: &mut S) {
		let dimensions = grid.get_dimensions();
		let cell_size = dimensions.get_cell_size();
		let quad_size = Vec2::splat(cell_size * 0.9);
		let width = dimensions.get_width() as i32;
		let costs = grid.get_cost_field().get();
		let flows = grid.get_flow_field().get();
		for (i, (cost, ordinal)) in costs.iter().zip(flows.iter()).enumerate() {
			let cell = GridCell::new(i as i32 % width, i as i32 / width);
			let centre = dimensions.grid_to_world(cell, self.height);
			if *cost == COST_IMPASSABLE {
				sink.quad(centre, quad_size, self.obstacle_color);
				continue;
			}
			if *cost > COST_DEFAULT {
				sink.quad(centre, quad_size, self.cost_color);
			}
			if *ordinal != Ordinal::Zero {
				let flow = ordinal.to_vec2();
				self.arrow(sink, centre, Vec3::new(flow.x, 0.0, flow.y), cell_size);
			}
		}
		if let Some(target) = grid.get_last_target() {
			let centre = dimensions.grid_to_world(target, self.height);
			sink.quad(centre, quad_size, self.target_color);
		}
	}
	/// A shaft through the cell centre with two head segments
	fn arrow<S: DebugSink + ?Sized>(&self, sink: &mut S, centre: Vec3, direction: Vec3, cell_size: f32) {
		let half = direction * cell_size * self.arrow_scale * 0.5;
		let tip = centre + half;
		sink.line(centre - half, tip, self.arrow_color);
		let head_length = cell_size * self.arrow_scale * 0.3;
		for angle in [PI / 6.0, -PI / 6.0] {
			let back = Quat::from_rotation_y(angle) * -direction;
			sink.line(tip, tip + back * head_length, self.arrow_color);
		}
	}
}
