//! Draws every [NavGrid] with Bevy gizmos
//!

use std::f32::consts::FRAC_PI_2;

use crate::prelude::*;
use bevy::gizmos::gizmos::GizmoBuffer;
use bevy::prelude::*;

impl DebugSink for Gizmos<'_, '_> {
	fn line(&mut self, start: Vec3, end: Vec3, color: Color) {
		GizmoBuffer::line(&mut **self, start, end, color);
	}
	fn quad(&mut self, centre: Vec3, size: Vec2, color: Color) {
		// rects are drawn in the xy plane, lay them flat on the ground
		let isometry = Isometry3d::new(centre, Quat::from_rotation_x(-FRAC_PI_2));
		GizmoBuffer::rect(&mut **self, isometry, size, color);
	}
}

/// Controls the gizmo drawing of flow fields
#[derive(Resource, Default)]
pub struct FlowFieldDebugSettings {
	/// Whether anything is drawn
	pub enabled: bool,
	/// Colours and sizes used
	pub visualiser: FlowFieldVisualiser,
}

/// Draw each [NavGrid] while [FlowFieldDebugSettings::enabled] is set
#[cfg(not(tarpaulin_include))]
pub fn draw_flow_fields(
	settings: Res<FlowFieldDebugSettings>,
	grids: Query<&NavGrid>,
	mut gizmos: Gizmos,
) {
	if !settings.enabled {
		return;
	}
	for grid in grids.iter() {
		settings.visualiser.draw(grid, &mut gizmos);
	}
}
