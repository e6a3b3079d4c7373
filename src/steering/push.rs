//! Soft penetration resolution between agents.
//!
//! An agent never moves another agent directly. While agents are updated their pushes are
//! deposited here keyed by the receiving agent, once every agent has finished moving the summed
//! deltas are applied in one pass
//!

use std::collections::BTreeMap;

use crate::prelude::*;
use bevy::prelude::*;

/// A displacement one agent asks to apply to another
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Push {
	/// Agent to move
	pub target: AgentId,
	/// Horizontal displacement
	pub delta: Vec3,
}

/// Sums pushes per receiving agent
#[derive(Clone, Debug, Default)]
pub struct PushAccumulator {
	/// Summed displacement of each pushed agent, ordered by id so application is deterministic
	deltas: BTreeMap<AgentId, Vec3>,
}

impl PushAccumulator {
	pub fn add(&mut self, push: Push) {
		*self.deltas.entry(push.target).or_insert(Vec3::ZERO) += push.delta;
	}
	pub fn extend(&mut self, pushes: impl IntoIterator<Item = Push>) {
		for push in pushes {
			self.add(push);
		}
	}
	/// Summed displacement waiting for an agent
	pub fn get_delta(&self, id: AgentId) -> Vec3 {
		self.deltas.get(&id).copied().unwrap_or(Vec3::ZERO)
	}
	pub fn is_empty(&self) -> bool {
		self.deltas.is_empty()
	}
	/// Hand every summed displacement to `apply` and empty the accumulator
	pub fn drain(&mut self, mut apply: impl FnMut(AgentId, Vec3)) {
		for (id, delta) in std::mem::take(&mut self.deltas) {
			apply(id, delta);
		}
	}
}

/// Push from `pusher` onto a neighbour at `other`. The push falls off linearly to zero at
/// `radius` and is scaled by `multiplier` for neighbours standing still. [None] outside the radius
pub fn push_delta(
	pusher: Vec3,
	other: Vec3,
	radius: f32,
	strength: f32,
	multiplier: f32,
	fallback: Vec3,
) -> Option<Vec3> {
	let offset = horizontal(other - pusher);
	let distance = offset.length();
	if distance >= radius {
		return None;
	}
	let direction = if distance > f32::EPSILON {
		offset / distance
	} else {
		fallback
	};
	Some(direction * (1.0 - distance / radius) * strength * multiplier)
}
