//! Logic relating to [FlowField] generation and move orders
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A request to solve the flow field of the [NavGrid] on entity `grid` towards `target`
#[derive(Event)]
pub struct EventGenerateFlowField {
	/// Entity holding the [NavGrid]
	grid: Entity,
	/// World position to flow towards
	target: Vec3,
}

impl EventGenerateFlowField {
	/// Create a new instance of [EventGenerateFlowField]
	#[cfg(not(tarpaulin_include))]
	pub fn new(grid: Entity, target: Vec3) -> Self {
		EventGenerateFlowField { grid, target }
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_grid(&self) -> Entity {
		self.grid
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_target(&self) -> Vec3 {
		self.target
	}
}

/// Order the agents bound to the grid on entity `grid` towards `target`, the flow field is
/// solved in the same tick
#[derive(Event)]
pub struct EventMoveAgents {
	/// Entity holding the [NavGrid]
	grid: Entity,
	/// World position to move to
	target: Vec3,
	/// Only order agents which are selected
	selected_only: bool,
}

impl EventMoveAgents {
	/// Create a new instance of [EventMoveAgents]
	#[cfg(not(tarpaulin_include))]
	pub fn new(grid: Entity, target: Vec3, selected_only: bool) -> Self {
		EventMoveAgents {
			grid,
			target,
			selected_only,
		}
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_grid(&self) -> Entity {
		self.grid
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_target(&self) -> Vec3 {
		self.target
	}
	#[cfg(not(tarpaulin_include))]
	pub fn is_selected_only(&self) -> bool {
		self.selected_only
	}
}

/// Process [EventMoveAgents] by ordering the agents and requesting a flow field
#[cfg(not(tarpaulin_include))]
pub fn process_move_orders(
	mut events: EventReader<EventMoveAgents>,
	mut agents: Query<&mut SteeringAgent>,
	mut event_generate: EventWriter<EventGenerateFlowField>,
) {
	for event in events.read() {
		let mut ordered = 0;
		for mut agent in agents.iter_mut() {
			if agent.get_field() != Some(event.get_grid()) {
				continue;
			}
			if event.is_selected_only() && !agent.get_state().is_selected {
				continue;
			}
			agent.command_move(event.get_target());
			ordered += 1;
		}
		debug!("Ordered {} agents to {}", ordered, event.get_target());
		event_generate.write(EventGenerateFlowField::new(
			event.get_grid(),
			event.get_target(),
		));
	}
}

/// Process [EventGenerateFlowField] and solve the fields of each requested grid
#[cfg(not(tarpaulin_include))]
pub fn process_flow_field_requests(
	mut events: EventReader<EventGenerateFlowField>,
	mut grids: Query<&mut NavGrid>,
) {
	// several commanders may send requests at once, a grid only holds one solve so only the most
	// recent request of each grid is processed
	let mut latest: Vec<(Entity, Vec3)> = Vec::new();
	for event in events.read() {
		match latest.iter_mut().find(|(e, _)| *e == event.get_grid()) {
			Some(entry) => entry.1 = event.get_target(),
			None => latest.push((event.get_grid(), event.get_target())),
		}
	}
	for (entity, target) in latest {
		let Ok(mut grid) = grids.get_mut(entity) else {
			warn!("Flow field requested of {:?} which has no NavGrid", entity);
			continue;
		};
		// a rejected target leaves the previous field in place
		if let Err(e) = grid.generate(target) {
			debug!("Flow field request for {:?} dropped: {}", entity, e);
		}
	}
}
