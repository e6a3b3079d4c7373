//! Drives the steering controller for every [SteeringAgent] entity.
//!
//! An agent's [AgentState] is the source of truth for its position, the [Transform] is written
//! from it at the end of each tick. Agents only sense other agents bound to the same grid entity.
//!

use crate::prelude::*;
use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

impl From<Entity> for AgentId {
	fn from(entity: Entity) -> Self {
		AgentId::new(entity.to_bits())
	}
}

/// A unit steered along the flow field of a grid entity
#[derive(Component, Clone, Debug)]
pub struct SteeringAgent {
	/// Movement state
	state: AgentState,
	/// Source of the stall nudge direction
	rng: StdRng,
	/// Entity holding the [NavGrid] the agent follows
	field: Option<Entity>,
}

impl SteeringAgent {
	/// Create a new instance of [SteeringAgent] standing still at `position`. The nudge rng is
	/// seeded from the spawn position, use [SteeringAgent::with_seed] to pick the seed
	pub fn new(position: Vec3, field: Option<Entity>) -> Self {
		let seed = ((position.x.to_bits() as u64) << 32) | position.z.to_bits() as u64;
		SteeringAgent {
			state: AgentState::new(position),
			rng: StdRng::seed_from_u64(seed),
			field,
		}
	}
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.rng = StdRng::seed_from_u64(seed);
		self
	}
	pub fn get_state(&self) -> &AgentState {
		&self.state
	}
	pub fn get_state_mut(&mut self) -> &mut AgentState {
		&mut self.state
	}
	pub fn get_field(&self) -> Option<Entity> {
		self.field
	}
	/// Bind the agent to another grid, or to none so it moves unsteered
	pub fn set_field(&mut self, field: Option<Entity>) {
		self.field = field;
	}
	pub fn set_selected(&mut self, is_selected: bool) {
		self.state.is_selected = is_selected;
	}
	/// Order the agent towards `target`
	pub fn command_move(&mut self, target: Vec3) {
		self.state.command_move(target);
	}
	pub fn stop(&mut self) {
		self.state.stop();
	}
}

/// Ground the agents stand on
#[derive(Resource)]
pub struct NavTerrain(Box<dyn TerrainHeight>);

impl NavTerrain {
	/// Create a new instance of [NavTerrain]
	pub fn new(terrain: impl TerrainHeight + 'static) -> Self {
		NavTerrain(Box::new(terrain))
	}
	pub fn get(&self) -> &dyn TerrainHeight {
		self.0.as_ref()
	}
}

impl Default for NavTerrain {
	fn default() -> Self {
		NavTerrain::new(FlatTerrain::default())
	}
}

/// Pushes deposited by agents during [OrderingSet::Steer], applied in [OrderingSet::Resolve]
#[derive(Resource, Default)]
pub struct PendingPushes(PushAccumulator);

impl PendingPushes {
	pub fn get(&self) -> &PushAccumulator {
		&self.0
	}
}

/// A [SteeringEvent] raised by the agent on `entity`
#[derive(Event, Clone, Copy, Debug)]
pub struct EventSteering {
	/// Entity of the agent
	entity: Entity,
	/// What happened
	event: SteeringEvent,
}

impl EventSteering {
	/// Create a new instance of [EventSteering]
	pub fn new(entity: Entity, event: SteeringEvent) -> Self {
		EventSteering { entity, event }
	}
	pub fn get_entity(&self) -> Entity {
		self.entity
	}
	pub fn get_event(&self) -> SteeringEvent {
		self.event
	}
}

/// Snapshot where every agent stands into the [AgentSpatialIndex] of its grid
#[cfg(not(tarpaulin_include))]
pub fn rebuild_spatial_index(
	mut indexes: Query<&mut AgentSpatialIndex>,
	agents: Query<(Entity, &SteeringAgent)>,
) {
	for mut index in indexes.iter_mut() {
		index.clear();
	}
	for (entity, agent) in agents.iter() {
		let Some(field) = agent.field else {
			continue;
		};
		if let Ok(mut index) = indexes.get_mut(field) {
			index.insert(
				AgentId::from(entity),
				agent.state.position,
				agent.state.is_moving,
			);
		}
	}
}

/// Run the steering controller for every agent
#[cfg(not(tarpaulin_include))]
pub fn steer_agents(
	time: Res<Time>,
	terrain: Res<NavTerrain>,
	grids: Query<(&NavGrid, &AgentSpatialIndex)>,
	unbound: Local<AgentSpatialIndex>,
	mut agents: Query<(Entity, &mut SteeringAgent, &SteeringConfig)>,
	mut pushes: ResMut<PendingPushes>,
	mut event_steering: EventWriter<EventSteering>,
) {
	let dt = time.delta_secs();
	if dt <= 0.0 {
		return;
	}
	for (entity, mut agent, config) in agents.iter_mut() {
		let bound = agent.field.and_then(|field| grids.get(field).ok());
		if agent.field.is_some() && bound.is_none() {
			warn!("Agent {:?} is bound to an entity with no NavGrid", entity);
		}
		let grid = bound.map(|(grid, _)| grid);
		let index = bound.map_or(&*unbound, |(_, index)| index);
		let spatial = GridSpatialQuery::new(grid, index);
		let motion = GridSlideMotion::new(grid, terrain.get());
		let ctx = SteeringContext {
			field: grid.map(|g| g as &dyn FlowFieldQuery),
			spatial: &spatial,
			motion: &motion,
			config,
			dt,
		};
		let SteeringAgent { state, rng, .. } = &mut *agent;
		let outcome = steer(AgentId::from(entity), state, rng, &ctx);
		pushes.0.extend(outcome.pushes);
		for event in outcome.events {
			event_steering.write(EventSteering::new(entity, event));
		}
	}
}

/// Apply the summed pushes once every agent has steered
#[cfg(not(tarpaulin_include))]
pub fn apply_pushes(mut pushes: ResMut<PendingPushes>, mut agents: Query<&mut SteeringAgent>) {
	if pushes.0.is_empty() {
		return;
	}
	pushes.0.drain(|id, delta| {
		let entity = Entity::from_bits(id.get());
		if let Ok(mut agent) = agents.get_mut(entity) {
			agent.state.position += horizontal(delta);
		}
	});
}

/// Write agent positions and headings into their [Transform]s
#[cfg(not(tarpaulin_include))]
pub fn sync_transforms(mut agents: Query<(&SteeringAgent, &mut Transform)>) {
	for (agent, mut transform) in agents.iter_mut() {
		transform.translation = agent.state.position;
		transform.rotation = Quat::from_rotation_y(agent.state.yaw);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn agent_id_round_trips_entity() {
		let entity = Entity::from_raw(42);
		let id = AgentId::from(entity);
		assert_eq!(entity, Entity::from_bits(id.get()));
	}
	#[test]
	fn seeded_by_spawn_position() {
		use rand::Rng;
		let mut a = SteeringAgent::new(Vec3::new(1.0, 0.0, 2.0), None);
		let mut b = SteeringAgent::new(Vec3::new(1.0, 0.0, 2.0), None);
		let x: u64 = a.rng.random();
		let y: u64 = b.rng.random();
		assert_eq!(x, y);
		let mut c = SteeringAgent::new(Vec3::new(1.0, 0.0, 2.0), None).with_seed(7);
		let z: u64 = c.rng.random();
		assert_ne!(x, z);
	}
	#[test]
	fn commands_reach_state() {
		let mut agent = SteeringAgent::new(Vec3::ZERO, None);
		agent.set_selected(true);
		agent.command_move(Vec3::new(4.0, 0.0, 0.0));
		assert!(agent.get_state().is_moving);
		assert!(agent.get_state().is_selected);
		agent.stop();
		assert!(!agent.get_state().is_moving);
	}
}
