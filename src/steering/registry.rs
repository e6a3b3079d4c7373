//! A plain collection of agents sharing one [NavGrid], for driving the steering controller
//! without an ECS.
//!
//! A tick runs in two phases. First every agent steers against a snapshot of where all agents
//! stood when the tick began, depositing its pushes into a [PushAccumulator]. Then the summed
//! pushes are applied. With the `multithread` feature the first phase runs on the rayon pool.
//!

use crate::prelude::*;
use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
#[cfg(feature = "multithread")]
use rayon::prelude::*;

/// An agent and everything it needs to steer
#[derive(Clone, Debug)]
pub struct RegisteredAgent {
	/// Handle of the agent
	id: AgentId,
	/// Movement state
	state: AgentState,
	/// Tunables
	config: SteeringConfig,
	/// Source of the stall nudge direction, seeded from the id
	rng: StdRng,
}

impl RegisteredAgent {
	pub fn get_id(&self) -> AgentId {
		self.id
	}
	pub fn get_state(&self) -> &AgentState {
		&self.state
	}
	pub fn get_config(&self) -> &SteeringConfig {
		&self.config
	}
}

/// Owns agents behind [AgentId] handles
#[derive(Clone, Debug, Default)]
pub struct AgentRegistry {
	/// Agents ordered by id
	agents: Vec<RegisteredAgent>,
	/// Id handed to the next spawned agent
	next_id: u64,
	/// Snapshot of positions rebuilt every tick
	index: AgentSpatialIndex,
	/// Pushes waiting to be applied
	pushes: PushAccumulator,
}

impl AgentRegistry {
	/// Create a new empty instance of [AgentRegistry]. Neighbours are bucketed by `bucket_size`,
	/// which should be around the larger of the separation and push radii
	pub fn new(bucket_size: f32) -> Self {
		AgentRegistry {
			index: AgentSpatialIndex::new(bucket_size),
			..Default::default()
		}
	}
	/// Add a stationary agent at `position`
	pub fn spawn(&mut self, position: Vec3, config: SteeringConfig) -> AgentId {
		let id = AgentId::new(self.next_id);
		self.next_id += 1;
		self.agents.push(RegisteredAgent {
			id,
			state: AgentState::new(position),
			config,
			rng: StdRng::seed_from_u64(id.get()),
		});
		id
	}
	/// Remove an agent, returns `false` if it did not exist
	pub fn despawn(&mut self, id: AgentId) -> bool {
		match self.position_of(id) {
			Some(i) => {
				self.agents.remove(i);
				true
			}
			None => false,
		}
	}
	/// Index of an agent within the ordered list
	fn position_of(&self, id: AgentId) -> Option<usize> {
		self.agents.binary_search_by_key(&id, |a| a.id).ok()
	}
	pub fn get(&self, id: AgentId) -> Option<&AgentState> {
		self.position_of(id).map(|i| &self.agents[i].state)
	}
	pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentState> {
		self.position_of(id).map(|i| &mut self.agents[i].state)
	}
	pub fn iter(&self) -> impl Iterator<Item = &RegisteredAgent> {
		self.agents.iter()
	}
	pub fn len(&self) -> usize {
		self.agents.len()
	}
	pub fn is_empty(&self) -> bool {
		self.agents.is_empty()
	}
	/// Mark an agent as part of the selection, returns `false` if it did not exist
	pub fn set_selected(&mut self, id: AgentId, is_selected: bool) -> bool {
		match self.get_mut(id) {
			Some(state) => {
				state.is_selected = is_selected;
				true
			}
			None => false,
		}
	}
	/// Order a single agent towards `target`, returns `false` if it did not exist
	pub fn command_agent(&mut self, id: AgentId, target: Vec3) -> bool {
		match self.get_mut(id) {
			Some(state) => {
				state.command_move(target);
				true
			}
			None => false,
		}
	}
	/// Order every selected agent towards `target`, returns how many were ordered
	pub fn command_selected(&mut self, target: Vec3) -> usize {
		let mut count = 0;
		for agent in self.agents.iter_mut().filter(|a| a.state.is_selected) {
			agent.state.command_move(target);
			count += 1;
		}
		count
	}
	/// Order every agent towards `target`
	pub fn command_all(&mut self, target: Vec3) {
		for agent in self.agents.iter_mut() {
			agent.state.command_move(target);
		}
	}
	/// Advance every agent by `dt`. Agents follow `grid` when given and stand on `terrain`.
	/// Returns the steering events raised during the tick in agent order
	pub fn tick(
		&mut self,
		grid: Option<&NavGrid>,
		terrain: &dyn TerrainHeight,
		dt: f32,
	) -> Vec<(AgentId, SteeringEvent)> {
		self.index.clear();
		for agent in self.agents.iter() {
			self.index
				.insert(agent.id, agent.state.position, agent.state.is_moving);
		}
		let spatial = GridSpatialQuery::new(grid, &self.index);
		let motion = GridSlideMotion::new(grid, terrain);
		let field = grid.map(|g| g as &dyn FlowFieldQuery);
		let step = |agent: &mut RegisteredAgent| {
			let ctx = SteeringContext {
				field,
				spatial: &spatial,
				motion: &motion,
				config: &agent.config,
				dt,
			};
			let outcome = steer(agent.id, &mut agent.state, &mut agent.rng, &ctx);
			(agent.id, outcome)
		};
		#[cfg(feature = "multithread")]
		let outcomes: Vec<(AgentId, SteerOutcome)> = self.agents.par_iter_mut().map(step).collect();
		#[cfg(not(feature = "multithread"))]
		let outcomes: Vec<(AgentId, SteerOutcome)> = self.agents.iter_mut().map(step).collect();

		let mut events = Vec::new();
		for (id, outcome) in outcomes {
			self.pushes.extend(outcome.pushes);
			events.extend(outcome.events.into_iter().map(|e| (id, e)));
		}
		let agents = &mut self.agents;
		self.pushes.drain(|id, delta| {
			if let Ok(i) = agents.binary_search_by_key(&id, |a| a.id) {
				agents[i].state.position += horizontal(delta);
			}
		});
		events
	}
}
