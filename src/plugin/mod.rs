//! Defines the Bevy [Plugin] for flow field navigation
//!
//! Every system runs in [FixedUpdate] so that steering sees a constant timestep. Within a tick
//! the sets are chained so a grid is never solved while agents are reading it:
//!
//! 1. [OrderingSet::Edit] applies cost edits and re-solves the grids they touched
//! 2. [OrderingSet::Calculate] issues move orders and solves requested flow fields
//! 3. [OrderingSet::Steer] snapshots agent positions and steers every agent
//! 4. [OrderingSet::Resolve] applies the pushes agents deposited and syncs [Transform]s
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod cost_layer;
#[cfg(feature = "debug_gizmos")]
pub mod debug_layer;
pub mod flow_layer;
pub mod steering_layer;

/// Order of the navigation systems within [FixedUpdate]
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Cost edits
	Edit,
	/// Flow field solves
	Calculate,
	/// Per agent steering
	Steer,
	/// Deferred pushes and transform sync
	Resolve,
}

pub struct FlowFieldNavPlugin;

impl Plugin for FlowFieldNavPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.init_resource::<NavTerrain>()
			.init_resource::<PendingPushes>()
			.add_event::<cost_layer::EventEditCosts>()
			.add_event::<cost_layer::EventCleanCaches>()
			.add_event::<flow_layer::EventGenerateFlowField>()
			.add_event::<flow_layer::EventMoveAgents>()
			.add_event::<steering_layer::EventSteering>()
			.configure_sets(
				FixedUpdate,
				(
					OrderingSet::Edit,
					OrderingSet::Calculate,
					OrderingSet::Steer,
					OrderingSet::Resolve,
				)
					.chain(),
			)
			.add_systems(
				FixedUpdate,
				(
					(cost_layer::process_cost_edits, cost_layer::clean_cache)
						.chain()
						.in_set(OrderingSet::Edit),
					(
						flow_layer::process_move_orders,
						flow_layer::process_flow_field_requests,
					)
						.chain()
						.in_set(OrderingSet::Calculate),
					(
						steering_layer::rebuild_spatial_index,
						steering_layer::steer_agents,
					)
						.chain()
						.in_set(OrderingSet::Steer),
					(steering_layer::apply_pushes, steering_layer::sync_transforms)
						.chain()
						.in_set(OrderingSet::Resolve),
				),
			);
		#[cfg(feature = "debug_gizmos")]
		app.init_resource::<debug_layer::FlowFieldDebugSettings>()
			.add_systems(Update, debug_layer::draw_flow_fields);
	}
}
