//! Solve flow fields and steer agents over them without an ECS
//!

use bevy::prelude::*;
use bevy_flowfield_nav_plugin::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Fixed timestep used by the scenarios
const DT: f32 = 1.0 / 60.0;

/// Cheapest cost of reaching `target` from every cell found by repeatedly relaxing every cell
/// until nothing changes
fn reference_integration(costs: &CostField, target: GridCell) -> Vec<u32> {
	let width = costs.get_width() as i32;
	let depth = costs.get_depth() as i32;
	let mut values = vec![INTEGRATION_UNSOLVED; (width * depth) as usize];
	let target_index = costs.get_index(target).unwrap();
	values[target_index] = 0;
	let mut changed = true;
	while changed {
		changed = false;
		for z in 0..depth {
			for x in 0..width {
				let cell = GridCell::new(x, z);
				let i = costs.get_index(cell).unwrap();
				let cost = costs.get()[i];
				if i == target_index || cost == COST_IMPASSABLE {
					continue;
				}
				for (_, n) in cell.neighbours() {
					let Some(j) = costs.get_index(n) else {
						continue;
					};
					if values[j] == INTEGRATION_UNSOLVED {
						continue;
					}
					if values[j] + cost < values[i] {
						values[i] = values[j] + cost;
						changed = true;
					}
				}
			}
		}
	}
	values
}

/// A grid of random costs with roughly one cell in six impassable
fn random_costs(rng: &mut StdRng, width: u32, depth: u32) -> CostField {
	let mut costs = CostField::new(width, depth);
	for z in 0..depth as i32 {
		for x in 0..width as i32 {
			let cost = if rng.random_range(0..6) == 0 {
				COST_IMPASSABLE
			} else {
				rng.random_range(1..10)
			};
			costs.set_cost(cost, GridCell::new(x, z)).unwrap();
		}
	}
	costs
}

#[test]
fn both_propagations_match_exhaustive_relaxation() {
	let mut rng = StdRng::seed_from_u64(3);
	for _ in 0..40 {
		let mut costs = random_costs(&mut rng, 6, 5);
		let target = GridCell::new(rng.random_range(0..6), rng.random_range(0..5));
		costs.set_cost(COST_DEFAULT, target).unwrap();
		let expected = reference_integration(&costs, target);
		for propagation in [Propagation::Wavefront, Propagation::Dijkstra] {
			let mut grid = NavGrid::from_cost_field(costs.clone(), 1.0)
				.unwrap()
				.with_propagation(propagation);
			grid.generate(grid.grid_to_world(target, 0.0)).unwrap();
			assert_eq!(expected, grid.get_integration_field().get());
		}
	}
}

#[test]
fn flow_descends_to_the_target() {
	let mut rng = StdRng::seed_from_u64(11);
	for _ in 0..20 {
		let mut costs = random_costs(&mut rng, 8, 8);
		let target = GridCell::new(rng.random_range(0..8), rng.random_range(0..8));
		costs.set_cost(COST_DEFAULT, target).unwrap();
		let mut grid = NavGrid::from_cost_field(costs, 1.0).unwrap();
		grid.generate(grid.grid_to_world(target, 0.0)).unwrap();
		let int_field = grid.get_integration_field();
		for z in 0..8 {
			for x in 0..8 {
				let mut cell = GridCell::new(x, z);
				if int_field.get_field_cell_value(cell) == INTEGRATION_UNSOLVED {
					continue;
				}
				// every reachable cell walks strictly downhill onto the target
				for _ in 0..64 {
					if cell == target {
						break;
					}
					let flow = grid.get_flow_field().get_flow_vector(cell);
					let next = GridCell::new(
						cell.get_x() + flow.x.signum() as i32 * (flow.x != 0.0) as i32,
						cell.get_z() + flow.y.signum() as i32 * (flow.y != 0.0) as i32,
					);
					assert!(
						int_field.get_field_cell_value(next) < int_field.get_field_cell_value(cell)
					);
					cell = next;
				}
				assert_eq!(target, cell);
			}
		}
	}
}

#[test]
fn obstacle_block_is_routed_around() {
	let mut grid = NavGrid::new(MapDimensions::new(10, 10, 1.0));
	for z in 4..=6 {
		for x in 4..=6 {
			grid.set_cell_cost(GridCell::new(x, z), COST_IMPASSABLE)
				.unwrap();
		}
	}
	let target = Vec3::new(9.5, 0.0, 9.5);
	grid.generate(target).unwrap();
	assert_eq!(
		0,
		grid.get_integration_field()
			.get_field_cell_value(GridCell::new(9, 9))
	);
	let corner = grid.get_flow_direction(Vec3::new(0.5, 0.0, 0.5));
	assert_ne!(Vec2::ZERO, corner);
	assert!(corner.x >= 0.0 && corner.y >= 0.0);
	for z in 4..=6 {
		for x in 4..=6 {
			let position = Vec3::new(x as f32 + 0.5, 0.0, z as f32 + 0.5);
			assert_eq!(Vec2::ZERO, grid.get_flow_direction(position));
			assert_eq!(COST_IMPASSABLE, grid.get_cell_cost(position));
		}
	}
	assert!(grid.is_reachable(Vec3::new(0.5, 0.0, 0.5), target));
}

#[test]
fn rejected_targets_keep_the_previous_field() {
	let mut grid = NavGrid::new(MapDimensions::new(10, 10, 1.0));
	grid.set_obstacle(Vec3::new(2.5, 0.0, 2.5), true).unwrap();
	grid.generate(Vec3::new(8.5, 0.0, 8.5)).unwrap();
	let before = grid.get_flow_field().clone();
	assert_eq!(
		Err(NavError::ImpassableTarget {
			cell: GridCell::new(2, 2)
		}),
		grid.generate(Vec3::new(2.5, 0.0, 2.5)).map(|_| ())
	);
	assert!(matches!(
		grid.generate(Vec3::new(-3.0, 0.0, 4.0)),
		Err(NavError::OutOfBounds { .. })
	));
	assert_eq!(&before, grid.get_flow_field());
	assert_eq!(Some(GridCell::new(8, 8)), grid.get_last_target());
	assert_eq!(1, grid.get_solve_count());
}

#[test]
fn agent_arrives_across_open_ground() {
	let mut grid = NavGrid::new(MapDimensions::new(32, 32, 1.0));
	let target = Vec3::new(20.5, 0.0, 4.5);
	grid.generate(target).unwrap();
	let mut registry = AgentRegistry::new(2.0);
	let id = registry.spawn(Vec3::new(1.5, 0.0, 4.5), SteeringConfig::default());
	registry.command_all(target);
	let terrain = FlatTerrain::default();
	let mut events = Vec::new();
	for _ in 0..300 {
		events.extend(registry.tick(Some(&grid), &terrain, DT));
	}
	let state = registry.get(id).unwrap();
	assert!(!state.is_moving);
	assert!(state.distance_to_target() < 1.0);
	assert_eq!(vec![(id, SteeringEvent::Arrived)], events);
}

#[test]
fn converging_agents_keep_their_distance() {
	let mut grid = NavGrid::new(MapDimensions::new(21, 5, 1.0));
	let target = Vec3::new(10.5, 0.0, 2.5);
	grid.generate(target).unwrap();
	let config = SteeringConfig {
		arrival_distance: 0.1,
		..Default::default()
	};
	let mut registry = AgentRegistry::new(2.0);
	let a = registry.spawn(Vec3::new(2.5, 0.0, 2.5), config.clone());
	let b = registry.spawn(Vec3::new(18.5, 0.0, 2.5), config);
	registry.command_all(target);
	let terrain = FlatTerrain::default();
	let mut closest = f32::MAX;
	for _ in 0..300 {
		registry.tick(Some(&grid), &terrain, DT);
		let pa = registry.get(a).unwrap().position;
		let pb = registry.get(b).unwrap().position;
		closest = closest.min(horizontal(pa - pb).length());
	}
	assert!(closest >= 0.5, "agents came within {}", closest);
	assert!(!registry.get(a).unwrap().is_moving);
	assert!(!registry.get(b).unwrap().is_moving);
}

#[test]
fn selection_limits_who_is_ordered() {
	let mut grid = NavGrid::new(MapDimensions::new(16, 16, 1.0));
	let target = Vec3::new(12.5, 0.0, 12.5);
	grid.generate(target).unwrap();
	let mut registry = AgentRegistry::new(2.0);
	let selected = registry.spawn(Vec3::new(1.5, 0.0, 1.5), SteeringConfig::default());
	let idle = registry.spawn(Vec3::new(1.5, 0.0, 12.5), SteeringConfig::default());
	registry.set_selected(selected, true);
	assert_eq!(1, registry.command_selected(target));
	let terrain = FlatTerrain::default();
	for _ in 0..30 {
		registry.tick(Some(&grid), &terrain, DT);
	}
	assert!(registry.get(selected).unwrap().position.x > 1.5);
	assert_eq!(Vec3::new(1.5, 0.0, 12.5), registry.get(idle).unwrap().position);
}

#[test]
fn expensive_corridor_is_still_followed() {
	let mut grid = NavGrid::new(MapDimensions::new(4, 1, 1.0));
	grid.set_cell_cost(GridCell::new(1, 0), 600_000).unwrap();
	grid.set_cell_cost(GridCell::new(2, 0), 600_000).unwrap();
	let target = Vec3::new(0.5, 0.0, 0.5);
	grid.generate(target).unwrap();
	assert_eq!(
		&[0, 600_000, 1_200_000, 1_200_001],
		grid.get_integration_field().get()
	);
	let far_end = Vec3::new(3.5, 0.0, 0.5);
	assert!(grid.is_reachable(far_end, target));
	assert_eq!(Vec2::new(-1.0, 0.0), grid.get_flow_direction(far_end));
	assert_eq!(3, grid.get_flow_field().count_directed());
}
