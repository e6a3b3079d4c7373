//! Measure a flow field solve through a maze of walls with single cell gaps, alternating which
//! end of the wall the gap sits at so the route snakes across the whole world
//!
//! World is 256 cells by 256 cells
//!

use bevy::prelude::*;
use bevy_flowfield_nav_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Every fourth row is a wall with a gap at alternating ends, laid over a patch of marsh
fn prepare_maze(size: u32, propagation: Propagation) -> NavGrid {
	let mut grid = NavGrid::new(MapDimensions::new(size, size, 1.0)).with_propagation(propagation);
	// some marsh between the walls
	let centre = size as f32 / 2.0;
	grid.set_cost_area(Vec3::new(centre, 0.0, centre), size as f32 / 6.0, 6)
		.unwrap();
	for (n, z) in (2..size as i32).step_by(4).enumerate() {
		let gap = if n % 2 == 0 { size as i32 - 1 } else { 0 };
		for x in 0..size as i32 {
			if x != gap {
				grid.set_cell_cost(GridCell::new(x, z), COST_IMPASSABLE)
					.unwrap();
			}
		}
	}
	grid
}

/// Solve towards the top left corner, forcing a full rebuild each time
fn flow_maze(grid: &mut NavGrid) {
	grid.generate_forced(Vec3::new(0.5, 0.0, 0.5)).unwrap();
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(50);
	for propagation in [Propagation::Wavefront, Propagation::Dijkstra] {
		let mut grid = prepare_maze(256, propagation);
		group.bench_function(format!("calc_flow_maze_{:?}", propagation), |b| {
			b.iter(|| flow_maze(black_box(&mut grid)))
		});
	}
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
