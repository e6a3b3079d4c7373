//! Flowfields are a means of handling pathfinding for a crowd of actors.
//!
//! [Fixing Pathfinding Once and For All](https://web.archive.org/web/20150905073624/http://www.ai-blog.net/archives/000152.html)
//!
//! [jdxdev](https://www.jdxdev.com/blog/2020/05/03/flowfields/)
//!
//! [leifnode](https://leifnode.com/2013/12/flow-field-pathfinding/)
//!
//! The map is a single grid of `width x depth` cells starting at the world origin, each cell is
//! `cell_size` world units square. Cells are indexed from the top-left corner, i.e `(0, 0)` is the
//! cell at the smallest `x` and `z`, and `x` grows along columns while `z` grows along rows.
//!
//! ```text
//!  _____________________________
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! ```
//!
//! Definitions:
//!
//! * Cost field - 32-bit field where [utilities::COST_IMPASSABLE] represents impassable terrain
//! and any value from `1` upwards represents the cost of entering that grid location, 1 being the
//! default and easiest. You could define a value of 5 for instance as being a slope or swamp and in
//! such a case pathfinding will try to avoid it
//! * Integration field - uses the cost field as input and stores the calculated cost-to-goal
//! * Flow field - one direction per cell pointing at the neighbour an actor should move into next.
//! Cells with no better neighbour (the goal, obstacles and unreachable pockets) have no direction
//!

pub mod debug;
pub mod fields;
pub mod nav_grid;
pub mod utilities;
