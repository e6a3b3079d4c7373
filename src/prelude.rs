//! `use bevy_flowfield_nav_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::flowfields::{
	debug::*,
	fields::{cost_field::*, flow_field::*, integration_field::*, *},
	nav_grid::*,
	utilities::*,
};

#[doc(hidden)]
pub use crate::steering::{
	agent::*, config::*, controller::*, motion::*, push::*, registry::*, spatial::*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	error::*,
	plugin::{cost_layer::*, flow_layer::*, steering_layer::*, *},
};

#[doc(hidden)]
#[cfg(feature = "debug_gizmos")]
pub use crate::plugin::debug_layer::*;
