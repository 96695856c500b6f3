//! Grid data structures and neighbourhoods

mod element;
#[allow(clippy::module_inception)]
mod grid;
mod neighborhood;

pub use element::GridElement;
pub use grid::{Grid, GridStatistics};
pub use neighborhood::{Neighborhood, D8_OFFSETS};
