//! Watershed analysis of height fields
//!
//! - Segmentation: partition cells into basins by flooding from the lowest
//!   cell, folding shallow dips into their neighbours
//! - Connectivity: basins linked by their lowest shared ridge cell, plus exits
//! - Reachability: per-basin escape height (bottleneck path to any exit)
//! - Basin graph: validated exits and per-cell height queries

mod basin_graph;
mod connectivity;
mod partition;
mod reachability;
mod segmentation;

pub use basin_graph::{validate_and_build, validate_exits, BasinGraph, ExitPoint};
pub use connectivity::{build_connectivity_graph, ConnectivityGraph, Exit, NodeId, Saddle};
pub use partition::{BasinId, BasinIds, BasinPartition, BasinSummary, GroupedVertex, Preference};
pub use reachability::{propagate_heights_info, HeightsInfo};
pub use segmentation::{segment, Segmentation, SegmentationParams};
