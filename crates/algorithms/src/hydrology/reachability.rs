//! Escape-height propagation over the basin connectivity graph
//!
//! For each basin, `max_z` is the lowest water level at which a flood starting
//! in the basin can reach an exit: the minimum over all paths to any exit of
//! the highest saddle crossed (a bottleneck path cost). Computed with a
//! Dijkstra-style sweep from all exits at once; since a path's cost never
//! drops as it grows, each basin is settled exactly once.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use serde::{Deserialize, Serialize};
use spillway_core::{Error, Result};
use tracing::debug;

use super::connectivity::{ConnectivityGraph, Exit, NodeId};
use super::partition::{BasinId, BasinPartition};

/// Flood heights of one basin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightsInfo {
    /// Elevation of the basin's minimum
    pub ground_z: f64,
    /// Lowest level at which water in the basin escapes through an exit
    pub max_z: f64,
}

/// Frontier entry, ordered so that `BinaryHeap` pops the lowest `max_z` first
#[derive(Debug, Clone, Copy)]
struct Candidate {
    max_z: f64,
    basin_id: BasinId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower max_z (then lower id) has higher priority
        other
            .max_z
            .total_cmp(&self.max_z)
            .then_with(|| other.basin_id.cmp(&self.basin_id))
    }
}

/// Compute [`HeightsInfo`] for every basin reachable from an exit.
///
/// Every basin touching an exit's cell is seeded with the lowest such exit's
/// `z`, even when that is below the basin's own floor. Basins with no path to
/// any exit are absent from the result.
pub fn propagate_heights_info(
    partition: &BasinPartition,
    exits: &[Exit],
    graph: &ConnectivityGraph,
) -> Result<BTreeMap<BasinId, HeightsInfo>> {
    if exits.is_empty() {
        return Err(Error::NoExits);
    }

    let mut best: Vec<Option<f64>> = vec![None; graph.basin_count()];
    let mut settled = vec![false; graph.basin_count()];
    let mut heap = BinaryHeap::new();

    for exit in exits {
        for basin_id in partition.vertex_at(exit.x, exit.y)?.basin_ids.iter() {
            let slot = best
                .get_mut(basin_id as usize)
                .ok_or_else(|| Error::Algorithm(format!("basin {} is not in the graph", basin_id)))?;
            if slot.is_none_or(|z| exit.z < z) {
                *slot = Some(exit.z);
                heap.push(Candidate {
                    max_z: exit.z,
                    basin_id,
                });
            }
        }
    }

    while let Some(Candidate { max_z, basin_id }) = heap.pop() {
        let index = basin_id as usize;
        if settled[index] {
            continue;
        }
        settled[index] = true;

        let Some(neighbors) = graph.neighbors(basin_id) else {
            continue;
        };
        for (node, saddle) in neighbors {
            // Exits are sinks; nothing flows back out of them
            let NodeId::Basin(next) = *node else {
                continue;
            };
            let next_index = next as usize;
            if settled[next_index] {
                continue;
            }
            let candidate = max_z.max(saddle.z);
            if best[next_index].is_none_or(|z| candidate < z) {
                best[next_index] = Some(candidate);
                heap.push(Candidate {
                    max_z: candidate,
                    basin_id: next,
                });
            }
        }
    }

    let mut heights = BTreeMap::new();
    for (index, max_z) in best.into_iter().enumerate() {
        let Some(max_z) = max_z else {
            continue;
        };
        let basin_id = index as BasinId;
        let minimum = partition.minimum_of(basin_id)?;
        let ground_z = f64::from(partition.vertex(minimum)?.z);
        heights.insert(basin_id, HeightsInfo { ground_z, max_z });
    }

    debug!(
        basins = graph.basin_count(),
        reached = heights.len(),
        exits = exits.len(),
        "propagated escape heights"
    );

    Ok(heights)
}
