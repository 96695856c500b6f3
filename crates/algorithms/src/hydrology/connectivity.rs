//! Basin connectivity graph
//!
//! Nodes are basins plus synthetic exit nodes; the edge between two basins is
//! the lowest ridge cell they share (their saddle). Exit edges point from a
//! basin to the exit and are never walked back, since exits are leaves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spillway_core::Result;
use tracing::debug;

use super::partition::{BasinId, BasinPartition};
use crate::maybe_rayon::*;

/// Node of the connectivity graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeId {
    Basin(BasinId),
    /// Exit ids are negative: -1, -2, ... in input order
    Exit(i32),
}

/// Cell realizing an edge, with the elevation a flood must reach to cross it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Saddle {
    pub x: usize,
    pub y: usize,
    pub z: f64,
}

/// A validated exit: an in-grid cell through which water leaves the system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    pub id: i32,
    pub x: usize,
    pub y: usize,
    pub z: f64,
}

impl Exit {
    pub fn node(&self) -> NodeId {
        NodeId::Exit(self.id)
    }

    pub fn saddle(&self) -> Saddle {
        Saddle {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }
}

/// Adjacency of every live basin, indexed by basin id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectivityGraph {
    edges: Vec<BTreeMap<NodeId, Saddle>>,
}

impl ConnectivityGraph {
    /// Graph with no edges for `basin_count` basins
    pub fn with_basins(basin_count: usize) -> Self {
        Self {
            edges: vec![BTreeMap::new(); basin_count],
        }
    }

    pub fn basin_count(&self) -> usize {
        self.edges.len()
    }

    /// Neighbours of a basin, keyed by node
    pub fn neighbors(&self, basin_id: BasinId) -> Option<&BTreeMap<NodeId, Saddle>> {
        self.edges.get(basin_id as usize)
    }

    /// Saddle of the edge `from -> to`, if any
    pub fn edge(&self, from: BasinId, to: NodeId) -> Option<&Saddle> {
        self.neighbors(from).and_then(|n| n.get(&to))
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(BTreeMap::len).sum()
    }

    /// (basin, neighbours) pairs in basin id order
    pub fn iter(&self) -> impl Iterator<Item = (BasinId, &BTreeMap<NodeId, Saddle>)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(id, n)| (id as BasinId, n))
    }

    /// Record `from -> to` unless an existing saddle is lower. Equal
    /// elevations keep the smaller (x, y) so the result does not depend on
    /// scan order.
    fn offer(&mut self, from: BasinId, to: NodeId, saddle: Saddle) {
        let neighbors = &mut self.edges[from as usize];
        match neighbors.get(&to) {
            Some(existing) if (existing.z, existing.x, existing.y) <= (saddle.z, saddle.x, saddle.y) => {}
            _ => {
                neighbors.insert(to, saddle);
            }
        }
    }
}

/// Build the connectivity graph of a partition.
///
/// Exits are assumed validated (in-grid, integer coordinates); see
/// [`validate_exits`](super::validate_exits). Every basin touching an exit's
/// cell gets an edge to that exit, and every pair of basins sharing a ridge
/// cell gets a symmetric edge weighted by their lowest shared cell.
pub fn build_connectivity_graph(partition: &BasinPartition, exits: &[Exit]) -> Result<ConnectivityGraph> {
    let mut graph = ConnectivityGraph::with_basins(partition.basin_count());

    for exit in exits {
        let vertex = partition.vertex_at(exit.x, exit.y)?;
        for basin_id in vertex.basin_ids.iter() {
            graph.offer(basin_id, exit.node(), exit.saddle());
        }
    }

    let width = partition.width();
    let vertices = partition.vertices();

    // Scan rows independently; merging keeps the lowest saddle per pair
    let ridge_edges: Vec<(BasinId, BasinId, Saddle)> = (0..partition.height())
        .into_par_iter()
        .flat_map(|y| {
            let mut row_edges = Vec::new();
            for x in 0..width {
                let vertex = &vertices[y * width + x];
                if !vertex.basin_ids.is_boundary() {
                    continue;
                }
                let saddle = Saddle {
                    x,
                    y,
                    z: f64::from(vertex.z),
                };
                let ids = vertex.basin_ids.as_slice();
                for (i, &a) in ids.iter().enumerate() {
                    for &b in &ids[i + 1..] {
                        row_edges.push((a, b, saddle));
                    }
                }
            }
            row_edges
        })
        .collect();

    for (a, b, saddle) in ridge_edges {
        graph.offer(a, NodeId::Basin(b), saddle);
        graph.offer(b, NodeId::Basin(a), saddle);
    }

    debug!(
        basins = graph.basin_count(),
        exits = exits.len(),
        edges = graph.edge_count(),
        "built basin connectivity graph"
    );

    Ok(graph)
}
