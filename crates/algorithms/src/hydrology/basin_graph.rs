//! Query surface over a segmented height field and its exits
//!
//! [`BasinGraph`] validates exits, builds the connectivity graph, propagates
//! escape heights and answers per-cell queries. A ridge cell belongs to several
//! basins; its flood height is governed by whichever of them escapes lowest.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use spillway_core::{Axis, Error, Result};
use tracing::debug;

use super::connectivity::{build_connectivity_graph, ConnectivityGraph, Exit};
use super::partition::{BasinId, BasinIds, BasinPartition};
use super::reachability::{propagate_heights_info, HeightsInfo};

/// Exit as supplied by a caller, before validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ExitPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

fn check_range(axis: Axis, value: f64, limit: usize) -> Result<()> {
    // Written so that NaN fails too
    if !(value >= 0.0 && value < limit as f64) {
        return Err(Error::OutOfBounds { axis, value, limit });
    }
    Ok(())
}

fn check_integer(axis: Axis, value: f64) -> Result<usize> {
    if value.round() != value {
        return Err(Error::NonIntegerCoordinate { axis, value });
    }
    Ok(value as usize)
}

/// Validate raw exits against a partition and assign ids `-1, -2, ...` in
/// input order.
///
/// Each exit is checked in turn: x range, y range, then x and y integrality.
/// The first failure is returned.
pub fn validate_exits(partition: &BasinPartition, exits: &[ExitPoint]) -> Result<Vec<Exit>> {
    if exits.is_empty() {
        return Err(Error::NoExits);
    }

    exits
        .iter()
        .enumerate()
        .map(|(i, exit)| {
            check_range(Axis::X, exit.x, partition.width())?;
            check_range(Axis::Y, exit.y, partition.height())?;
            let x = check_integer(Axis::X, exit.x)?;
            let y = check_integer(Axis::Y, exit.y)?;
            Ok(Exit {
                id: -(i as i32) - 1,
                x,
                y,
                z: exit.z,
            })
        })
        .collect()
}

/// Validate exits and build the connectivity graph for them.
pub fn validate_and_build(
    partition: &BasinPartition,
    exits: &[ExitPoint],
) -> Result<(Vec<Exit>, ConnectivityGraph)> {
    let exits = validate_exits(partition, exits)?;
    let graph = build_connectivity_graph(partition, &exits)?;
    Ok((exits, graph))
}

/// Basin connectivity and escape heights for one partition and exit set.
///
/// Rebuild it whenever the exits change; the per-cell cache is keyed by basin
/// id set and lives only as long as this value.
#[derive(Debug)]
pub struct BasinGraph<'a> {
    partition: &'a BasinPartition,
    exits: Vec<Exit>,
    graph: ConnectivityGraph,
    heights: BTreeMap<BasinId, HeightsInfo>,
    cache: RefCell<HashMap<BasinIds, HeightsInfo>>,
}

impl<'a> BasinGraph<'a> {
    /// Validate `exits`, build the graph and propagate heights.
    ///
    /// All validation happens before any graph work; see [`validate_exits`].
    pub fn new(partition: &'a BasinPartition, exits: &[ExitPoint]) -> Result<Self> {
        let (exits, graph) = validate_and_build(partition, exits)?;
        let heights = propagate_heights_info(partition, &exits, &graph)?;

        debug!(
            basins = partition.basin_count(),
            exits = exits.len(),
            reached = heights.len(),
            "built basin graph"
        );

        Ok(Self {
            partition,
            exits,
            graph,
            heights,
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn partition(&self) -> &BasinPartition {
        self.partition
    }

    /// Validated exits with their assigned ids
    pub fn exits(&self) -> &[Exit] {
        &self.exits
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    /// Heights of every basin that can reach an exit
    pub fn heights(&self) -> &BTreeMap<BasinId, HeightsInfo> {
        &self.heights
    }

    /// Heights of a single basin
    pub fn heights_info(&self, basin_id: BasinId) -> Result<HeightsInfo> {
        self.heights
            .get(&basin_id)
            .copied()
            .ok_or(Error::MissingHeightsInfo(basin_id))
    }

    /// Heights governing a cell: for a ridge cell, those of the basin with the
    /// lowest `max_z` (the first such basin in id order on ties).
    ///
    /// Fails with [`Error::MissingHeightsInfo`] if any basin of the cell has
    /// no path to an exit.
    pub fn heights_info_for(&self, index: usize) -> Result<HeightsInfo> {
        let basin_ids = &self.partition.vertex(index)?.basin_ids;
        if let Some(info) = self.cache.borrow().get(basin_ids) {
            return Ok(*info);
        }

        let mut lowest: Option<HeightsInfo> = None;
        for basin_id in basin_ids.iter() {
            let info = self.heights_info(basin_id)?;
            if lowest.is_none_or(|l| info.max_z < l.max_z) {
                lowest = Some(info);
            }
        }
        let info = lowest.ok_or_else(|| Error::Other(format!("cell {} belongs to no basin", index)))?;

        self.cache.borrow_mut().insert(basin_ids.clone(), info);
        Ok(info)
    }

    /// [`heights_info_for`](Self::heights_info_for) by coordinates
    pub fn heights_info_for_xy(&self, x: usize, y: usize) -> Result<HeightsInfo> {
        self.partition.vertex_at(x, y)?;
        self.heights_info_for(y * self.partition.width() + x)
    }

    /// Number of distinct basin id sets answered so far
    pub fn cached_sets(&self) -> usize {
        self.cache.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::segmentation::{segment, SegmentationParams};
    use spillway_core::HeightField;

    /// Two pits separated by a ridge in the third column
    fn ridge_partition() -> BasinPartition {
        #[rustfmt::skip]
        let raw = [
            1, 1, 1, 1,
            1, 0, 1, 0,
            1, 1, 1, 1,
        ];
        let field = HeightField::from_raw(&raw, 4, 3).unwrap();
        segment(&field, SegmentationParams::default()).unwrap()
    }

    fn message(partition: &BasinPartition, exit: ExitPoint) -> String {
        BasinGraph::new(partition, &[exit]).unwrap_err().to_string()
    }

    #[test]
    fn test_requires_exits() {
        let partition = ridge_partition();
        let err = BasinGraph::new(&partition, &[]).unwrap_err();
        assert!(matches!(err, Error::NoExits));
        assert_eq!(
            err.to_string(),
            "Must provide at least one exit for calculating the basin graph"
        );
    }

    #[test]
    fn test_exit_out_of_range() {
        let p = ridge_partition();
        assert_eq!(
            message(&p, ExitPoint::new(-1.0, 0.0, 0.0)),
            "exit.x of -1 must be in range 0 <= x < 4"
        );
        assert_eq!(
            message(&p, ExitPoint::new(0.0, -1.0, 0.0)),
            "exit.y of -1 must be in range 0 <= y < 3"
        );
        assert_eq!(
            message(&p, ExitPoint::new(10.0, 0.0, 0.0)),
            "exit.x of 10 must be in range 0 <= x < 4"
        );
        assert_eq!(
            message(&p, ExitPoint::new(0.0, 10.0, 0.0)),
            "exit.y of 10 must be in range 0 <= y < 3"
        );
        assert!(matches!(
            BasinGraph::new(&p, &[ExitPoint::new(f64::NAN, 0.0, 0.0)]),
            Err(Error::OutOfBounds { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn test_exit_not_integer() {
        let p = ridge_partition();
        assert_eq!(
            message(&p, ExitPoint::new(1.1, 0.0, 0.0)),
            "exit.x of 1.1 must be an integer"
        );
        assert_eq!(
            message(&p, ExitPoint::new(0.0, 1.1, 0.0)),
            "exit.y of 1.1 must be an integer"
        );
    }

    #[test]
    fn test_range_checked_before_integrality() {
        let p = ridge_partition();
        assert!(matches!(
            BasinGraph::new(&p, &[ExitPoint::new(1.5, 7.0, 0.0)]),
            Err(Error::OutOfBounds { axis: Axis::Y, .. })
        ));
    }

    #[test]
    fn test_exit_ids_follow_input_order() {
        let p = ridge_partition();
        let exits = validate_exits(&p, &[ExitPoint::new(0.0, 1.0, 0.0), ExitPoint::new(3.0, 2.0, 4.0)]).unwrap();
        assert_eq!(exits[0], Exit { id: -1, x: 0, y: 1, z: 0.0 });
        assert_eq!(exits[1], Exit { id: -2, x: 3, y: 2, z: 4.0 });
    }

    #[test]
    fn test_heights_per_basin_and_cell() {
        let p = ridge_partition();
        let graph = BasinGraph::new(&p, &[ExitPoint::new(0.0, 1.0, 0.0)]).unwrap();

        assert_eq!(graph.heights_info(0).unwrap(), HeightsInfo { ground_z: 0.0, max_z: 0.0 });
        assert_eq!(graph.heights_info(1).unwrap(), HeightsInfo { ground_z: 0.0, max_z: 1.0 });
        assert!(matches!(graph.heights_info(2), Err(Error::MissingHeightsInfo(2))));

        // Interior of the right basin
        assert_eq!(graph.heights_info_for_xy(3, 1).unwrap().max_z, 1.0);
        // Ridge cell shared by both basins takes the lower escape
        assert_eq!(graph.heights_info_for_xy(2, 1).unwrap(), HeightsInfo { ground_z: 0.0, max_z: 0.0 });
        assert!(graph.heights_info_for_xy(4, 0).is_err());
    }

    #[test]
    fn test_queries_memoized_by_basin_set() {
        let p = ridge_partition();
        let graph = BasinGraph::new(&p, &[ExitPoint::new(0.0, 1.0, 0.0)]).unwrap();

        for index in 0..p.vertices().len() {
            graph.heights_info_for(index).unwrap();
        }
        // {0}, {1} and {0, 1}
        assert_eq!(graph.cached_sets(), 3);
        assert_eq!(graph.heights_info_for(2).unwrap().max_z, 0.0);
    }

    #[test]
    fn test_unreachable_basin_reports_missing_heights() {
        let field = HeightField::from_raw(&[0, 3, 0], 3, 1).unwrap();
        let p = segment(&field, SegmentationParams::default()).unwrap();
        // Exit sits inside basin 0 only; basin 1 is still reached over the ridge
        let graph = BasinGraph::new(&p, &[ExitPoint::new(0.0, 0.0, 0.0)]).unwrap();
        assert_eq!(graph.heights_info(1).unwrap().max_z, 3.0);

        let disconnected = BasinPartition::from_parts(
            2,
            1,
            vec![
                crate::hydrology::partition::GroupedVertex {
                    z: 0,
                    basin_ids: BasinIds::single(0),
                    basin_id: Some(0),
                },
                crate::hydrology::partition::GroupedVertex {
                    z: 0,
                    basin_ids: BasinIds::single(1),
                    basin_id: Some(1),
                },
            ],
            2,
        )
        .unwrap();
        let graph = BasinGraph::new(&disconnected, &[ExitPoint::new(0.0, 0.0, 0.0)]).unwrap();
        assert!(matches!(graph.heights_info_for(1), Err(Error::MissingHeightsInfo(1))));
    }
}
