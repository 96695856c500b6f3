//! Watershed segmentation with tolerant basin merging
//!
//! Partitions every cell of a height field into one or more basins by
//! flooding from the lowest cell upwards:
//!
//! 1. Sort all cells by elevation (ties by cell index)
//! 2. Visit cells lowest first; a cell with no single-basin neighbour seeds a
//!    new basin, a cell touching one basin joins it, and a cell touching
//!    several becomes a ridge cell shared by all of them
//! 3. At a ridge cell, basins whose minimum is within `max_z_diff` of the
//!    ridge have not yet proven they are separate depressions and are merged
//!    into a neighbour
//! 4. Relabel surviving basins by ascending minimum elevation
//!
//! Cells spanning several basins never propagate membership, which is what
//! keeps ridge lines one cell wide.

use spillway_core::{Algorithm, Error, HeightField, Result};
use tracing::{debug, trace};

use super::partition::{BasinId, BasinIds, BasinPartition, GroupedVertex};

/// How often (in sorted cells) segmentation progress is traced
const PROGRESS_INTERVAL: usize = 10_000;

/// Parameters for watershed segmentation
#[derive(Debug, Clone, Default)]
pub struct SegmentationParams {
    /// Depth a basin's minimum must lie below a ridge cell (strictly more
    /// than this) to stay separate from the other basins meeting there.
    /// 0 merges only basins whose minimum is level with the ridge.
    pub max_z_diff: u32,
}

/// Watershed segmentation algorithm
#[derive(Debug, Clone, Default)]
pub struct Segmentation;

impl Algorithm for Segmentation {
    type Input = HeightField;
    type Output = BasinPartition;
    type Params = SegmentationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Watershed Segmentation"
    }

    fn description(&self) -> &'static str {
        "Partition a height field into basins with tolerant merging of shallow dips"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        segment(&input, params)
    }
}

/// Basin record in the segmentation arena
#[derive(Debug)]
struct Basin {
    /// Cell index of the seed (minimum)
    minimum: usize,
    z: u32,
    /// Every cell ever assigned to this basin; may contain repeats
    members: Vec<usize>,
    alive: bool,
}

/// Segment a height field into basins.
///
/// Returns a normalized [`BasinPartition`]: basin ids are `0..basin_count`,
/// ascending by minimum elevation, and every cell belongs to at least one basin.
///
/// # Example
///
/// ```ignore
/// let field = HeightField::from_raw(&[0, 0, 0, 0, 1, 1, 0, 1, 0], 3, 3)?;
/// let partition = segment(&field, SegmentationParams::default())?;
/// assert_eq!(partition.basin_count(), 2);
/// ```
pub fn segment(field: &HeightField, params: SegmentationParams) -> Result<BasinPartition> {
    let n = field.len();
    let max_z_diff = u64::from(params.max_z_diff);

    let z: Vec<u32> = field.elevations().collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by_key(|&i| (z[i], i));

    let mut cell_ids: Vec<BasinIds> = vec![BasinIds::new(); n];
    let mut minimum_of_cell: Vec<Option<BasinId>> = vec![None; n];
    let mut basins: Vec<Basin> = Vec::new();

    // Reused per cell: single-basin neighbour ids in first-encountered order
    let mut connected: Vec<BasinId> = Vec::with_capacity(8);

    for (sorted_idx, &cell) in order.iter().enumerate() {
        if sorted_idx % PROGRESS_INTERVAL == 0 {
            trace!(processed = sorted_idx, total = n, basins = basins.len(), "segmentation progress");
        }

        connected.clear();
        for neighbor in field.neighbors(cell) {
            if let Some(id) = cell_ids[neighbor].sole()
                && !connected.contains(&id)
            {
                connected.push(id);
            }
        }

        if connected.is_empty() {
            // Local minimum: seed a new basin
            let id = basins.len() as BasinId;
            basins.push(Basin {
                minimum: cell,
                z: z[cell],
                members: vec![cell],
                alive: true,
            });
            cell_ids[cell] = BasinIds::single(id);
            minimum_of_cell[cell] = Some(id);
            continue;
        }

        cell_ids[cell] = connected.iter().copied().collect();
        for &id in &connected {
            basins[id as usize].members.push(cell);
        }

        if connected.len() < 2 {
            continue;
        }

        let cell_z = u64::from(z[cell]);
        let (deeper, similar): (Vec<BasinId>, Vec<BasinId>) = connected
            .iter()
            .partition(|&&id| u64::from(basins[id as usize].z) + max_z_diff < cell_z);

        let (survivor, absorbed) = match deeper.first() {
            Some(&keep) => (keep, similar),
            None => {
                // Lowest similar minimum survives so it stays the lowest cell of the merged basin
                let keep = similar
                    .iter()
                    .copied()
                    .min_by_key(|&id| basins[id as usize].z)
                    .ok_or_else(|| Error::Algorithm("ridge cell with no connected basin".to_string()))?;
                let absorbed = similar.into_iter().filter(|&id| id != keep).collect();
                (keep, absorbed)
            }
        };

        for id in absorbed {
            merge_basin(&mut basins, &mut cell_ids, &mut minimum_of_cell, id, survivor);
        }
    }

    let alive = basins.iter().filter(|b| b.alive).count();
    debug!(
        cells = n,
        seeded = basins.len(),
        basins = alive,
        max_z_diff = params.max_z_diff,
        "segmented height field"
    );

    let vertices: Vec<GroupedVertex> = cell_ids
        .into_iter()
        .zip(minimum_of_cell)
        .zip(z)
        .map(|((basin_ids, basin_id), z)| GroupedVertex { z, basin_ids, basin_id })
        .collect();

    let mut partition =
        BasinPartition::from_parts(field.width(), field.height(), vertices, basins.len())?;
    partition.normalize()?;

    Ok(partition)
}

/// Fold basin `from` into `into`: relabel every member cell, hand over the
/// member list and tombstone `from`.
fn merge_basin(
    basins: &mut [Basin],
    cell_ids: &mut [BasinIds],
    minimum_of_cell: &mut [Option<BasinId>],
    from: BasinId,
    into: BasinId,
) {
    let members = std::mem::take(&mut basins[from as usize].members);
    for &member in &members {
        let ids = &mut cell_ids[member];
        ids.remove(from);
        ids.insert(into);
    }
    basins[into as usize].members.extend(members);

    let ghost = &mut basins[from as usize];
    ghost.alive = false;
    minimum_of_cell[ghost.minimum] = None;
}
