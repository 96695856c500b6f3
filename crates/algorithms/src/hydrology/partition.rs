//! Basin partition: per-cell basin membership produced by segmentation

use serde::{Deserialize, Serialize};
use spillway_core::{Error, Grid, Result};
use tracing::debug;

/// Dense basin identifier. After normalization ids are `0..basin_count`,
/// ascending by the elevation of each basin's minimum.
pub type BasinId = u32;

/// Sorted, duplicate-free set of basin ids.
///
/// Ids are small dense integers and a cell rarely touches more than a few
/// basins, so a sorted vector beats a hash set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasinIds(Vec<BasinId>);

impl BasinIds {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(id: BasinId) -> Self {
        Self(vec![id])
    }

    pub fn from_ids<I: IntoIterator<Item = BasinId>>(ids: I) -> Self {
        let mut v: Vec<BasinId> = ids.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    /// Insert an id, returning false if it was already present
    pub fn insert(&mut self, id: BasinId) -> bool {
        match self.0.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, id);
                true
            }
        }
    }

    /// Remove an id, returning false if it was absent
    pub fn remove(&mut self, id: BasinId) -> bool {
        match self.0.binary_search(&id) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, id: BasinId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The only id, if this set has exactly one
    pub fn sole(&self) -> Option<BasinId> {
        match self.0.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// A cell in more than one basin sits on a ridge between them
    pub fn is_boundary(&self) -> bool {
        self.0.len() > 1
    }

    pub fn lowest(&self) -> Option<BasinId> {
        self.0.first().copied()
    }

    pub fn highest(&self) -> Option<BasinId> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = BasinId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[BasinId] {
        &self.0
    }
}

impl FromIterator<BasinId> for BasinIds {
    fn from_iter<I: IntoIterator<Item = BasinId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

/// One cell of the partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedVertex {
    /// Elevation
    pub z: u32,
    /// Every basin this cell belongs to
    pub basin_ids: BasinIds,
    /// Set only on the cell that is the minimum (seed) of a live basin
    pub basin_id: Option<BasinId>,
}

impl GroupedVertex {
    pub fn is_minimum(&self) -> bool {
        self.basin_id.is_some()
    }
}

/// Which basin to pick for a cell that belongs to several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preference {
    /// Lowest basin id, i.e. the deepest minimum
    #[default]
    Lowest,
    /// Highest basin id
    Highest,
}

/// Aggregate description of one basin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinSummary {
    pub basin_id: BasinId,
    /// Column of the minimum cell
    pub minimum_x: usize,
    /// Row of the minimum cell
    pub minimum_y: usize,
    /// Elevation of the minimum cell
    pub ground_z: u32,
    /// Cells belonging to this basin only
    pub interior_cells: usize,
    /// Cells shared with at least one other basin
    pub boundary_cells: usize,
}

/// Watershed decomposition of a height field.
///
/// Holds one [`GroupedVertex`] per cell in cell index order (`y * width + x`).
#[derive(Debug, Clone, PartialEq)]
pub struct BasinPartition {
    input_width: usize,
    input_height: usize,
    vertices: Vec<GroupedVertex>,
    basin_count: usize,
    /// Cell index of each basin's minimum, indexed by basin id
    minima: Vec<Option<usize>>,
}

impl BasinPartition {
    /// Assemble a partition from per-cell records.
    ///
    /// Ids are taken as-is (no normalization). Fails with
    /// [`Error::ShapeMismatch`] if the vertex count is not `width * height`, and
    /// with [`Error::InvalidParameter`] if a cell references an id outside
    /// `0..basin_count` or has no basin at all.
    ///
    /// Each basin has at most one minimum cell, and that cell must list the
    /// basin in its own set.
    pub fn from_parts(
        width: usize,
        height: usize,
        vertices: Vec<GroupedVertex>,
        basin_count: usize,
    ) -> Result<Self> {
        if vertices.len() != width * height {
            return Err(Error::ShapeMismatch {
                len: vertices.len(),
                width,
                height,
            });
        }

        let mut minima = vec![None; basin_count];
        for (index, vertex) in vertices.iter().enumerate() {
            let out_of_range = vertex
                .basin_ids
                .iter()
                .chain(vertex.basin_id)
                .find(|&id| id as usize >= basin_count);
            if let Some(id) = out_of_range {
                return Err(Error::InvalidParameter {
                    name: "basin_id",
                    value: id.to_string(),
                    reason: format!("cell {} references a basin outside 0..{}", index, basin_count),
                });
            }
            if vertex.basin_ids.is_empty() {
                return Err(Error::InvalidParameter {
                    name: "basin_ids",
                    value: "{}".to_string(),
                    reason: format!("cell {} belongs to no basin", index),
                });
            }
            if let Some(id) = vertex.basin_id {
                if !vertex.basin_ids.contains(id) {
                    return Err(Error::InvalidParameter {
                        name: "basin_id",
                        value: id.to_string(),
                        reason: format!("minimum cell {} does not belong to basin {}", index, id),
                    });
                }
                if let Some(previous) = minima[id as usize].replace(index) {
                    return Err(Error::InvalidParameter {
                        name: "basin_id",
                        value: id.to_string(),
                        reason: format!("cells {} and {} are both the minimum of basin {}", previous, index, id),
                    });
                }
            }
        }

        Ok(Self {
            input_width: width,
            input_height: height,
            vertices,
            basin_count,
            minima,
        })
    }

    /// Relabel basin ids `0..basin_count` in ascending order of their
    /// minimum's elevation (ties by cell index) and rewrite every cell's set.
    ///
    /// Ids with no minimum cell are reported as [`Error::MissingMinimum`].
    /// Normalizing an already normalized partition changes nothing.
    pub fn normalize(&mut self) -> Result<()> {
        let mut minima: Vec<(usize, BasinId)> = self
            .vertices
            .iter()
            .enumerate()
            .filter_map(|(index, v)| v.basin_id.map(|id| (index, id)))
            .collect();
        minima.sort_by_key(|&(index, _)| (self.vertices[index].z, index));

        let table_len = minima.iter().map(|&(_, id)| id as usize + 1).max().unwrap_or(0);
        let mut id_map: Vec<Option<BasinId>> = vec![None; table_len];
        for (new_id, &(_, old_id)) in minima.iter().enumerate() {
            id_map[old_id as usize] = Some(new_id as BasinId);
        }

        let relabeled = self
            .vertices
            .iter()
            .map(|vertex| {
                vertex
                    .basin_ids
                    .iter()
                    .map(|old| {
                        id_map
                            .get(old as usize)
                            .copied()
                            .flatten()
                            .ok_or(Error::MissingMinimum(old))
                    })
                    .collect::<Result<BasinIds>>()
            })
            .collect::<Result<Vec<BasinIds>>>()?;

        for (vertex, basin_ids) in self.vertices.iter_mut().zip(relabeled) {
            vertex.basin_ids = basin_ids;
            if let Some(old) = vertex.basin_id {
                vertex.basin_id = id_map[old as usize];
            }
        }

        self.basin_count = minima.len();
        self.minima = minima.iter().map(|&(index, _)| Some(index)).collect();

        debug!(basins = self.basin_count, "normalized basin ids");
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.input_width
    }

    pub fn height(&self) -> usize {
        self.input_height
    }

    /// Number of live basins
    pub fn basin_count(&self) -> usize {
        self.basin_count
    }

    pub fn vertices(&self) -> &[GroupedVertex] {
        &self.vertices
    }

    /// Cell record at a flat index
    pub fn vertex(&self, index: usize) -> Result<&GroupedVertex> {
        self.vertices.get(index).ok_or(Error::IndexOutOfBounds {
            row: index / self.input_width.max(1),
            col: index % self.input_width.max(1),
            rows: self.input_height,
            cols: self.input_width,
        })
    }

    /// Cell record at (x, y)
    pub fn vertex_at(&self, x: usize, y: usize) -> Result<&GroupedVertex> {
        if x >= self.input_width || y >= self.input_height {
            return Err(Error::IndexOutOfBounds {
                row: y,
                col: x,
                rows: self.input_height,
                cols: self.input_width,
            });
        }
        self.vertex(y * self.input_width + x)
    }

    /// (x, y) of a flat cell index
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.input_width, index / self.input_width)
    }

    /// Cell index of the minimum of `basin_id`
    pub fn minimum_of(&self, basin_id: BasinId) -> Result<usize> {
        self.minima
            .get(basin_id as usize)
            .copied()
            .flatten()
            .ok_or(Error::MissingMinimum(basin_id))
    }

    /// Cell indices of all basin minima, in basin id order
    pub fn minima(&self) -> Result<Vec<usize>> {
        (0..self.basin_count as BasinId)
            .map(|id| self.minimum_of(id))
            .collect()
    }

    /// Minimum cell of the lowest or highest basin a cell belongs to
    pub fn minimum_for_cell(&self, index: usize, preference: Preference) -> Result<usize> {
        let basin_id = self.preferred_basin(index, preference)?;
        self.minimum_of(basin_id)
    }

    /// One basin id per cell, as a `height x width` grid
    pub fn label_grid(&self, preference: Preference) -> Result<Grid<u32>> {
        let labels = (0..self.vertices.len())
            .map(|index| self.preferred_basin(index, preference))
            .collect::<Result<Vec<BasinId>>>()?;
        Grid::from_vec(labels, self.input_height, self.input_width)
    }

    /// Per-basin statistics in basin id order
    pub fn basin_summaries(&self) -> Result<Vec<BasinSummary>> {
        let mut interior = vec![0_usize; self.basin_count];
        let mut boundary = vec![0_usize; self.basin_count];
        for vertex in &self.vertices {
            let counts = if vertex.basin_ids.is_boundary() {
                &mut boundary
            } else {
                &mut interior
            };
            for id in vertex.basin_ids.iter() {
                counts[id as usize] += 1;
            }
        }

        (0..self.basin_count)
            .map(|b| {
                let basin_id = b as BasinId;
                let minimum = self.minimum_of(basin_id)?;
                let (minimum_x, minimum_y) = self.coords_of(minimum);
                Ok(BasinSummary {
                    basin_id,
                    minimum_x,
                    minimum_y,
                    ground_z: self.vertices[minimum].z,
                    interior_cells: interior[b],
                    boundary_cells: boundary[b],
                })
            })
            .collect()
    }

    fn preferred_basin(&self, index: usize, preference: Preference) -> Result<BasinId> {
        let ids = &self.vertex(index)?.basin_ids;
        let id = match preference {
            Preference::Lowest => ids.lowest(),
            Preference::Highest => ids.highest(),
        };
        id.ok_or_else(|| Error::Other(format!("cell {} belongs to no basin", index)))
    }
}
