//! Elevation input for watershed analysis

use crate::error::{Error, Result};
use crate::grid::{Grid, GridElement, Neighborhood};
use num_traits::ToPrimitive;

/// Immutable elevation raster.
///
/// Elevations are unsigned magnitudes (think grayscale intensity). Raw input
/// is clamped into `0..=u32::MAX` rather than rejected, so a negative sample
/// becomes 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    grid: Grid<u32>,
}

impl HeightField {
    /// Create a height field from row-major elevations.
    ///
    /// Fails with [`Error::ShapeMismatch`] when `elevations.len() != width * height`
    /// and with [`Error::InvalidDimensions`] for a zero-area field.
    pub fn new(elevations: Vec<u32>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let grid = Grid::from_vec(elevations, height, width)?;
        Ok(Self { grid })
    }

    /// Create a height field from arbitrary numeric samples, clamping each one
    /// into the valid elevation domain (see [`GridElement::saturating_from`]).
    pub fn from_raw<T: ToPrimitive + Copy>(raw: &[T], width: usize, height: usize) -> Result<Self> {
        if raw.len() != width * height {
            return Err(Error::ShapeMismatch {
                len: raw.len(),
                width,
                height,
            });
        }
        let elevations = raw.iter().map(|&v| u32::saturating_from(v)).collect();
        Self::new(elevations, width, height)
    }

    pub fn width(&self) -> usize {
        self.grid.cols()
    }

    pub fn height(&self) -> usize {
        self.grid.rows()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Elevation at (x, y)
    pub fn z(&self, x: usize, y: usize) -> Result<u32> {
        self.grid.get(y, x)
    }

    /// Elevation at a flat cell index.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn z_at(&self, index: usize) -> u32 {
        let (row, col) = (index / self.width(), index % self.width());
        self.grid.data()[(row, col)]
    }

    /// Flat cell index of (x, y)
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    /// (x, y) of a flat cell index
    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.width(), index / self.width())
    }

    /// In-bounds D8 neighbours of a cell, in scan order
    pub fn neighbors(&self, index: usize) -> Neighborhood {
        Neighborhood::d8(self.height(), self.width(), index)
    }

    /// Elevations in cell index order
    pub fn elevations(&self) -> impl Iterator<Item = u32> + '_ {
        self.grid.iter()
    }

    /// Underlying grid
    pub fn grid(&self) -> &Grid<u32> {
        &self.grid
    }
}
