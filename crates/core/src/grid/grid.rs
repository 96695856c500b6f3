//! Rectangular value grid

use crate::error::{Error, Result};
use crate::grid::GridElement;
use ndarray::Array2;

/// A rectangular 2D grid of cell values.
///
/// Values are stored row-major as `(row, col)`, so the flat cell index of
/// `(x, y)` is `y * cols + x`.
///
/// # Example
///
/// ```ignore
/// use spillway_core::Grid;
///
/// let mut grid: Grid<u32> = Grid::new(3, 4);
/// grid.set(1, 2, 7)?;
/// assert_eq!(grid.get(1, 2)?, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: GridElement> {
    data: Array2<T>,
}

impl<T: GridElement> Grid<T> {
    /// Zero-filled grid of `rows x cols`
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Wrap row-major values; fails with [`Error::ShapeMismatch`] unless
    /// `data.len() == rows * cols`.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let len = data.len();
        Array2::from_shape_vec((rows, cols), data)
            .map(|data| Self { data })
            .map_err(|_| Error::ShapeMismatch {
                len,
                width: cols,
                height: rows,
            })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::IndexOutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or_else(|| self.out_of_bounds(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(self.out_of_bounds(row, col)),
        }
    }

    /// Values in cell index order
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.data.iter().copied()
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Min, max and mean over every cell
    pub fn statistics(&self) -> GridStatistics<T> {
        let (min, max, sum) = self.data.iter().fold(
            (None::<T>, None::<T>, 0.0_f64),
            |(min, max, sum), &value| {
                (
                    Some(min.map_or(value, |m| if value < m { value } else { m })),
                    Some(max.map_or(value, |m| if value > m { value } else { m })),
                    sum + value.as_f64(),
                )
            },
        );

        let count = self.len();
        GridStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            count,
        }
    }
}

/// Summary of a grid's values; `None` when the grid is empty
#[derive(Debug, Clone)]
pub struct GridStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions() {
        let grid: Grid<u32> = Grid::new(3, 7);
        assert_eq!((grid.rows(), grid.cols()), (3, 7));
        assert_eq!(grid.shape(), (3, 7));
        assert_eq!(grid.len(), 21);
    }

    #[test]
    fn test_grid_access() {
        let mut grid: Grid<u32> = Grid::new(4, 3);
        grid.set(3, 2, 42).unwrap();
        assert_eq!(grid.get(3, 2).unwrap(), 42);
        assert!(matches!(
            grid.get(4, 0),
            Err(Error::IndexOutOfBounds { row: 4, col: 0, rows: 4, cols: 3 })
        ));
        assert!(grid.set(0, 3, 1).is_err());
    }

    #[test]
    fn test_grid_from_vec_is_row_major() {
        let grid = Grid::from_vec(vec![1_u32, 2, 3, 4, 5, 6], 2, 3).unwrap();
        assert_eq!(grid.get(0, 2).unwrap(), 3);
        assert_eq!(grid.get(1, 0).unwrap(), 4);
        assert_eq!(grid.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_grid_from_vec_shape_mismatch() {
        let err = Grid::from_vec(vec![1_u32, 2, 3], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch { len: 3, width: 2, height: 2 }
        ));
    }

    #[test]
    fn test_grid_statistics() {
        let grid = Grid::from_vec(vec![4_i32, -2, 7, 3, 3, 0], 3, 2).unwrap();
        let stats = grid.statistics();
        assert_eq!(stats.min, Some(-2));
        assert_eq!(stats.max, Some(7));
        assert_eq!(stats.count, 6);
        assert!((stats.mean.unwrap() - 2.5).abs() < 1e-9, "mean of 15 / 6");

        let empty: Grid<u8> = Grid::new(0, 3);
        let stats = empty.statistics();
        assert!(stats.min.is_none() && stats.mean.is_none());
    }

    #[test]
    fn test_grid_filled() {
        let grid = Grid::filled(2, 2, 9_u16);
        assert!(grid.iter().all(|v| v == 9));
        assert!(!grid.is_empty());
    }
}
