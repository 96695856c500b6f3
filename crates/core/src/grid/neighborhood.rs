//! 8-connected neighbourhood enumeration
//!
//! Every algorithm that breaks ties by "first encountered neighbour" relies on
//! the fixed order of [`D8_OFFSETS`].

/// D8 neighbour offsets as `(dr, dc)`, in scan order:
/// top-left, top, top-right, left, right, bottom-left, bottom, bottom-right.
pub const D8_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// In-bounds D8 neighbours of one cell of a `rows x cols` grid.
#[derive(Debug, Clone)]
pub struct Neighborhood {
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
    next: usize,
}

impl Neighborhood {
    /// Neighbours of the cell at flat index `index` (`row * cols + col`).
    pub fn d8(rows: usize, cols: usize, index: usize) -> Self {
        Self {
            rows,
            cols,
            row: index / cols.max(1),
            col: index % cols.max(1),
            next: 0,
        }
    }
}

impl Iterator for Neighborhood {
    /// Flat index of the neighbour
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.next < D8_OFFSETS.len() {
            let (dr, dc) = D8_OFFSETS[self.next];
            self.next += 1;

            let nr = self.row as isize + dr;
            let nc = self.col as isize + dc;
            if nr < 0 || nc < 0 || (nr as usize) >= self.rows || (nc as usize) >= self.cols {
                continue;
            }
            return Some(nr as usize * self.cols + nc as usize);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_cell_has_eight_neighbors_in_scan_order() {
        // 3x3, centre cell
        let n: Vec<usize> = Neighborhood::d8(3, 3, 4).collect();
        assert_eq!(n, vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_corner_cell_skips_out_of_bounds() {
        let n: Vec<usize> = Neighborhood::d8(3, 3, 0).collect();
        assert_eq!(n, vec![1, 3, 4]);

        let n: Vec<usize> = Neighborhood::d8(3, 3, 8).collect();
        assert_eq!(n, vec![4, 5, 7]);
    }

    #[test]
    fn test_single_row_and_single_cell() {
        let n: Vec<usize> = Neighborhood::d8(1, 5, 2).collect();
        assert_eq!(n, vec![1, 3]);

        assert_eq!(Neighborhood::d8(1, 1, 0).count(), 0);
    }
}
