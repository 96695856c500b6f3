//! I/O operations for reading and writing grids
//!
//! TIFF is the default format. Paths ending in `.asc` are read and written as
//! ESRI ASCII grids instead.

mod ascii;
mod native;

pub use ascii::{parse_ascii_grid, read_ascii_grid, write_ascii_grid};
pub use native::{read_tiff, read_tiff_from_buffer, write_tiff, write_tiff_to_buffer};

use crate::error::Result;
use crate::grid::Grid;
use crate::height_field::HeightField;
use std::path::Path;

fn is_ascii_grid(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("asc"))
}

/// Read a height grid, picking the format from the file extension
pub fn read_height_field<P: AsRef<Path>>(path: P) -> Result<HeightField> {
    let path = path.as_ref();
    if is_ascii_grid(path) {
        read_ascii_grid(path)
    } else {
        read_tiff(path)
    }
}

/// Write a label grid, picking the format from the file extension
pub fn write_label_grid<P: AsRef<Path>>(grid: &Grid<u32>, path: P) -> Result<()> {
    let path = path.as_ref();
    if is_ascii_grid(path) {
        write_ascii_grid(grid, path)
    } else {
        write_tiff(grid, path)
    }
}
