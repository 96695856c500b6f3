//! ESRI ASCII grid reading/writing
//!
//! Header keys are case-insensitive. `ncols` and `nrows` are required;
//! `xllcorner`/`xllcenter`, `yllcorner`/`yllcenter`, `cellsize` and
//! `nodata_value` are accepted. Georeferencing is not used by the watershed
//! algorithms and is dropped on read.

use crate::error::{Error, Result};
use crate::grid::{Grid, GridElement};
use crate::height_field::HeightField;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

const OPTIONAL_KEYS: [&str; 6] = [
    "xllcorner",
    "xllcenter",
    "yllcorner",
    "yllcenter",
    "cellsize",
    "nodata_value",
];

/// Read an ESRI ASCII grid file into a [`HeightField`]
pub fn read_ascii_grid<P: AsRef<Path>>(path: P) -> Result<HeightField> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_ascii_grid(&text)
}

/// Parse ESRI ASCII grid text into a [`HeightField`].
///
/// Samples are clamped into the elevation domain; nodata samples become 0.
pub fn parse_ascii_grid(text: &str) -> Result<HeightField> {
    let mut ncols: Option<usize> = None;
    let mut nrows: Option<usize> = None;
    let mut nodata: Option<f64> = None;
    let mut samples: Vec<f64> = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let key = parts.next().unwrap_or_default().to_ascii_lowercase();
        // Samples such as `nan` or `inf` also start with a letter
        if samples.is_empty() && is_header_key(&key) {
            let value = parts.next().ok_or_else(|| Error::Parse {
                line: line_no,
                reason: format!("header key '{}' has no value", key),
            })?;

            match key.as_str() {
                "ncols" => ncols = Some(parse_usize(value, line_no)?),
                "nrows" => nrows = Some(parse_usize(value, line_no)?),
                "nodata_value" => nodata = Some(parse_f64(value, line_no)?),
                _ => {
                    parse_f64(value, line_no)?;
                }
            }
            continue;
        }

        for token in trimmed.split_whitespace() {
            samples.push(parse_f64(token, line_no)?);
        }
    }

    let width = ncols.ok_or_else(|| Error::Parse {
        line: 1,
        reason: "missing 'ncols' header".to_string(),
    })?;
    let height = nrows.ok_or_else(|| Error::Parse {
        line: 1,
        reason: "missing 'nrows' header".to_string(),
    })?;

    if let Some(nd) = nodata {
        for v in samples.iter_mut() {
            if (*v - nd).abs() < f64::EPSILON {
                *v = 0.0;
            }
        }
    }

    HeightField::from_raw(&samples, width, height)
}

/// Write a grid as ESRI ASCII text with unit cell size at the origin
pub fn write_ascii_grid<T: GridElement, P: AsRef<Path>>(grid: &Grid<T>, path: P) -> Result<()> {
    let file = fs::File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);

    writeln!(out, "ncols {}", grid.cols())?;
    writeln!(out, "nrows {}", grid.rows())?;
    writeln!(out, "xllcorner 0")?;
    writeln!(out, "yllcorner 0")?;
    writeln!(out, "cellsize 1")?;

    for row in grid.data().rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;

    Ok(())
}

fn is_header_key(key: &str) -> bool {
    matches!(key, "ncols" | "nrows") || OPTIONAL_KEYS.contains(&key)
}

fn parse_usize(value: &str, line: usize) -> Result<usize> {
    value.parse().map_err(|_| Error::Parse {
        line,
        reason: format!("expected a non-negative integer, got '{}'", value),
    })
}

fn parse_f64(value: &str, line: usize) -> Result<f64> {
    value.parse().map_err(|_| Error::Parse {
        line,
        reason: format!("expected a number, got '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ncols 3
nrows 2
xllcorner 0.0
yllcorner 0.0
cellsize 30
NODATA_value -9999
5 4 -9999
2 -1 7.6
";

    #[test]
    fn test_parse_ascii_grid() {
        let field = parse_ascii_grid(SAMPLE).unwrap();
        assert_eq!(field.width(), 3);
        assert_eq!(field.height(), 2);
        // nodata and negative samples clamp to 0, reals round
        assert_eq!(field.elevations().collect::<Vec<_>>(), vec![5, 4, 0, 2, 0, 8]);
    }

    #[test]
    fn test_parse_ascii_grid_missing_header() {
        let err = parse_ascii_grid("nrows 1\n1 2\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_ascii_grid_bad_sample() {
        let err = parse_ascii_grid("ncols 2\nnrows 1\n1 x\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_ascii_grid_first_row_starts_with_nan() {
        let field = parse_ascii_grid("ncols 2\nnrows 2\nnan 3\nInf -inf\n").unwrap();
        assert_eq!(field.elevations().collect::<Vec<_>>(), vec![0, 3, u32::MAX, 0]);
    }

    #[test]
    fn test_parse_ascii_grid_unknown_key_is_not_a_header() {
        let err = parse_ascii_grid("ncols 1\nnrows 1\nprojection 4326\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_ascii_grid_wrong_sample_count() {
        let err = parse_ascii_grid("ncols 2\nnrows 2\n1 2 3\n").unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { len: 3, .. }), "got {:?}", err);
    }

    #[test]
    fn test_ascii_grid_roundtrip() {
        let grid = Grid::from_vec(vec![0_u32, 1, 2, 3, 4, 5], 2, 3).unwrap();
        let tmp = tempfile::NamedTempFile::with_suffix(".asc").unwrap();
        write_ascii_grid(&grid, tmp.path()).unwrap();

        let field = read_ascii_grid(tmp.path()).unwrap();
        assert_eq!(field.grid(), &grid);
    }
}
