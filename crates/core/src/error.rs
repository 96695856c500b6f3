//! Error types for spillway

use thiserror::Error;

/// Grid axis named in coordinate errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Main error type for spillway operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Elevation data length ({len}) does not match width * height ({width} * {height})")]
    ShapeMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("exit.{axis} of {value} must be in range 0 <= {axis} < {limit}")]
    OutOfBounds { axis: Axis, value: f64, limit: usize },

    #[error("exit.{axis} of {value} must be an integer")]
    NonIntegerCoordinate { axis: Axis, value: f64 },

    #[error("Must provide at least one exit for calculating the basin graph")]
    NoExits,

    #[error("No heights info found for basin {0}")]
    MissingHeightsInfo(u32),

    #[error("No minimum found for basin {0}")]
    MissingMinimum(u32),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for spillway operations
pub type Result<T> = std::result::Result<T, Error>;
