//! # Spillway Core
//!
//! Core types, traits and I/O for the spillway watershed toolkit.
//!
//! This crate provides:
//! - `Grid<T>`: Generic rectangular grid type
//! - `HeightField`: Clamped elevation input for the watershed algorithms
//! - D8 neighbourhood enumeration with a fixed scan order
//! - Algorithm traits for consistent API
//! - TIFF and ESRI ASCII grid I/O

pub mod error;
pub mod grid;
pub mod height_field;
pub mod io;

pub use error::{Axis, Error, Result};
pub use grid::{Grid, GridElement};
pub use height_field::HeightField;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Grid, GridElement};
    pub use crate::height_field::HeightField;
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in spillway.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
