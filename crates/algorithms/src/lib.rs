//! # Spillway Algorithms
//!
//! Watershed segmentation of height fields and the basin graph built on top
//! of it.
//!
//! ## Pipeline
//!
//! 1. [`hydrology::segment`] turns a [`HeightField`](spillway_core::HeightField)
//!    into a [`hydrology::BasinPartition`]
//! 2. [`hydrology::BasinGraph::new`] validates exits, links basins through
//!    their lowest saddles and propagates escape heights
//! 3. [`hydrology::BasinGraph::heights_info_for`] answers per-cell queries

pub mod hydrology;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::hydrology::{
        segment, BasinGraph, BasinId, BasinPartition, ExitPoint, HeightsInfo, Preference,
        Segmentation, SegmentationParams,
    };
    pub use spillway_core::prelude::*;
}
