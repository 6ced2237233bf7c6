//! # Shoreline Core
//!
//! Core types, traits and I/O for the shoreline extraction workspace.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced raster grid (water-index bands, rough masks)
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference system tag carried into vector output
//! - Point records passed between pipeline stages
//! - Vector features and labelled region polygons
//! - I/O for GeoTIFF rasters, point text files and GeoJSON

pub mod crs;
pub mod error;
pub mod io;
pub mod points;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use points::{AveragedPoint, RawPoint, TaggedPoint};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, Feature, FeatureCollection, RegionPolygon};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::points::{AveragedPoint, RawPoint, TaggedPoint};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{Feature, FeatureCollection, RegionPolygon};
    pub use crate::Algorithm;
}

/// Core trait for the pipeline stages.
///
/// A stage is a pure function from an input to an output, steered by a
/// parameter record with sensible defaults.
pub trait Algorithm {
    /// Input type for the stage
    type Input;
    /// Output type for the stage
    type Output;
    /// Parameters controlling stage behavior
    type Params: Default;
    /// Error type for stage execution
    type Error: std::error::Error;

    /// Returns the stage name
    fn name(&self) -> &'static str;

    /// Returns a description of what the stage does
    fn description(&self) -> &'static str;

    /// Execute the stage
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
