//! Binary dilation
//!
//! A cell becomes foreground when any cell under the structuring element
//! is foreground.

use shoreline_core::raster::Raster;
use shoreline_core::{Algorithm, Error, Result};

use super::element::StructuringElement;

/// Binary dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = StructuringElement;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Binary dilation (foreground wherever the element touches foreground)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, &params)
    }
}

/// Dilate a binary mask
pub fn dilate(mask: &Raster<u8>, element: &StructuringElement) -> Result<Raster<u8>> {
    super::binary_filter(mask, element, false, |cells| cells.iter().any(|&fg| fg))
}
