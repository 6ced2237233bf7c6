//! Binary erosion
//!
//! A cell stays foreground only when every cell under the structuring
//! element is foreground. The grid border does not erode.

use shoreline_core::raster::Raster;
use shoreline_core::{Algorithm, Error, Result};

use super::element::StructuringElement;

/// Binary erosion algorithm
#[derive(Debug, Clone, Default)]
pub struct Erode;

impl Algorithm for Erode {
    type Input = Raster<u8>;
    type Output = Raster<u8>;
    type Params = StructuringElement;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Erode"
    }

    fn description(&self) -> &'static str {
        "Binary erosion (foreground only where the whole element is foreground)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        erode(&input, &params)
    }
}

/// Erode a binary mask
pub fn erode(mask: &Raster<u8>, element: &StructuringElement) -> Result<Raster<u8>> {
    super::binary_filter(mask, element, true, |cells| cells.iter().all(|&fg| fg))
}
