//! Rough pixel shoreline from a water mask
//!
//! The pixel line is the one-pixel ring where a binary water mask changes
//! state: the inner ring (mask minus its erosion) or the outer ring (dilation
//! minus the mask). Holes and specks below a minimum area are removed from
//! the mask before the ring is taken. Line pixels are set to [`BOUNDARY_VALUE`], so the result
//! is directly the candidate mask of the kernel surface fitter.

use serde::{Deserialize, Serialize};
use shoreline_core::raster::Raster;
use shoreline_core::{Algorithm, Error, Result};
use tracing::info;

use super::holes::remove_holes;
use super::threshold::{binarize, Threshold};
use crate::morphology::{dilate, erode, StructuringElement};
use crate::subpixel::BOUNDARY_VALUE;

/// Which side of the water edge the ring is taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Morphology {
    /// Water pixels touching land
    Erosion,
    /// Land pixels touching water
    #[default]
    Dilation,
}

/// Parameters for rough pixel line construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelLineParams {
    pub threshold: Threshold,
    pub morphology: Morphology,
    /// Minimum component area in cells kept in the water mask (0 = off)
    pub area: usize,
}

impl Default for PixelLineParams {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            morphology: Morphology::default(),
            area: 300,
        }
    }
}

/// Pixel line of a binary water mask (4-connected element)
pub fn pixel_line(water: &Raster<u8>, morphology: Morphology) -> Result<Raster<u8>> {
    let element = StructuringElement::Cross(1);
    let (inner, outer) = match morphology {
        Morphology::Erosion => (erode(water, &element)?, water.clone()),
        Morphology::Dilation => (water.clone(), dilate(water, &element)?),
    };

    let mut line = outer;
    line.data_mut().zip_mut_with(inner.data(), |o, &i| {
        *o = if *o != 0 && i == 0 { BOUNDARY_VALUE } else { 0 };
    });

    let count = line.data().iter().filter(|&&v| v != 0).count();
    info!(?morphology, pixels = count, "pixel line built");
    Ok(line)
}

/// Clear pixel line cells where `region_mask` is 0
pub fn mask_pixel_line(line: &Raster<u8>, region_mask: &Raster<u8>) -> Result<Raster<u8>> {
    line.ensure_same_shape(region_mask)?;
    let mut out = line.clone();
    out.data_mut().zip_mut_with(region_mask.data(), |v, &m| {
        if m == 0 {
            *v = 0;
        }
    });
    Ok(out)
}

/// Water index to rough pixel line
#[derive(Debug, Clone, Default)]
pub struct PixelLine;

impl Algorithm for PixelLine {
    type Input = Raster<f64>;
    type Output = Raster<u8>;
    type Params = PixelLineParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "PixelLine"
    }

    fn description(&self) -> &'static str {
        "Binarize a water index and extract the one-pixel water edge"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let water = binarize(&input, params.threshold)?;
        let water = remove_holes(&water, params.area)?;
        pixel_line(&water, params.morphology)
    }
}
