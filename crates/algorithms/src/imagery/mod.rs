//! Water index preprocessing
//!
//! - Binarization of a water index (fixed zero, Otsu or multi-Otsu threshold)
//! - Removal of small holes and specks from the water mask
//! - Rough one-pixel shoreline from the binary mask
//! - Clipping the pixel line to a region mask

mod holes;
mod pixel_line;
mod threshold;

pub use holes::remove_holes;
pub use pixel_line::{mask_pixel_line, pixel_line, Morphology, PixelLine, PixelLineParams};
pub use threshold::{binarize, multi_otsu_thresholds, otsu_threshold, Threshold};
