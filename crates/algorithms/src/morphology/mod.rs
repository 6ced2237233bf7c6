//! Binary morphology on water masks
//!
//! Masks are `Raster<u8>` where any non-zero cell is foreground. Outputs use
//! 1 for foreground and 0 for background. Erosion treats cells outside the
//! grid as foreground and dilation treats them as background, so neither
//! operation moves a mask edge that lies on the grid border.

mod dilate;
mod element;
mod erode;

pub use dilate::{dilate, Dilate};
pub use element::StructuringElement;
pub use erode::{erode, Erode};

use crate::maybe_rayon::*;
use ndarray::Array2;
use shoreline_core::raster::Raster;
use shoreline_core::{Error, Result};

/// Build an output mask by applying `hit` to every cell's neighbourhood.
/// `hit` receives the foreground flags under the element; cells outside the
/// grid read as `outside`.
pub(crate) fn binary_filter<F>(
    mask: &Raster<u8>,
    element: &StructuringElement,
    outside: bool,
    hit: F,
) -> Result<Raster<u8>>
where
    F: Fn(&[bool]) -> bool + Sync + Send,
{
    element.validate()?;

    let (rows, cols) = mask.shape();
    let offsets = element.offsets();
    let data = mask.data();

    let output: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            let mut flags = vec![false; offsets.len()];
            for (col, out) in row_data.iter_mut().enumerate() {
                for (flag, &(dr, dc)) in flags.iter_mut().zip(&offsets) {
                    let r = row as isize + dr;
                    let c = col as isize + dc;
                    *flag = if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
                        outside
                    } else {
                        data[[r as usize, c as usize]] != 0
                    };
                }
                if hit(&flags) {
                    *out = 1;
                }
            }
            row_data
        })
        .collect();

    let mut result = mask.with_same_meta::<u8>(rows, cols);
    result.set_nodata(None);
    *result.data_mut() =
        Array2::from_shape_vec((rows, cols), output).map_err(|e| Error::Other(e.to_string()))?;
    Ok(result)
}
