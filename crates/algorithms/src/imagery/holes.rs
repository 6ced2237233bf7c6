//! Area closing of a binary water mask
//!
//! Background components smaller than `area` cells are filled, then
//! foreground components smaller than `area` are cleared. Components are
//! 4-connected. A component covering the whole mask is never flipped.

use ndarray::Array2;
use shoreline_core::raster::Raster;
use shoreline_core::Result;
use std::collections::VecDeque;
use tracing::debug;

const CROSS_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Remove holes and specks smaller than `area` cells from a 0/1 mask.
///
/// `area == 0` returns the mask unchanged.
pub fn remove_holes(mask: &Raster<u8>, area: usize) -> Result<Raster<u8>> {
    let mut out = mask.clone();
    if area == 0 {
        return Ok(out);
    }

    let data = out.data_mut();
    data.mapv_inplace(|v| u8::from(v != 0));
    let filled = flip_small_components(data, 0, area);
    let cleared = flip_small_components(data, 1, area);
    debug!(area, filled, cleared, "small mask components removed");
    Ok(out)
}

/// Flip every 4-connected component of `value` with fewer than `area` cells.
/// Returns the number of flipped components.
fn flip_small_components(data: &mut Array2<u8>, value: u8, area: usize) -> usize {
    let (rows, cols) = data.dim();
    let mut visited = Array2::<bool>::from_elem((rows, cols), false);
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut component: Vec<(usize, usize)> = Vec::new();
    let mut flipped = 0;

    for row in 0..rows {
        for col in 0..cols {
            if visited[(row, col)] || data[(row, col)] != value {
                continue;
            }

            visited[(row, col)] = true;
            queue.push_back((row, col));
            component.clear();

            while let Some((r, c)) = queue.pop_front() {
                component.push((r, c));
                for &(dr, dc) in &CROSS_OFFSETS {
                    let nr = r as isize + dr;
                    let nc = c as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    if !visited[(nr, nc)] && data[(nr, nc)] == value {
                        visited[(nr, nc)] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }

            if component.len() < area && component.len() < rows * cols {
                for &cell in &component {
                    data[cell] = 1 - value;
                }
                flipped += 1;
            }
        }
    }

    flipped
}
