//! Kernel surface fitting and scene-wide point extraction
//!
//! For every rough-line pixel, a `kernel × kernel` window of the water-index
//! band is upsampled, fitted with a polynomial surface, and the zero level of
//! the surface Laplacian is traced. The branch with the steepest, most
//! central slope becomes that pixel's sub-pixel boundary.

use crate::maybe_rayon::*;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use shoreline_core::points::RawPoint;
use shoreline_core::raster::Raster;
use shoreline_core::{Algorithm, Error, Result};
use tracing::{debug, info};

use super::contour::{trace_contours, Branch};
use super::polyfit::{self, Polynomial2d};
use super::upsample::upsample_cubic;
use super::weights::{weight_matrix, WeightMatrix};

/// Value marking rough boundary pixels in the mask
pub const BOUNDARY_VALUE: u8 = 255;

/// Parameters for kernel surface fitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelParams {
    /// Window side in pixels (odd)
    pub kernel_size: usize,
    /// Upsampling factor
    pub points_per_pixel: usize,
    /// Polynomial degree of the fitted surface
    pub degree: usize,
    /// Pixels ignored along every scene edge
    pub border_margin: usize,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            points_per_pixel: 4,
            degree: 3,
            border_margin: 10,
        }
    }
}

impl KernelParams {
    pub fn validate(&self) -> Result<()> {
        if self.kernel_size < 3 || self.kernel_size % 2 == 0 {
            return Err(Error::InvalidParameter {
                name: "kernel_size",
                value: self.kernel_size.to_string(),
                reason: "kernel size must be an odd number of at least 3".into(),
            });
        }
        if self.points_per_pixel == 0 {
            return Err(Error::InvalidParameter {
                name: "points_per_pixel",
                value: "0".into(),
                reason: "at least one point per pixel is required".into(),
            });
        }
        if self.degree == 0 {
            return Err(Error::InvalidParameter {
                name: "degree",
                value: "0".into(),
                reason: "a constant surface has no boundary".into(),
            });
        }
        if self.degree > polyfit::MAX_DEGREE {
            return Err(Error::InvalidParameter {
                name: "degree",
                value: self.degree.to_string(),
                reason: format!("degree may not exceed {}", polyfit::MAX_DEGREE),
            });
        }
        let samples = self.grid_side();
        if samples < self.degree + 1 {
            return Err(Error::InvalidParameter {
                name: "degree",
                value: self.degree.to_string(),
                reason: format!("{} samples per axis cannot fit degree {}", samples, self.degree),
            });
        }
        Ok(())
    }

    /// Samples per axis of the upsampled window
    pub fn grid_side(&self) -> usize {
        self.kernel_size * self.points_per_pixel
    }
}

/// Sub-pixel boundary vertex in kernel-local coordinates.
///
/// `x` grows to the east and `y` to the south from the window's upper-left
/// corner, in map units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePoint {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

/// Index of the branch with the highest mean of `|∇f| · w` over its
/// vertices.
///
/// The scan starts from a best score of 0 and accepts `>=`, so a later
/// branch with an equal score replaces an earlier one. Returns `None` when
/// no branch has a finite score.
pub fn best_branch(
    branches: &[Branch],
    surface: &Polynomial2d,
    weights: &WeightMatrix,
    spacing: f64,
) -> Option<usize> {
    let mut best = None;
    let mut best_score = 0.0;

    for (i, branch) in branches.iter().enumerate() {
        if branch.is_empty() {
            continue;
        }
        let total: f64 = branch
            .iter()
            .map(|&(x, y)| surface.gradient_magnitude(x, y) * weights.at_local(x, y, spacing))
            .sum();
        let mean = total / branch.len() as f64;
        if mean >= best_score {
            best_score = mean;
            best = Some(i);
        }
    }

    best
}

/// Sample coordinates along one axis: first at half a spacing, then every
/// spacing
fn sample_axis(n: usize, spacing: f64) -> Vec<f64> {
    (0..n).map(|k| spacing / 2.0 + k as f64 * spacing).collect()
}

/// Fit one kernel window and return the winning boundary branch.
///
/// `None` when the surface cannot be fitted, the Laplacian has no zero
/// crossing, or no branch scores.
pub fn fit_kernel(
    window: ArrayView2<'_, f64>,
    pixel_size: f64,
    params: &KernelParams,
    weights: &WeightMatrix,
) -> Option<Vec<CandidatePoint>> {
    let ppp = params.points_per_pixel;
    let clean = window.mapv(|v| if v == f64::NEG_INFINITY { 0.0 } else { v });
    let (lo, hi) = clean
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    // Flat windows are skipped outright instead of tracing the round-off
    // zeros of their Laplacian, which would otherwise win the branch scan.
    if !(hi > lo) {
        return None;
    }

    let surface_grid = upsample_cubic(clean.view(), ppp);
    let (rows, cols) = surface_grid.dim();

    let spacing = pixel_size / ppp as f64;
    let xs = sample_axis(cols, spacing);
    let ys = sample_axis(rows, spacing);

    let mut sx = Vec::with_capacity(rows * cols);
    let mut sy = Vec::with_capacity(rows * cols);
    for &y in &ys {
        for &x in &xs {
            sx.push(x);
            sy.push(y);
        }
    }
    let sz: Vec<f64> = surface_grid.iter().copied().collect();

    let surface = polyfit::fit(&sx, &sy, &sz, params.degree)?;
    let laplacian = Array2::from_shape_fn((rows, cols), |(r, c)| surface.laplacian(xs[c], ys[r]));

    let branches = trace_contours(laplacian.view(), &xs, &ys, 0.0);
    let best = best_branch(&branches, &surface, weights, spacing)?;

    Some(
        branches[best]
            .iter()
            .map(|&(x, y)| CandidatePoint {
                x,
                y,
                weight: weights.at_local(x, y, spacing),
            })
            .collect(),
    )
}

/// Extract sub-pixel boundary points for a whole scene.
///
/// Every mask pixel equal to 255 at least `border_margin` pixels away from
/// the scene edges is fitted independently. Points come back in row-major
/// pixel order. Fails with `NoResults` when the scene yields no point.
pub fn extract_points(
    band: &Raster<f64>,
    mask: &Raster<u8>,
    params: &KernelParams,
) -> Result<Vec<RawPoint>> {
    params.validate()?;
    band.ensure_same_shape(mask)?;

    let (rows, cols) = band.shape();
    let margin = params.border_margin;
    if rows <= 2 * margin || cols <= 2 * margin {
        return Err(Error::NoResults(format!(
            "scene of {}x{} pixels has no interior beyond a {} pixel margin",
            rows, cols, margin
        )));
    }

    let weights = weight_matrix(params.kernel_size, params.points_per_pixel);
    let pixel_size = band.cell_size();
    let transform = *band.transform();
    let kernel = params.kernel_size;
    let mask_data = mask.data();

    let per_row: Vec<(usize, Vec<RawPoint>)> = (margin..rows - margin)
        .into_par_iter()
        .map(|row| {
            let mut candidates = 0usize;
            let mut points = Vec::new();
            for col in margin..cols - margin {
                if mask_data[[row, col]] != BOUNDARY_VALUE {
                    continue;
                }
                candidates += 1;
                let Some(window) = band.window(row, col, kernel) else {
                    continue;
                };
                match fit_kernel(window, pixel_size, params, &weights) {
                    Some(branch) => {
                        let (ox, oy) = transform.kernel_origin(row, col, kernel);
                        points.extend(
                            branch
                                .into_iter()
                                .map(|p| RawPoint::new(ox + p.x, oy - p.y, p.weight)),
                        );
                    }
                    None => debug!(row, col, "no boundary contour in kernel"),
                }
            }
            (candidates, points)
        })
        .collect();

    let candidates: usize = per_row.iter().map(|(n, _)| n).sum();
    let points: Vec<RawPoint> = per_row.into_iter().flat_map(|(_, p)| p).collect();

    if candidates == 0 {
        return Err(Error::NoResults(
            "rough boundary mask has no pixel inside the border margin".into(),
        ));
    }
    if points.is_empty() {
        return Err(Error::NoResults(format!(
            "none of {} boundary pixels produced a sub-pixel contour",
            candidates
        )));
    }

    info!(
        boundary_pixels = candidates,
        points = points.len(),
        "sub-pixel extraction finished"
    );
    Ok(points)
}

/// Sub-pixel extraction stage
#[derive(Debug, Clone, Default)]
pub struct ExtractPoints;

impl Algorithm for ExtractPoints {
    type Input = (Raster<f64>, Raster<u8>);
    type Output = Vec<RawPoint>;
    type Params = KernelParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ExtractPoints"
    }

    fn description(&self) -> &'static str {
        "Sub-pixel boundary points from Laplacian zero crossings of fitted kernel surfaces"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (band, mask) = input;
        extract_points(&band, &mask, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoreline_core::GeoTransform;

    /// Smooth water/land transition along x with its inflection at `edge`
    fn step_value(x: f64, edge: f64) -> f64 {
        ((x - edge) / 1.5).tanh()
    }

    fn step_window(size: usize, edge: f64) -> Array2<f64> {
        Array2::from_shape_fn((size, size), |(r, c)| {
            let noise = 0.01 * ((7 * r + 3 * c) as f64).sin();
            step_value(c as f64 + 0.5, edge) + noise
        })
    }

    #[test]
    fn test_params_validation() {
        assert!(KernelParams::default().validate().is_ok());
        let even = KernelParams { kernel_size: 4, ..Default::default() };
        assert!(even.validate().is_err());
        let no_ppp = KernelParams { points_per_pixel: 0, ..Default::default() };
        assert!(no_ppp.validate().is_err());
        let flat = KernelParams { degree: 0, ..Default::default() };
        assert!(flat.validate().is_err());
        let steep = KernelParams { kernel_size: 9, degree: 8, ..Default::default() };
        assert!(steep.validate().is_err());
    }

    #[test]
    fn test_fit_kernel_finds_edge_near_center() {
        let params = KernelParams { kernel_size: 5, ..Default::default() };
        let weights = weight_matrix(5, 4);
        let edge = 2.3;
        let window = step_window(5, edge);

        let points = fit_kernel(window.view(), 1.0, &params, &weights).unwrap();
        assert!(points.len() >= 2);
        for p in &points {
            assert!((p.x - edge).abs() < 0.5, "x = {} too far from {}", p.x, edge);
            assert!(p.weight > 0.0 && p.weight <= 1.0);
        }
    }

    #[test]
    fn test_fit_kernel_single_branch() {
        let params = KernelParams { kernel_size: 5, ..Default::default() };
        let window = step_window(5, 2.3);
        let clean = upsample_cubic(window.view(), 4);
        let xs = sample_axis(20, 0.25);
        let mut sx = Vec::new();
        let mut sy = Vec::new();
        for &y in &xs {
            for &x in &xs {
                sx.push(x);
                sy.push(y);
            }
        }
        let sz: Vec<f64> = clean.iter().copied().collect();
        let surface = polyfit::fit(&sx, &sy, &sz, params.degree).unwrap();
        let lap = Array2::from_shape_fn((20, 20), |(r, c)| surface.laplacian(xs[c], xs[r]));
        assert_eq!(trace_contours(lap.view(), &xs, &xs, 0.0).len(), 1);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let params = KernelParams::default();
        let weights = weight_matrix(3, 4);
        let window = step_window(3, 1.4);
        let first = fit_kernel(window.view(), 1.0, &params, &weights);
        for _ in 0..5 {
            assert_eq!(fit_kernel(window.view(), 1.0, &params, &weights), first);
        }
    }

    #[test]
    fn test_negative_infinity_reads_as_zero() {
        let params = KernelParams { kernel_size: 5, ..Default::default() };
        let weights = weight_matrix(5, 4);
        let mut with_inf = step_window(5, 2.3);
        with_inf[[0, 2]] = f64::NEG_INFINITY;
        let mut with_zero = with_inf.clone();
        with_zero[[0, 2]] = 0.0;

        let from_inf = fit_kernel(with_inf.view(), 1.0, &params, &weights);
        assert!(from_inf.is_some());
        assert_eq!(from_inf, fit_kernel(with_zero.view(), 1.0, &params, &weights));
    }

    #[test]
    fn test_flat_window_has_no_contour() {
        let params = KernelParams::default();
        let weights = weight_matrix(3, 4);
        let window = Array2::from_elem((3, 3), 0.25);
        assert!(fit_kernel(window.view(), 1.0, &params, &weights).is_none());
    }

    #[test]
    fn test_best_branch_prefers_steeper_and_ties_go_last() {
        let weights = weight_matrix(3, 4);
        let spacing = 0.25;
        let xs: Vec<f64> = (0..12).map(|k| 0.125 + k as f64 * spacing).collect();
        let mut sx = Vec::new();
        let mut sy = Vec::new();
        let mut sz = Vec::new();
        for &y in &xs {
            for &x in &xs {
                sx.push(x);
                sy.push(y);
                sz.push(x * x * x);
            }
        }
        // |∇f| = 3x², grows to the east
        let surface = polyfit::fit(&sx, &sy, &sz, 3).unwrap();

        let west: Branch = vec![(0.6, 1.4), (0.6, 1.6)];
        let east: Branch = vec![(2.4, 1.4), (2.4, 1.6)];
        let east_mirror: Branch = vec![(2.4, 1.6), (2.4, 1.4)];

        assert_eq!(best_branch(&[west.clone(), east.clone()], &surface, &weights, spacing), Some(1));
        assert_eq!(best_branch(&[east.clone(), west.clone()], &surface, &weights, spacing), Some(0));
        assert_eq!(best_branch(&[east, east_mirror], &surface, &weights, spacing), Some(1));
        assert_eq!(best_branch(&[], &surface, &weights, spacing), None);
    }

    fn scene(rows: usize, cols: usize, edge_col: f64) -> (Raster<f64>, Raster<u8>) {
        let data = (0..rows * cols)
            .map(|i| step_value((i % cols) as f64 + 0.5, edge_col))
            .collect();
        let mut band = Raster::from_vec(data, rows, cols).unwrap();
        band.set_transform(GeoTransform::new(1000.0, 2000.0, 1.0, -1.0));
        let mask = band.with_same_meta::<u8>(rows, cols);
        (band, mask)
    }

    #[test]
    fn test_extract_points_world_coordinates() {
        let (band, mut mask) = scene(30, 30, 15.3);
        for row in 12..18 {
            mask.set(row, 15, BOUNDARY_VALUE).unwrap();
        }
        let points = extract_points(&band, &mask, &KernelParams::default()).unwrap();
        assert!(!points.is_empty());
        for p in &points {
            assert!((p.x - 1015.3).abs() < 0.5, "x = {}", p.x);
            assert!(p.y <= 2000.0 - 11.0 && p.y >= 2000.0 - 19.0, "y = {}", p.y);
        }
        // row-major order
        assert!(points.first().unwrap().y >= points.last().unwrap().y);
    }

    #[test]
    fn test_extract_points_ignores_margin() {
        let (band, mut mask) = scene(30, 30, 15.3);
        mask.set(5, 15, BOUNDARY_VALUE).unwrap();
        mask.set(24, 15, BOUNDARY_VALUE).unwrap();
        assert!(matches!(
            extract_points(&band, &mask, &KernelParams::default()),
            Err(Error::NoResults(_))
        ));
    }

    #[test]
    fn test_extract_points_flat_scene_is_no_results() {
        let mut band = Raster::filled(30, 30, 0.5);
        band.set(3, 3, f64::NEG_INFINITY).unwrap();
        let mut mask: Raster<u8> = Raster::new(30, 30);
        mask.set(15, 15, BOUNDARY_VALUE).unwrap();
        assert!(matches!(
            extract_points(&band, &mask, &KernelParams::default()),
            Err(Error::NoResults(_))
        ));
    }

    #[test]
    fn test_extract_points_shape_mismatch() {
        let (band, _) = scene(30, 30, 15.3);
        let mask: Raster<u8> = Raster::new(30, 29);
        assert!(matches!(
            extract_points(&band, &mask, &KernelParams::default()),
            Err(Error::SizeMismatch { .. })
        ));
    }
}
