//! Centrality weight matrix
//!
//! Each cell of the upsampled kernel grid gets `2 * Φ(-d)`, the two-sided
//! tail probability of a zero-mean normal with σ = 3 at the cell's distance
//! `d` from the grid center. Values fall off from ~1 at the center.

use ndarray::Array2;

/// Standard deviation of the falloff, in upsampled cells
const SIGMA: f64 = 3.0;

/// Complementary error function.
///
/// Rational approximation with fractional error below 1.2e-7 everywhere.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let r = t * (-z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77)))))))))
        .exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Normal cumulative distribution function
pub fn normal_cdf(x: f64, mean: f64, sigma: f64) -> f64 {
    0.5 * erfc(-(x - mean) / (sigma * std::f64::consts::SQRT_2))
}

/// Square centrality weights over the upsampled kernel grid
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    data: Array2<f64>,
}

impl WeightMatrix {
    /// Side length in cells
    pub fn side(&self) -> usize {
        self.data.nrows()
    }

    /// Weight at cell (i, j)
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.data.get((i, j)).copied()
    }

    /// Weight for a kernel-local coordinate.
    ///
    /// The cell is `[floor(x / spacing), floor(y / spacing)]`, clamped into
    /// the grid so vertices on the far edge map to the last cell.
    pub fn at_local(&self, x: f64, y: f64, spacing: f64) -> f64 {
        let last = self.side().saturating_sub(1);
        let index = |v: f64| {
            let cell = (v / spacing).floor();
            if cell.is_nan() || cell < 0.0 {
                0
            } else {
                (cell as usize).min(last)
            }
        };
        self.data[[index(x), index(y)]]
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }
}

/// Build the weight matrix for a kernel of `kernel_size` pixels sampled at
/// `points_per_pixel` points per pixel.
pub fn weight_matrix(kernel_size: usize, points_per_pixel: usize) -> WeightMatrix {
    let n = kernel_size * points_per_pixel;
    let center = (n as f64 + 1.0) / 2.0;

    let data = Array2::from_shape_fn((n, n), |(i, j)| {
        let di = (i + 1) as f64 - center;
        let dj = (j + 1) as f64 - center;
        let d = (di * di + dj * dj).sqrt();
        (2.0 * normal_cdf(-d, 0.0, SIGMA)).min(1.0)
    });

    WeightMatrix { data }
}
