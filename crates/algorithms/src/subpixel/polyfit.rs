//! Least-squares bivariate polynomial surfaces
//!
//! The surface is `f(x, y) = Σ c[i][j] · u^i · v^j` for `0 <= i, j <= degree`,
//! where `u`, `v` are the sample coordinates mapped onto `[-1, 1]`. The
//! mapping keeps the normal equations well conditioned; derivatives are
//! returned in the original coordinate units.

/// Highest supported degree per axis
pub const MAX_DEGREE: usize = 7;

/// Fitted polynomial surface
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial2d {
    degree: usize,
    /// Row-major `(degree + 1)²` coefficients, index `i * (degree + 1) + j`
    coeffs: Vec<f64>,
    x_center: f64,
    x_half: f64,
    y_center: f64,
    y_half: f64,
}

fn normalisation(values: &[f64]) -> (f64, f64) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let half = (max - min) / 2.0;
    let half = if half > 0.0 { half } else { 1.0 };
    ((min + max) / 2.0, half)
}

fn powers(t: f64, degree: usize, out: &mut [f64]) {
    out[0] = 1.0;
    for k in 1..=degree {
        out[k] = out[k - 1] * t;
    }
}

/// `n · (n-1) · … · (n-k+1)`, the factor picked up by `k` derivatives of `t^n`
fn falling(n: usize, k: usize) -> f64 {
    (0..k).map(|m| (n - m) as f64).product()
}

/// Fit a polynomial surface of `degree` to scattered `(x, y, z)` samples.
///
/// Returns `None` when `degree` exceeds [`MAX_DEGREE`], the inputs disagree
/// in length, hold non-finite values, are too few for the number of
/// coefficients, or the normal equations are singular.
pub fn fit(x: &[f64], y: &[f64], z: &[f64], degree: usize) -> Option<Polynomial2d> {
    if degree > MAX_DEGREE {
        return None;
    }
    let m = degree + 1;
    let n_terms = m * m;
    if x.len() != y.len() || x.len() != z.len() || x.len() < n_terms {
        return None;
    }
    if x.iter().chain(y).chain(z).any(|v| !v.is_finite()) {
        return None;
    }

    let (x_center, x_half) = normalisation(x);
    let (y_center, y_half) = normalisation(y);

    let mut ata = vec![0.0_f64; n_terms * n_terms];
    let mut atz = vec![0.0_f64; n_terms];
    let mut pu = [0.0_f64; MAX_DEGREE + 1];
    let mut pv = [0.0_f64; MAX_DEGREE + 1];
    let mut basis = vec![0.0_f64; n_terms];

    for ((&xi, &yi), &zi) in x.iter().zip(y).zip(z) {
        powers((xi - x_center) / x_half, degree, &mut pu);
        powers((yi - y_center) / y_half, degree, &mut pv);
        for i in 0..m {
            for j in 0..m {
                basis[i * m + j] = pu[i] * pv[j];
            }
        }
        for a in 0..n_terms {
            atz[a] += basis[a] * zi;
            for b in a..n_terms {
                ata[a * n_terms + b] += basis[a] * basis[b];
            }
        }
    }
    for a in 0..n_terms {
        for b in 0..a {
            ata[a * n_terms + b] = ata[b * n_terms + a];
        }
    }

    let coeffs = gauss_solve(n_terms, &mut ata, &mut atz)?;

    Some(Polynomial2d {
        degree,
        coeffs,
        x_center,
        x_half,
        y_center,
        y_half,
    })
}

/// Solve `mat · x = rhs` by Gaussian elimination with partial pivoting
fn gauss_solve(n: usize, mat: &mut [f64], rhs: &mut [f64]) -> Option<Vec<f64>> {
    for col in 0..n {
        let mut max_val = mat[col * n + col].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = mat[row * n + col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < 1e-12 {
            return None;
        }

        if max_row != col {
            for j in 0..n {
                mat.swap(col * n + j, max_row * n + j);
            }
            rhs.swap(col, max_row);
        }

        let pivot = mat[col * n + col];
        for row in (col + 1)..n {
            let factor = mat[row * n + col] / pivot;
            mat[row * n + col] = 0.0;
            for j in (col + 1)..n {
                mat[row * n + j] -= factor * mat[col * n + j];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0_f64; n];
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= mat[col * n + j] * x[j];
        }
        x[col] = sum / mat[col * n + col];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

impl Polynomial2d {
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Partial derivative of order `dx` in x and `dy` in y at (x, y)
    pub fn partial(&self, x: f64, y: f64, dx: usize, dy: usize) -> f64 {
        let m = self.degree + 1;
        if dx >= m || dy >= m {
            return 0.0;
        }
        let u = (x - self.x_center) / self.x_half;
        let v = (y - self.y_center) / self.y_half;

        let mut pu = [0.0; MAX_DEGREE + 1];
        let mut pv = [0.0; MAX_DEGREE + 1];
        powers(u, self.degree, &mut pu);
        powers(v, self.degree, &mut pv);

        let mut sum = 0.0;
        for i in dx..m {
            let fu = falling(i, dx) * pu[i - dx];
            for j in dy..m {
                sum += self.coeffs[i * m + j] * fu * falling(j, dy) * pv[j - dy];
            }
        }
        sum / (self.x_half.powi(dx as i32) * self.y_half.powi(dy as i32))
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.partial(x, y, 0, 0)
    }

    pub fn derivative_x(&self, x: f64, y: f64) -> f64 {
        self.partial(x, y, 1, 0)
    }

    pub fn derivative_y(&self, x: f64, y: f64) -> f64 {
        self.partial(x, y, 0, 1)
    }

    /// `∂²f/∂x² + ∂²f/∂y²`
    pub fn laplacian(&self, x: f64, y: f64) -> f64 {
        self.partial(x, y, 2, 0) + self.partial(x, y, 0, 2)
    }

    pub fn gradient_magnitude(&self, x: f64, y: f64) -> f64 {
        self.derivative_x(x, y).hypot(self.derivative_y(x, y))
    }
}
