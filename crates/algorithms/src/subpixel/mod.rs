//! Sub-pixel boundary extraction
//!
//! - **weights**: centrality weight matrix over the upsampled kernel
//! - **upsample**: cubic convolution upsampling of a kernel window
//! - **polyfit**: least-squares bivariate polynomial surfaces
//! - **contour**: marching-squares iso-line tracing
//! - **kernel**: per-pixel fitting, branch selection and scene extraction

mod contour;
mod kernel;
mod polyfit;
mod upsample;
mod weights;

pub use contour::{trace_contours, Branch};
pub use kernel::{
    best_branch, extract_points, fit_kernel, CandidatePoint, ExtractPoints, KernelParams,
    BOUNDARY_VALUE,
};
pub use polyfit::{fit as fit_polynomial, Polynomial2d, MAX_DEGREE};
pub use upsample::upsample_cubic;
pub use weights::{erfc, normal_cdf, weight_matrix, WeightMatrix};
