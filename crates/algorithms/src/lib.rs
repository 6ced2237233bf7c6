//! # Shoreline Algorithms
//!
//! Sub-pixel shoreline extraction from water-index imagery.
//!
//! ## Stages
//!
//! - **imagery**: water index binarization and rough pixel line
//! - **morphology**: binary erosion and dilation
//! - **subpixel**: kernel surface fitting and Laplacian zero-level tracing
//! - **cluster**: averaging of dense points along both axes
//! - **vector**: region tagging and feature output
//! - **cleaning**: triangulation, spanning tree path and angle filter
//! - **pipeline**: all of the above for one scene

pub mod cleaning;
pub mod cluster;
pub mod imagery;
pub mod morphology;
pub mod pipeline;
pub mod subpixel;
pub mod vector;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cleaning::{clean_groups, CleanGroups, CleanedGroup, CleaningParams};
    pub use crate::cluster::{average_points, AveragePoints, ClusterParams};
    pub use crate::imagery::{
        binarize, mask_pixel_line, pixel_line, remove_holes, Morphology, PixelLine,
        PixelLineParams, Threshold,
    };
    pub use crate::morphology::{dilate, erode, StructuringElement};
    pub use crate::pipeline::{run_scene, SceneReport, SceneResult, ShorelineParams};
    pub use crate::subpixel::{extract_points, ExtractPoints, KernelParams, BOUNDARY_VALUE};
    pub use crate::vector::{cleaned_lines_to_features, cleaned_points_to_features, tag_points};
    pub use shoreline_core::prelude::*;
}
