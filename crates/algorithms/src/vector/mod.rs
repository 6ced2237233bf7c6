//! Vector-side stages
//!
//! - Tagging averaged points with the region polygon containing them
//! - Turning cleaned groups into point and polyline features

mod association;
mod emit;

pub use association::{tag_points, RegionIndex};
pub use emit::{cleaned_lines_to_features, cleaned_points_to_features};
