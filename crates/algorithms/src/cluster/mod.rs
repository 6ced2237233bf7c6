//! Reduction of dense sub-pixel points to one point per cluster

mod average;

pub use average::{average_points, AveragePoints, ClusterParams};
