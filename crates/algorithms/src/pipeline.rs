//! Scene pipeline
//!
//! Chains sub-pixel extraction, cluster averaging, region tagging and
//! outlier rejection for one scene, timing each stage.

use serde::{Deserialize, Serialize};
use shoreline_core::points::{AveragedPoint, RawPoint, TaggedPoint};
use shoreline_core::raster::Raster;
use shoreline_core::vector::RegionPolygon;
use shoreline_core::Result;
use std::time::{Duration, Instant};
use tracing::info;

use crate::cleaning::{clean_groups, CleanedGroup, CleaningParams};
use crate::cluster::{average_points, ClusterParams};
use crate::subpixel::{extract_points, KernelParams};
use crate::vector::tag_points;

/// Every parameter of a scene run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShorelineParams {
    pub kernel: KernelParams,
    pub cluster: ClusterParams,
    pub cleaning: CleaningParams,
}

impl ShorelineParams {
    pub fn validate(&self) -> Result<()> {
        self.kernel.validate()?;
        self.cluster.validate()?;
        self.cleaning.validate()
    }
}

/// Counts and stage timings of a scene run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneReport {
    pub raw_points: usize,
    pub averaged_points: usize,
    pub tagged_points: usize,
    pub groups: usize,
    pub cleaned_points: usize,
    pub extract_time: Duration,
    pub average_time: Duration,
    pub tag_time: Duration,
    pub clean_time: Duration,
}

impl SceneReport {
    pub fn total_time(&self) -> Duration {
        self.extract_time + self.average_time + self.tag_time + self.clean_time
    }
}

/// Everything a scene run produces
#[derive(Debug, Clone)]
pub struct SceneResult {
    pub raw: Vec<RawPoint>,
    pub averaged: Vec<AveragedPoint>,
    pub tagged: Vec<TaggedPoint>,
    pub cleaned: Vec<CleanedGroup>,
    pub report: SceneReport,
}

/// Run the full extraction for one scene.
///
/// `band` is the water-index band, `mask` the rough pixel line with
/// boundary pixels set to 255. Fails with `NoResults` when no sub-pixel
/// point is found; empty later stages are not errors.
pub fn run_scene(
    band: &Raster<f64>,
    mask: &Raster<u8>,
    regions: &[RegionPolygon],
    params: &ShorelineParams,
) -> Result<SceneResult> {
    params.validate()?;

    let start = Instant::now();
    let raw = extract_points(band, mask, &params.kernel)?;
    let extract_time = start.elapsed();

    let start = Instant::now();
    let averaged = average_points(&raw, &params.cluster);
    let average_time = start.elapsed();

    let start = Instant::now();
    let tagged = tag_points(&averaged, regions);
    let tag_time = start.elapsed();

    let start = Instant::now();
    let cleaned = clean_groups(&tagged, &params.cleaning);
    let clean_time = start.elapsed();

    let report = SceneReport {
        raw_points: raw.len(),
        averaged_points: averaged.len(),
        tagged_points: tagged.iter().filter(|t| t.region_id != 0).count(),
        groups: cleaned.len(),
        cleaned_points: cleaned.iter().map(|g| g.points.len()).sum(),
        extract_time,
        average_time,
        tag_time,
        clean_time,
    };
    info!(
        raw = report.raw_points,
        averaged = report.averaged_points,
        groups = report.groups,
        cleaned = report.cleaned_points,
        elapsed_ms = report.total_time().as_millis() as u64,
        "scene finished"
    );

    Ok(SceneResult {
        raw,
        averaged,
        tagged,
        cleaned,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_defaults() {
        let params: ShorelineParams =
            serde_json::from_str(r#"{"kernel":{"kernel_size":5},"cleaning":{"angle_tolerance":null}}"#)
                .unwrap();
        assert_eq!(params.kernel.kernel_size, 5);
        assert_eq!(params.kernel.points_per_pixel, 4);
        assert_eq!(params.cluster, ClusterParams::default());
        assert_eq!(params.cleaning.angle_tolerance, None);
        assert_eq!(params.cleaning.min_group_size, 4);
    }

    #[test]
    fn test_validation_reaches_every_stage() {
        let mut params = ShorelineParams::default();
        assert!(params.validate().is_ok());
        params.kernel.kernel_size = 4;
        assert!(params.validate().is_err());

        let mut params = ShorelineParams::default();
        params.cluster.cluster_distance = -1.0;
        assert!(params.validate().is_err());

        let mut params = ShorelineParams::default();
        params.cleaning.min_group_size = 2;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_empty_mask_is_no_results() {
        let band = Raster::filled(30, 30, 0.1);
        let mask = Raster::filled(30, 30, 0u8);
        let err = run_scene(&band, &mask, &[], &ShorelineParams::default()).unwrap_err();
        assert!(matches!(err, shoreline_core::Error::NoResults(_)));
    }
}
