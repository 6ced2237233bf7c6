//! Shoreline CLI - sub-pixel shoreline extraction from water-index imagery

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shoreline_algorithms::cluster::{average_points, ClusterParams};
use shoreline_algorithms::imagery::{
    binarize, mask_pixel_line, pixel_line, remove_holes, Morphology, Threshold,
};
use shoreline_algorithms::pipeline::{run_scene, ShorelineParams};
use shoreline_algorithms::vector::{cleaned_lines_to_features, cleaned_points_to_features};
use shoreline_core::io::{
    read_geotiff, read_raw_points, read_regions, write_averaged_points, write_feature_collection,
    write_mask_geotiff, write_raw_points,
};
use shoreline_core::{FeatureCollection, Raster, CRS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "shoreline")]
#[command(author, version, about = "Sub-pixel shoreline extraction", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Build the rough pixel shoreline from a water index
    PixelLine {
        /// Water index raster
        input: PathBuf,
        /// Output mask (255 on the pixel line)
        output: PathBuf,
        /// Threshold method: zero, otsu, multiotsu
        #[arg(short, long, default_value = "zero")]
        threshold: String,
        /// Morphological method: erosion, dilation
        #[arg(short, long, default_value = "dilation")]
        morphology: String,
        /// Holes and specks below this many cells are removed (0 = off)
        #[arg(short, long, default_value = "300")]
        area: usize,
        /// Region mask; line pixels where it is 0 are removed
        #[arg(short, long)]
        regions: Option<PathBuf>,
    },
    /// Extract, average and clean the sub-pixel shoreline of a scene
    Extract {
        /// Water index band
        band: PathBuf,
        /// Rough pixel line mask (255 on candidate pixels)
        mask: PathBuf,
        /// Region polygons (GeoJSON with a numeric region_id)
        regions: PathBuf,
        /// Output directory
        out_dir: PathBuf,
        /// JSON parameter file; overrides every parameter flag
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Average an existing raw point file
    Average {
        /// Raw point file (x,y,weight per line)
        input: PathBuf,
        /// Averaged point file (x,y per line)
        output: PathBuf,
        /// JSON parameter file; its cluster section overrides the flags
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        params: ParamArgs,
    },
}

#[derive(clap::Args)]
struct ParamArgs {
    /// Kernel side in pixels (odd)
    #[arg(long, default_value = "3")]
    kernel_size: usize,
    /// Upsampling factor of each kernel
    #[arg(long, default_value = "4")]
    points_per_pixel: usize,
    /// Polynomial degree of the kernel surface
    #[arg(long, default_value = "3")]
    degree: usize,
    /// Pixels ignored along every scene edge
    #[arg(long, default_value = "10")]
    border_margin: usize,
    /// Largest gap inside a point cluster (map units)
    #[arg(long, default_value = "50.0")]
    cluster_distance: f64,
    /// Smallest cluster that yields an averaged point
    #[arg(long, default_value = "3")]
    min_cluster_size: usize,
    /// Turning angle (degrees) below which path points are dropped
    #[arg(long, default_value = "150.0")]
    angle_tolerance: f64,
    /// Keep the whole path, skipping the angle filter
    #[arg(long)]
    no_angle_filter: bool,
    /// Smallest region group that is cleaned
    #[arg(long, default_value = "4")]
    min_group_size: usize,
}

impl ParamArgs {
    fn to_params(&self) -> ShorelineParams {
        let mut params = ShorelineParams::default();
        params.kernel.kernel_size = self.kernel_size;
        params.kernel.points_per_pixel = self.points_per_pixel;
        params.kernel.degree = self.degree;
        params.kernel.border_margin = self.border_margin;
        params.cluster = ClusterParams {
            cluster_distance: self.cluster_distance,
            min_cluster_size: self.min_cluster_size,
        };
        params.cleaning.angle_tolerance = (!self.no_angle_filter).then_some(self.angle_tolerance);
        params.cleaning.min_group_size = self.min_group_size;
        params
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_band(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn read_mask(path: &Path) -> Result<Raster<u8>> {
    let pb = spinner("Reading mask...");
    let raster: Raster<u8> = read_geotiff(path)
        .with_context(|| format!("Failed to read mask {}", path.display()))?;
    pb.finish_and_clear();
    Ok(raster)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_features(path: &Path, features: &FeatureCollection, crs: Option<&CRS>) -> Result<()> {
    write_feature_collection(create(path)?, features, crs)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn load_params(config: Option<&Path>, flags: &ParamArgs) -> Result<ShorelineParams> {
    let params = match config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => flags.to_params(),
    };
    params.validate().context("Invalid parameters")?;
    Ok(params)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_threshold(s: &str) -> Result<Threshold> {
    match s.to_lowercase().as_str() {
        "zero" | "0" => Ok(Threshold::Zero),
        "otsu" | "1" => Ok(Threshold::Otsu),
        "multiotsu" | "multi-otsu" | "2" => Ok(Threshold::MultiOtsu),
        _ => anyhow::bail!("Unknown threshold: {}. Use zero, otsu or multiotsu.", s),
    }
}

fn parse_morphology(s: &str) -> Result<Morphology> {
    match s.to_lowercase().as_str() {
        "erosion" => Ok(Morphology::Erosion),
        "dilation" => Ok(Morphology::Dilation),
        _ => anyhow::bail!("Unknown morphology: {}. Use erosion or dilation.", s),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster = read_band(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let (Some(min), Some(max), Some(mean)) = (stats.min, stats.max, stats.mean) {
                println!("  Min: {:.6}", min);
                println!("  Max: {:.6}", max);
                println!("  Mean: {:.6}", mean);
            }
            println!("  Valid cells: {}", stats.valid_count);
            println!("  Invalid cells: {}", stats.nodata_count);
        }

        Commands::PixelLine {
            input,
            output,
            threshold,
            morphology,
            area,
            regions,
        } => {
            let threshold = parse_threshold(&threshold)?;
            let morphology = parse_morphology(&morphology)?;
            let index = read_band(&input)?;

            let start = Instant::now();
            let water = binarize(&index, threshold)?;
            let water = remove_holes(&water, area)?;
            let mut line = pixel_line(&water, morphology)?;
            if let Some(path) = regions {
                let region_mask = read_mask(&path)?;
                line = mask_pixel_line(&line, &region_mask).context("Region mask does not fit")?;
            }
            let elapsed = start.elapsed();

            write_mask_geotiff(&line, &output, None).context("Failed to write pixel line")?;
            done("Pixel line", &output, elapsed);
        }

        Commands::Extract {
            band,
            mask,
            regions,
            out_dir,
            config,
            params,
        } => {
            let params = load_params(config.as_deref(), &params)?;
            let band_raster = read_band(&band)?;
            let mask_raster = read_mask(&mask)?;
            let region_polygons = read_regions(&regions)
                .with_context(|| format!("Failed to read regions {}", regions.display()))?;
            info!("Regions: {}", region_polygons.len());

            let pb = spinner("Extracting shoreline...");
            let result = run_scene(&band_raster, &mask_raster, &region_polygons, &params);
            pb.finish_and_clear();
            let result = result.context("Shoreline extraction failed")?;

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let stem = band
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scene".to_string());
            let crs = band_raster.crs();

            let raw_path = out_dir.join(format!("{}.d", stem));
            write_raw_points(create(&raw_path)?, &result.raw)
                .with_context(|| format!("Failed to write {}", raw_path.display()))?;
            let avg_path = out_dir.join(format!("{}.m", stem));
            write_averaged_points(create(&avg_path)?, &result.averaged)
                .with_context(|| format!("Failed to write {}", avg_path.display()))?;
            let cp_path = out_dir.join(format!("{}_cp.geojson", stem));
            write_features(&cp_path, &cleaned_points_to_features(&result.cleaned), crs)?;
            let cl_path = out_dir.join(format!("{}_cl.geojson", stem));
            write_features(&cl_path, &cleaned_lines_to_features(&result.cleaned), crs)?;

            let report = &result.report;
            println!("Raw points: {}", report.raw_points);
            println!("Averaged points: {}", report.averaged_points);
            println!("Points inside regions: {}", report.tagged_points);
            println!("Cleaned groups: {} ({} points)", report.groups, report.cleaned_points);
            println!("  Extraction: {:.2?}", report.extract_time);
            println!("  Averaging: {:.2?}", report.average_time);
            println!("  Tagging: {:.2?}", report.tag_time);
            println!("  Cleaning: {:.2?}", report.clean_time);
            done("Shoreline", &out_dir, report.total_time());
        }

        Commands::Average {
            input,
            output,
            config,
            params,
        } => {
            let cluster = load_params(config.as_deref(), &params)?.cluster;
            let file = File::open(&input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let raw = read_raw_points(BufReader::new(file))
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let start = Instant::now();
            let averaged = average_points(&raw, &cluster);
            let elapsed = start.elapsed();

            write_averaged_points(create(&output)?, &averaged)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} raw points -> {} averaged points", raw.len(), averaged.len());
            done("Averaged points", &output, elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("Otsu").unwrap(), Threshold::Otsu);
        assert_eq!(parse_threshold("2").unwrap(), Threshold::MultiOtsu);
        assert_eq!(parse_threshold("multiotsu").unwrap(), Threshold::MultiOtsu);
        assert!(parse_threshold("kmeans").is_err());
    }

    #[test]
    fn test_pixel_line_area_flag() {
        let cli = Cli::try_parse_from(["shoreline", "pixel-line", "in.tif", "out.tif", "--area", "0"])
            .unwrap();
        match cli.command {
            Commands::PixelLine { area, .. } => assert_eq!(area, 0),
            _ => panic!("expected pixel-line"),
        }
    }
}
