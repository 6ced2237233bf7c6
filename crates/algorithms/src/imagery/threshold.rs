//! Water index binarization
//!
//! Index values at or above the threshold are water (1), everything else is
//! land (0). `-inf` reads as 0 before the threshold is computed, NaN is
//! always land.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shoreline_core::raster::Raster;
use shoreline_core::{Error, Result};
use tracing::debug;

const OTSU_BINS: usize = 256;

/// How the water/land threshold is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    /// Fixed threshold of 0
    #[default]
    Zero,
    /// Otsu's between-class variance maximum over the finite values
    Otsu,
    /// Three-class Otsu; the threshold closer to zero is used
    #[serde(rename = "multiotsu")]
    MultiOtsu,
}

fn clean_value(v: f64) -> f64 {
    if v == f64::NEG_INFINITY {
        0.0
    } else {
        v
    }
}

/// Histogram of the finite values, or the single value when they are all equal
enum Histogram {
    Constant(f64),
    Bins { counts: [f64; OTSU_BINS], min: f64, width: f64 },
}

impl Histogram {
    fn new<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(Error::Algorithm("Otsu threshold of an image without finite values".into()));
        }

        let (min, max) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if max <= min {
            return Ok(Histogram::Constant(min));
        }

        let width = (max - min) / OTSU_BINS as f64;
        let mut counts = [0.0_f64; OTSU_BINS];
        for &v in &finite {
            let bin = (((v - min) / width) as usize).min(OTSU_BINS - 1);
            counts[bin] += 1.0;
        }
        Ok(Histogram::Bins { counts, min, width })
    }
}

/// Otsu threshold of `values` using a 256-bin histogram.
///
/// Non-finite values are ignored. Returns the centre of the winning bin, or
/// the single value when all values are equal.
pub fn otsu_threshold<I>(values: I) -> Result<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (hist, min, width) = match Histogram::new(values)? {
        Histogram::Constant(v) => return Ok(v),
        Histogram::Bins { counts, min, width } => (counts, min, width),
    };
    let centre = |i: usize| min + (i as f64 + 0.5) * width;

    // class weights and means below (inclusive) and above each bin
    let mut w_low = [0.0_f64; OTSU_BINS];
    let mut m_low = [0.0_f64; OTSU_BINS];
    let (mut count, mut sum) = (0.0, 0.0);
    for i in 0..OTSU_BINS {
        count += hist[i];
        sum += hist[i] * centre(i);
        w_low[i] = count;
        m_low[i] = if count > 0.0 { sum / count } else { 0.0 };
    }
    let mut w_high = [0.0_f64; OTSU_BINS];
    let mut m_high = [0.0_f64; OTSU_BINS];
    let (mut count, mut sum) = (0.0, 0.0);
    for i in (0..OTSU_BINS).rev() {
        count += hist[i];
        sum += hist[i] * centre(i);
        w_high[i] = count;
        m_high[i] = if count > 0.0 { sum / count } else { 0.0 };
    }

    let mut best = 0;
    let mut best_var = f64::NEG_INFINITY;
    for i in 0..OTSU_BINS - 1 {
        let var = w_low[i] * w_high[i + 1] * (m_low[i] - m_high[i + 1]).powi(2);
        if var > best_var {
            best_var = var;
            best = i;
        }
    }
    Ok(centre(best))
}

/// Two thresholds splitting `values` into three classes of maximum
/// between-class variance, using a 256-bin histogram.
///
/// Each threshold is the centre of the last bin of the class below it, so
/// the pair is ordered. Non-finite values are ignored.
pub fn multi_otsu_thresholds<I>(values: I) -> Result<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let (hist, min, width) = match Histogram::new(values)? {
        Histogram::Constant(v) => return Ok((v, v)),
        Histogram::Bins { counts, min, width } => (counts, min, width),
    };
    let centre = |i: usize| min + (i as f64 + 0.5) * width;

    // prefix count and sum, entry i covers bins 0..i
    let mut count = [0.0_f64; OTSU_BINS + 1];
    let mut sum = [0.0_f64; OTSU_BINS + 1];
    for i in 0..OTSU_BINS {
        count[i + 1] = count[i] + hist[i];
        sum[i + 1] = sum[i] + hist[i] * centre(i);
    }
    // sum² / weight of bins lo..hi, the class term of the between-class variance
    let class = |lo: usize, hi: usize| {
        let w = count[hi] - count[lo];
        if w > 0.0 {
            (sum[hi] - sum[lo]).powi(2) / w
        } else {
            0.0
        }
    };

    let mut best = (0, 1);
    let mut best_var = f64::NEG_INFINITY;
    for i in 0..OTSU_BINS - 2 {
        for j in i + 1..OTSU_BINS - 1 {
            let var = class(0, i + 1) + class(i + 1, j + 1) + class(j + 1, OTSU_BINS);
            if var > best_var {
                best_var = var;
                best = (i, j);
            }
        }
    }
    Ok((centre(best.0), centre(best.1)))
}

/// Binary water mask from a water index raster
pub fn binarize(index: &Raster<f64>, method: Threshold) -> Result<Raster<u8>> {
    let tol = match method {
        Threshold::Zero => 0.0,
        Threshold::Otsu => otsu_threshold(index.data().iter().map(|&v| clean_value(v)))?,
        Threshold::MultiOtsu => {
            let (low, high) =
                multi_otsu_thresholds(index.data().iter().map(|&v| clean_value(v)))?;
            if low.abs() <= high.abs() {
                low
            } else {
                high
            }
        }
    };
    debug!(?method, threshold = tol, "binarizing water index");

    let (rows, cols) = index.shape();
    let data: Vec<u8> = index
        .data()
        .iter()
        .map(|&v| u8::from(clean_value(v) >= tol))
        .collect();

    let mut mask = index.with_same_meta::<u8>(rows, cols);
    mask.set_nodata(None);
    *mask.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(mask)
}
