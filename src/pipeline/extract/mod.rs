//! Color extraction strategies.
//!
//! Every strategy turns a [`SampleSet`] into a [`CandidatePalette`] of at most
//! `k` weighted colors. The set of strategies is closed: [`Method`] names
//! them, and [`strategies`] is the dispatch table the adaptive mode walks.

pub mod kmeans;
pub mod median_cut;
pub mod mmcq;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::pipeline::sample::SampleSet;
use crate::pipeline::Deadline;

/// Smallest and largest accepted cluster counts.
pub const MIN_K: usize = 1;
pub const MAX_K: usize = 32;

/// Extraction method identifiers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Lloyd's k-means in sRGB.
    #[value(name = "kmeans_rgb")]
    #[serde(rename = "kmeans_rgb")]
    ClusteringRgb,
    /// Lloyd's k-means in CIELAB.
    #[default]
    #[value(name = "kmeans_lab")]
    #[serde(rename = "kmeans_lab")]
    ClusteringPerceptual,
    /// Recursive split along the widest channel.
    #[value(name = "median_cut")]
    MedianCut,
    /// Color Thief's modified median cut (MMCQ).
    #[value(name = "fast")]
    #[serde(rename = "fast")]
    FastHeuristic,
    /// Run every other method and keep the best-scoring palette.
    #[value(name = "adaptive")]
    Adaptive,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::ClusteringRgb,
        Method::ClusteringPerceptual,
        Method::MedianCut,
        Method::FastHeuristic,
        Method::Adaptive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::ClusteringRgb => "kmeans_rgb",
            Method::ClusteringPerceptual => "kmeans_lab",
            Method::MedianCut => "median_cut",
            Method::FastHeuristic => "fast",
            Method::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown extraction method: {s}"))
    }
}

/// A representative color and the fraction of samples it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Swatch {
    pub color: Color,
    pub weight: f32,
}

/// Failures local to one strategy. The adaptive mode drops the strategy and
/// carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no samples to extract from")]
    NoSamples,
    #[error("deadline expired before {0} started")]
    DeadlineExceeded(Method),
}

/// The unscored output of one extraction strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePalette {
    method: Method,
    requested: usize,
    exhaustive: bool,
    swatches: Vec<Swatch>,
}

impl CandidatePalette {
    /// Normalize raw strategy output: merge swatches that landed on the same
    /// color, drop empty ones, sort by weight (descending) and cap at `k`.
    pub fn new(method: Method, requested: usize, swatches: Vec<Swatch>) -> Self {
        let mut merged: Vec<Swatch> = Vec::with_capacity(swatches.len());
        for swatch in swatches.into_iter().filter(|s| s.weight > 0.0) {
            match merged.iter_mut().find(|m| m.color == swatch.color) {
                Some(existing) => existing.weight += swatch.weight,
                None => merged.push(swatch),
            }
        }
        merged.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.color.cmp(&b.color))
        });
        merged.truncate(requested.max(MIN_K));
        Self {
            method,
            requested,
            exhaustive: false,
            swatches: merged,
        }
    }

    /// Candidate built from the exact color histogram of a low-color image.
    fn exhaustive(method: Method, requested: usize, swatches: Vec<Swatch>) -> Self {
        Self {
            exhaustive: true,
            ..Self::new(method, requested, swatches)
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The `k` the strategy was asked for.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// True when the image had no more distinct colors than `k` and the
    /// candidate is its complete histogram.
    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.swatches.iter().map(|s| s.color)
    }

    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn total_weight(&self) -> f32 {
        self.swatches.iter().map(|s| s.weight).sum()
    }
}

/// One extraction strategy.
pub trait Extractor: Send + Sync {
    fn method(&self) -> Method;

    /// Strategy body. Only called with more distinct colors than `k`.
    fn cluster(
        &self,
        samples: &[Color],
        k: usize,
        deadline: Deadline,
    ) -> Result<Vec<Swatch>, ExtractError>;

    /// Extract at most `k` representative colors.
    ///
    /// Images with `k` or fewer distinct colors short-circuit to their exact
    /// histogram, so no strategy ever fabricates duplicate entries.
    fn extract(
        &self,
        samples: &SampleSet,
        k: usize,
        deadline: Deadline,
    ) -> Result<CandidatePalette, ExtractError> {
        if samples.is_empty() {
            return Err(ExtractError::NoSamples);
        }
        let k = k.clamp(MIN_K, MAX_K);
        if let Some(histogram) = exact_histogram(samples.colors(), k) {
            return Ok(CandidatePalette::exhaustive(self.method(), k, histogram));
        }
        let swatches = self.cluster(samples.colors(), k, deadline)?;
        Ok(CandidatePalette::new(self.method(), k, swatches))
    }
}

/// Dispatch table for the concrete strategies, in tie-break order.
pub fn strategies() -> [&'static dyn Extractor; 4] {
    [
        &kmeans::LloydLab,
        &median_cut::MedianCut,
        &kmeans::LloydRgb,
        &mmcq::Mmcq,
    ]
}

/// The concrete extractor for `method`, or `None` for [`Method::Adaptive`].
pub fn extractor_for(method: Method) -> Option<&'static dyn Extractor> {
    strategies().into_iter().find(|e| e.method() == method)
}

/// Weighted swatches for each cluster label in `indices`. Empty clusters are
/// skipped.
pub(crate) fn swatches_from_labels(centroids: &[Color], indices: &[u8], total: usize) -> Vec<Swatch> {
    let mut counts = vec![0usize; centroids.len()];
    for &idx in indices {
        counts[idx as usize] += 1;
    }
    centroids
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&color, count)| Swatch {
            color,
            weight: count as f32 / total as f32,
        })
        .collect()
}

/// The full color histogram, if the samples hold at most `k` distinct colors.
fn exact_histogram(samples: &[Color], k: usize) -> Option<Vec<Swatch>> {
    let mut counts: HashMap<Color, usize> = HashMap::new();
    for &color in samples {
        *counts.entry(color).or_insert(0) += 1;
        if counts.len() > k {
            return None;
        }
    }
    let total = samples.len() as f32;
    Some(
        counts
            .into_iter()
            .map(|(color, count)| Swatch {
                color,
                weight: count as f32 / total,
            })
            .collect(),
    )
}
