//! Image → semantic palette pipeline.
//!
//! Sampler → extractor(s) → role assigner → quality scorer. The adaptive
//! method fans the concrete extractors out over rayon and keeps the best.

pub mod adaptive;
pub mod assign;
pub mod contrast;
pub mod extract;
pub mod sample;
pub mod score;

use std::path::Path;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::PaletteError;
use crate::theme::SemanticPalette;

use extract::{extractor_for, CandidatePalette, Method};
use sample::SampleSet;

/// Palettes scoring below this are flagged, never rejected.
pub const DEFAULT_QUALITY_THRESHOLD: f32 = 0.5;
/// Default number of colors to extract.
pub const DEFAULT_K: usize = 6;

/// Point in time after which extraction stops starting new work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Deadline(None)
    }

    pub fn at(instant: Instant) -> Self {
        Deadline(Some(instant))
    }

    pub fn after(timeout: Duration) -> Self {
        Deadline(Instant::now().checked_add(timeout))
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Knobs for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub method: Method,
    pub k: usize,
    pub quality_threshold: f32,
    pub timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            k: DEFAULT_K,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            timeout: None,
        }
    }
}

impl PipelineConfig {
    fn deadline(&self) -> Deadline {
        self.timeout.map(Deadline::after).unwrap_or_default()
    }
}

/// Load an image and derive its semantic palette.
pub fn run(path: &Path, config: &PipelineConfig) -> Result<SemanticPalette, PaletteError> {
    let samples = sample::load_samples(path)?;
    run_samples(&samples, config)
}

/// Derive a semantic palette from already-sampled pixels.
pub fn run_samples(
    samples: &SampleSet,
    config: &PipelineConfig,
) -> Result<SemanticPalette, PaletteError> {
    let deadline = config.deadline();
    let palette = match extractor_for(config.method) {
        Some(extractor) => {
            let candidate = extractor.extract(samples, config.k, deadline)?;
            evaluate(&candidate, config.quality_threshold)
        }
        None => adaptive::adaptive(samples, config.k, deadline, config.quality_threshold)?,
    };

    info!(
        "palette from {} scored {:.3}",
        palette.method(),
        palette.quality().total
    );
    for warning in palette.warnings() {
        warn!("{warning}");
    }
    Ok(palette)
}

/// Every concrete method's palette, best first.
pub fn compare(samples: &SampleSet, config: &PipelineConfig) -> Vec<SemanticPalette> {
    adaptive::rank_methods(samples, config.k, config.deadline(), config.quality_threshold)
}

/// Assign roles to a candidate and score the pair.
pub fn evaluate(candidate: &CandidatePalette, quality_threshold: f32) -> SemanticPalette {
    let assignment = assign::assign_roles(candidate);
    let quality = score::score(candidate, &assignment);
    SemanticPalette::new(assignment, quality, candidate.method(), quality_threshold)
}
