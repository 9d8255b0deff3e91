use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::pipeline::extract::median_cut::MedianCut;
use crate::pipeline::extract::{strategies, ExtractError, Extractor};
use crate::pipeline::sample::SampleSet;
use crate::pipeline::{evaluate, Deadline};
use crate::theme::SemanticPalette;

/// Pick the highest-scoring item. The first of equal scores wins.
pub fn select_best<T>(scored: impl IntoIterator<Item = (f32, T)>) -> Option<T> {
    let mut best: Option<(f32, T)> = None;
    for (score, item) in scored {
        match &best {
            Some((best_score, _)) if *best_score >= score => {}
            _ => best = Some((score, item)),
        }
    }
    best.map(|(_, item)| item)
}

/// Run every concrete strategy in parallel and return their palettes, best
/// score first.
///
/// Strategies that fail, or had not started when the deadline passed, are
/// left out. If none finished, median-cut runs without a deadline so there is
/// always something to return for non-empty samples.
pub fn rank_methods(
    samples: &SampleSet,
    k: usize,
    deadline: Deadline,
    quality_threshold: f32,
) -> Vec<SemanticPalette> {
    let results: Vec<_> = strategies()
        .par_iter()
        .map(|extractor| {
            let method = extractor.method();
            if deadline.expired() {
                return (method, Err(ExtractError::DeadlineExceeded(method)));
            }
            let started = Instant::now();
            let result = extractor
                .extract(samples, k, deadline)
                .map(|candidate| evaluate(&candidate, quality_threshold));
            debug!("{method}: finished in {:?}", started.elapsed());
            (method, result)
        })
        .collect();

    let mut palettes: Vec<SemanticPalette> = Vec::with_capacity(results.len());
    for (method, result) in results {
        match result {
            Ok(palette) => {
                debug!("{method}: score {:.3}", palette.quality().total);
                palettes.push(palette);
            }
            Err(err) => warn!("{method} excluded: {err}"),
        }
    }

    if palettes.is_empty() {
        if let Ok(candidate) = MedianCut.extract(samples, k, Deadline::none()) {
            palettes.push(evaluate(&candidate, quality_threshold));
        }
    }

    // Stable sort keeps dispatch-table order among equal scores.
    palettes.sort_by(|a, b| b.quality().total.total_cmp(&a.quality().total));
    palettes
}

/// The adaptive method: the best palette any concrete strategy produced.
pub fn adaptive(
    samples: &SampleSet,
    k: usize,
    deadline: Deadline,
    quality_threshold: f32,
) -> Result<SemanticPalette, ExtractError> {
    if samples.is_empty() {
        return Err(ExtractError::NoSamples);
    }
    let ranked = rank_methods(samples, k, deadline, quality_threshold);
    let best = select_best(ranked.into_iter().map(|p| (p.quality().total, p)))
        .ok_or(ExtractError::NoSamples)?;
    info!("adaptive selected {}", best.method());
    Ok(best)
}
