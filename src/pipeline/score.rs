//! Palette quality scoring.
//!
//! Five sub-scores, each clamped to [0, 1], combined with fixed weights that
//! sum to 1.0. Scoring is a pure function of a candidate and its role
//! assignment.

use serde::Serialize;

use crate::color::Color;
use crate::pipeline::assign::Assignment;
use crate::pipeline::extract::CandidatePalette;

pub const CONTRAST_WEIGHT: f32 = 0.30;
pub const DIVERSITY_WEIGHT: f32 = 0.25;
pub const SATURATION_WEIGHT: f32 = 0.20;
pub const LUMINANCE_WEIGHT: f32 = 0.15;
pub const CONFIDENCE_WEIGHT: f32 = 0.10;

/// Contrast ratio that earns a full contrast sub-score (WCAG AAA).
const FULL_CONTRAST: f32 = 7.0;
/// Mean pairwise ΔE that earns a full diversity sub-score.
const FULL_DIVERSITY: f32 = 100.0;
/// Saturation standard deviation that earns a full balance sub-score.
const FULL_SATURATION_SPREAD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityBreakdown {
    pub contrast: f32,
    pub diversity: f32,
    pub saturation: f32,
    pub luminance: f32,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    pub total: f32,
    pub breakdown: QualityBreakdown,
}

impl QualityScore {
    pub fn from_breakdown(breakdown: QualityBreakdown) -> Self {
        let total = CONTRAST_WEIGHT * breakdown.contrast
            + DIVERSITY_WEIGHT * breakdown.diversity
            + SATURATION_WEIGHT * breakdown.saturation
            + LUMINANCE_WEIGHT * breakdown.luminance
            + CONFIDENCE_WEIGHT * breakdown.confidence;
        Self {
            total: total.clamp(0.0, 1.0),
            breakdown,
        }
    }
}

/// Score a candidate palette together with the roles assigned from it.
pub fn score(candidate: &CandidatePalette, assignment: &Assignment) -> QualityScore {
    let colors: Vec<Color> = candidate.colors().collect();
    QualityScore::from_breakdown(QualityBreakdown {
        contrast: contrast_score(&colors),
        diversity: diversity_score(&colors),
        saturation: saturation_score(&colors),
        luminance: luminance_score(&colors),
        confidence: assignment.confidence.clamp(0.0, 1.0),
    })
}

/// Contrast between the two colors most likely to become background and
/// text: the darkest and the lightest. 1:1 scores 0, 7:1 and above score 1.
fn contrast_score(colors: &[Color]) -> f32 {
    let luminances = colors.iter().map(|c| c.relative_luminance());
    let (Some(darkest), Some(lightest)) = (
        luminances.clone().min_by(f32::total_cmp),
        luminances.max_by(f32::total_cmp),
    ) else {
        return 0.0;
    };
    let ratio = (lightest + 0.05) / (darkest + 0.05);
    ((ratio - 1.0) / (FULL_CONTRAST - 1.0)).clamp(0.0, 1.0)
}

/// Mean pairwise CIELAB distance.
fn diversity_score(colors: &[Color]) -> f32 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            total += a.delta_e(*b);
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    (total / pairs as f32 / FULL_DIVERSITY).clamp(0.0, 1.0)
}

/// Spread of HSL saturation. All-gray and all-neon palettes both score low.
fn saturation_score(colors: &[Color]) -> f32 {
    let saturations: Vec<f32> = colors.iter().map(|c| c.hsl_saturation()).collect();
    (std_dev(&saturations) / FULL_SATURATION_SPREAD).clamp(0.0, 1.0)
}

/// Mean of the luminance range and (twice) its standard deviation.
fn luminance_score(colors: &[Color]) -> f32 {
    let luminances: Vec<f32> = colors.iter().map(|c| c.relative_luminance()).collect();
    if luminances.len() < 2 {
        return 0.0;
    }
    let min = luminances.iter().copied().fold(f32::INFINITY, f32::min);
    let max = luminances.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = (max - min).clamp(0.0, 1.0);
    let spread = (std_dev(&luminances) * 2.0).min(1.0);
    (range + spread) / 2.0
}

/// Population standard deviation; 0 for fewer than two values.
fn std_dev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::assign::assign_roles;
    use crate::pipeline::extract::{Method, Swatch};

    fn candidate(colors: &[Color]) -> CandidatePalette {
        let weight = 1.0 / colors.len() as f32;
        CandidatePalette::new(
            Method::MedianCut,
            colors.len(),
            colors.iter().map(|&color| Swatch { color, weight }).collect(),
        )
    }

    fn scored(colors: &[Color]) -> QualityScore {
        let candidate = candidate(colors);
        score(&candidate, &assign_roles(&candidate))
    }

    #[test]
    fn weights_sum_to_one() {
        let sum = CONTRAST_WEIGHT
            + DIVERSITY_WEIGHT
            + SATURATION_WEIGHT
            + LUMINANCE_WEIGHT
            + CONFIDENCE_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sub_scores_stay_in_unit_range() {
        let palettes: [&[Color]; 3] = [
            &[Color::new(128, 128, 128)],
            &[Color::BLACK, Color::WHITE],
            &[
                Color::new(20, 20, 30),
                Color::new(220, 60, 60),
                Color::new(60, 200, 90),
                Color::new(70, 90, 230),
                Color::new(240, 240, 230),
            ],
        ];
        for colors in palettes {
            let q = scored(colors);
            let b = q.breakdown;
            for (name, value) in [
                ("contrast", b.contrast),
                ("diversity", b.diversity),
                ("saturation", b.saturation),
                ("luminance", b.luminance),
                ("confidence", b.confidence),
                ("total", q.total),
            ] {
                assert!((0.0..=1.0).contains(&value), "{name} = {value}");
            }
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let colors = [
            Color::new(12, 14, 30),
            Color::new(200, 80, 40),
            Color::new(90, 160, 200),
            Color::new(230, 225, 210),
        ];
        let candidate = candidate(&colors);
        let assignment = assign_roles(&candidate);
        assert_eq!(score(&candidate, &assignment), score(&candidate, &assignment));
    }

    #[test]
    fn varied_palette_beats_flat_gray() {
        let gray = scored(&[Color::new(120, 120, 120), Color::new(130, 130, 130)]);
        let varied = scored(&[
            Color::new(15, 15, 25),
            Color::new(210, 70, 60),
            Color::new(70, 180, 120),
            Color::new(235, 235, 225),
        ]);
        assert!(varied.total > gray.total, "{} <= {}", varied.total, gray.total);
    }

    #[test]
    fn black_and_white_max_out_contrast() {
        let q = scored(&[Color::BLACK, Color::WHITE]);
        assert_eq!(q.breakdown.contrast, 1.0);
        assert_eq!(q.breakdown.luminance, 1.0);
    }

    #[test]
    fn single_color_has_no_spread() {
        let q = scored(&[Color::new(255, 0, 0)]);
        assert_eq!(q.breakdown.diversity, 0.0);
        assert_eq!(q.breakdown.saturation, 0.0);
        assert_eq!(q.breakdown.luminance, 0.0);
        assert_eq!(q.breakdown.contrast, 0.0);
    }
}
