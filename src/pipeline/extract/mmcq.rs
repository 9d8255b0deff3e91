use color_thief::ColorFormat;
use log::debug;

use crate::color::Color;
use crate::pipeline::Deadline;

use super::median_cut::MedianCut;
use super::{swatches_from_labels, ExtractError, Extractor, Method, Swatch};

/// Pixel stride handed to Color Thief; 1 reads every sample.
const QUALITY: u8 = 1;
/// Color Thief refuses palettes smaller than this.
const MIN_COLORS: usize = 2;
/// Colors closer than this squared ΔE are merged.
const DEDUP_THRESHOLD: f32 = 25.0; // ΔE² < 25 means ΔE < 5

/// Color Thief's modified median cut quantization (MMCQ).
pub struct Mmcq;

impl Extractor for Mmcq {
    fn method(&self) -> Method {
        Method::FastHeuristic
    }

    fn cluster(
        &self,
        samples: &[Color],
        k: usize,
        deadline: Deadline,
    ) -> Result<Vec<Swatch>, ExtractError> {
        let pixels: Vec<u8> = samples.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
        let max_colors = k.max(MIN_COLORS) as u8;

        let mut palette: Vec<Color> =
            match color_thief::get_palette(&pixels, ColorFormat::Rgb, QUALITY, max_colors) {
                Ok(colors) => colors.iter().map(|c| Color::new(c.r, c.g, c.b)).collect(),
                Err(err) => {
                    debug!("fast: color thief failed ({err:?}), using median cut");
                    Vec::new()
                }
            };
        if palette.is_empty() {
            return MedianCut.cluster(samples, k, deadline);
        }
        palette.dedup();
        palette.truncate(k);
        debug!("fast: {} colors for k={k}", palette.len());

        let indices: Vec<u8> = samples.iter().map(|&c| nearest(&palette, c)).collect();
        let mut swatches = swatches_from_labels(&palette, &indices, samples.len());
        deduplicate(&mut swatches);
        Ok(swatches)
    }
}

/// Index of the palette entry closest to `color` in sRGB.
fn nearest(palette: &[Color], color: Color) -> u8 {
    let distance = |p: &Color| {
        let d = |a: u8, b: u8| (a as i32 - b as i32).pow(2);
        d(p.r, color.r) + d(p.g, color.g) + d(p.b, color.b)
    };
    palette
        .iter()
        .enumerate()
        .min_by_key(|&(_, p)| distance(p))
        .map_or(0, |(i, _)| i as u8)
}

/// Merge colors that are too similar (ΔE < 5 in LAB space).
/// Keeps the first color and accumulates the weight.
fn deduplicate(swatches: &mut Vec<Swatch>) {
    let mut i = 0;
    while i < swatches.len() {
        let lab_i = swatches[i].color.to_lab();
        let mut j = i + 1;
        while j < swatches.len() {
            let lab_j = swatches[j].color.to_lab();
            let delta_e_sq = (lab_i.l - lab_j.l).powi(2)
                + (lab_i.a - lab_j.a).powi(2)
                + (lab_i.b - lab_j.b).powi(2);
            if delta_e_sq < DEDUP_THRESHOLD {
                swatches[i].weight += swatches[j].weight;
                swatches.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}
