use kmeans_colors::get_kmeans;
use log::debug;
use palette::{Lab, Srgb};

use crate::color::Color;
use crate::pipeline::Deadline;

use super::{swatches_from_labels, ExtractError, Extractor, Method, Swatch};

/// Iteration cap shared by every k-means run.
pub const MAX_ITER: usize = 20;
/// Convergence threshold for normalized sRGB (channels in [0, 1]).
pub const RGB_CONVERGE: f32 = 0.0025;
/// Convergence threshold for CIELAB.
pub const LAB_CONVERGE: f32 = 5.0;
/// Fixed seed for k-means++ initialization.
pub const SEED: u64 = 42;

/// Lloyd's k-means over normalized sRGB.
pub struct LloydRgb;

/// Lloyd's k-means over CIELAB.
pub struct LloydLab;

impl Extractor for LloydRgb {
    fn method(&self) -> Method {
        Method::ClusteringRgb
    }

    fn cluster(&self, samples: &[Color], k: usize, _: Deadline) -> Result<Vec<Swatch>, ExtractError> {
        let pixels: Vec<Srgb<f32>> = samples.iter().map(|c| c.to_srgb_f32()).collect();
        let result = get_kmeans(k, MAX_ITER, RGB_CONVERGE, false, &pixels, SEED);
        debug!("kmeans_rgb: k={k} score={:.4}", result.score);

        let centroids: Vec<Color> = result
            .centroids
            .iter()
            .map(|c| Color::from_srgb_f32(*c))
            .collect();
        Ok(swatches_from_labels(&centroids, &result.indices, samples.len()))
    }
}

impl Extractor for LloydLab {
    fn method(&self) -> Method {
        Method::ClusteringPerceptual
    }

    fn cluster(&self, samples: &[Color], k: usize, _: Deadline) -> Result<Vec<Swatch>, ExtractError> {
        let pixels: Vec<Lab> = samples.iter().map(|c| c.to_lab()).collect();
        let result = get_kmeans(k, MAX_ITER, LAB_CONVERGE, false, &pixels, SEED);
        debug!("kmeans_lab: k={k} score={:.4}", result.score);

        let centroids: Vec<Color> = result.centroids.iter().map(|c| Color::from_lab(*c)).collect();
        Ok(swatches_from_labels(&centroids, &result.indices, samples.len()))
    }
}
