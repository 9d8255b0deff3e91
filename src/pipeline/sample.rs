use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;
use log::debug;

use crate::color::Color;
use crate::error::PaletteError;

/// Largest side, in pixels, of the image the samples are drawn from.
pub const MAX_DIM: u32 = 256;

/// Pixel samples drawn from one image. Read-only after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    colors: Vec<Color>,
    width: u32,
    height: u32,
}

impl SampleSet {
    /// Wrap already-decoded pixels. Used by tests and callers that decode
    /// images themselves.
    pub fn from_colors(colors: Vec<Color>) -> Self {
        let width = colors.len() as u32;
        Self {
            colors,
            width,
            height: 1,
        }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Dimensions of the (possibly downsampled) image the samples came from.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Load an image from disk and sample it.
pub fn load_samples(path: &Path) -> Result<SampleSet, PaletteError> {
    if !path.exists() {
        return Err(PaletteError::ImageMissing {
            path: path.to_path_buf(),
        });
    }
    let origin = path.display().to_string();
    let img = image::open(path).map_err(|source| PaletteError::ImageDecode {
        origin: origin.clone(),
        source,
    })?;
    sample_image(img, &origin)
}

/// Decode an in-memory image and sample it.
pub fn decode_samples(bytes: &[u8]) -> Result<SampleSet, PaletteError> {
    let origin = "<memory>";
    let img = image::load_from_memory(bytes).map_err(|source| PaletteError::ImageDecode {
        origin: origin.to_string(),
        source,
    })?;
    sample_image(img, origin)
}

/// Downsample to fit within `MAX_DIM` x `MAX_DIM` (aspect ratio preserved)
/// and collect the pixels in row-major order.
///
/// Nearest-neighbour resampling keeps every sample an exact source color, so
/// an image with N distinct colors never grows blended in-between shades.
pub fn sample_image(img: DynamicImage, origin: &str) -> Result<SampleSet, PaletteError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(PaletteError::EmptyImage {
            origin: origin.to_string(),
        });
    }

    let img = if img.width() > MAX_DIM || img.height() > MAX_DIM {
        debug!(
            "downsampling {origin} from {}x{} to fit {MAX_DIM}x{MAX_DIM}",
            img.width(),
            img.height()
        );
        img.resize(MAX_DIM, MAX_DIM, FilterType::Nearest)
    } else {
        img
    };
    let rgb_img = img.to_rgb8();

    let colors: Vec<Color> = rgb_img
        .pixels()
        .map(|p| Color::new(p[0], p[1], p[2]))
        .collect();

    Ok(SampleSet {
        colors,
        width: rgb_img.width(),
        height: rgb_img.height(),
    })
}
