//! Error and warning kinds surfaced by the palette pipeline.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::extract::ExtractError;

/// Failures that abort a stage of the pipeline.
///
/// The image variants are fatal to a whole run. `TemplateRender` is scoped to
/// a single application; callers rendering a batch keep going.
#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("file not found: {}", path.display())]
    ImageMissing { path: PathBuf },

    #[error(
        "unsupported or corrupt image: {origin}. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF"
    )]
    ImageDecode {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    #[error("image has no pixels: {origin}")]
    EmptyImage { origin: String },

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("failed to render template for {app}: {source}")]
    TemplateRender {
        app: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PaletteError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PaletteError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Non-fatal conditions recorded on a palette. They never block output.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaletteWarning {
    #[error("image has only {distinct} distinct colors, fewer than the {requested} requested")]
    ExtractionDegenerate { distinct: usize, requested: usize },

    #[error("background/text contrast {best_ratio:.2}:1 could not reach 4.5:1; using neutral fallback")]
    ContrastUnsatisfiable { best_ratio: f32 },

    #[error("palette quality {score:.2} is below the {threshold:.2} threshold")]
    QualityBelowThreshold { score: f32, threshold: f32 },
}
