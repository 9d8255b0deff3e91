//! Rendering palettes through per-application templates.

pub mod builtin;
pub mod filters;

use std::collections::BTreeMap;

use minijinja::{context, Environment, UndefinedBehavior, Value};
use rayon::prelude::*;

use crate::color::Color;
use crate::error::PaletteError;
use crate::pipeline::extract::{CandidatePalette, Method, Swatch};
use crate::pipeline::{evaluate, DEFAULT_QUALITY_THRESHOLD};
use crate::theme::SemanticPalette;

pub use filters::FilterTable;

/// One template to render for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub app: String,
    pub source: String,
}

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new(filters: &FilterTable) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        filters.register(&mut env);
        Self { env }
    }

    /// Render `source` for `app`. Any template failure, including a
    /// reference to an unknown role, is reported against that application.
    pub fn render(
        &self,
        app: &str,
        source: &str,
        palette: &SemanticPalette,
    ) -> Result<String, PaletteError> {
        self.env
            .render_str(source, template_context(palette))
            .map_err(|source| PaletteError::TemplateRender {
                app: app.to_string(),
                source,
            })
    }

    /// Render many templates in parallel. Results come back in job order and
    /// one failure never affects the others.
    pub fn render_batch(
        &self,
        jobs: &[RenderJob],
        palette: &SemanticPalette,
    ) -> Vec<Result<String, PaletteError>> {
        jobs.par_iter()
            .map(|job| self.render(&job.app, &job.source, palette))
            .collect()
    }

    /// Render `source` against [`sample_palette`] and throw the output away.
    pub fn check(&self, app: &str, source: &str) -> Result<(), PaletteError> {
        self.render(app, source, &sample_palette()).map(|_| ())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&FilterTable::standard())
    }
}

/// A fixed dark palette with a full set of hues, for validating templates
/// without an image.
pub fn sample_palette() -> SemanticPalette {
    let swatches = [
        Color::new(24, 26, 38),
        Color::new(204, 72, 64),
        Color::new(96, 176, 104),
        Color::new(214, 180, 82),
        Color::new(82, 124, 214),
        Color::new(180, 96, 190),
        Color::new(232, 228, 218),
    ]
    .into_iter()
    .map(|color| Swatch { color, weight: 1.0 / 7.0 })
    .collect();
    evaluate(
        &CandidatePalette::new(Method::ClusteringPerceptual, 7, swatches),
        DEFAULT_QUALITY_THRESHOLD,
    )
}

/// `colors.<role>` as hex strings plus `colors.terminal` (the 16 slots in
/// order), and `palette.method` / `palette.quality`.
fn template_context(palette: &SemanticPalette) -> Value {
    let mut colors: BTreeMap<String, Value> = palette
        .iter()
        .map(|(role, color)| (role.name(), Value::from(color.to_hex())))
        .collect();
    let terminal: Vec<String> = palette
        .roles()
        .terminal
        .iter()
        .map(|color| color.to_hex())
        .collect();
    colors.insert("terminal".to_string(), Value::from(terminal));

    context! {
        colors => colors,
        palette => context! {
            method => palette.method().as_str(),
            quality => palette.quality().total,
            text_contrast => palette.text_contrast(),
        },
    }
}
