//! Templates shipped inside the binary, addressed as `builtin:<name>`.

use std::path::{Path, PathBuf};

pub const PREFIX: &str = "builtin:";

static BUILTINS: &[(&str, &str)] = &[
    ("ghostty", include_str!("templates/ghostty.j2")),
    ("zellij", include_str!("templates/zellij.kdl.j2")),
    ("css", include_str!("templates/css.j2")),
    ("json", include_str!("templates/json.j2")),
];

pub fn get(name: &str) -> Option<&'static str> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

/// Where a template's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin(&'static str),
    File(PathBuf),
}

impl TemplateSource {
    /// `builtin:<name>` selects a shipped template; anything else is a path.
    /// Returns `None` for an unknown builtin name.
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.strip_prefix(PREFIX) {
            Some(name) => get(name).map(TemplateSource::Builtin),
            None => Some(TemplateSource::File(Path::new(spec).to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pipeline::evaluate;
    use crate::pipeline::extract::{CandidatePalette, Method, Swatch};
    use crate::template::Renderer;
    use crate::theme::Role;

    fn palette() -> crate::theme::SemanticPalette {
        let swatches = [
            Color::new(20, 22, 35),
            Color::new(200, 60, 50),
            Color::new(60, 160, 90),
            Color::new(200, 180, 60),
            Color::new(70, 90, 210),
            Color::new(230, 228, 220),
        ]
        .into_iter()
        .map(|color| Swatch { color, weight: 1.0 / 6.0 })
        .collect();
        evaluate(&CandidatePalette::new(Method::ClusteringPerceptual, 6, swatches), 0.5)
    }

    #[test]
    fn every_builtin_renders() {
        let renderer = Renderer::default();
        let palette = palette();
        for name in names() {
            let source = get(name).unwrap();
            let out = renderer.render(name, source, &palette).unwrap();
            assert!(!out.is_empty(), "{name} rendered nothing");
            assert!(out.ends_with('\n'), "{name} lost its trailing newline");
        }
    }

    #[test]
    fn ghostty_lists_all_sixteen_slots() {
        let palette = palette();
        let out = Renderer::default()
            .render("ghostty", get("ghostty").unwrap(), &palette)
            .unwrap();
        assert_eq!(out.lines().count(), 22);
        for slot in 0..16u8 {
            let line = format!("palette = {slot}={}", palette.get(Role::Terminal(slot)));
            assert!(out.contains(&line), "missing {line}");
        }
        assert!(out.contains(&format!("background = {}", palette.get(Role::Background))));
    }

    #[test]
    fn zellij_has_kdl_structure() {
        let out = Renderer::default()
            .render("zellij", get("zellij").unwrap(), &palette())
            .unwrap();
        assert!(out.starts_with("themes {"));
        let color_lines = out.lines().filter(|l| l.starts_with("        ")).count();
        assert_eq!(color_lines, 11);
    }

    #[test]
    fn json_builtin_is_valid_json() {
        let palette = palette();
        let out = Renderer::default()
            .render("json", get("json").unwrap(), &palette)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["method"], "kmeans_lab");
        assert_eq!(parsed["terminal"].as_array().unwrap().len(), 16);
        assert_eq!(parsed["text"], palette.get(Role::Text).to_hex());
    }

    #[test]
    fn source_parsing() {
        assert!(matches!(
            TemplateSource::parse("builtin:css"),
            Some(TemplateSource::Builtin(_))
        ));
        assert_eq!(TemplateSource::parse("builtin:nope"), None);
        assert_eq!(
            TemplateSource::parse("/tmp/theme.j2"),
            Some(TemplateSource::File(PathBuf::from("/tmp/theme.j2")))
        );
    }
}
