use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;

use wallhue::color::Color;
use wallhue::error::{PaletteError, PaletteWarning};
use wallhue::pipeline::adaptive::select_best;
use wallhue::pipeline::extract::{extractor_for, Method};
use wallhue::pipeline::sample::{load_samples, SampleSet};
use wallhue::pipeline::{self, Deadline, PipelineConfig};
use wallhue::template::builtin;
use wallhue::template::{RenderJob, Renderer};
use wallhue::theme::{Role, SemanticPalette};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn create_solid_red(path: &Path) {
    image::RgbImage::from_pixel(10, 10, image::Rgb([255, 0, 0]))
        .save(path)
        .unwrap();
}

fn create_three_colors(path: &Path) {
    let img = image::RgbImage::from_fn(30, 30, |x, _| match x / 10 {
        0 => image::Rgb([20, 30, 60]),
        1 => image::Rgb([200, 120, 40]),
        _ => image::Rgb([240, 236, 225]),
    });
    img.save(path).unwrap();
}

fn create_colorful(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let region = (x / 16) + (y / 16) * 4;
        match region % 8 {
            0 => image::Rgb([220, 50, 50]),
            1 => image::Rgb([50, 200, 50]),
            2 => image::Rgb([50, 50, 220]),
            3 => image::Rgb([220, 220, 50]),
            4 => image::Rgb([200, 50, 200]),
            5 => image::Rgb([50, 200, 200]),
            6 => image::Rgb([20, 20, 20]),
            _ => image::Rgb([240, 240, 240]),
        }
    });
    img.save(path).unwrap();
}

fn create_large_gradient(path: &Path) {
    let img = image::RgbImage::from_fn(1024, 512, |x, y| {
        image::Rgb([(x / 4) as u8, (y / 2) as u8, 255 - (x / 4) as u8])
    });
    img.save(path).unwrap();
}

fn create_pale(path: &Path) {
    let img = image::RgbImage::from_fn(32, 32, |x, y| {
        let v = 228 + ((x + y) % 20) as u8;
        image::Rgb([v, v, v.saturating_sub(4)])
    });
    img.save(path).unwrap();
}

/// Generate the fixtures once per test run and return the path of one.
fn fixture(name: &str) -> PathBuf {
    static GENERATED: Once = Once::new();
    let dir = fixture_dir();
    GENERATED.call_once(|| {
        std::fs::create_dir_all(&dir).unwrap();
        create_solid_red(&dir.join("solid-red.png"));
        create_three_colors(&dir.join("three-colors.png"));
        create_colorful(&dir.join("colorful.png"));
        create_large_gradient(&dir.join("large-gradient.png"));
        create_pale(&dir.join("pale.png"));
    });
    let path = dir.join(name);
    assert!(path.exists(), "unknown fixture {name}");
    path
}

fn run(name: &str, method: Method, k: usize) -> SemanticPalette {
    let config = PipelineConfig {
        method,
        k,
        ..PipelineConfig::default()
    };
    pipeline::run(&fixture(name), &config).unwrap()
}

// ---------------------------------------------------------------------------
// End-to-end behaviour
// ---------------------------------------------------------------------------

#[test]
fn solid_red_becomes_a_monochrome_ladder() {
    for method in Method::ALL {
        let palette = run("solid-red.png", method, 6);
        assert_eq!(palette.get(Role::Primary), Color::new(255, 0, 0), "{method}");
        assert!(palette.text_contrast() >= 4.5, "{method}");
        let red_hue = Color::new(255, 0, 0).hue();
        for slot in (1..=6).chain(9..=14) {
            let color = palette.get(Role::Terminal(slot));
            assert!(
                wallhue::color::hue_distance(color.hue(), red_hue) < 40.0,
                "{method}: color{slot} {color} is not a shade of red"
            );
        }
        assert!(palette
            .warnings()
            .iter()
            .any(|w| matches!(w, PaletteWarning::ExtractionDegenerate { distinct: 1, .. })));
    }
}

#[test]
fn adaptive_selection_keeps_the_best_score() {
    let chosen = select_best([
        (0.62, Method::ClusteringRgb),
        (0.81, Method::MedianCut),
        (0.77, Method::FastHeuristic),
    ]);
    assert_eq!(chosen, Some(Method::MedianCut));
}

#[test]
fn bad_template_fails_alone() {
    let palette = run("colorful.png", Method::MedianCut, 8);
    let jobs = [
        RenderJob {
            app: "broken".into(),
            source: "bg = {{ colors.nonexistent }}\n".into(),
        },
        RenderJob {
            app: "ghostty".into(),
            source: builtin::get("ghostty").unwrap().into(),
        },
    ];
    let results = Renderer::default().render_batch(&jobs, &palette);
    assert!(matches!(
        &results[0],
        Err(PaletteError::TemplateRender { app, .. }) if app == "broken"
    ));
    validate_ghostty(results[1].as_ref().unwrap());
}

#[test]
fn three_color_image_with_eight_requested() {
    let samples = load_samples(&fixture("three-colors.png")).unwrap();
    for method in [
        Method::ClusteringRgb,
        Method::ClusteringPerceptual,
        Method::MedianCut,
        Method::FastHeuristic,
    ] {
        let candidate = extractor_for(method)
            .unwrap()
            .extract(&samples, 8, Deadline::none())
            .unwrap();
        assert!(candidate.len() <= 3, "{method}: {}", candidate.len());
    }

    let palette = run("three-colors.png", Method::Adaptive, 8);
    assert_eq!(palette.iter().count(), 21);
    assert!(palette.text_contrast() >= 4.5);
    assert!(palette.warnings().contains(&PaletteWarning::ExtractionDegenerate {
        distinct: 3,
        requested: 8,
    }));
}

// ---------------------------------------------------------------------------
// Pipeline properties
// ---------------------------------------------------------------------------

#[test]
fn large_images_are_downsampled() {
    let samples = load_samples(&fixture("large-gradient.png")).unwrap();
    assert_eq!(samples.dimensions(), (256, 128));
    assert_eq!(samples.len(), 256 * 128);
}

#[test]
fn every_method_is_deterministic() {
    for method in Method::ALL {
        let first = run("colorful.png", method, 8);
        let second = run("colorful.png", method, 8);
        assert_eq!(first, second, "{method} is not reproducible");
    }
}

#[test]
fn adaptive_matches_best_of_comparison() {
    let samples = load_samples(&fixture("colorful.png")).unwrap();
    let config = PipelineConfig {
        method: Method::Adaptive,
        k: 8,
        ..PipelineConfig::default()
    };
    let ranked = pipeline::compare(&samples, &config);
    let adaptive = pipeline::run_samples(&samples, &config).unwrap();
    assert_eq!(ranked.len(), 4);
    assert_eq!(adaptive, ranked[0]);
    assert!(ranked
        .iter()
        .all(|p| p.quality().total <= adaptive.quality().total));
}

#[test]
fn pale_image_still_meets_text_contrast() {
    for method in Method::ALL {
        let palette = run("pale.png", method, 6);
        assert!(
            palette.text_contrast() >= 4.5,
            "{method}: {:.2}",
            palette.text_contrast()
        );
    }
}

#[test]
fn missing_and_corrupt_images_are_reported() {
    let missing = pipeline::run(Path::new("/no/such/wallpaper.png"), &PipelineConfig::default());
    assert!(matches!(missing, Err(PaletteError::ImageMissing { .. })));

    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.png");
    std::fs::write(&corrupt, b"definitely not a png").unwrap();
    let result = pipeline::run(&corrupt, &PipelineConfig::default());
    assert!(matches!(result, Err(PaletteError::ImageDecode { .. })));
}

#[test]
fn json_output_carries_roles_quality_and_warnings() {
    let palette = run("solid-red.png", Method::MedianCut, 6);
    let json: serde_json::Value = serde_json::from_str(&palette.to_json().unwrap()).unwrap();
    assert_eq!(json["method"], "median_cut");
    assert_eq!(json["roles"]["primary"], "#ff0000");
    assert_eq!(json["roles"]["terminal"].as_array().unwrap().len(), 16);
    assert!(json["quality"]["breakdown"]["contrast"].is_number());
    assert_eq!(json["warnings"][0]["kind"], "extraction_degenerate");
}

/// Built-in Ghostty output: six special colors followed by sixteen slots.
fn validate_ghostty(output: &str) {
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 22, "got {} lines", lines.len());
    assert!(lines[0].starts_with("background = #"));
    assert!(lines[1].starts_with("foreground = #"));
    for i in 0..16 {
        let prefix = format!("palette = {i}=#");
        assert!(lines[6 + i].starts_with(&prefix), "line {}: {}", 6 + i, lines[6 + i]);
    }
    for line in &lines {
        let pos = line.find('#').unwrap();
        let hex = &line[pos..];
        assert_eq!(hex.len(), 7, "{line}");
        assert!(hex[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_samples() -> impl Strategy<Value = SampleSet> {
        proptest::collection::vec(proptest::array::uniform3(0u8..=255u8), 1..=256).prop_map(
            |pixels| {
                let colors = pixels
                    .into_iter()
                    .map(|[r, g, b]| Color::new(r, g, b))
                    .collect();
                SampleSet::from_colors(colors)
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn extractors_stay_within_k(samples in arb_samples(), k in 1usize..=32) {
            for method in [
                Method::ClusteringRgb,
                Method::ClusteringPerceptual,
                Method::MedianCut,
                Method::FastHeuristic,
            ] {
                let candidate = extractor_for(method)
                    .unwrap()
                    .extract(&samples, k, Deadline::none())
                    .unwrap();
                prop_assert!(!candidate.is_empty());
                prop_assert!(candidate.len() <= k, "{}: {} > {}", method, candidate.len(), k);
                prop_assert!(candidate.total_weight() <= 1.0 + 1e-3);
                let weights: Vec<f32> = candidate.swatches().iter().map(|s| s.weight).collect();
                prop_assert!(weights.windows(2).all(|w| w[0] >= w[1]));
            }
        }

        #[test]
        fn text_contrast_always_holds(samples in arb_samples(), k in 4usize..=16) {
            for method in [Method::MedianCut, Method::ClusteringPerceptual, Method::Adaptive] {
                let config = PipelineConfig { method, k, ..PipelineConfig::default() };
                let palette = pipeline::run_samples(&samples, &config).unwrap();
                let ratio = Color::contrast_ratio(&palette.get(Role::Background), &palette.get(Role::Text));
                prop_assert!(ratio >= 4.5, "{}: {:.2}", method, ratio);
                let q = palette.quality().total;
                prop_assert!((0.0..=1.0).contains(&q));
            }
        }

        #[test]
        fn ghostty_output_is_well_formed(samples in arb_samples()) {
            let palette = pipeline::run_samples(&samples, &PipelineConfig::default()).unwrap();
            let output = Renderer::default()
                .render("ghostty", builtin::get("ghostty").unwrap(), &palette)
                .unwrap();
            prop_assert_eq!(output.lines().count(), 22);
        }
    }
}

// ---------------------------------------------------------------------------
// CLI integration tests (run the actual binary)
// ---------------------------------------------------------------------------

fn wallhue() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wallhue"));
    // Keep the user's own config out of the way.
    cmd.env("XDG_CONFIG_HOME", fixture_dir().join("no-config"));
    cmd
}

#[test]
fn cli_extract_json() {
    let output = wallhue()
        .args(["extract", "-m", "median_cut", "--json"])
        .arg(fixture("colorful.png"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["method"], "median_cut");
}

#[test]
fn cli_render_builtin() {
    let output = wallhue()
        .args(["render", "-k", "8"])
        .arg(fixture("colorful.png"))
        .arg("builtin:ghostty")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    validate_ghostty(&String::from_utf8_lossy(&output.stdout));
}

#[test]
fn cli_missing_image_fails() {
    let output = wallhue()
        .args(["extract", "/no/such/image.png"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
}

#[test]
fn cli_apply_reports_each_app() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let good = dir.path().join("out/palette.json");
    std::fs::write(
        &config,
        format!(
            "colors = 6\n\n\
             [[app]]\nname = \"json\"\ntemplate = \"builtin:json\"\noutput = \"{}\"\n\n\
             [[app]]\nname = \"broken\"\ntemplate = \"{}\"\noutput = \"{}\"\n",
            good.display(),
            dir.path().join("missing.j2").display(),
            dir.path().join("broken.out").display(),
        ),
    )
    .unwrap();

    let output = wallhue()
        .arg("apply")
        .arg(fixture("colorful.png"))
        .arg("-c")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok    json"), "{stdout}");
    assert!(stdout.contains("FAIL  broken"), "{stdout}");
    assert!(good.exists());
}

#[test]
fn cli_lists_and_checks_templates() {
    let output = wallhue().arg("templates").output().unwrap();
    assert!(output.status.success());
    let listed = String::from_utf8_lossy(&output.stdout);
    for name in builtin::names() {
        assert!(listed.contains(&format!("builtin:{name}")), "{listed}");
    }

    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.j2");
    std::fs::write(&broken, "fg = {{ colors.foreground }}\n").unwrap();
    let output = wallhue()
        .args(["check", "builtin:ghostty", "builtin:zellij"])
        .arg(&broken)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok    builtin:ghostty"), "{stdout}");
    assert!(stdout.contains("ok    builtin:zellij"), "{stdout}");
    assert!(stdout.contains("FAIL"), "{stdout}");
}
