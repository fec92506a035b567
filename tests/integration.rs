use std::path::{Path, PathBuf};
use std::process::Command;

use coverhue::color::Color;
use coverhue::config::Config;
use coverhue::pipeline::extract::{Outcome, EMPTY_PALETTE, LOAD_FAILURE_PALETTE};
use coverhue::pipeline::quantize::{KMeansQuantizer, Quantizer};
use coverhue::pipeline::select::{select_accents, FilterConfig};
use coverhue::{extract_dominant_colors, Extractor};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn create_colorful(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let region = (x / 16) + (y / 16) * 4;
        match region % 8 {
            0 => image::Rgb([220, 50, 50]),   // red
            1 => image::Rgb([50, 200, 50]),   // green
            2 => image::Rgb([50, 50, 220]),   // blue
            3 => image::Rgb([220, 220, 50]),  // yellow
            4 => image::Rgb([200, 50, 200]),  // magenta
            5 => image::Rgb([50, 200, 200]),  // cyan
            6 => image::Rgb([20, 20, 20]),    // black
            _ => image::Rgb([240, 240, 240]), // white
        }
    });
    img.save(path).unwrap();
}

fn create_monochrome(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let v = ((x * 255) / 64 + (y * 255) / 64) as u8 / 2;
        image::Rgb([v, v, v])
    });
    img.save(path).unwrap();
}

fn create_single_hue(path: &Path) {
    let img = image::RgbImage::from_pixel(32, 32, image::Rgb([204, 51, 51]));
    img.save(path).unwrap();
}

fn create_transparent(path: &Path) {
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([255, 0, 0, 0]));
    img.save(path).unwrap();
}

struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        create_colorful(&dir.path().join("colorful.png"));
        create_monochrome(&dir.path().join("monochrome.png"));
        create_single_hue(&dir.path().join("single-hue.png"));
        create_transparent(&dir.path().join("transparent.png"));
        std::fs::write(dir.path().join("not_an_image.png"), "this is not an image").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn source(&self, name: &str) -> String {
        self.path(name).to_str().unwrap().to_string()
    }
}

fn is_hex6(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

fn assert_accent_shape(colors: &[String; 4]) {
    for c in colors {
        assert!(is_hex6(c), "not a lowercase #rrggbb color: {c}");
    }
}

// ---------------------------------------------------------------------------
// End-to-end extraction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn colorful_image_yields_vivid_accents() {
    let fx = Fixtures::new();
    let result = Extractor::new(Config::default())
        .extract(&fx.source("colorful.png"))
        .await;

    assert_accent_shape(&result.colors);
    assert!(
        matches!(result.outcome, Outcome::Extracted { padded: 0, .. }),
        "expected at least four vivid colors, got {:?}",
        result.outcome
    );
    for hex in &result.colors {
        let hsl = Color::from_hex(hex).unwrap().to_hsl();
        assert!(
            FilterConfig::default().accepts(hsl),
            "{hex} should be vivid and mid-toned, got {hsl:?}"
        );
    }
}

#[tokio::test]
async fn monochrome_image_falls_back_to_lightest_gray() {
    let fx = Fixtures::new();
    let result = Extractor::new(Config::default())
        .extract(&fx.source("monochrome.png"))
        .await;

    assert_accent_shape(&result.colors);
    assert!(matches!(result.outcome, Outcome::Monochrome { padded: 3 }));

    let seed = Color::from_hex(&result.colors[0]).unwrap();
    for hex in &result.colors[1..] {
        let variant = Color::from_hex(hex).unwrap();
        for (base, v) in [(seed.r, variant.r), (seed.g, variant.g), (seed.b, variant.b)] {
            assert!(
                (i16::from(base) - i16::from(v)).abs() <= 30,
                "variant {hex} strays too far from {seed}"
            );
        }
    }
}

#[tokio::test]
async fn single_hue_image_is_padded_around_it() {
    let fx = Fixtures::new();
    let colors = extract_dominant_colors(&fx.source("single-hue.png")).await;

    assert_accent_shape(&colors);
    assert_eq!(colors[0], "#cc3333");
    for hex in &colors[1..] {
        assert!(
            hex == "#ea5151" || hex == "#ae1515",
            "unexpected padded variant {hex}"
        );
    }
}

#[tokio::test]
async fn transparent_image_yields_empty_palette_fallback() {
    let fx = Fixtures::new();
    let colors = extract_dominant_colors(&fx.source("transparent.png")).await;
    assert_eq!(colors, EMPTY_PALETTE);
}

#[tokio::test]
async fn unreadable_sources_yield_load_fallback() {
    let fx = Fixtures::new();
    for source in [
        fx.source("not_an_image.png"),
        fx.source("missing.png"),
        "https://example.com/cover.jpg".to_string(),
    ] {
        assert_eq!(extract_dominant_colors(&source).await, LOAD_FAILURE_PALETTE);
    }
}

#[tokio::test]
async fn concurrent_extractions_are_independent() {
    let fx = Fixtures::new();
    let extractor = std::sync::Arc::new(Extractor::new(Config::default()));

    let handles: Vec<_> = ["colorful.png", "missing.png", "transparent.png"]
        .into_iter()
        .map(|name| {
            let extractor = std::sync::Arc::clone(&extractor);
            let source = fx.source(name);
            tokio::spawn(async move { extractor.extract(&source).await })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().outcome);
    }
    assert!(matches!(outcomes[0], Outcome::Extracted { .. }));
    assert_eq!(outcomes[1], Outcome::LoadFailed);
    assert_eq!(outcomes[2], Outcome::EmptyPalette);
}

#[test]
fn kmeans_quantizer_respects_requested_count() {
    let fx = Fixtures::new();
    let img = image::open(fx.path("colorful.png")).unwrap();
    let palette = KMeansQuantizer::default().quantize(&img, 10);
    assert!(!palette.is_empty());
    assert!(palette.len() <= 10);
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_color() -> impl Strategy<Value = Color> {
        proptest::array::uniform3(0u8..=255u8).prop_map(|[r, g, b]| Color::new(r, g, b))
    }

    fn arb_palette() -> impl Strategy<Value = Vec<Color>> {
        proptest::collection::vec(arb_color(), 0..=10)
    }

    fn arb_offset() -> impl Strategy<Value = i16> {
        prop_oneof![Just(30i16), Just(-30i16)]
    }

    proptest! {
        #[test]
        fn always_four_lowercase_hex_colors(palette in arb_palette(), offset in arb_offset()) {
            let selection = select_accents(&palette, &FilterConfig::default(), &move || offset);
            let hex_re = regex::Regex::new(r"^#[0-9a-f]{6}$").unwrap();
            for hex in selection.to_hex() {
                prop_assert!(hex_re.is_match(&hex), "invalid hex: '{}'", hex);
            }
        }

        #[test]
        fn leading_accents_come_from_the_palette(palette in arb_palette(), offset in arb_offset()) {
            let selection = select_accents(&palette, &FilterConfig::default(), &move || offset);
            let kept = selection.survivors.min(4);
            for color in &selection.colors[..kept] {
                prop_assert!(palette.contains(color));
            }
        }

        #[test]
        fn survivors_are_sorted_by_saturation(palette in arb_palette(), offset in arb_offset()) {
            let selection = select_accents(&palette, &FilterConfig::default(), &move || offset);
            let kept = selection.survivors.min(4);
            for pair in selection.colors[..kept].windows(2) {
                prop_assert!(pair[0].to_hsl().saturation >= pair[1].to_hsl().saturation);
            }
        }

        #[test]
        fn padding_stays_within_offset_of_base(palette in arb_palette(), offset in arb_offset()) {
            let selection = select_accents(&palette, &FilterConfig::default(), &move || offset);
            let base = selection.colors[0];
            for variant in &selection.colors[4 - selection.padded..] {
                prop_assert_eq!(*variant, base.shifted(offset));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CLI integration tests (run the actual binary)
// ---------------------------------------------------------------------------

fn cargo_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_coverhue"))
}

#[test]
fn cli_prints_one_line_per_image() {
    let fx = Fixtures::new();
    let output = Command::new(cargo_bin())
        .args([fx.source("colorful.png"), fx.source("missing.png")])
        .output()
        .expect("failed to run binary");

    assert!(output.status.success(), "binary exited with error");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&format!("{}: #", fx.source("colorful.png"))));
    assert!(lines[1].ends_with("#4a6fa5 #166088 #4a6fa5 #166088"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file not found"), "stderr: {stderr}");
}

#[test]
fn cli_json_output_parses() {
    let fx = Fixtures::new();
    let output = Command::new(cargo_bin())
        .args([fx.source("transparent.png").as_str(), "--format", "json"])
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["colors"][0], "#555");
    assert_eq!(value[0]["outcome"]["kind"], "empty_palette");
}

#[test]
fn cli_output_flag_writes_file() {
    let fx = Fixtures::new();
    let out_path = fx.path("accents.css");

    let output = Command::new(cargo_bin())
        .args([
            fx.source("single-hue.png").as_str(),
            "--format",
            "css",
            "--output",
            out_path.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    let content = std::fs::read_to_string(&out_path).unwrap();
    assert!(content.contains(":root {"));
    assert!(content.contains("--accent-1: #cc3333;"));
}

#[test]
fn cli_rejects_bad_config() {
    let fx = Fixtures::new();
    let config = fx.path("coverhue.toml");
    std::fs::write(&config, "[filter]\nmin_lightness = 2.0\n").unwrap();

    let output = Command::new(cargo_bin())
        .args([
            fx.source("colorful.png").as_str(),
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("min_lightness"), "stderr: {stderr}");
}

#[test]
fn cli_help_output() {
    let output = Command::new(cargo_bin())
        .arg("--help")
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("coverhue"));
    assert!(stdout.contains("--format"));
    assert!(stdout.contains("--timeout-ms"));
    assert!(stdout.contains("--preview"));
}
