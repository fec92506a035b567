use image::imageops::FilterType;
use image::DynamicImage;
use kmeans_colors::get_kmeans_hamerly;
use palette::{IntoColor, Lab, Srgb};

use crate::color::Color;

/// Reduces an image to a handful of representative colors.
///
/// Implementations return at most `count` colors, most representative first.
/// They may return fewer, or none at all.
pub trait Quantizer: Send + Sync {
    fn quantize(&self, image: &DynamicImage, count: usize) -> Vec<Color>;
}

/// A color extracted from the image with its cluster weight.
#[derive(Debug, Clone)]
pub struct WeightedColor {
    pub color: Color,
    pub weight: f32,
}

const MAX_ITER: usize = 20;
const CONVERGE: f32 = 5.0;
const DEDUP_THRESHOLD: f32 = 25.0; // ΔE² < 25 means ΔE < 5
const MIN_ALPHA: u8 = 125;
const SEED: u64 = 42;

/// K-means clustering in CIELAB space (Hamerly's algorithm, K-means++ init).
#[derive(Debug, Clone, Copy)]
pub struct KMeansQuantizer {
    max_dimension: u32,
}

impl KMeansQuantizer {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl Default for KMeansQuantizer {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Quantizer for KMeansQuantizer {
    fn quantize(&self, image: &DynamicImage, count: usize) -> Vec<Color> {
        let pixels = prepare_pixels(image, self.max_dimension);
        cluster(&pixels, count)
            .into_iter()
            .map(|c| c.color)
            .collect()
    }
}

/// Resize to fit within `max_dim` x `max_dim` (preserving aspect ratio) and
/// convert every sufficiently opaque pixel to CIELAB.
pub fn prepare_pixels(image: &DynamicImage, max_dim: u32) -> Vec<Lab> {
    let image = if image.width() > max_dim || image.height() > max_dim {
        image.resize(max_dim, max_dim, FilterType::Lanczos3)
    } else {
        image.clone()
    };

    image
        .to_rgba8()
        .pixels()
        .filter(|p| p[3] >= MIN_ALPHA)
        .map(|p| {
            let srgb: Srgb<f32> = Srgb::new(p[0], p[1], p[2]).into_format();
            srgb.into_color()
        })
        .collect()
}

/// Run K-means on LAB pixels.
///
/// Returns deduplicated colors sorted by weight (descending). An empty pixel
/// buffer or `k == 0` yields no colors.
pub fn cluster(pixels: &[Lab], k: usize) -> Vec<WeightedColor> {
    // Cluster indices are u8.
    let k = k.min(pixels.len()).min(u8::MAX as usize);
    if k == 0 {
        return Vec::new();
    }

    let result = get_kmeans_hamerly(k, MAX_ITER, CONVERGE, false, pixels, SEED);

    let total = pixels.len() as f32;
    let mut counts = vec![0u32; k];
    for &idx in &result.indices {
        counts[idx as usize] += 1;
    }

    let mut colors: Vec<WeightedColor> = result
        .centroids
        .iter()
        .enumerate()
        .filter(|(i, _)| counts[*i] > 0)
        .map(|(i, lab)| WeightedColor {
            color: Color::from_lab(*lab),
            weight: counts[i] as f32 / total,
        })
        .collect();

    deduplicate(&mut colors);
    colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    colors
}

/// Merge colors that are too similar (ΔE < 5 in LAB space).
/// Keeps the first color and accumulates the weight.
fn deduplicate(colors: &mut Vec<WeightedColor>) {
    let mut i = 0;
    while i < colors.len() {
        let lab_i = colors[i].color.to_lab();
        let mut j = i + 1;
        while j < colors.len() {
            let lab_j = colors[j].color.to_lab();
            let delta_e_sq = (lab_i.l - lab_j.l).powi(2)
                + (lab_i.a - lab_j.a).powi(2)
                + (lab_i.b - lab_j.b).powi(2);
            if delta_e_sq < DEDUP_THRESHOLD {
                colors[i].weight += colors[j].weight;
                colors.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}
