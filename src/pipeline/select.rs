use rand::Rng;
use serde::Deserialize;

use crate::color::{Color, Hsl};

/// Number of accent colors every extraction produces.
pub const ACCENT_COUNT: usize = 4;

/// Seed used when there is nothing at all to derive accents from.
const NEUTRAL_SEED: Color = Color::new(100, 100, 100);

/// Perceptual bounds a candidate must satisfy to be used as an accent.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Darker candidates are dropped.
    pub min_lightness: f32,
    /// Lighter candidates are dropped.
    pub max_lightness: f32,
    /// Grayer candidates are dropped.
    pub min_saturation: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_lightness: 0.15,
            max_lightness: 0.85,
            min_saturation: 0.25,
        }
    }
}

impl FilterConfig {
    pub fn accepts(&self, hsl: Hsl) -> bool {
        hsl.lightness >= self.min_lightness
            && hsl.lightness <= self.max_lightness
            && hsl.saturation >= self.min_saturation
    }
}

/// Supplies the signed channel offset for each padding step.
pub trait OffsetSource: Send + Sync {
    fn offset(&self) -> i16;
}

impl<F> OffsetSource for F
where
    F: Fn() -> i16 + Send + Sync,
{
    fn offset(&self) -> i16 {
        self()
    }
}

/// Picks `+magnitude` or `-magnitude` with equal probability on every call.
#[derive(Debug, Clone, Copy)]
pub struct RandomOffset {
    magnitude: i16,
}

impl RandomOffset {
    pub fn new(magnitude: u8) -> Self {
        Self {
            magnitude: i16::from(magnitude),
        }
    }
}

impl OffsetSource for RandomOffset {
    fn offset(&self) -> i16 {
        if rand::thread_rng().gen_bool(0.5) {
            self.magnitude
        } else {
            -self.magnitude
        }
    }
}

/// The accents chosen from one palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub colors: [Color; ACCENT_COUNT],
    /// Palette entries that passed the filter (before truncation).
    pub survivors: usize,
    /// Entries synthesized by padding.
    pub padded: usize,
}

impl Selection {
    pub fn to_hex(&self) -> [String; ACCENT_COUNT] {
        self.colors.map(Color::to_hex)
    }
}

/// Keep the candidates the filter accepts, most saturated first.
///
/// The sort is stable: equally saturated colors keep their palette order.
pub fn filter_and_rank(palette: &[Color], filter: &FilterConfig) -> Vec<Color> {
    let mut ranked: Vec<(Color, Hsl)> = palette
        .iter()
        .map(|&c| (c, c.to_hsl()))
        .filter(|(_, hsl)| filter.accepts(*hsl))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.saturation.total_cmp(&a.saturation));
    ranked.into_iter().map(|(c, _)| c).collect()
}

/// The entry with the highest HSL lightness; the earliest one wins ties.
pub fn lightest(palette: &[Color]) -> Option<Color> {
    palette
        .iter()
        .map(|&c| (c, c.to_hsl().lightness))
        .reduce(|best, next| if next.1 > best.1 { next } else { best })
        .map(|(c, _)| c)
}

/// Filter, rank and pad `palette` into exactly [`ACCENT_COUNT`] colors.
///
/// If nothing survives filtering the lightest palette entry seeds the result,
/// or a neutral gray when the palette is empty. Short results are padded with
/// variants of the first entry shifted by `offsets` on every channel.
pub fn select_accents(
    palette: &[Color],
    filter: &FilterConfig,
    offsets: &impl OffsetSource,
) -> Selection {
    let mut working = filter_and_rank(palette, filter);
    let survivors = working.len();
    crate::debug!("select"; "{survivors} of {} candidates passed the filter", palette.len());

    if working.is_empty() {
        let seed = lightest(palette).unwrap_or(NEUTRAL_SEED);
        crate::debug!("select"; "no vivid candidates, seeding with {seed}");
        working.push(seed);
    }

    let mut padded = 0;
    while working.len() < ACCENT_COUNT {
        let base = working[0];
        working.push(base.shifted(offsets.offset()));
        padded += 1;
    }

    Selection {
        colors: std::array::from_fn(|i| working[i]),
        survivors,
        padded,
    }
}
