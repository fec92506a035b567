use std::future::Future;
use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;

use crate::color::Color;
use crate::config::Config;

use super::load::{FsLoader, ImageLoader, LoadError};
use super::quantize::{KMeansQuantizer, Quantizer};
use super::select::{select_accents, OffsetSource, RandomOffset, ACCENT_COUNT};

/// Returned when the image cannot be loaded or decoded.
pub const LOAD_FAILURE_PALETTE: [&str; ACCENT_COUNT] = ["#4a6fa5", "#166088", "#4a6fa5", "#166088"];

/// Returned when the quantizer finds no colors at all.
pub const EMPTY_PALETTE: [&str; ACCENT_COUNT] = ["#555", "#666", "#777", "#888"];

/// Which path through the pipeline produced the accents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Outcome {
    /// At least one palette color passed the filter.
    Extracted { survivors: usize, padded: usize },
    /// Nothing passed the filter; accents derive from the lightest palette color.
    Monochrome { padded: usize },
    LoadFailed,
    EmptyPalette,
}

/// The accents for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub source: String,
    pub colors: [String; ACCENT_COUNT],
    pub outcome: Outcome,
}

impl Extraction {
    fn fallback(source: &str, palette: [&str; ACCENT_COUNT], outcome: Outcome) -> Self {
        Self {
            source: source.to_string(),
            colors: palette.map(str::to_string),
            outcome,
        }
    }
}

/// Loads an image, quantizes it and picks four accent colors.
///
/// Extraction never fails: load errors and empty palettes resolve to fixed
/// fallback palettes.
pub struct Extractor<L = FsLoader, Q = KMeansQuantizer, R = RandomOffset> {
    loader: L,
    quantizer: Arc<Q>,
    offsets: R,
    config: Config,
}

impl Extractor {
    /// The filesystem loader, K-means quantizer and random padding.
    pub fn new(config: Config) -> Self {
        Self {
            loader: FsLoader,
            quantizer: Arc::new(KMeansQuantizer::new(config.max_dimension)),
            offsets: RandomOffset::new(config.offset),
            config,
        }
    }
}

impl<L, Q, R> Extractor<L, Q, R>
where
    L: ImageLoader,
    Q: Quantizer + 'static,
    R: OffsetSource,
{
    pub fn with_parts(loader: L, quantizer: Q, offsets: R, config: Config) -> Self {
        Self {
            loader,
            quantizer: Arc::new(quantizer),
            offsets,
            config,
        }
    }

    /// Extract accents for `source`, waiting as long as the load takes
    /// (bounded only by the configured timeout).
    pub async fn extract(&self, source: &str) -> Extraction {
        self.extract_until(source, std::future::pending()).await
    }

    /// Like [`extract`](Self::extract), but abandons the load as soon as
    /// `cancel` completes, resolving with the load-failure palette.
    pub async fn extract_until<C>(&self, source: &str, cancel: C) -> Extraction
    where
        C: Future<Output = ()>,
    {
        let image = match self.load(source, cancel).await {
            Ok(image) => image,
            Err(err) => {
                crate::log!("load"; "{err}, using fallback accents");
                return Extraction::fallback(source, LOAD_FAILURE_PALETTE, Outcome::LoadFailed);
            }
        };

        let palette = self.quantize(image).await;
        if palette.is_empty() {
            crate::log!("quantize"; "{source}: no colors found, using fallback accents");
            return Extraction::fallback(source, EMPTY_PALETTE, Outcome::EmptyPalette);
        }
        crate::debug!("quantize"; "{source}: {} candidate colors", palette.len());

        let selection = select_accents(&palette, &self.config.filter, &self.offsets);
        let outcome = if selection.survivors == 0 {
            crate::log!("select"; "{source}: no vivid colors, deriving accents from the lightest");
            Outcome::Monochrome {
                padded: selection.padded,
            }
        } else {
            Outcome::Extracted {
                survivors: selection.survivors,
                padded: selection.padded,
            }
        };

        Extraction {
            source: source.to_string(),
            colors: selection.to_hex(),
            outcome,
        }
    }

    async fn load<C>(&self, source: &str, cancel: C) -> Result<DynamicImage, LoadError>
    where
        C: Future<Output = ()>,
    {
        let load = async {
            let pending = self.loader.load(source);
            match self.config.load_timeout() {
                Some(limit) => tokio::time::timeout(limit, pending)
                    .await
                    .unwrap_or(Err(LoadError::TimedOut(limit))),
                None => pending.await,
            }
        };

        tokio::select! {
            result = load => result,
            () = cancel => Err(LoadError::Cancelled),
        }
    }

    async fn quantize(&self, image: DynamicImage) -> Vec<Color> {
        let quantizer = Arc::clone(&self.quantizer);
        let count = self.config.candidates;
        tokio::task::spawn_blocking(move || quantizer.quantize(&image, count))
            .await
            .unwrap_or_else(|err| {
                crate::log!("quantize"; "quantizer task failed: {err}");
                Vec::new()
            })
    }
}

/// Extract four accent colors from the image at `source` with default settings.
pub async fn extract_dominant_colors(source: &str) -> [String; ACCENT_COUNT] {
    Extractor::new(Config::default()).extract(source).await.colors
}
