use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::cli::Args;
use crate::pipeline::select::FilterConfig;

/// Extraction settings, loaded from TOML and overridable from the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Colors requested from the quantizer before filtering.
    pub candidates: usize,
    /// Magnitude of the per-channel offset used to pad short palettes.
    pub offset: u8,
    /// Images are downscaled to fit within this many pixels per side before quantizing.
    pub max_dimension: u32,
    /// Give up on an image load after this many milliseconds. Unset waits indefinitely.
    pub load_timeout_ms: Option<u64>,
    pub filter: FilterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            candidates: 10,
            offset: 30,
            max_dimension: 256,
            load_timeout_ms: None,
            filter: FilterConfig::default(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("invalid config")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Defaults, then the `--config` file, then command-line overrides.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(candidates) = args.candidates {
            config.candidates = candidates;
        }
        if let Some(ms) = args.timeout_ms {
            config.load_timeout_ms = Some(ms);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=255).contains(&self.candidates) {
            bail!("candidates must be between 1 and 255, got {}", self.candidates);
        }
        if self.max_dimension == 0 {
            bail!("max_dimension must be positive");
        }
        let f = &self.filter;
        for (name, value) in [
            ("min_lightness", f.min_lightness),
            ("max_lightness", f.max_lightness),
            ("min_saturation", f.min_saturation),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("filter.{name} must be within [0, 1], got {value}");
            }
        }
        if f.min_lightness > f.max_lightness {
            bail!(
                "filter.min_lightness ({}) exceeds filter.max_lightness ({})",
                f.min_lightness,
                f.max_lightness
            );
        }
        Ok(())
    }
}
