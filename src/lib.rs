pub mod cli;
pub mod color;
pub mod config;
pub mod logger;
pub mod output;
pub mod pipeline;
pub mod tui;

pub use pipeline::extract::{extract_dominant_colors, Extraction, Extractor, Outcome};
