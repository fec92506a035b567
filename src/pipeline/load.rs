use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use thiserror::Error;
use url::Url;

/// Why an image could not be turned into pixels.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid image source `{input}`: {reason}")]
    InvalidSource { input: String, reason: String },

    #[error("unsupported URL scheme `{0}`: only local paths and file:// URLs can be read")]
    UnsupportedScheme(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt image: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image load timed out after {0:?}")]
    TimedOut(Duration),

    #[error("image load cancelled")]
    Cancelled,

    #[error("image decode task failed")]
    Task(#[from] tokio::task::JoinError),
}

/// An awaitable image resource.
///
/// A load settles exactly once, with decoded pixels or an error.
pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &str) -> impl Future<Output = Result<DynamicImage, LoadError>> + Send;
}

/// Reads images from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl ImageLoader for FsLoader {
    fn load(&self, source: &str) -> impl Future<Output = Result<DynamicImage, LoadError>> + Send {
        let resolved = resolve_path(source);
        async move {
            let path = resolved?;
            let bytes = tokio::fs::read(&path).await.map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    LoadError::NotFound(path.clone())
                } else {
                    LoadError::Io {
                        path: path.clone(),
                        source: err,
                    }
                }
            })?;
            tokio::task::spawn_blocking(move || decode(&path, &bytes)).await?
        }
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<DynamicImage, LoadError> {
    image::load_from_memory(bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Map a source string to a filesystem path.
///
/// `file://` URLs are converted; strings that do not parse as an absolute URL
/// (relative paths, Windows drive paths) are taken as paths verbatim.
pub fn resolve_path(source: &str) -> Result<PathBuf, LoadError> {
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => {
            url.to_file_path().map_err(|()| LoadError::InvalidSource {
                input: source.to_string(),
                reason: "not a local file path".to_string(),
            })
        }
        // A single-letter scheme is a drive letter.
        Ok(url) if url.scheme().len() > 1 => {
            Err(LoadError::UnsupportedScheme(url.scheme().to_string()))
        }
        _ => Ok(PathBuf::from(source)),
    }
}
