//! Error types for tile optimization.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while optimizing a tile.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Container, payload or metadata framing problem.
    #[error(transparent)]
    Format(#[from] tileforged_format::Error),

    /// The image codec could not decode the payload.
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    /// Re-encoding a decoded image failed.
    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// A specific image of the tile failed; the whole tile is abandoned.
    #[error("image {index}: {source}")]
    Image {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error occurred.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker panicked while processing the file.
    #[error("worker panicked: {0}")]
    Panicked(String),

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Create an unsupported image error.
    pub fn unsupported_image(msg: impl Into<String>) -> Self {
        Self::UnsupportedImage(msg.into())
    }

    /// Create an I/O error tied to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attribute this error to the image at `index`.
    pub fn in_image(self, index: usize) -> Self {
        Self::Image {
            index,
            source: Box::new(self),
        }
    }

    /// Whether this error came from an image that could not be decoded.
    pub fn is_unsupported_image(&self) -> bool {
        match self {
            Self::UnsupportedImage(_) => true,
            Self::Image { source, .. } => source.is_unsupported_image(),
            _ => false,
        }
    }
}
