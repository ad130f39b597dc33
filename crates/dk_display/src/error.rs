use std::io;

use dk_platform::PlatformError;
use thiserror::Error;

/// A native resource could not be built from its descriptor.
///
/// Always recoverable: the cache is left unchanged and the caller may retry or substitute a
/// placeholder.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("image '{uri}' has no byte source")]
    NoSource { uri: String },

    #[error("cannot read image '{uri}': {source}")]
    Read {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode image '{uri}': {source}")]
    Decode {
        uri: String,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Native(#[from] PlatformError),

    #[error("display environment has been torn down")]
    Disposed,
}

/// Display environment errors.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// `main()` was called before any thread created a display environment.
    #[error("main UI thread not running")]
    NotRunning,

    #[error("display environment belongs to another thread")]
    WrongThread,

    #[error("display environment has been torn down")]
    Disposed,

    #[error("platform reported no monitors")]
    NoMonitors,

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

pub type DisplayResult<T> = Result<T, DisplayError>;
