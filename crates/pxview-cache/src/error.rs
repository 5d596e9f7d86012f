//! Error types for the pixel store and its views.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store and view operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors raised by [`PixelStore`](crate::PixelStore), [`PixelCache`](crate::PixelCache)
/// and [`RegionView`](crate::RegionView) implementations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Bounds, region or allocation failure from the core types.
    #[error(transparent)]
    Core(#[from] pxview_core::Error),

    /// I/O error reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// A config value is out of range.
    #[error("invalid cache config: {0}")]
    InvalidConfig(String),

    /// Pixel data does not match the store dimensions.
    #[error("pixel data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// Commit requested without a staged write.
    #[error("nothing to commit: no row was requested for write")]
    NothingToCommit,

    /// The store refuses writes.
    #[error("pixel store is read-only")]
    ReadOnly,

    /// Allocating another page would exceed `max_pages`.
    #[error("page limit reached: {limit} pages resident")]
    ResourceLimit {
        /// Configured limit.
        limit: usize,
    },

    /// A thread panicked while holding the store lock.
    #[error("pixel store lock poisoned")]
    Poisoned,
}

impl CacheError {
    /// Creates an out-of-bounds error for the given pixel and store size.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::Core(pxview_core::Error::out_of_bounds(x, y, width, height))
    }

    /// Creates an [`CacheError::InvalidConfig`] error.
    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns `true` if a request fell outside the store.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::Core(err) if err.is_bounds_error())
    }

    /// Returns `true` if the store refused or could not take a write.
    #[inline]
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            Self::ReadOnly | Self::NothingToCommit | Self::ResourceLimit { .. }
        )
    }

    /// Returns `true` if the error must not be recovered from.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Core(err) => err.is_fatal(),
            Self::Poisoned => true,
            _ => false,
        }
    }
}
