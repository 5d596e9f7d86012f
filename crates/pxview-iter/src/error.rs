//! Error types for the row iterator and histogram builders.

use pxview_cache::CacheError;
use pxview_core::Severity;
use thiserror::Error;

/// Result type for iterator operations.
pub type IterResult<T> = std::result::Result<T, IterError>;

/// Errors raised by [`RegionIterator`](crate::RegionIterator) and the histogram builders.
#[derive(Debug, Error)]
pub enum IterError {
    /// The requested region has zero width or height.
    #[error("region {width}x{height} has zero area")]
    ZeroRegionSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// `sync` was called while the cursor is not on a row.
    #[error("no current row to sync (cursor at {row})")]
    NotOnRow {
        /// Cursor position.
        row: i64,
    },

    /// `sync` was called on a row whose data is not in the scratch cells.
    #[error("row {row} was not read into the scratch cells (holding {loaded:?})")]
    RowNotLoaded {
        /// Cursor row.
        row: u32,
        /// Row the scratch cells hold, if any.
        loaded: Option<u32>,
    },

    /// A progress monitor asked to stop.
    #[error("{task} cancelled after {done} of {total}")]
    Cancelled {
        /// Operation name.
        task: String,
        /// Units completed.
        done: u64,
        /// Total units.
        total: u64,
    },

    /// Failure from the store or view.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Failure from the core types.
    #[error(transparent)]
    Core(#[from] pxview_core::Error),
}

impl IterError {
    /// Returns `true` if the error came from a store or view.
    #[inline]
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Self::Cache(_))
    }

    /// Returns `true` if a monitor stopped the operation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns `true` if the error must not be recovered from.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Cache(err) => err.is_fatal(),
            Self::Core(err) => err.is_fatal(),
            _ => false,
        }
    }

    /// Severity to record in an exception slot.
    pub fn severity(&self) -> Severity {
        if self.is_fatal() {
            Severity::Fatal
        } else if self.is_cancelled() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}
