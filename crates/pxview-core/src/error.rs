//! Error types for pxview-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failures that can occur on plain values:
//! - Cell array allocation
//! - Color string parsing
//! - Region validation
//!
//! # Usage
//!
//! ```rust
//! use pxview_core::{Error, Result};
//!
//! fn check_row(y: u32, height: u32) -> Result<()> {
//!     if y >= height {
//!         return Err(Error::out_of_bounds(0, y, 1, height));
//!     }
//!     Ok(())
//! }
//! assert!(check_row(3, 2).is_err());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur on cells, colors and regions.
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds), [`InvalidRegion`](Error::InvalidRegion)
/// - **Allocation errors**: [`OutOfMemory`](Error::OutOfMemory)
/// - **Color errors**: [`UnrecognizedColor`](Error::UnrecognizedColor)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Pixel coordinates are outside store bounds.
    #[error("pixel ({x}, {y}) out of bounds for image {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Region has zero area or does not fit where it was requested.
    #[error("invalid region ({x}, {y}, {width}x{height}): {reason}")]
    InvalidRegion {
        /// Region X origin
        x: u32,
        /// Region Y origin
        y: u32,
        /// Region width
        width: u32,
        /// Region height
        height: u32,
        /// Why the region was rejected
        reason: String,
    },

    /// Allocation of a cell array (or other control block) failed.
    ///
    /// This is classified as fatal: the operation that needed the memory
    /// produces no value at all.
    #[error("memory allocation failed: {count} cells requested")]
    OutOfMemory {
        /// Number of elements requested
        count: usize,
    },

    /// A color specification string could not be parsed.
    #[error("unrecognized color `{0}`")]
    UnrecognizedColor(String),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(x: u32, y: u32, width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            x,
            y,
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::OutOfMemory`] error.
    #[inline]
    pub fn out_of_memory(count: usize) -> Self {
        Self::OutOfMemory { count }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }

    /// Returns `true` if the error must not be recovered from.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}
