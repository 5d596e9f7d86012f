//! # pxview-core
//!
//! Core types for row-granular pixel region access.
//!
//! This crate provides the value types shared by the store, the views over it
//! and the row iterator:
//!
//! - [`Quantum`], [`QUANTUM_MAX`] - integer channel encoding of the backing store
//! - [`Colorspace`], [`StorageClass`], [`StoreTraits`] - store metadata that
//!   decides how the auxiliary index channel is routed
//! - [`PixelPacket`], [`MagickPixel`] - native and floating-point pixel forms
//! - [`ColorCell`] - one mutable pixel in normalized and quantized form
//! - [`Rect`] - region of interest
//! - [`IdFactory`], [`ObjectId`] - locally scoped object identifiers
//!
//! ## Crate Structure
//!
//! ```text
//! pxview-core (this crate)
//!    ^
//!    |
//!    +-- pxview-cache (paged store, region views)
//!    +-- pxview-iter (row iterator, histogram builders)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for metadata and color types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cell;
pub mod color_name;
pub mod colorspace;
pub mod error;
pub mod exception;
pub mod id;
pub mod pixel;
pub mod quantum;
pub mod rect;

// Re-exports for convenience
pub use cell::{AuxChannel, Channel, ColorCell};
pub use color_name::{parse_color, ParsedColor};
pub use colorspace::{Colorspace, IndexRouting, StorageClass, StoreTraits};
pub use error::{Error, Result};
pub use exception::{Exception, Severity};
pub use id::{IdFactory, Named, ObjectId};
pub use pixel::{is_color_equal, is_color_similar, IndexPacket, MagickPixel, PixelPacket};
pub use quantum::{from_quantum, to_quantum, Quantum, QUANTUM_DEPTH, QUANTUM_MAX, QUANTUM_RANGE};
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use pxview_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cell::{AuxChannel, Channel, ColorCell};
    pub use crate::colorspace::{Colorspace, IndexRouting, StorageClass, StoreTraits};
    pub use crate::error::{Error, Result};
    pub use crate::exception::{Exception, Severity};
    pub use crate::id::{IdFactory, Named, ObjectId};
    pub use crate::pixel::{IndexPacket, MagickPixel, PixelPacket};
    pub use crate::quantum::{Quantum, QUANTUM_MAX};
    pub use crate::rect::Rect;
}
