//! # pxview-iter
//!
//! Row-by-row access to a rectangular region of a pixel store.
//!
//! - [`RegionIterator`] - bidirectional row cursor with a reusable scratch row
//!   of [`ColorCell`](pxview_core::ColorCell)s and explicit write-back
//! - [`image_histogram`] / [`region_histogram`] - distinct colors with counts
//! - [`ProgressMonitor`] - progress and cancellation for long passes
//!
//! ## Crate Structure
//!
//! ```text
//! pxview-core    cells, colors, ids
//!      ^
//! pxview-cache   store, views
//!      ^
//! pxview-iter    (this crate)
//! ```
//!
//! ## Example
//!
//! ```
//! use pxview_cache::PixelCache;
//! use pxview_core::{Channel, IdFactory, PixelPacket};
//! use pxview_iter::{NoProgress, RegionIterator, RowAction};
//!
//! let cache = PixelCache::from_pixels(2, 2, &[PixelPacket::rgb(0, 0, 0); 4])?;
//! let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
//!
//! let rows = iter.for_each_row(&mut NoProgress, |row, cells| {
//!     if row == 1 {
//!         cells[0].set_channel(Channel::Green, 1.0);
//!         RowAction::Sync
//!     } else {
//!         RowAction::Keep
//!     }
//! })?;
//! assert_eq!(rows, 2);
//! assert_eq!(cache.pixel(0, 1)?.green, u16::MAX);
//! # Ok::<(), pxview_iter::IterError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod histogram;
pub mod iterator;
pub mod progress;

pub use error::{IterError, IterResult};
pub use histogram::{image_histogram, region_histogram, ColorCount, ColorTally};
pub use iterator::{CursorState, RegionIterator, RowAction};
pub use progress::{NoProgress, ProgressMonitor};
