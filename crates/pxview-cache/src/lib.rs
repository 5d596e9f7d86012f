//! # pxview-cache
//!
//! Paged in-memory pixel store and the row-granular views used to read and
//! write it.
//!
//! - [`PixelStore`] - pixels, auxiliary slots and metadata, in lazily allocated pages
//! - [`PixelCache`] - shared handle to a store
//! - [`RegionView`] / [`CacheView`] - acquire, stage and commit rows
//! - [`CacheConfig`] - page size, page limit, read-only flag (YAML loadable)
//!
//! ## Example
//!
//! ```
//! use pxview_cache::{PixelCache, RegionView};
//! use pxview_core::{PixelPacket, Rect};
//!
//! let cache = PixelCache::blank(4, 4)?;
//! let mut view = cache.open_view(Rect::new(0, 0, 4, 2))?;
//!
//! let row = view.row_for_write(Rect::new(0, 1, 4, 1))?;
//! row.pixels[2] = PixelPacket::rgb(1, 2, 3);
//! view.commit()?;
//!
//! assert_eq!(cache.pixel(2, 1)?, PixelPacket::rgb(1, 2, 3));
//! # Ok::<(), pxview_cache::CacheError>(())
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod view;

pub use cache::PixelCache;
pub use config::{CacheConfig, DEFAULT_PAGE_ROWS};
pub use error::{CacheError, CacheResult};
pub use store::{CacheStats, PixelStore};
pub use view::{CacheView, PixelRows, PixelRowsMut, RegionView};
