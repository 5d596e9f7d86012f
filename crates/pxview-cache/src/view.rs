//! Row-granular views over a pixel store.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+
//! | RegionView        |   acquire_row / row_for_write / commit
//! +-------------------+
//!          ^
//!          |
//! +-------------------+        +-------------+
//! | CacheView         | -----> | PixelCache  |
//! | (staging buffers) |  lock  | PixelStore  |
//! +-------------------+        +-------------+
//! ```
//!
//! A view owns one staging buffer. [`RegionView::acquire_row`] fills it with
//! a copy of the requested pixels. [`RegionView::row_for_write`] does the
//! same but also remembers the rectangle, so that a following
//! [`RegionView::commit`] copies the (possibly modified) buffer back.
//! Any acquire discards an uncommitted write.

use pxview_core::{IndexPacket, PixelPacket, Rect, StoreTraits};
use tracing::trace;

use crate::cache::PixelCache;
use crate::error::{CacheError, CacheResult};

/// Pixels of an acquired row, read-only.
#[derive(Debug, Clone, Copy)]
pub struct PixelRows<'a> {
    /// Store pixels, row-major.
    pub pixels: &'a [PixelPacket],
    /// Auxiliary slots, parallel to `pixels`.
    pub indexes: &'a [IndexPacket],
}

/// Pixels of a row staged for write.
#[derive(Debug)]
pub struct PixelRowsMut<'a> {
    /// Store pixels, row-major.
    pub pixels: &'a mut [PixelPacket],
    /// Auxiliary slots, parallel to `pixels`.
    pub indexes: &'a mut [IndexPacket],
}

/// Read/write window onto a pixel store.
///
/// Rectangles passed to the row methods are in store coordinates. They are
/// checked against the store bounds, not against [`region`](Self::region).
pub trait RegionView {
    /// The region the view was opened for.
    fn region(&self) -> Rect;

    /// Store metadata sampled now.
    fn traits(&self) -> CacheResult<StoreTraits>;

    /// Copies `rect` out of the store.
    fn acquire_row(&mut self, rect: Rect) -> CacheResult<PixelRows<'_>>;

    /// Copies `rect` out of the store and stages it for [`commit`](Self::commit).
    fn row_for_write(&mut self, rect: Rect) -> CacheResult<PixelRowsMut<'_>>;

    /// Writes the staged rectangle back.
    ///
    /// Fails with [`CacheError::NothingToCommit`] if nothing is staged.
    fn commit(&mut self) -> CacheResult<()>;

    /// Drops staged data and starts over as if freshly opened.
    fn reopen(&mut self) -> CacheResult<()>;
}

/// [`RegionView`] over a [`PixelCache`].
#[derive(Debug)]
pub struct CacheView {
    cache: PixelCache,
    region: Rect,
    pixels: Vec<PixelPacket>,
    indexes: Vec<IndexPacket>,
    pending: Option<Rect>,
}

impl CacheView {
    pub(crate) fn new(cache: PixelCache, region: Rect) -> Self {
        Self {
            cache,
            region,
            pixels: Vec::new(),
            indexes: Vec::new(),
            pending: None,
        }
    }

    /// The store this view reads from.
    pub fn cache(&self) -> &PixelCache {
        &self.cache
    }

    /// Rectangle staged for commit, if any.
    pub fn pending(&self) -> Option<Rect> {
        self.pending
    }

    fn load(&mut self, rect: Rect) -> CacheResult<()> {
        self.pending = None;
        let mut store = self.cache.write()?;
        store.read_region(rect, &mut self.pixels, &mut self.indexes)
    }
}

impl RegionView for CacheView {
    fn region(&self) -> Rect {
        self.region
    }

    fn traits(&self) -> CacheResult<StoreTraits> {
        self.cache.traits()
    }

    fn acquire_row(&mut self, rect: Rect) -> CacheResult<PixelRows<'_>> {
        trace!(%rect, "acquire");
        self.load(rect)?;
        Ok(PixelRows {
            pixels: &self.pixels,
            indexes: &self.indexes,
        })
    }

    fn row_for_write(&mut self, rect: Rect) -> CacheResult<PixelRowsMut<'_>> {
        trace!(%rect, "stage for write");
        self.load(rect)?;
        self.pending = Some(rect);
        Ok(PixelRowsMut {
            pixels: &mut self.pixels,
            indexes: &mut self.indexes,
        })
    }

    fn commit(&mut self) -> CacheResult<()> {
        let rect = self.pending.take().ok_or(CacheError::NothingToCommit)?;
        trace!(%rect, "commit");
        self.cache
            .write()?
            .write_region(rect, &self.pixels, &self.indexes)
    }

    fn reopen(&mut self) -> CacheResult<()> {
        trace!(region = %self.region, "reopen");
        self.pending = None;
        self.pixels = Vec::new();
        self.indexes = Vec::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> PixelCache {
        let pixels: Vec<_> = (0..6u16).map(|v| PixelPacket::rgb(v, v, v)).collect();
        PixelCache::from_pixels(3, 2, &pixels).unwrap()
    }

    #[test]
    fn test_acquire_copies_row() {
        let mut view = cache().open_full_view().unwrap();
        let rows = view.acquire_row(Rect::new(0, 1, 3, 1)).unwrap();
        let reds: Vec<_> = rows.pixels.iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![3, 4, 5]);
        assert_eq!(rows.indexes, &[0, 0, 0]);
    }

    #[test]
    fn test_write_then_commit() {
        let cache = cache();
        let mut view = cache.open_full_view().unwrap();
        let rows = view.row_for_write(Rect::new(1, 0, 2, 1)).unwrap();
        rows.pixels[0].red = 100;
        rows.indexes[1] = 9;
        assert_eq!(cache.pixel(1, 0).unwrap().red, 1, "not visible before commit");
        view.commit().unwrap();
        assert_eq!(cache.pixel(1, 0).unwrap().red, 100);
        assert_eq!(cache.index(2, 0).unwrap(), 9);
        assert_eq!(view.pending(), None);
    }

    #[test]
    fn test_commit_without_stage() {
        let mut view = cache().open_full_view().unwrap();
        assert!(matches!(view.commit(), Err(CacheError::NothingToCommit)));
        view.row_for_write(Rect::new(0, 0, 1, 1)).unwrap();
        view.acquire_row(Rect::new(0, 0, 1, 1)).unwrap();
        assert!(matches!(view.commit(), Err(CacheError::NothingToCommit)));
    }

    #[test]
    fn test_reopen_discards_stage() {
        let mut view = cache().open_full_view().unwrap();
        view.row_for_write(Rect::new(0, 0, 3, 1)).unwrap();
        view.reopen().unwrap();
        assert!(view.commit().is_err());
    }

    #[test]
    fn test_out_of_bounds_row() {
        let mut view = cache().open_full_view().unwrap();
        let err = view.acquire_row(Rect::new(0, 2, 3, 1)).unwrap_err();
        assert!(err.is_bounds_error());
    }
}
