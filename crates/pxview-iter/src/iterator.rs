//! Bidirectional row cursor over a rectangular region.
//!
//! # Cursor
//!
//! The cursor ranges over `-1..=H` where `H` is the region height. `-1`
//! (before the first row) and `H` (after the last row) are sentinels; only
//! `0..H` materialize data.
//!
//! ```text
//!   -1      0      1    ...   H-1      H
//!   [ ] -> [r0] -> [r1] ... -> [rH-1] -> [ ]
//!    ^ BeforeFirst                      ^ AfterLast
//! ```
//!
//! [`next_row`](RegionIterator::next_row) and
//! [`previous_row`](RegionIterator::previous_row) move the cursor and fill
//! the scratch cells. [`seek_row`](RegionIterator::seek_row) only moves it,
//! so the row that a seek names is never the row the following traversal
//! call returns:
//!
//! | call sequence                  | row materialized |
//! |--------------------------------|------------------|
//! | `seek_to_first(); next_row()`  | 0                |
//! | `seek_to_last(); previous_row()` | H-1            |
//! | `seek_row(r); next_row()`      | r+1              |
//! | `seek_row(r); previous_row()`  | r-1              |
//!
//! # Write-back
//!
//! Cells are a scratch copy. Changes reach the store only through
//! [`sync`](RegionIterator::sync); dropping the iterator or moving the cursor
//! discards them.
//!
//! # Example
//!
//! ```
//! use pxview_cache::PixelCache;
//! use pxview_core::{Channel, IdFactory};
//! use pxview_iter::RegionIterator;
//!
//! let cache = PixelCache::blank(8, 4)?;
//! let mut ids = IdFactory::new();
//! let mut iter = RegionIterator::region(&mut ids, &cache, 2, 1, 4, 2)?;
//!
//! while let Some(cells) = iter.next_row()? {
//!     for cell in cells.iter_mut() {
//!         cell.set_channel(Channel::Red, 1.0);
//!     }
//!     iter.sync()?;
//! }
//! assert_eq!(cache.pixel(2, 1)?.red, u16::MAX);
//! assert_eq!(cache.pixel(1, 1)?.red, 0);
//! # Ok::<(), pxview_iter::IterError>(())
//! ```

use pxview_cache::{CacheError, CacheView, PixelCache, RegionView};
use pxview_core::{ColorCell, Exception, IdFactory, Named, ObjectId, Rect};
use tracing::{debug, trace, warn};

use crate::error::{IterError, IterResult};
use crate::progress::ProgressMonitor;

/// Where the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Before the first row (`-1`).
    BeforeFirst,
    /// On a data row.
    OnRow(u32),
    /// After the last row (`H`).
    AfterLast,
}

/// What [`RegionIterator::for_each_row`] does with a row after the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowAction {
    /// Leave the store untouched.
    #[default]
    Keep,
    /// Write the row back.
    Sync,
}

/// Row cursor with a reusable scratch row of [`ColorCell`]s.
///
/// The iterator owns its view exclusively. It is not meant to be driven from
/// more than one place at a time and has no internal locking.
#[derive(Debug)]
pub struct RegionIterator<V: RegionView = CacheView> {
    id: ObjectId,
    view: V,
    region: Rect,
    row: i64,
    loaded: Option<u32>,
    cells: Vec<ColorCell>,
    exception: Option<Exception>,
}

impl RegionIterator<CacheView> {
    /// Iterates over the whole store.
    pub fn new(ids: &mut IdFactory, cache: &PixelCache) -> IterResult<Self> {
        let bounds = cache.bounds()?;
        Self::region(ids, cache, bounds.x, bounds.y, bounds.width, bounds.height)
    }

    /// Iterates over a sub-region of the store.
    ///
    /// Fails with [`IterError::ZeroRegionSize`] for an empty region and with
    /// an out-of-bounds cache error if the region leaves the store.
    pub fn region(
        ids: &mut IdFactory,
        cache: &PixelCache,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> IterResult<Self> {
        if width == 0 || height == 0 {
            return Err(IterError::ZeroRegionSize { width, height });
        }
        let view = cache.open_view(Rect::new(x, y, width, height))?;
        Self::with_view(ids, view)
    }
}

impl<V: RegionView> RegionIterator<V> {
    /// Iterates over the region `view` was opened for.
    pub fn with_view(ids: &mut IdFactory, view: V) -> IterResult<Self> {
        let region = view.region();
        if region.is_empty() {
            return Err(IterError::ZeroRegionSize {
                width: region.width,
                height: region.height,
            });
        }
        let id = ids.next_id();
        let cells = ids.cells(region.width as usize)?;
        debug!(%id, %region, "created region iterator");
        Ok(Self {
            id,
            view,
            region,
            row: -1,
            loaded: None,
            cells,
            exception: None,
        })
    }

    #[inline]
    fn height(&self) -> i64 {
        i64::from(self.region.height)
    }

    // === Cursor ===

    /// Moves one row down and materializes it.
    ///
    /// Returns `Ok(None)` once the cursor runs past the last row; the cursor
    /// then stays at `H`. A failed acquire leaves the cursor on the row,
    /// records the error and returns it.
    pub fn next_row(&mut self) -> IterResult<Option<&mut [ColorCell]>> {
        self.row = (self.row + 1).min(self.height());
        trace!(id = %self.id, row = self.row, "next_row");
        self.materialize()
    }

    /// Moves one row up and materializes it.
    ///
    /// Returns `Ok(None)` once the cursor runs past the first row; the cursor
    /// then stays at `-1`.
    pub fn previous_row(&mut self) -> IterResult<Option<&mut [ColorCell]>> {
        self.row = (self.row - 1).max(-1);
        trace!(id = %self.id, row = self.row, "previous_row");
        self.materialize()
    }

    /// Positions the cursor on `row` without reading it.
    ///
    /// Returns `false` and leaves the cursor alone if `row` is not a data row.
    #[must_use]
    pub fn seek_row(&mut self, row: i64) -> bool {
        if row < 0 || row >= self.height() {
            trace!(id = %self.id, row, height = self.region.height, "seek_row out of range");
            return false;
        }
        trace!(id = %self.id, row, "seek_row");
        self.row = row;
        true
    }

    /// Positions the cursor before the first row.
    pub fn seek_to_first(&mut self) {
        trace!(id = %self.id, "seek_to_first");
        self.row = -1;
    }

    /// Positions the cursor after the last row.
    pub fn seek_to_last(&mut self) {
        trace!(id = %self.id, "seek_to_last");
        self.row = self.height();
    }

    /// Positions the cursor before the first row.
    pub fn reset(&mut self) {
        trace!(id = %self.id, "reset");
        self.row = -1;
    }

    fn materialize(&mut self) -> IterResult<Option<&mut [ColorCell]>> {
        if self.current_row().is_none() {
            return Ok(None);
        }
        match self.load_row() {
            Ok(()) => Ok(Some(self.cells.as_mut_slice())),
            Err(err) => {
                self.loaded = None;
                Err(self.record(err.into(), "row acquisition failed"))
            }
        }
    }

    fn load_row(&mut self) -> Result<(), CacheError> {
        let rect = self.region.row(self.row as u32);
        let traits = self.view.traits()?;
        let rows = self.view.acquire_row(rect)?;
        let source = rows.pixels.iter().zip(rows.indexes);
        for (cell, (pixel, index)) in self.cells.iter_mut().zip(source) {
            cell.set_from_store(pixel, *index, &traits);
        }
        self.loaded = Some(self.row as u32);
        Ok(())
    }

    // === Write-back ===

    /// Writes the current row's cells back to the store.
    ///
    /// The auxiliary slot is routed by the store metadata at the time of this
    /// call, not at the time the row was read. Fails with
    /// [`IterError::NotOnRow`] when the cursor is on a sentinel and with
    /// [`IterError::RowNotLoaded`] when the scratch cells hold some other row
    /// (after a failed read or a bare seek). Failures are also recorded in
    /// the exception slot.
    pub fn sync(&mut self) -> IterResult<()> {
        let Some(offset) = self.current_row() else {
            let err = IterError::NotOnRow { row: self.row };
            return Err(self.record(err, "sync without a current row"));
        };
        if self.loaded != Some(offset) {
            let err = IterError::RowNotLoaded {
                row: offset,
                loaded: self.loaded,
            };
            return Err(self.record(err, "sync of a row that was not read"));
        }
        match self.store_row(offset) {
            Ok(()) => {
                debug!(id = %self.id, row = offset, width = self.region.width, "synced row");
                Ok(())
            }
            Err(err) => Err(self.record(err.into(), "row commit failed")),
        }
    }

    fn store_row(&mut self, offset: u32) -> Result<(), CacheError> {
        let rect = self.region.row(offset);
        let traits = self.view.traits()?;
        let rows = self.view.row_for_write(rect)?;
        let target = rows.pixels.iter_mut().zip(rows.indexes.iter_mut());
        for (cell, (pixel, index)) in self.cells.iter().zip(target) {
            cell.write_to_store(pixel, index, &traits);
        }
        self.view.commit()
    }

    // === Lifecycle ===

    /// Starts over: reopens the view, resets the scratch cells, clears the
    /// exception slot and puts the cursor before the first row.
    ///
    /// Cells keep their ids.
    pub fn clear(&mut self) -> IterResult<()> {
        debug!(id = %self.id, "clearing region iterator");
        self.exception = None;
        self.row = -1;
        self.loaded = None;
        for cell in &mut self.cells {
            *cell = ColorCell::with_id(cell.id());
        }
        if let Err(err) = self.view.reopen() {
            return Err(self.record(err.into(), "view reopen failed"));
        }
        Ok(())
    }

    /// Visits every row top to bottom.
    ///
    /// `f` gets the row offset within the region and the cells; rows for which
    /// it returns [`RowAction::Sync`] are written back. `monitor` is told after
    /// each row and may cancel, which ends the pass with
    /// [`IterError::Cancelled`]. Rows synced before cancellation stay written.
    ///
    /// Returns the number of rows visited. The cursor ends after the last row.
    pub fn for_each_row<F>(&mut self, monitor: &mut dyn ProgressMonitor, f: F) -> IterResult<u64>
    where
        F: FnMut(u32, &mut [ColorCell]) -> RowAction,
    {
        self.scan("row-pass", monitor, f)
    }

    pub(crate) fn scan<F>(
        &mut self,
        task: &'static str,
        monitor: &mut dyn ProgressMonitor,
        mut f: F,
    ) -> IterResult<u64>
    where
        F: FnMut(u32, &mut [ColorCell]) -> RowAction,
    {
        self.reset();
        let total = u64::from(self.region.height);
        let mut done = 0u64;
        while let Some(cells) = self.next_row()? {
            if f(done as u32, cells) == RowAction::Sync {
                self.sync()?;
            }
            done += 1;
            if !monitor.progress(task, done, total) {
                let err = IterError::Cancelled {
                    task: task.to_string(),
                    done,
                    total,
                };
                return Err(self.record(err, "pass cancelled"));
            }
        }
        debug!(id = %self.id, task, rows = done, "pass complete");
        Ok(done)
    }

    fn record(&mut self, err: IterError, reason: &str) -> IterError {
        warn!(id = %self.id, row = self.row, error = %err, "{reason}");
        self.exception = Some(Exception::from_error(err.severity(), reason, &err));
        err
    }

    // === Accessors ===

    /// The iterator's id.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The fixed region.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.region
    }

    /// Raw cursor value in `-1..=H`.
    #[inline]
    pub fn row(&self) -> i64 {
        self.row
    }

    /// Cursor as a state.
    pub fn state(&self) -> CursorState {
        match self.current_row() {
            Some(row) => CursorState::OnRow(row),
            None if self.row < 0 => CursorState::BeforeFirst,
            None => CursorState::AfterLast,
        }
    }

    fn current_row(&self) -> Option<u32> {
        (0..self.height()).contains(&self.row).then_some(self.row as u32)
    }

    /// Scratch cells, one per region column.
    #[inline]
    pub fn cells(&self) -> &[ColorCell] {
        &self.cells
    }

    /// Mutable scratch cells.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [ColorCell] {
        &mut self.cells
    }

    /// Number of scratch cells (the region width).
    #[inline]
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// The underlying view.
    #[inline]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Last recorded failure.
    #[inline]
    pub fn exception(&self) -> Option<&Exception> {
        self.exception.as_ref()
    }

    /// Clears the exception slot, returning what was there.
    #[inline]
    pub fn clear_exception(&mut self) -> Option<Exception> {
        self.exception.take()
    }
}

impl<V: RegionView> Named for RegionIterator<V> {
    const KIND: &'static str = "RegionIterator";

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl<V: RegionView> Drop for RegionIterator<V> {
    fn drop(&mut self) {
        debug!(id = %self.id, row = self.row, "dropping region iterator");
    }
}
