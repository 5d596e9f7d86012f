//! Sync, discard, index routing and error reporting.

use anyhow::Result;
use approx::assert_abs_diff_eq;
use pxview_cache::{
    CacheError, CacheResult, CacheView, PixelCache, PixelRows, PixelRowsMut, RegionView,
};
use pxview_core::{
    AuxChannel, Channel, Colorspace, IdFactory, PixelPacket, Rect, Severity, StorageClass,
    StoreTraits, QUANTUM_MAX,
};
use pxview_iter::{
    image_histogram, region_histogram, CursorState, IterError, NoProgress, RegionIterator, RowAction,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn gray_store(width: u32, height: u32, level: u16) -> Result<PixelCache> {
    let pixels = vec![PixelPacket::rgb(level, level, level); (width * height) as usize];
    Ok(PixelCache::from_pixels(width, height, &pixels)?)
}

#[test]
fn test_sync_writes_row() -> Result<()> {
    init_tracing();
    let cache = gray_store(3, 2, 100)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
    iter.next_row()?;
    let cells = iter.next_row()?.expect("row 1");
    cells[2].set_channel(Channel::Blue, 1.0);
    iter.sync()?;

    assert_eq!(cache.pixel(2, 1)?, PixelPacket::rgb(100, 100, QUANTUM_MAX));
    assert_eq!(cache.pixel(2, 0)?, PixelPacket::rgb(100, 100, 100));
    Ok(())
}

#[test]
fn test_unsynced_changes_are_discarded_on_drop() -> Result<()> {
    init_tracing();
    let cache = gray_store(2, 2, 7)?;
    let mut ids = IdFactory::new();
    {
        let mut iter = RegionIterator::new(&mut ids, &cache)?;
        let cells = iter.next_row()?.expect("row 0");
        for cell in cells.iter_mut() {
            cell.set_channel(Channel::Red, 1.0);
        }
    }
    let mut fresh = RegionIterator::new(&mut ids, &cache)?;
    let cells = fresh.next_row()?.expect("row 0");
    assert!(cells.iter().all(|c| c.channel_quantum(Channel::Red) == 7));
    assert_eq!(cache.stats()?.row_writes, 0);
    Ok(())
}

#[test]
fn test_moving_away_discards_changes() -> Result<()> {
    let cache = gray_store(1, 2, 7)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
    iter.next_row()?.expect("row 0")[0].set_channel(Channel::Red, 0.0);
    iter.next_row()?;
    let reread = iter.previous_row()?.expect("row 0");
    assert_eq!(reread[0].channel_quantum(Channel::Red), 7);
    Ok(())
}

#[test]
fn test_index_routing_on_read() -> Result<()> {
    let cache = gray_store(1, 1, 0)?;
    cache.set_index(0, 0, 500)?;
    let mut ids = IdFactory::new();

    let mut iter = RegionIterator::new(&mut ids, &cache)?;
    let cell = &iter.next_row()?.expect("row")[0];
    assert_eq!(cell.aux(), AuxChannel::Unused);
    assert_eq!(cell.channel(Channel::Black), 0.0);
    assert_eq!(cell.index(), 0);

    cache.set_storage_class(StorageClass::Pseudo)?;
    iter.reset();
    let cell = &iter.next_row()?.expect("row")[0];
    assert_eq!(cell.index(), 500);
    assert_eq!(cell.channel(Channel::Black), 0.0);

    cache.set_colorspace(Colorspace::Cmyk)?;
    iter.reset();
    let cell = &iter.next_row()?.expect("row")[0];
    assert_eq!(cell.channel_quantum(Channel::Black), 500);
    assert_eq!(cell.index(), 0);
    assert_eq!(cell.colorspace(), Colorspace::Cmyk);
    Ok(())
}

#[test]
fn test_routing_follows_store_at_sync_time() -> Result<()> {
    init_tracing();
    let cache = gray_store(1, 1, 0)?;
    cache.set_index(0, 0, 123)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;

    // Read as plain RGB, then turn the store into CMYK before syncing.
    iter.next_row()?.expect("row")[0].set_channel_quantum(Channel::Black, 77);
    cache.set_colorspace(Colorspace::Cmyk)?;
    iter.sync()?;
    assert_eq!(cache.index(0, 0)?, 77);

    // Read as CMYK, then drop back to RGB: the slot is no longer ours.
    iter.reset();
    iter.next_row()?.expect("row")[0].set_channel_quantum(Channel::Black, 9);
    cache.set_colorspace(Colorspace::Rgb)?;
    iter.sync()?;
    assert_eq!(cache.index(0, 0)?, 77);

    // Read as CMYK, then switch to palette storage: black is not an index.
    cache.set_colorspace(Colorspace::Cmyk)?;
    iter.reset();
    iter.next_row()?;
    cache.set_colorspace(Colorspace::Rgb)?;
    cache.set_storage_class(StorageClass::Pseudo)?;
    iter.sync()?;
    assert_eq!(cache.index(0, 0)?, 0);
    Ok(())
}

#[test]
fn test_sync_failure_is_reported() -> Result<()> {
    init_tracing();
    let cache = gray_store(2, 1, 1)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
    iter.next_row()?;
    cache.set_read_only(true)?;

    let err = iter.sync().unwrap_err();
    assert!(matches!(err, IterError::Cache(CacheError::ReadOnly)));
    let exception = iter.clear_exception().expect("recorded");
    assert_eq!(exception.severity, Severity::Error);
    assert_eq!(exception.reason, "row commit failed");
    assert!(iter.exception().is_none());
    Ok(())
}

#[test]
fn test_last_error_wins() -> Result<()> {
    let cache = gray_store(1, 1, 1)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
    let _ = iter.sync();
    iter.next_row()?;
    cache.set_read_only(true)?;
    let _ = iter.sync();
    assert_eq!(iter.exception().map(|e| e.reason.as_str()), Some("row commit failed"));
    Ok(())
}

/// View that refuses to read one row.
#[derive(Debug)]
struct FlakyView {
    inner: CacheView,
    bad_row: u32,
}

impl RegionView for FlakyView {
    fn region(&self) -> Rect {
        self.inner.region()
    }

    fn traits(&self) -> CacheResult<StoreTraits> {
        self.inner.traits()
    }

    fn acquire_row(&mut self, rect: Rect) -> CacheResult<PixelRows<'_>> {
        if rect.y == self.bad_row {
            return Err(CacheError::out_of_bounds(rect.x, rect.y, 0, 0));
        }
        self.inner.acquire_row(rect)
    }

    fn row_for_write(&mut self, rect: Rect) -> CacheResult<PixelRowsMut<'_>> {
        self.inner.row_for_write(rect)
    }

    fn commit(&mut self) -> CacheResult<()> {
        self.inner.commit()
    }

    fn reopen(&mut self) -> CacheResult<()> {
        self.inner.reopen()
    }
}

#[test]
fn test_acquire_failure_keeps_cursor_on_row() -> Result<()> {
    init_tracing();
    let cache = gray_store(2, 3, 5)?;
    let view = FlakyView {
        inner: cache.open_full_view()?,
        bad_row: 1,
    };
    let mut iter = RegionIterator::with_view(&mut IdFactory::new(), view)?;
    iter.next_row()?;

    let err = iter.next_row().unwrap_err();
    assert!(err.is_cache_error());
    assert_eq!(iter.row(), 1);
    let exception = iter.exception().expect("recorded");
    assert_eq!(exception.reason, "row acquisition failed");
    assert!(exception.description.is_some());

    assert!(iter.next_row()?.is_some(), "row 2 still readable");
    Ok(())
}

#[test]
fn test_failed_read_blocks_sync_of_stale_cells() -> Result<()> {
    init_tracing();
    let cache = PixelCache::from_pixels(1, 2, &[PixelPacket::rgb(10, 10, 10), PixelPacket::rgb(99, 99, 99)])?;
    let view = FlakyView {
        inner: cache.open_full_view()?,
        bad_row: 1,
    };
    let mut iter = RegionIterator::with_view(&mut IdFactory::new(), view)?;
    let first = iter.next_row()?.expect("row 0");
    assert_abs_diff_eq!(first[0].red(), 10.0 / QUANTUM_MAX as f64, epsilon = 1e-12);
    assert!(iter.next_row().is_err());
    assert_eq!(iter.state(), CursorState::OnRow(1));

    let err = iter.sync().unwrap_err();
    assert!(matches!(err, IterError::RowNotLoaded { row: 1, loaded: None }));
    assert_eq!(cache.pixel(0, 1)?, PixelPacket::rgb(99, 99, 99));
    assert_eq!(
        iter.exception().map(|e| e.reason.as_str()),
        Some("sync of a row that was not read")
    );
    Ok(())
}

#[test]
fn test_for_each_row_syncs_marked_rows() -> Result<()> {
    let cache = gray_store(2, 3, 0)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
    let visited = iter.for_each_row(&mut NoProgress, |row, cells| {
        for cell in cells.iter_mut() {
            cell.set_channel(Channel::Green, 1.0);
        }
        if row % 2 == 0 { RowAction::Sync } else { RowAction::Keep }
    })?;
    assert_eq!(visited, 3);
    assert_eq!(cache.pixel(1, 0)?.green, QUANTUM_MAX);
    assert_eq!(cache.pixel(1, 1)?.green, 0);
    assert_eq!(cache.pixel(1, 2)?.green, QUANTUM_MAX);
    Ok(())
}

#[test]
fn test_for_each_row_cancel() -> Result<()> {
    init_tracing();
    let cache = gray_store(1, 4, 0)?;
    let mut iter = RegionIterator::new(&mut IdFactory::new(), &cache)?;
    let mut calls = Vec::new();
    let mut monitor = |task: &str, done: u64, total: u64| {
        calls.push((task.to_string(), done, total));
        done < 2
    };
    let err = iter
        .for_each_row(&mut monitor, |_, cells| {
            cells[0].set_channel(Channel::Red, 1.0);
            RowAction::Sync
        })
        .unwrap_err();

    assert!(matches!(err, IterError::Cancelled { done: 2, total: 4, .. }));
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "row-pass");
    assert_eq!(iter.exception().map(|e| e.severity), Some(Severity::Warning));
    assert_eq!(cache.pixel(0, 1)?.red, QUANTUM_MAX, "rows before cancel stay synced");
    assert_eq!(cache.pixel(0, 2)?.red, 0);
    Ok(())
}

#[test]
fn test_histograms_over_region() -> Result<()> {
    let white = PixelPacket::rgb(QUANTUM_MAX, QUANTUM_MAX, QUANTUM_MAX);
    let black = PixelPacket::default();
    let cache = PixelCache::from_pixels(3, 2, &[white, black, black, white, white, black])?;
    let mut ids = IdFactory::new();

    let whole = image_histogram(&mut ids, &cache, &mut NoProgress)?;
    let counts: Vec<_> = whole.iter().map(|c| c.color_count()).collect();
    assert_eq!(counts, vec![3, 3]);

    let mut iter = RegionIterator::region(&mut ids, &cache, 1, 0, 2, 2)?;
    let part = region_histogram(&mut ids, &mut iter, &mut NoProgress)?;
    assert_eq!(part.len(), 2);
    assert_eq!(part[0].quantum_color(), black);
    assert_eq!(part[0].color_count(), 3);
    assert_eq!(part[1].color_count(), 1);
    assert_eq!(iter.row(), 2);
    Ok(())
}
