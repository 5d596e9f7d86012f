//! Distinct-color histograms as arrays of [`ColorCell`].
//!
//! Two builders share one output shape: one cell per distinct color, with
//! the occurrence count stamped on the cell.
//!
//! - [`image_histogram`] asks a [`ColorTally`] source for the whole image at once
//! - [`region_histogram`] walks a [`RegionIterator`] row by row
//!
//! Both return cells ordered by store value (red, green, blue, opacity, then
//! auxiliary slot), so results are deterministic.

use std::collections::BTreeMap;

use pxview_cache::{PixelCache, RegionView};
use pxview_core::{ColorCell, IdFactory, IndexPacket, IndexRouting, PixelPacket, StoreTraits};
use tracing::debug;

use crate::error::{IterError, IterResult};
use crate::iterator::{RegionIterator, RowAction};
use crate::progress::ProgressMonitor;

/// One distinct color and how often it occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorCount {
    /// Store pixel.
    pub pixel: PixelPacket,
    /// Auxiliary slot, 0 when the store does not use it.
    pub index: IndexPacket,
    /// Occurrences.
    pub count: u64,
}

/// Source of whole-image color counts.
pub trait ColorTally {
    /// Store metadata used to interpret the auxiliary slot of each entry.
    fn traits(&self) -> IterResult<StoreTraits>;

    /// Counts distinct colors. Entries are ordered by store value.
    fn tally_colors(&self, monitor: &mut dyn ProgressMonitor) -> IterResult<Vec<ColorCount>>;
}

type Tally = BTreeMap<(PixelPacket, IndexPacket), u64>;

fn into_counts(tally: Tally) -> Vec<ColorCount> {
    tally
        .into_iter()
        .map(|((pixel, index), count)| ColorCount { pixel, index, count })
        .collect()
}

impl ColorTally for PixelCache {
    fn traits(&self) -> IterResult<StoreTraits> {
        Ok(PixelCache::traits(self)?)
    }

    fn tally_colors(&self, monitor: &mut dyn ProgressMonitor) -> IterResult<Vec<ColorCount>> {
        const TASK: &str = "color-tally";
        let bounds = self.bounds()?;
        let routed = ColorTally::traits(self)?.index_routing() != IndexRouting::Unused;
        let total = u64::from(bounds.height);
        let mut tally = Tally::new();
        for offset in 0..bounds.height {
            let (pixels, indexes) = self.read_region(bounds.row(offset))?;
            for (pixel, index) in pixels.into_iter().zip(indexes) {
                let index = if routed { index } else { 0 };
                *tally.entry((pixel, index)).or_insert(0) += 1;
            }
            let done = u64::from(offset) + 1;
            if !monitor.progress(TASK, done, total) {
                return Err(IterError::Cancelled {
                    task: TASK.to_string(),
                    done,
                    total,
                });
            }
        }
        Ok(into_counts(tally))
    }
}

fn stamp(ids: &mut IdFactory, counts: &[ColorCount], traits: &StoreTraits) -> IterResult<Vec<ColorCell>> {
    let mut cells = ids.cells(counts.len())?;
    for (cell, entry) in cells.iter_mut().zip(counts) {
        cell.set_from_store(&entry.pixel, entry.index, traits);
        cell.set_color_count(entry.count);
    }
    Ok(cells)
}

/// Builds one cell per distinct color of `source`.
///
/// ```
/// use pxview_cache::PixelCache;
/// use pxview_core::{IdFactory, PixelPacket};
/// use pxview_iter::{image_histogram, NoProgress};
///
/// let red = PixelPacket::rgb(u16::MAX, 0, 0);
/// let cache = PixelCache::from_pixels(3, 1, &[red, red, PixelPacket::default()])?;
/// let cells = image_histogram(&mut IdFactory::new(), &cache, &mut NoProgress)?;
/// assert_eq!(cells.len(), 2);
/// assert_eq!(cells[1].color_count(), 2);
/// # Ok::<(), pxview_iter::IterError>(())
/// ```
pub fn image_histogram<S>(ids: &mut IdFactory, source: &S, monitor: &mut dyn ProgressMonitor) -> IterResult<Vec<ColorCell>>
where
    S: ColorTally + ?Sized,
{
    let traits = source.traits()?;
    let counts = source.tally_colors(monitor)?;
    debug!(colors = counts.len(), "image histogram");
    stamp(ids, &counts, &traits)
}

/// Builds one cell per distinct color of the iterator's region.
///
/// The iterator is reset first and left after its last row. Cells are
/// interpreted with the store metadata sampled when the pass starts.
pub fn region_histogram<V: RegionView>(
    ids: &mut IdFactory,
    iter: &mut RegionIterator<V>,
    monitor: &mut dyn ProgressMonitor,
) -> IterResult<Vec<ColorCell>> {
    let traits = iter.view().traits()?;
    let mut tally = Tally::new();
    iter.scan("region-histogram", monitor, |_, cells| {
        for cell in cells.iter() {
            let mut pixel = PixelPacket::default();
            let mut index = 0;
            cell.write_to_store(&mut pixel, &mut index, &traits);
            *tally.entry((pixel, index)).or_insert(0) += 1;
        }
        RowAction::Keep
    })?;
    let counts = into_counts(tally);
    debug!(id = %iter.id(), colors = counts.len(), "region histogram");
    stamp(ids, &counts, &traits)
}
