//! Paged in-memory pixel store.
//!
//! Pixels are kept in pages of `page_rows` full-width rows. A page is
//! allocated the first time any of its rows is written; until then its rows
//! read as the background color with a zero auxiliary slot.
//!
//! ```text
//! row 0  ┐
//! ...    ├─ page 0   (allocated)
//! row 63 ┘
//! row 64 ┐
//! ...    ├─ page 1   (None: reads as background)
//! ```

use pxview_core::{
    Colorspace, Error, IndexPacket, PixelPacket, Rect, StorageClass, StoreTraits,
};
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

/// Store counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Rows copied out through region reads.
    pub row_reads: u64,
    /// Rows copied in through region writes.
    pub row_writes: u64,
    /// Pages allocated since creation.
    pub pages_allocated: u64,
    /// Pages currently resident.
    pub resident_pages: u64,
}

#[derive(Debug)]
struct Page {
    pixels: Vec<PixelPacket>,
    indexes: Vec<IndexPacket>,
}

/// Pixel data plus the metadata that decides how it is interpreted.
#[derive(Debug)]
pub struct PixelStore {
    width: u32,
    height: u32,
    colorspace: Colorspace,
    storage_class: StorageClass,
    matte: bool,
    background: PixelPacket,
    colormap: Vec<PixelPacket>,
    config: CacheConfig,
    pages: Vec<Option<Page>>,
    stats: CacheStats,
}

fn reserve<T: Clone>(count: usize, fill: T) -> CacheResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(count)
        .map_err(|_| Error::out_of_memory(count))?;
    buf.resize(count, fill);
    Ok(buf)
}

impl PixelStore {
    /// Creates a store with the default config. No pages are allocated.
    pub fn new(width: u32, height: u32) -> CacheResult<Self> {
        Self::with_config(width, height, CacheConfig::default())
    }

    /// Creates a store with an explicit config.
    pub fn with_config(width: u32, height: u32, config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(Error::invalid_region(0, 0, width, height, "store has no pixels").into());
        }
        let page_count = height.div_ceil(config.page_rows) as usize;
        debug!(width, height, page_rows = config.page_rows, page_count, "creating pixel store");
        Ok(Self {
            width,
            height,
            colorspace: Colorspace::Rgb,
            storage_class: StorageClass::Direct,
            matte: false,
            background: PixelPacket::default(),
            colormap: Vec::new(),
            config,
            pages: (0..page_count).map(|_| None).collect(),
            stats: CacheStats::default(),
        })
    }

    /// Creates a store filled from row-major pixels. Auxiliary slots start at 0.
    pub fn from_pixels(width: u32, height: u32, pixels: &[PixelPacket]) -> CacheResult<Self> {
        let mut store = Self::new(width, height)?;
        let bounds = store.bounds();
        let indexes = reserve(bounds.pixel_count(), 0)?;
        store.store_region(bounds, pixels, &indexes)?;
        store.stats.row_writes = 0;
        Ok(store)
    }

    // === Metadata ===

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole store as a rectangle at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Current colorspace.
    #[inline]
    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    /// Changes the colorspace tag. Pixel data is not converted.
    pub fn set_colorspace(&mut self, colorspace: Colorspace) {
        debug!(from = %self.colorspace, to = %colorspace, "store colorspace changed");
        self.colorspace = colorspace;
    }

    /// Current storage class.
    #[inline]
    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }

    /// Changes the storage class.
    pub fn set_storage_class(&mut self, storage_class: StorageClass) {
        self.storage_class = storage_class;
    }

    /// Whether opacity is meaningful.
    #[inline]
    pub fn matte(&self) -> bool {
        self.matte
    }

    /// Marks opacity as meaningful or not.
    pub fn set_matte(&mut self, matte: bool) {
        self.matte = matte;
    }

    /// Metadata snapshot used for auxiliary slot routing.
    #[inline]
    pub fn traits(&self) -> StoreTraits {
        StoreTraits {
            colorspace: self.colorspace,
            storage_class: self.storage_class,
            matte: self.matte,
        }
    }

    /// Color of pixels in unallocated pages.
    #[inline]
    pub fn background(&self) -> PixelPacket {
        self.background
    }

    /// Sets the background. Pages already allocated keep their pixels.
    pub fn set_background(&mut self, background: PixelPacket) {
        self.background = background;
    }

    /// Palette for `Pseudo` stores.
    #[inline]
    pub fn colormap(&self) -> &[PixelPacket] {
        &self.colormap
    }

    /// Replaces the palette.
    pub fn set_colormap(&mut self, colormap: Vec<PixelPacket>) {
        self.colormap = colormap;
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Makes the store accept or reject writes.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    // === Region access ===

    /// Copies `rect` into `pixels` / `indexes`, replacing their contents.
    ///
    /// The buffers keep their allocation between calls.
    pub fn read_region(
        &mut self,
        rect: Rect,
        pixels: &mut Vec<PixelPacket>,
        indexes: &mut Vec<IndexPacket>,
    ) -> CacheResult<()> {
        self.check_bounds(rect)?;
        let count = rect.pixel_count();
        pixels.clear();
        indexes.clear();
        pixels
            .try_reserve(count)
            .map_err(|_| Error::out_of_memory(count))?;
        indexes
            .try_reserve(count)
            .map_err(|_| Error::out_of_memory(count))?;

        let (x, width) = (rect.x as usize, rect.width as usize);
        for y in rect.y..rect.bottom() {
            let (page, row) = self.locate(y);
            match &self.pages[page] {
                Some(page) => {
                    let start = row * self.width as usize + x;
                    pixels.extend_from_slice(&page.pixels[start..start + width]);
                    indexes.extend_from_slice(&page.indexes[start..start + width]);
                }
                None => {
                    pixels.extend(std::iter::repeat_n(self.background, width));
                    indexes.extend(std::iter::repeat_n(0, width));
                }
            }
        }
        self.stats.row_reads += u64::from(rect.height);
        Ok(())
    }

    /// Writes `rect` from row-major `pixels` / `indexes`.
    ///
    /// Fails with [`CacheError::ReadOnly`] on read-only stores and with
    /// [`CacheError::ResourceLimit`] if the pages it touches do not fit under
    /// `max_pages`. Either way nothing is written.
    pub fn write_region(&mut self, rect: Rect, pixels: &[PixelPacket], indexes: &[IndexPacket]) -> CacheResult<()> {
        if self.config.read_only {
            return Err(CacheError::ReadOnly);
        }
        self.store_region(rect, pixels, indexes)
    }

    fn store_region(&mut self, rect: Rect, pixels: &[PixelPacket], indexes: &[IndexPacket]) -> CacheResult<()> {
        self.check_bounds(rect)?;
        let expected = rect.pixel_count();
        for actual in [pixels.len(), indexes.len()] {
            if actual != expected {
                return Err(CacheError::SizeMismatch { expected, actual });
            }
        }
        self.check_page_budget(rect)?;

        let (x, width) = (rect.x as usize, rect.width as usize);
        let stride = self.width as usize;
        let rows = pixels.chunks_exact(width).zip(indexes.chunks_exact(width));
        for (y, (src_pixels, src_indexes)) in (rect.y..rect.bottom()).zip(rows) {
            let (page, row) = self.locate(y);
            let page = self.page_mut(page)?;
            let start = row * stride + x;
            page.pixels[start..start + width].copy_from_slice(src_pixels);
            page.indexes[start..start + width].copy_from_slice(src_indexes);
        }
        self.stats.row_writes += u64::from(rect.height);
        Ok(())
    }

    // === Single pixels ===

    /// Reads one pixel without touching the counters.
    pub fn pixel(&self, x: u32, y: u32) -> CacheResult<PixelPacket> {
        let (page, offset) = self.pixel_offset(x, y)?;
        Ok(self.pages[page]
            .as_ref()
            .map_or(self.background, |page| page.pixels[offset]))
    }

    /// Reads one auxiliary slot without touching the counters.
    pub fn index(&self, x: u32, y: u32) -> CacheResult<IndexPacket> {
        let (page, offset) = self.pixel_offset(x, y)?;
        Ok(self.pages[page].as_ref().map_or(0, |page| page.indexes[offset]))
    }

    /// Writes one pixel, keeping its auxiliary slot.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: PixelPacket) -> CacheResult<()> {
        if self.config.read_only {
            return Err(CacheError::ReadOnly);
        }
        let (page, offset) = self.pixel_offset(x, y)?;
        self.check_page_budget(Rect::new(x, y, 1, 1))?;
        self.page_mut(page)?.pixels[offset] = pixel;
        Ok(())
    }

    /// Writes one auxiliary slot, keeping the pixel.
    pub fn set_index(&mut self, x: u32, y: u32, index: IndexPacket) -> CacheResult<()> {
        if self.config.read_only {
            return Err(CacheError::ReadOnly);
        }
        let (page, offset) = self.pixel_offset(x, y)?;
        self.check_page_budget(Rect::new(x, y, 1, 1))?;
        self.page_mut(page)?.indexes[offset] = index;
        Ok(())
    }

    // === Internals ===

    fn check_bounds(&self, rect: Rect) -> CacheResult<()> {
        if rect.is_empty() {
            return Err(Error::invalid_region(rect.x, rect.y, rect.width, rect.height, "empty request").into());
        }
        if !self.bounds().contains_rect(&rect) {
            return Err(CacheError::out_of_bounds(
                rect.right().saturating_sub(1),
                rect.bottom().saturating_sub(1),
                self.width,
                self.height,
            ));
        }
        Ok(())
    }

    fn locate(&self, y: u32) -> (usize, usize) {
        let rows = self.config.page_rows;
        ((y / rows) as usize, (y % rows) as usize)
    }

    fn pixel_offset(&self, x: u32, y: u32) -> CacheResult<(usize, usize)> {
        if x >= self.width || y >= self.height {
            return Err(CacheError::out_of_bounds(x, y, self.width, self.height));
        }
        let (page, row) = self.locate(y);
        Ok((page, row * self.width as usize + x as usize))
    }

    fn page_rows_at(&self, page: usize) -> usize {
        let start = page * self.config.page_rows as usize;
        (self.height as usize - start).min(self.config.page_rows as usize)
    }

    fn check_page_budget(&self, rect: Rect) -> CacheResult<()> {
        let Some(limit) = self.config.max_pages else {
            return Ok(());
        };
        let (first, _) = self.locate(rect.y);
        let (last, _) = self.locate(rect.bottom() - 1);
        let missing = self.pages[first..=last].iter().filter(|p| p.is_none()).count();
        if self.resident_pages() + missing > limit {
            return Err(CacheError::ResourceLimit { limit });
        }
        Ok(())
    }

    fn page_mut(&mut self, index: usize) -> CacheResult<&mut Page> {
        let page = match self.pages[index].take() {
            Some(page) => page,
            None => {
                let count = self.page_rows_at(index) * self.width as usize;
                let page = Page {
                    pixels: reserve(count, self.background)?,
                    indexes: reserve(count, 0)?,
                };
                self.stats.pages_allocated += 1;
                self.stats.resident_pages += 1;
                debug!(page = index, pixels = count, "allocated page");
                page
            }
        };
        Ok(self.pages[index].insert(page))
    }

    /// Number of allocated pages.
    pub fn resident_pages(&self) -> usize {
        self.stats.resident_pages as usize
    }
}
