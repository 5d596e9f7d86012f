//! Shared handle to a [`PixelStore`].
//!
//! A [`PixelCache`] is cheap to clone; every clone refers to the same store.
//! Views opened from it ([`CacheView`]) lock the store only for the duration
//! of a single row transfer, so several views may be open over overlapping
//! regions at once. Ordering of their writes is whatever order the callers
//! commit in.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pxview_core::{Colorspace, IndexPacket, PixelPacket, Rect, StorageClass, StoreTraits};
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::store::{CacheStats, PixelStore};
use crate::view::CacheView;

/// Clonable, thread-safe handle to a pixel store.
#[derive(Debug, Clone)]
pub struct PixelCache {
    store: Arc<RwLock<PixelStore>>,
}

impl From<PixelStore> for PixelCache {
    fn from(store: PixelStore) -> Self {
        Self::new(store)
    }
}

impl PixelCache {
    /// Wraps a store.
    pub fn new(store: PixelStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates an empty (background-filled) store of the given size.
    pub fn blank(width: u32, height: u32) -> CacheResult<Self> {
        PixelStore::new(width, height).map(Self::new)
    }

    /// Creates an empty store with an explicit config.
    pub fn with_config(width: u32, height: u32, config: CacheConfig) -> CacheResult<Self> {
        PixelStore::with_config(width, height, config).map(Self::new)
    }

    /// Creates a store filled from row-major pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: &[PixelPacket]) -> CacheResult<Self> {
        PixelStore::from_pixels(width, height, pixels).map(Self::new)
    }

    pub(crate) fn read(&self) -> CacheResult<RwLockReadGuard<'_, PixelStore>> {
        self.store.read().map_err(|_| CacheError::Poisoned)
    }

    pub(crate) fn write(&self) -> CacheResult<RwLockWriteGuard<'_, PixelStore>> {
        self.store.write().map_err(|_| CacheError::Poisoned)
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut PixelStore) -> R) -> CacheResult<R> {
        Ok(f(&mut *self.write()?))
    }

    /// Opens a view over `region`.
    ///
    /// The region must lie inside the store and have a positive area.
    pub fn open_view(&self, region: Rect) -> CacheResult<CacheView> {
        let bounds = self.bounds()?;
        if region.is_empty() {
            return Err(pxview_core::Error::invalid_region(
                region.x,
                region.y,
                region.width,
                region.height,
                "view region has zero area",
            )
            .into());
        }
        if !bounds.contains_rect(&region) {
            return Err(CacheError::out_of_bounds(
                region.right().saturating_sub(1),
                region.bottom().saturating_sub(1),
                bounds.width,
                bounds.height,
            ));
        }
        debug!(%region, "opening cache view");
        Ok(CacheView::new(self.clone(), region))
    }

    /// Opens a view over the whole store.
    pub fn open_full_view(&self) -> CacheResult<CacheView> {
        self.open_view(self.bounds()?)
    }

    /// Returns `true` if both handles refer to the same store.
    pub fn same_store(&self, other: &PixelCache) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    // === Metadata ===

    /// Store size as a rectangle at the origin.
    pub fn bounds(&self) -> CacheResult<Rect> {
        Ok(self.read()?.bounds())
    }

    /// Metadata snapshot for auxiliary slot routing.
    pub fn traits(&self) -> CacheResult<StoreTraits> {
        Ok(self.read()?.traits())
    }

    /// Changes the store colorspace.
    pub fn set_colorspace(&self, colorspace: Colorspace) -> CacheResult<()> {
        self.write()?.set_colorspace(colorspace);
        Ok(())
    }

    /// Changes the store storage class.
    pub fn set_storage_class(&self, storage_class: StorageClass) -> CacheResult<()> {
        self.write()?.set_storage_class(storage_class);
        Ok(())
    }

    /// Marks opacity as meaningful or not.
    pub fn set_matte(&self, matte: bool) -> CacheResult<()> {
        self.write()?.set_matte(matte);
        Ok(())
    }

    /// Makes the store accept or reject writes.
    pub fn set_read_only(&self, read_only: bool) -> CacheResult<()> {
        self.write()?.set_read_only(read_only);
        Ok(())
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CacheResult<CacheStats> {
        Ok(self.read()?.stats())
    }

    // === Pixels ===

    /// Reads one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> CacheResult<PixelPacket> {
        self.read()?.pixel(x, y)
    }

    /// Writes one pixel.
    pub fn set_pixel(&self, x: u32, y: u32, pixel: PixelPacket) -> CacheResult<()> {
        self.write()?.set_pixel(x, y, pixel)
    }

    /// Reads one auxiliary slot.
    pub fn index(&self, x: u32, y: u32) -> CacheResult<IndexPacket> {
        self.read()?.index(x, y)
    }

    /// Writes one auxiliary slot.
    pub fn set_index(&self, x: u32, y: u32, index: IndexPacket) -> CacheResult<()> {
        self.write()?.set_index(x, y, index)
    }

    /// Copies `rect` out of the store into fresh buffers.
    pub fn read_region(&self, rect: Rect) -> CacheResult<(Vec<PixelPacket>, Vec<IndexPacket>)> {
        let (mut pixels, mut indexes) = (Vec::new(), Vec::new());
        self.write()?.read_region(rect, &mut pixels, &mut indexes)?;
        Ok((pixels, indexes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_store() {
        let cache = PixelCache::blank(2, 2).unwrap();
        let other = cache.clone();
        other.set_pixel(1, 1, PixelPacket::rgb(3, 2, 1)).unwrap();
        assert_eq!(cache.pixel(1, 1).unwrap(), PixelPacket::rgb(3, 2, 1));
        assert!(cache.same_store(&other));
        assert!(!cache.same_store(&PixelCache::blank(2, 2).unwrap()));
    }

    #[test]
    fn test_open_view_checks_region() {
        let cache = PixelCache::blank(4, 3).unwrap();
        assert!(cache.open_view(Rect::new(1, 1, 3, 2)).is_ok());
        assert!(cache.open_view(Rect::new(2, 0, 3, 1)).unwrap_err().is_bounds_error());
        assert!(cache.open_view(Rect::new(0, 0, 4, 0)).unwrap_err().is_bounds_error());
    }

    #[test]
    fn test_metadata_setters() {
        let cache = PixelCache::blank(1, 1).unwrap();
        cache.set_colorspace(Colorspace::Cmyk).unwrap();
        cache.set_storage_class(StorageClass::Pseudo).unwrap();
        let traits = cache.traits().unwrap();
        assert_eq!(traits.colorspace, Colorspace::Cmyk);
        assert_eq!(traits.storage_class, StorageClass::Pseudo);
        let palette = cache.with_store(|store| {
            store.set_colormap(vec![PixelPacket::rgb(1, 2, 3)]);
            store.colormap().len()
        });
        assert_eq!(palette.unwrap(), 1);
    }
}
