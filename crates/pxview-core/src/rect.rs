//! Rectangular regions of a pixel store.
//!
//! A [`Rect`] is the window a view or iterator works on: origin plus extent,
//! all in pixels, with `(0, 0)` at the top-left corner of the store.
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐  <- y
//!   │   │  region  │
//!   │   └──────────┘  <- y + height (exclusive)
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use pxview_core::Rect;
//!
//! let region = Rect::new(10, 20, 100, 50);
//! assert!(region.contains(15, 25));
//! assert_eq!(region.row(3), Rect::new(10, 23, 100, 1));
//! ```
//!
//! # Used By
//!
//! - `pxview-cache` - view requests are bounds-checked against the store
//! - `pxview-iter` - the iterator's fixed region

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// # Invariants
///
/// - A rectangle with zero width or height is considered empty
/// - Edge arithmetic saturates instead of wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: u32,
    /// Y coordinate of the top edge (inclusive)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from origin (0, 0) with given dimensions.
    ///
    /// ```rust
    /// use pxview_core::Rect;
    ///
    /// let rect = Rect::from_size(1920, 1080);
    /// assert_eq!((rect.x, rect.y), (0, 0));
    /// ```
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the X coordinate of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Returns the Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point (px, py) is inside this rectangle.
    ///
    /// Inclusive on the left/top edges, exclusive on the right/bottom edges.
    #[inline]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns `true` if this rectangle fully contains another.
    ///
    /// ```rust
    /// use pxview_core::Rect;
    ///
    /// let outer = Rect::from_size(100, 100);
    /// assert!(outer.contains_rect(&Rect::new(10, 10, 50, 50)));
    /// assert!(!outer.contains_rect(&Rect::new(90, 0, 20, 1)));
    /// ```
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles don't overlap.
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Returns the single-row rectangle at `offset` rows below the top edge.
    ///
    /// The result keeps this rectangle's x and width.
    #[inline]
    pub const fn row(&self, offset: u32) -> Rect {
        Rect::new(self.x, self.y.saturating_add(offset), self.width, 1)
    }

    /// Number of pixels as `usize`, for buffer sizing.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.area() as usize
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
