//! Locally scoped object identifiers.
//!
//! Cells and iterators carry an [`ObjectId`] for debugging and log
//! correlation. Ids come from an [`IdFactory`] owned by the caller, so two
//! independent factories may hand out the same numbers; there is no
//! process-wide registry.

use std::fmt;
use std::num::NonZeroU64;

use crate::cell::ColorCell;
use crate::error::{Error, Result};

/// Opaque identifier assigned by an [`IdFactory`].
///
/// Cells created outside a factory are anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId(Option<NonZeroU64>);

impl ObjectId {
    /// The id of objects not created through a factory.
    pub const ANONYMOUS: Self = Self(None);

    /// Returns the raw number, or `None` for anonymous objects.
    #[inline]
    pub fn get(self) -> Option<u64> {
        self.0.map(NonZeroU64::get)
    }

    /// Returns `true` if no factory assigned this id.
    #[inline]
    pub fn is_anonymous(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("anon"),
        }
    }
}

/// Monotonic id source.
///
/// # Example
///
/// ```
/// use pxview_core::{IdFactory, Named};
///
/// let mut ids = IdFactory::new();
/// let cell = ids.cell();
/// assert_eq!(cell.debug_name(), "ColorCell-1");
/// let row = ids.cells(3).unwrap();
/// assert_eq!(row.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct IdFactory {
    last: u64,
}

impl IdFactory {
    /// Creates a factory whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next id.
    pub fn next_id(&mut self) -> ObjectId {
        self.last = self.last.wrapping_add(1).max(1);
        ObjectId(NonZeroU64::new(self.last))
    }

    /// Creates one cell with a fresh id.
    pub fn cell(&mut self) -> ColorCell {
        ColorCell::with_id(self.next_id())
    }

    /// Creates `count` cells with consecutive ids.
    ///
    /// The backing array is reserved up front; if that fails the result is
    /// [`Error::OutOfMemory`] and no cells exist.
    pub fn cells(&mut self, count: usize) -> Result<Vec<ColorCell>> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| Error::out_of_memory(count))?;
        for _ in 0..count {
            cells.push(self.cell());
        }
        Ok(cells)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.last
    }
}

/// Objects that have a human-readable debug name.
pub trait Named {
    /// Type prefix, e.g. `"ColorCell"`.
    const KIND: &'static str;

    /// The object's id.
    fn id(&self) -> ObjectId;

    /// `"<Kind>-<id>"`.
    fn debug_name(&self) -> String {
        format!("{}-{}", Self::KIND, self.id())
    }
}
