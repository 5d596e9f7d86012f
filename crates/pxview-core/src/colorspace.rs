//! Colorspace and storage-class tags of the backing store.
//!
//! The store keeps one auxiliary 16-bit slot per pixel next to the R,G,B and
//! opacity channels. What that slot means depends on the store's metadata at
//! the moment it is touched:
//!
//! | colorspace | storage class | slot meaning          |
//! |------------|---------------|-----------------------|
//! | CMYK       | any           | black (K)             |
//! | other      | `Pseudo`      | palette index         |
//! | other      | `Direct`      | unused                |
//!
//! [`StoreTraits::index_routing`] resolves this table. It is evaluated on
//! every read and every write-back, never cached on a cell.

use std::fmt;

/// Colorspace tag of a store or a cell.
///
/// Only the tag is carried; no conversion math lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colorspace {
    /// Not set.
    Undefined,
    /// Linear RGB.
    #[default]
    Rgb,
    /// sRGB encoded RGB.
    Srgb,
    /// Single channel gray (stored in R=G=B).
    Gray,
    /// RGB with a fully transparent background.
    Transparent,
    /// Cyan, magenta, yellow, black. The black channel uses the auxiliary slot.
    Cmyk,
    /// CIE L*a*b*.
    Lab,
    /// CIE XYZ.
    Xyz,
    /// YCbCr.
    YCbCr,
    /// YUV.
    Yuv,
    /// Hue, saturation, lightness.
    Hsl,
    /// Hue, whiteness, blackness.
    Hwb,
}

impl Colorspace {
    /// Returns `true` if this colorspace stores a black channel in the auxiliary slot.
    #[inline]
    pub fn has_black_channel(self) -> bool {
        matches!(self, Self::Cmyk)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Rgb => "rgb",
            Self::Srgb => "srgb",
            Self::Gray => "gray",
            Self::Transparent => "transparent",
            Self::Cmyk => "cmyk",
            Self::Lab => "lab",
            Self::Xyz => "xyz",
            Self::YCbCr => "ycbcr",
            Self::Yuv => "yuv",
            Self::Hsl => "hsl",
            Self::Hwb => "hwb",
        }
    }
}

impl fmt::Display for Colorspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How pixels are stored: by value or through a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageClass {
    /// Every pixel carries its own color.
    #[default]
    Direct,
    /// Pixels carry a palette index in the auxiliary slot.
    Pseudo,
}

/// What the auxiliary slot means for a particular read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRouting {
    /// Slot holds the black (K) channel.
    Black,
    /// Slot holds a palette index.
    Index,
    /// Slot is not meaningful and is left untouched.
    Unused,
}

/// Store metadata sampled at the point of a read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreTraits {
    /// Store colorspace.
    pub colorspace: Colorspace,
    /// Store storage class.
    pub storage_class: StorageClass,
    /// Whether the store carries meaningful opacity.
    pub matte: bool,
}

impl StoreTraits {
    /// Creates traits for the given colorspace and storage class, without matte.
    #[inline]
    pub const fn new(colorspace: Colorspace, storage_class: StorageClass) -> Self {
        Self {
            colorspace,
            storage_class,
            matte: false,
        }
    }

    /// Resolves the meaning of the auxiliary slot. CMYK wins over palette storage.
    #[inline]
    pub fn index_routing(&self) -> IndexRouting {
        if self.colorspace.has_black_channel() {
            IndexRouting::Black
        } else if self.storage_class == StorageClass::Pseudo {
            IndexRouting::Index
        } else {
            IndexRouting::Unused
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_table() {
        let direct = StoreTraits::new(Colorspace::Rgb, StorageClass::Direct);
        let pseudo = StoreTraits::new(Colorspace::Srgb, StorageClass::Pseudo);
        let cmyk = StoreTraits::new(Colorspace::Cmyk, StorageClass::Direct);
        let cmyk_pseudo = StoreTraits::new(Colorspace::Cmyk, StorageClass::Pseudo);

        assert_eq!(direct.index_routing(), IndexRouting::Unused);
        assert_eq!(pseudo.index_routing(), IndexRouting::Index);
        assert_eq!(cmyk.index_routing(), IndexRouting::Black);
        assert_eq!(cmyk_pseudo.index_routing(), IndexRouting::Black);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Colorspace::default(), Colorspace::Rgb);
        assert_eq!(StorageClass::default(), StorageClass::Direct);
        assert_eq!(Colorspace::Cmyk.to_string(), "cmyk");
    }
}
