//! Pixel forms exchanged with the backing store.
//!
//! - [`PixelPacket`] - the store's native per-pixel layout (quantized R,G,B,opacity)
//! - [`IndexPacket`] - the auxiliary per-pixel slot stored next to each packet
//! - [`MagickPixel`] - floating point color with its colorspace, matte and fuzz,
//!   used for distance comparisons
//!
//! Opacity follows the store convention: `0` is opaque, [`QUANTUM_MAX`] is
//! fully transparent.

use crate::colorspace::Colorspace;
use crate::quantum::{Quantum, QUANTUM_MAX};

/// Auxiliary per-pixel slot: black channel or palette index.
pub type IndexPacket = Quantum;

/// Opacity value of a fully opaque pixel.
pub const OPAQUE_OPACITY: Quantum = 0;

/// Opacity value of a fully transparent pixel.
pub const TRANSPARENT_OPACITY: Quantum = QUANTUM_MAX;

/// Native store pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct PixelPacket {
    /// Red (or cyan) quantum.
    pub red: Quantum,
    /// Green (or magenta) quantum.
    pub green: Quantum,
    /// Blue (or yellow) quantum.
    pub blue: Quantum,
    /// Opacity quantum, 0 = opaque.
    pub opacity: Quantum,
}

impl PixelPacket {
    /// Creates an opaque pixel.
    #[inline]
    pub const fn rgb(red: Quantum, green: Quantum, blue: Quantum) -> Self {
        Self {
            red,
            green,
            blue,
            opacity: OPAQUE_OPACITY,
        }
    }

    /// Creates a pixel with explicit opacity.
    #[inline]
    pub const fn new(red: Quantum, green: Quantum, blue: Quantum, opacity: Quantum) -> Self {
        Self {
            red,
            green,
            blue,
            opacity,
        }
    }
}

/// Floating point color in an arbitrary but consistent scale.
///
/// `fuzz` is expressed in the same scale as the channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagickPixel {
    /// Colorspace tag.
    pub colorspace: Colorspace,
    /// Whether opacity takes part in comparisons.
    pub matte: bool,
    /// Similarity tolerance.
    pub fuzz: f64,
    /// Red channel.
    pub red: f64,
    /// Green channel.
    pub green: f64,
    /// Blue channel.
    pub blue: f64,
    /// Opacity channel.
    pub opacity: f64,
    /// Auxiliary channel (black for CMYK).
    pub index: f64,
}

impl MagickPixel {
    fn compared_channels(&self, other: &MagickPixel) -> Vec<(f64, f64)> {
        let mut pairs = vec![
            (self.red, other.red),
            (self.green, other.green),
            (self.blue, other.blue),
        ];
        if self.matte {
            pairs.push((self.opacity, other.opacity));
        }
        if self.colorspace.has_black_channel() {
            pairs.push((self.index, other.index));
        }
        pairs
    }
}

/// Exact comparison over the channels `p` cares about.
///
/// Opacity is compared only when `p.matte` is set, the index channel only
/// when `p` is CMYK.
pub fn is_color_equal(p: &MagickPixel, q: &MagickPixel) -> bool {
    p.compared_channels(q).into_iter().all(|(a, b)| a == b)
}

/// Distance comparison using `p.fuzz` as the per-channel tolerance.
///
/// With zero fuzz this is [`is_color_equal`]. Otherwise the squared
/// Euclidean distance over the compared channels must not exceed
/// `fuzz^2` times the number of compared channels. The sum is checked after
/// each channel so far-apart colors bail out early.
///
/// ```
/// use pxview_core::{is_color_similar, MagickPixel};
///
/// let p = MagickPixel { red: 0.5, fuzz: 0.1, ..Default::default() };
/// let q = MagickPixel { red: 0.55, ..Default::default() };
/// assert!(is_color_similar(&p, &q));
/// ```
pub fn is_color_similar(p: &MagickPixel, q: &MagickPixel) -> bool {
    if p.fuzz == 0.0 {
        return is_color_equal(p, q);
    }
    let pairs = p.compared_channels(q);
    let limit = p.fuzz * p.fuzz * pairs.len() as f64;
    let mut distance = 0.0;
    for (a, b) in pairs {
        let delta = a - b;
        distance += delta * delta;
        if distance > limit {
            return false;
        }
    }
    true
}
