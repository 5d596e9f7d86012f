//! Mutable single-pixel color cells.
//!
//! A [`ColorCell`] holds one pixel's channels as normalized `f64` values in
//! `[0, 1]`. Quantized accessors convert on the fly with
//! [`to_quantum`](crate::quantum::to_quantum) / [`from_quantum`](crate::quantum::from_quantum),
//! so a quantum written through [`ColorCell::set_channel_quantum`] reads back
//! unchanged through [`ColorCell::channel_quantum`].
//!
//! # Channels
//!
//! | [`Channel`]                | storage slot            |
//! |----------------------------|-------------------------|
//! | `Red` / `Cyan`             | red                     |
//! | `Green` / `Magenta`        | green                   |
//! | `Blue` / `Yellow`          | blue                    |
//! | `Opacity`                  | opacity (0 = opaque)    |
//! | `Alpha`                    | `1 - opacity`           |
//! | `Black` / `Index`          | auxiliary ([`AuxChannel`]) |
//!
//! The auxiliary slot is a tagged value: it is either black, a palette
//! index, or unused. Which one a cell holds is decided when it is loaded from
//! a store (see [`ColorCell::set_from_store`]) or when a caller sets `Black`
//! or `Index` explicitly. Reading `Black` from a cell that holds an index
//! (or the reverse) yields 0 rather than a reinterpretation of stale data.
//!
//! # Example
//!
//! ```
//! use pxview_core::{Channel, ColorCell, QUANTUM_MAX};
//!
//! let mut cell = ColorCell::new();
//! cell.set_channel(Channel::Red, 1.5); // clamped
//! assert_eq!(cell.channel(Channel::Red), 1.0);
//! assert_eq!(cell.channel_quantum(Channel::Red), QUANTUM_MAX);
//! assert_eq!(cell.to_color_string(), format!("{QUANTUM_MAX},0,0"));
//! ```

use crate::color_name::parse_color;
use crate::colorspace::{Colorspace, IndexRouting, StoreTraits};
use crate::error::Result;
use crate::exception::{Exception, Severity};
use crate::id::{Named, ObjectId};
use crate::pixel::{is_color_similar, IndexPacket, MagickPixel, PixelPacket};
use crate::quantum::{from_quantum, to_quantum, Quantum, QUANTUM_MAX, QUANTUM_RANGE};

/// Addressable channel of a [`ColorCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red slot.
    Red,
    /// Green slot.
    Green,
    /// Blue slot.
    Blue,
    /// Opacity slot, 0 = opaque.
    Opacity,
    /// Complement of opacity.
    Alpha,
    /// Red slot, CMYK naming.
    Cyan,
    /// Green slot, CMYK naming.
    Magenta,
    /// Blue slot, CMYK naming.
    Yellow,
    /// Auxiliary slot as black.
    Black,
    /// Auxiliary slot as palette index.
    Index,
}

impl Channel {
    /// Every channel, for exhaustive checks.
    pub const ALL: [Channel; 10] = [
        Channel::Red,
        Channel::Green,
        Channel::Blue,
        Channel::Opacity,
        Channel::Alpha,
        Channel::Cyan,
        Channel::Magenta,
        Channel::Yellow,
        Channel::Black,
        Channel::Index,
    ];
}

/// Content of the auxiliary slot, normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AuxChannel {
    /// Nothing meaningful stored.
    #[default]
    Unused,
    /// Black (K) channel.
    Black(f64),
    /// Palette index divided by [`QUANTUM_MAX`].
    Index(f64),
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value > 1.0 {
        1.0
    } else if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// One pixel's channels, plus the metadata needed to format and compare it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCell {
    id: ObjectId,
    colorspace: Colorspace,
    matte: bool,
    fuzz: f64,
    red: f64,
    green: f64,
    blue: f64,
    opacity: f64,
    aux: AuxChannel,
    count: u64,
    exception: Option<Exception>,
}

impl Default for ColorCell {
    fn default() -> Self {
        Self::with_id(ObjectId::ANONYMOUS)
    }
}

impl ColorCell {
    /// Creates an anonymous opaque black RGB cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cell carrying `id`. Use [`IdFactory::cell`](crate::IdFactory::cell) to get one.
    pub fn with_id(id: ObjectId) -> Self {
        Self {
            id,
            colorspace: Colorspace::Rgb,
            matte: false,
            fuzz: 0.0,
            red: 0.0,
            green: 0.0,
            blue: 0.0,
            opacity: 0.0,
            aux: AuxChannel::Unused,
            count: 1,
            exception: None,
        }
    }

    /// The cell's id.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Drops any recorded exception and resets the colorspace to RGB.
    ///
    /// Channel values are kept.
    pub fn clear(&mut self) {
        self.exception = None;
        self.colorspace = Colorspace::Rgb;
    }

    // === Channel access ===

    /// Normalized value of `which`.
    pub fn channel(&self, which: Channel) -> f64 {
        match which {
            Channel::Red | Channel::Cyan => self.red,
            Channel::Green | Channel::Magenta => self.green,
            Channel::Blue | Channel::Yellow => self.blue,
            Channel::Opacity => self.opacity,
            Channel::Alpha => 1.0 - self.opacity,
            Channel::Black => match self.aux {
                AuxChannel::Black(v) => v,
                _ => 0.0,
            },
            Channel::Index => match self.aux {
                AuxChannel::Index(v) => v,
                _ => 0.0,
            },
        }
    }

    /// Sets `which` to `value` clamped to `[0, 1]`.
    pub fn set_channel(&mut self, which: Channel, value: f64) {
        let value = clamp_unit(value);
        match which {
            Channel::Red | Channel::Cyan => self.red = value,
            Channel::Green | Channel::Magenta => self.green = value,
            Channel::Blue | Channel::Yellow => self.blue = value,
            Channel::Opacity => self.opacity = value,
            Channel::Alpha => self.opacity = 1.0 - value,
            Channel::Black => self.aux = AuxChannel::Black(value),
            Channel::Index => self.aux = AuxChannel::Index(value),
        }
    }

    /// Quantized value of `which`, rounded half up.
    #[inline]
    pub fn channel_quantum(&self, which: Channel) -> Quantum {
        to_quantum(self.channel(which))
    }

    /// Sets `which` from a quantum. The input range needs no clamping.
    pub fn set_channel_quantum(&mut self, which: Channel, value: Quantum) {
        let normalized = from_quantum(value);
        match which {
            Channel::Alpha => self.opacity = from_quantum(QUANTUM_MAX - value),
            _ => self.set_channel(which, normalized),
        }
    }

    /// Normalized red.
    #[inline]
    pub fn red(&self) -> f64 {
        self.red
    }

    /// Normalized green.
    #[inline]
    pub fn green(&self) -> f64 {
        self.green
    }

    /// Normalized blue.
    #[inline]
    pub fn blue(&self) -> f64 {
        self.blue
    }

    /// Normalized alpha (`1 - opacity`).
    #[inline]
    pub fn alpha(&self) -> f64 {
        1.0 - self.opacity
    }

    /// Palette index, or 0 if the auxiliary slot holds something else.
    #[inline]
    pub fn index(&self) -> IndexPacket {
        self.channel_quantum(Channel::Index)
    }

    /// Stores a palette index in the auxiliary slot.
    #[inline]
    pub fn set_index(&mut self, index: IndexPacket) {
        self.set_channel_quantum(Channel::Index, index);
    }

    /// Current content of the auxiliary slot.
    #[inline]
    pub fn aux(&self) -> AuxChannel {
        self.aux
    }

    // === Bulk conversion ===

    /// Sets R,G,B and opacity from a store pixel. The auxiliary slot is untouched.
    pub fn set_quantum_color(&mut self, color: &PixelPacket) {
        self.red = from_quantum(color.red);
        self.green = from_quantum(color.green);
        self.blue = from_quantum(color.blue);
        self.opacity = from_quantum(color.opacity);
    }

    /// R,G,B and opacity as a store pixel.
    pub fn quantum_color(&self) -> PixelPacket {
        PixelPacket::new(
            to_quantum(self.red),
            to_quantum(self.green),
            to_quantum(self.blue),
            to_quantum(self.opacity),
        )
    }

    /// Loads the cell from a store pixel and its auxiliary slot.
    ///
    /// `traits` must be sampled from the store for this read: it decides
    /// whether `index` is black, a palette index, or ignored. The cell also
    /// takes the store's colorspace and matte flag so that formatting and
    /// comparison reflect where the color came from.
    pub fn set_from_store(&mut self, pixel: &PixelPacket, index: IndexPacket, traits: &StoreTraits) {
        self.set_quantum_color(pixel);
        self.aux = match traits.index_routing() {
            IndexRouting::Black => AuxChannel::Black(from_quantum(index)),
            IndexRouting::Index => AuxChannel::Index(from_quantum(index)),
            IndexRouting::Unused => AuxChannel::Unused,
        };
        self.colorspace = traits.colorspace;
        self.matte = traits.matte;
    }

    /// Writes the cell into a store pixel and its auxiliary slot.
    ///
    /// `traits` must be sampled at write time. When the slot means black the
    /// cell's black value is written, when it means index the cell's index is
    /// written, otherwise `index` is left as it was. A cell whose auxiliary
    /// slot holds the other kind writes 0.
    pub fn write_to_store(&self, pixel: &mut PixelPacket, index: &mut IndexPacket, traits: &StoreTraits) {
        *pixel = self.quantum_color();
        match traits.index_routing() {
            IndexRouting::Black => *index = self.channel_quantum(Channel::Black),
            IndexRouting::Index => *index = self.channel_quantum(Channel::Index),
            IndexRouting::Unused => {}
        }
    }

    /// Channels scaled to `[0, QUANTUM_MAX]` as floats, with fuzz scaled alike.
    pub fn magick_color(&self) -> MagickPixel {
        let normalized = self.normalized_pixel();
        MagickPixel {
            fuzz: normalized.fuzz * QUANTUM_RANGE,
            red: normalized.red * QUANTUM_RANGE,
            green: normalized.green * QUANTUM_RANGE,
            blue: normalized.blue * QUANTUM_RANGE,
            opacity: normalized.opacity * QUANTUM_RANGE,
            index: normalized.index * QUANTUM_RANGE,
            ..normalized
        }
    }

    fn normalized_pixel(&self) -> MagickPixel {
        let index = match self.aux {
            AuxChannel::Black(v) | AuxChannel::Index(v) => v,
            AuxChannel::Unused => 0.0,
        };
        MagickPixel {
            colorspace: self.colorspace,
            matte: self.matte,
            fuzz: self.fuzz,
            red: self.red,
            green: self.green,
            blue: self.blue,
            opacity: self.opacity,
            index,
        }
    }

    /// Formats as comma-joined quanta: `R,G,B[,K][,A]`.
    ///
    /// The black value is appended for CMYK cells and the opacity quantum for
    /// cells with alpha.
    pub fn to_color_string(&self) -> String {
        let mut out = format!(
            "{},{},{}",
            to_quantum(self.red),
            to_quantum(self.green),
            to_quantum(self.blue)
        );
        if self.colorspace.has_black_channel() {
            out.push_str(&format!(",{}", self.channel_quantum(Channel::Black)));
        }
        if self.matte {
            out.push_str(&format!(",{}", to_quantum(self.opacity)));
        }
        out
    }

    /// Compares two cells with tolerance `fuzz` (normalized units).
    ///
    /// Both cells keep `fuzz` afterwards; any previous tolerance is lost.
    pub fn similar(&mut self, other: &mut ColorCell, fuzz: f64) -> bool {
        self.fuzz = fuzz;
        other.fuzz = fuzz;
        is_color_similar(&self.normalized_pixel(), &other.normalized_pixel())
    }

    /// Last tolerance set by [`similar`](Self::similar).
    #[inline]
    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }

    /// Sets the cell from a color specification such as `"#ff8000"` or `"cmyk(0,0,0,50%)"`.
    ///
    /// On failure the cell is unchanged, the error is returned and also
    /// recorded in the cell's exception slot.
    pub fn set_color(&mut self, spec: &str) -> Result<()> {
        let parsed = match parse_color(spec) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.exception = Some(Exception::from_error(Severity::Error, "unrecognized color", &err));
                return Err(err);
            }
        };
        self.colorspace = parsed.colorspace;
        self.matte = parsed.matte;
        self.set_quantum_color(&parsed.pixel);
        self.aux = if parsed.colorspace.has_black_channel() {
            AuxChannel::Black(from_quantum(parsed.index))
        } else {
            AuxChannel::Unused
        };
        Ok(())
    }

    // === Metadata ===

    /// Occurrence count (1 unless the cell is a histogram bucket).
    #[inline]
    pub fn color_count(&self) -> u64 {
        self.count
    }

    /// Sets the occurrence count.
    #[inline]
    pub fn set_color_count(&mut self, count: u64) {
        self.count = count;
    }

    /// Colorspace tag.
    #[inline]
    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    /// Sets the colorspace tag. Channel values are not converted.
    #[inline]
    pub fn set_colorspace(&mut self, colorspace: Colorspace) {
        self.colorspace = colorspace;
    }

    /// Whether opacity is meaningful.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.matte
    }

    /// Marks opacity as meaningful or not.
    #[inline]
    pub fn set_has_alpha(&mut self, matte: bool) {
        self.matte = matte;
    }

    /// Last recorded exception.
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

impl Named for ColorCell {
    const KIND: &'static str = "ColorCell";

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::StorageClass;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_set_channel_clamps() {
        let mut cell = ColorCell::new();
        for which in Channel::ALL {
            for value in [-3.0, -0.0001, 0.0, 0.25, 0.5, 1.0, 1.0001, 42.0] {
                cell.set_channel(which, value);
                assert_abs_diff_eq!(cell.channel(which), value.clamp(0.0, 1.0), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_set_channel_nan_is_zero() {
        let mut cell = ColorCell::new();
        for which in Channel::ALL {
            cell.set_channel(which, 0.5);
            cell.set_channel(which, f64::NAN);
            assert_eq!(cell.channel(which), 0.0, "{which:?}");
            assert_eq!(cell.channel_quantum(which), 0, "{which:?}");
        }
    }

    #[test]
    fn test_quantum_round_trip_all_channels() {
        let mut cell = ColorCell::new();
        for which in Channel::ALL {
            for q in 0..=QUANTUM_MAX {
                cell.set_channel_quantum(which, q);
                assert_eq!(cell.channel_quantum(which), q, "{which:?} drifted at {q}");
            }
        }
    }

    #[test]
    fn test_alpha_is_opacity_complement() {
        let mut cell = ColorCell::new();
        cell.set_channel(Channel::Alpha, 0.25);
        assert_abs_diff_eq!(cell.channel(Channel::Opacity), 0.75, epsilon = 1e-12);
        cell.set_channel(Channel::Alpha, 7.0);
        assert_eq!(cell.channel(Channel::Opacity), 0.0);
        cell.set_channel_quantum(Channel::Alpha, 0);
        assert_eq!(cell.channel_quantum(Channel::Opacity), QUANTUM_MAX);
    }

    #[test]
    fn test_cmyk_aliases() {
        let mut cell = ColorCell::new();
        cell.set_channel(Channel::Cyan, 0.1);
        cell.set_channel(Channel::Magenta, 0.2);
        cell.set_channel(Channel::Yellow, 0.3);
        assert_eq!(cell.red(), 0.1);
        assert_eq!(cell.green(), 0.2);
        assert_eq!(cell.blue(), 0.3);
    }

    #[test]
    fn test_aux_kinds_do_not_alias() {
        let mut cell = ColorCell::new();
        cell.set_index(7);
        assert_eq!(cell.index(), 7);
        assert_eq!(cell.channel(Channel::Black), 0.0);
        cell.set_channel(Channel::Black, 0.5);
        assert_eq!(cell.index(), 0);
        assert_eq!(cell.aux(), AuxChannel::Black(0.5));
    }

    #[test]
    fn test_set_from_store_routes_index() {
        let pixel = PixelPacket::rgb(10, 20, 30);
        let mut cell = ColorCell::new();

        cell.set_from_store(&pixel, 400, &StoreTraits::new(Colorspace::Cmyk, StorageClass::Direct));
        assert_eq!(cell.channel_quantum(Channel::Black), 400);
        assert_eq!(cell.colorspace(), Colorspace::Cmyk);

        cell.set_from_store(&pixel, 5, &StoreTraits::new(Colorspace::Rgb, StorageClass::Pseudo));
        assert_eq!(cell.index(), 5);
        assert_eq!(cell.channel(Channel::Black), 0.0);

        cell.set_from_store(&pixel, 999, &StoreTraits::new(Colorspace::Rgb, StorageClass::Direct));
        assert_eq!(cell.aux(), AuxChannel::Unused);
        assert_eq!(cell.quantum_color(), pixel);
    }

    #[test]
    fn test_write_to_store_uses_write_time_traits() {
        let mut cell = ColorCell::new();
        cell.set_from_store(&PixelPacket::rgb(1, 2, 3), 0, &StoreTraits::default());
        cell.set_channel_quantum(Channel::Black, 1234);

        let mut pixel = PixelPacket::default();
        let mut index = 77;
        cell.write_to_store(&mut pixel, &mut index, &StoreTraits::default());
        assert_eq!(index, 77, "unused slot must be left alone");
        assert_eq!(pixel, PixelPacket::rgb(1, 2, 3));

        cell.write_to_store(&mut pixel, &mut index, &StoreTraits::new(Colorspace::Cmyk, StorageClass::Direct));
        assert_eq!(index, 1234);

        cell.write_to_store(&mut pixel, &mut index, &StoreTraits::new(Colorspace::Rgb, StorageClass::Pseudo));
        assert_eq!(index, 0, "black is not an index");
    }

    #[test]
    fn test_color_string_fields() {
        let mut cell = ColorCell::new();
        cell.set_channel_quantum(Channel::Red, 1);
        cell.set_channel_quantum(Channel::Green, 2);
        cell.set_channel_quantum(Channel::Blue, 3);
        assert_eq!(cell.to_color_string(), "1,2,3");

        cell.set_colorspace(Colorspace::Cmyk);
        cell.set_channel_quantum(Channel::Black, 4);
        assert_eq!(cell.to_color_string(), "1,2,3,4");

        cell.set_has_alpha(true);
        cell.set_channel_quantum(Channel::Opacity, 5);
        assert_eq!(cell.to_color_string(), "1,2,3,4,5");

        cell.set_colorspace(Colorspace::Rgb);
        assert_eq!(cell.to_color_string(), "1,2,3,5");
    }

    #[test]
    fn test_similar_overwrites_fuzz() {
        let mut a = ColorCell::new();
        let mut b = ColorCell::new();
        a.set_channel(Channel::Red, 0.50);
        b.set_channel(Channel::Red, 0.52);

        assert!(!a.similar(&mut b, 0.0));
        assert!(a.similar(&mut b, 0.05));
        assert_eq!(a.fuzz(), 0.05);
        assert_eq!(b.fuzz(), 0.05);
        assert!(!a.similar(&mut b, 0.001));
        assert_eq!(b.fuzz(), 0.001);
    }

    #[test]
    fn test_set_color() {
        let mut cell = ColorCell::new();
        cell.set_color("rgba(255,0,0,0.0)").unwrap();
        assert!(cell.has_alpha());
        assert_eq!(cell.channel_quantum(Channel::Red), QUANTUM_MAX);
        assert_eq!(cell.alpha(), 0.0);

        cell.set_color("cmyk(0,0,0,100%)").unwrap();
        assert_eq!(cell.colorspace(), Colorspace::Cmyk);
        assert_eq!(cell.channel(Channel::Black), 1.0);
        assert!(cell.exception().is_none());
    }

    #[test]
    fn test_set_color_failure_records_exception() {
        let mut cell = ColorCell::new();
        cell.set_channel(Channel::Green, 0.5);
        assert!(cell.set_color("#nothex").is_err());
        assert_eq!(cell.green(), 0.5);
        let exc = cell.clear_exception().unwrap();
        assert_eq!(exc.severity, Severity::Error);
        assert!(cell.exception().is_none());
    }

    #[test]
    fn test_clear_and_count() {
        let mut cell = ColorCell::new();
        assert_eq!(cell.color_count(), 1);
        cell.set_color_count(12);
        assert_eq!(cell.color_count(), 12);
        cell.set_colorspace(Colorspace::Lab);
        let _ = cell.set_color("bogus");
        cell.clear();
        assert_eq!(cell.colorspace(), Colorspace::Rgb);
        assert!(cell.exception().is_none());
    }

    #[test]
    fn test_magick_color_scale() {
        let mut cell = ColorCell::new();
        cell.set_channel(Channel::Blue, 1.0);
        let magick = cell.magick_color();
        assert_abs_diff_eq!(magick.blue, QUANTUM_RANGE, epsilon = 1e-9);
        assert_eq!(magick.red, 0.0);
    }
}
