//! Color specification strings.
//!
//! Accepted forms:
//!
//! | form                         | example               |
//! |------------------------------|-----------------------|
//! | `#RGB` / `#RGBA`             | `#f00`                |
//! | `#RRGGBB` / `#RRGGBBAA`      | `#ff000080`           |
//! | `#RRRRGGGGBBBB[AAAA]`        | `#ffff00000000`       |
//! | `rgb(r,g,b)` / `rgba(r,g,b,a)` | `rgb(255, 50%, 0)`  |
//! | `cmyk(c,m,y,k)` / `cmyka(c,m,y,k,a)` | `cmyk(0,0,0,100%)` |
//! | a few names                  | `white`, `none`       |
//!
//! Integer components are 8-bit (`0..=255`), `%` components are relative to
//! the full range, and the `a` component of `rgba`/`cmyka` is a float in
//! `[0, 1]` where `1` is opaque.

use crate::colorspace::Colorspace;
use crate::error::{Error, Result};
use crate::pixel::{IndexPacket, PixelPacket, OPAQUE_OPACITY, TRANSPARENT_OPACITY};
use crate::quantum::{scale_u8, to_quantum, Quantum, QUANTUM_MAX};

/// Result of parsing a color string, in store units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedColor {
    /// Colorspace implied by the syntax (`Cmyk` for `cmyk(...)`).
    pub colorspace: Colorspace,
    /// Whether the string carried an alpha component.
    pub matte: bool,
    /// Color channels and opacity.
    pub pixel: PixelPacket,
    /// Black channel for CMYK colors, otherwise 0.
    pub index: IndexPacket,
}

impl ParsedColor {
    fn rgb(pixel: PixelPacket, matte: bool) -> Self {
        Self {
            colorspace: Colorspace::Rgb,
            matte,
            pixel,
            index: 0,
        }
    }
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// Parses a color specification.
///
/// ```
/// use pxview_core::{parse_color, QUANTUM_MAX};
///
/// let red = parse_color("#ff0000").unwrap();
/// assert_eq!(red.pixel.red, QUANTUM_MAX);
/// assert!(parse_color("not-a-color").is_err());
/// ```
pub fn parse_color(spec: &str) -> Result<ParsedColor> {
    let unrecognized = || Error::UnrecognizedColor(spec.to_string());
    let text = spec.trim().to_ascii_lowercase();

    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(unrecognized);
    }
    if let Some(open) = text.find('(') {
        let body = text[open + 1..].strip_suffix(')').ok_or_else(unrecognized)?;
        return parse_functional(&text[..open], body).ok_or_else(unrecognized);
    }
    if text == "none" || text == "transparent" {
        let pixel = PixelPacket::new(0, 0, 0, TRANSPARENT_OPACITY);
        return Ok(ParsedColor::rgb(pixel, true));
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == text)
        .map(|(_, [r, g, b])| {
            ParsedColor::rgb(PixelPacket::rgb(scale_u8(*r), scale_u8(*g), scale_u8(*b)), false)
        })
        .ok_or_else(unrecognized)
}

fn parse_hex(hex: &str) -> Option<ParsedColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let (digits, components) = match hex.len() {
        3 => (1, 3),
        4 => (1, 4),
        6 => (2, 3),
        8 => (2, 4),
        12 => (4, 3),
        16 => (4, 4),
        _ => return None,
    };
    let max = (1u32 << (4 * digits)) - 1;
    let mut values = [0 as Quantum; 4];
    for (i, value) in values.iter_mut().take(components).enumerate() {
        let chunk = &hex[i * digits..(i + 1) * digits];
        let raw = u32::from_str_radix(chunk, 16).ok()?;
        *value = (raw * QUANTUM_MAX as u32 / max) as Quantum;
    }
    let matte = components == 4;
    let opacity = if matte {
        QUANTUM_MAX - values[3]
    } else {
        OPAQUE_OPACITY
    };
    Some(ParsedColor::rgb(
        PixelPacket::new(values[0], values[1], values[2], opacity),
        matte,
    ))
}

fn parse_functional(name: &str, body: &str) -> Option<ParsedColor> {
    let args: Vec<&str> = body.split(',').map(str::trim).collect();
    let (colorspace, channels, matte) = match name.trim() {
        "rgb" => (Colorspace::Rgb, 3, false),
        "rgba" => (Colorspace::Rgb, 3, true),
        "cmyk" => (Colorspace::Cmyk, 4, false),
        "cmyka" => (Colorspace::Cmyk, 4, true),
        _ => return None,
    };
    if args.len() != channels + usize::from(matte) {
        return None;
    }
    let mut values = [0 as Quantum; 4];
    for (value, arg) in values.iter_mut().zip(&args[..channels]) {
        *value = parse_component(arg)?;
    }
    let opacity = if matte {
        let alpha: f64 = args[channels].parse().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        to_quantum(1.0 - alpha)
    } else {
        OPAQUE_OPACITY
    };
    Some(ParsedColor {
        colorspace,
        matte,
        pixel: PixelPacket::new(values[0], values[1], values[2], opacity),
        index: if colorspace == Colorspace::Cmyk { values[3] } else { 0 },
    })
}

fn parse_component(arg: &str) -> Option<Quantum> {
    if let Some(percent) = arg.strip_suffix('%') {
        let value: f64 = percent.trim().parse().ok()?;
        if !(0.0..=100.0).contains(&value) {
            return None;
        }
        return Some(to_quantum(value / 100.0));
    }
    arg.parse::<u8>().ok().map(scale_u8)
}
