//! Integer channel encoding used by the backing store.
//!
//! Channels are stored as [`Quantum`] values in `[0, QUANTUM_MAX]`. Cells
//! keep a normalized `f64` copy; the two forms convert with
//! [`to_quantum`] (round half up) and [`from_quantum`] (exact division).

/// Integer channel value as stored in the pixel store.
pub type Quantum = u16;

/// Bits per channel.
pub const QUANTUM_DEPTH: u32 = 16;

/// Largest representable channel value.
pub const QUANTUM_MAX: Quantum = Quantum::MAX;

/// [`QUANTUM_MAX`] as a float, the scale between normalized and quantized values.
pub const QUANTUM_RANGE: f64 = QUANTUM_MAX as f64;

/// Converts a normalized value to a quantum.
///
/// Adds a `0.5` bias before truncating, so ties round up. Inputs outside
/// `[0, 1]` saturate to the ends of the quantum range.
///
/// ```
/// use pxview_core::{to_quantum, QUANTUM_MAX};
/// assert_eq!(to_quantum(1.0), QUANTUM_MAX);
/// assert_eq!(to_quantum(0.0), 0);
/// ```
#[inline]
pub fn to_quantum(value: f64) -> Quantum {
    // float-to-int `as` saturates, NaN maps to 0
    (QUANTUM_RANGE * value + 0.5) as Quantum
}

/// Converts a quantum to its normalized value in `[0, 1]`.
#[inline]
pub fn from_quantum(value: Quantum) -> f64 {
    value as f64 / QUANTUM_RANGE
}

/// Scales an 8-bit channel value to the full quantum range.
///
/// ```
/// use pxview_core::quantum::scale_u8;
/// assert_eq!(scale_u8(255), pxview_core::QUANTUM_MAX);
/// ```
#[inline]
pub fn scale_u8(value: u8) -> Quantum {
    // 257 * 255 == 65535
    value as Quantum * (QUANTUM_MAX / u8::MAX as Quantum)
}
