// this_file: src/index.rs
//! Ordinal-to-color encoding for the label surface.
//!
//! Horizontal layouts encode `i + 1` so that black stays free for the
//! background; vertical layouts encode `i` directly and leave the green
//! channel unreduced. Both forms are kept as they are consumed downstream.

use crate::color::Rgb;
use crate::layout::Orientation;

const BASE: usize = 255;

/// Largest ordinal a vertical label can carry without overflowing green.
pub const MAX_VERTICAL_ORDINAL: usize = BASE * 256 - 1;

/// Label color of the unit at `ordinal`, or `None` if it cannot be encoded.
pub fn index_color(ordinal: usize, orientation: Orientation) -> Option<Rgb> {
    match orientation {
        Orientation::Horizontal => {
            let idx = ordinal.checked_add(1)?;
            let r = u8::try_from(idx / (BASE * BASE)).ok()?;
            let g = ((idx / BASE) % BASE) as u8;
            let b = (idx % BASE) as u8;
            Some(Rgb([r, g, b]))
        }
        Orientation::Vertical => {
            let r = u8::try_from(ordinal / (BASE * BASE)).ok()?;
            let g = u8::try_from(ordinal / BASE).ok()?;
            let b = (ordinal % BASE) as u8;
            Some(Rgb([r, g, b]))
        }
    }
}

/// Recover the ordinal painted with `color`.
///
/// Returns `None` for colors no ordinal maps to (including the horizontal
/// background).
pub fn decode(color: Rgb, orientation: Orientation) -> Option<usize> {
    let [r, g, b] = color.0.map(usize::from);
    if b >= BASE {
        return None;
    }
    match orientation {
        Orientation::Horizontal => {
            if g >= BASE {
                return None;
            }
            let idx = r * BASE * BASE + g * BASE + b;
            idx.checked_sub(1)
        }
        Orientation::Vertical => {
            // green is unreduced, so red is redundant; re-encode to check it
            let ordinal = g * BASE + b;
            (index_color(ordinal, orientation) == Some(color)).then_some(ordinal)
        }
    }
}
