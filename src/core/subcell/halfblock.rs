// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Halfblock blitting (1 column x 2 rows per cell, §4.3).

use super::sample::{luminance_709, sq_dist};
use crate::core::cell::style::RgbColor;

/// The result of blitting one cell in halfblock mode: either a single flat
/// color (both samples nearly equal) or a glyph with fg occupying the
/// chosen half and bg the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalfblockCell {
    /// Emit a space with `bg` as the cell's background (both halves equal).
    Flat { bg: RgbColor },
    /// Emit U+2580 (upper half block): fg = top sample, bg = bottom.
    Upper { fg: RgbColor, bg: RgbColor },
    /// Emit U+2584 (lower half block): fg = bottom sample, bg = top.
    Lower { fg: RgbColor, bg: RgbColor },
}

pub const UPPER_HALF_BLOCK: char = '\u{2580}';
pub const LOWER_HALF_BLOCK: char = '\u{2584}';

/// Delta-squared threshold at or below which the two samples are treated
/// as a single flat color (§4.3: "Δ² <= 256").
pub const FLAT_THRESHOLD: f64 = 256.0;

/// Chooses the halfblock rendering for one cell from its two samples
/// (`top`, `bottom`), each `(rgb, alpha, under_background)`.
#[must_use]
pub fn halfblock_cell(top: (RgbColor, u8), bottom: (RgbColor, u8), cell_background: RgbColor) -> HalfblockCell {
    let top_opaque = top.1 >= super::partition::ALPHA_THRESHOLD;
    let bottom_opaque = bottom.1 >= super::partition::ALPHA_THRESHOLD;
    let top_color = if top_opaque { top.0 } else { cell_background };
    let bottom_color = if bottom_opaque { bottom.0 } else { cell_background };

    if sq_dist(top_color, bottom_color) <= FLAT_THRESHOLD {
        return HalfblockCell::Flat { bg: top_color };
    }

    match (top_opaque, bottom_opaque) {
        (true, false) => HalfblockCell::Upper { fg: top_color, bg: bottom_color },
        (false, true) => HalfblockCell::Lower { fg: bottom_color, bg: top_color },
        _ => {
            if luminance_709(top_color) >= luminance_709(bottom_color) {
                HalfblockCell::Upper { fg: top_color, bg: bottom_color }
            } else {
                HalfblockCell::Lower { fg: bottom_color, bg: top_color }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_samples_collapse_to_flat() {
        let top = (RgbColor::new(10, 10, 10), 255);
        let bottom = (RgbColor::new(12, 10, 10), 255);
        assert_eq!(halfblock_cell(top, bottom, RgbColor::BLACK), HalfblockCell::Flat { bg: top.0 });
    }

    #[test]
    fn opaque_top_transparent_bottom_picks_upper() {
        let top = (RgbColor::new(255, 0, 0), 255);
        let bottom = (RgbColor::new(0, 0, 0), 0);
        let bg = RgbColor::new(20, 20, 20);
        assert_eq!(halfblock_cell(top, bottom, bg), HalfblockCell::Upper { fg: top.0, bg });
    }

    #[test]
    fn both_opaque_picks_higher_luminance_half() {
        let bright = (RgbColor::new(255, 255, 255), 255);
        let dark = (RgbColor::new(0, 0, 0), 255);
        assert_eq!(halfblock_cell(bright, dark, RgbColor::BLACK), HalfblockCell::Upper { fg: bright.0, bg: dark.0 });
        assert_eq!(halfblock_cell(dark, bright, RgbColor::BLACK), HalfblockCell::Lower { fg: bright.0, bg: dark.0 });
    }
}
