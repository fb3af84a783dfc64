// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Sextant blitting (2 columns x 3 rows per cell, §4.3): the Unicode
//! "Symbols for Legacy Computing" sextant block (U+1FB00..=U+1FB3B) plus
//! the two half-block characters that the sextant block deliberately
//! omits, chosen by two-color partitioning.

use super::partition::{Partition, Sample, all_transparent, partition_min_error};
use crate::core::cell::style::RgbColor;

pub const SUB_X_PER_CELL: u32 = 2;
pub const SUB_Y_PER_CELL: u32 = 3;

/// Bit weights, in sample order top-left, top-right, mid-left, mid-right,
/// bottom-left, bottom-right.
const WEIGHTS: [u32; 6] = [1, 2, 4, 8, 16, 32];

/// Maps a 6-bit sextant pattern to its glyph. Patterns `0` and `63` (all
/// clear / all set) map to space and full block; patterns `21` (the full
/// left column) and `42` (the full right column) are not part of the
/// sextant block and instead reuse the pre-existing half-block
/// characters, which is why the Unicode block itself holds only 60
/// (not 62) code points.
#[must_use]
pub fn sextant_glyph(pattern: u32) -> char {
    let n = pattern & 0b11_1111;
    match n {
        0 => ' ',
        21 => '\u{258C}', // left half block
        42 => '\u{2590}', // right half block
        63 => '\u{2588}', // full block
        1..=20 => char::from_u32(0x1FB00 + (n - 1)).unwrap_or('\u{2588}'),
        22..=41 => char::from_u32(0x1FB00 + (n - 2)).unwrap_or('\u{2588}'),
        43..=62 => char::from_u32(0x1FB00 + (n - 3)).unwrap_or('\u{2588}'),
        _ => unreachable!("pattern masked to 6 bits"),
    }
}

/// Converts a sample-order bitmask (bit `i` set if sample `i` is in the
/// "set" class) into the glyph pattern number used by [`sextant_glyph`].
/// They are the same numbering here (`WEIGHTS` is the identity ordering
/// `1,2,4,8,16,32`), kept as a separate function so the two concerns
/// (partition bit order vs. Unicode glyph numbering) can diverge safely
/// if a future glyph source assigns weights differently.
#[must_use]
pub fn pattern_to_glyph_index(pattern: u32) -> u32 {
    let mut n = 0;
    for (i, &w) in WEIGHTS.iter().enumerate() {
        if (pattern >> i) & 1 == 1 {
            n += w;
        }
    }
    n
}

/// Picks the sextant glyph and fg/bg for one cell from its six samples in
/// top-left, top-right, mid-left, mid-right, bottom-left, bottom-right
/// order. Returns `None` if no sample is opaque.
#[must_use]
pub fn sextant_cell(samples: [(RgbColor, u8); 6], bg_fallback: RgbColor) -> Option<(char, RgbColor, RgbColor)> {
    let s: Vec<Sample> = samples
        .iter()
        .map(|&(rgb, a)| Sample { rgb, opaque: a >= super::partition::ALPHA_THRESHOLD })
        .collect();
    if all_transparent(&s) {
        return None;
    }
    let Partition { pattern, fg, bg } = partition_min_error(&s, bg_fallback);
    Some((sextant_glyph(pattern_to_glyph_index(pattern)), fg, bg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_has_exactly_sixty_codepoints() {
        let mut count = 0;
        for n in 0u32..64 {
            if !matches!(n, 0 | 21 | 42 | 63) {
                count += 1;
            }
        }
        assert_eq!(count, 60);
    }

    #[test]
    fn left_column_maps_to_left_half_block() {
        assert_eq!(sextant_glyph(21), '\u{258C}');
    }

    #[test]
    fn right_column_maps_to_right_half_block() {
        assert_eq!(sextant_glyph(42), '\u{2590}');
    }

    #[test]
    fn full_pattern_maps_to_full_block() {
        assert_eq!(sextant_glyph(63), '\u{2588}');
    }

    #[test]
    fn all_transparent_returns_none() {
        let samples = [(RgbColor::BLACK, 0); 6];
        assert!(sextant_cell(samples, RgbColor::BLACK).is_none());
    }
}
