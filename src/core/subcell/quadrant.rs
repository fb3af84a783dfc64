// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Quadrant blitting (2 columns x 2 rows per cell, §4.3): one of the 16
//! Unicode quadrant block characters, chosen by two-color partitioning.

use super::partition::{Partition, Sample, all_transparent, partition_min_error};
use crate::core::cell::style::RgbColor;

pub const SUB_X_PER_CELL: u32 = 2;
pub const SUB_Y_PER_CELL: u32 = 2;

/// Sample order: top-left, top-right, bottom-left, bottom-right (bit 0..3
/// of the partition pattern, matching the table below).
#[must_use]
pub fn quadrant_glyph(pattern: u32) -> char {
    match pattern & 0b1111 {
        0b0000 => ' ',
        0b0001 => '\u{2598}', // TL
        0b0010 => '\u{259D}', // TR
        0b0011 => '\u{2580}', // TL+TR (upper half)
        0b0100 => '\u{2596}', // BL
        0b0101 => '\u{258C}', // TL+BL (left half)
        0b0110 => '\u{259E}', // TR+BL
        0b0111 => '\u{259B}', // TL+TR+BL
        0b1000 => '\u{2597}', // BR
        0b1001 => '\u{259A}', // TL+BR
        0b1010 => '\u{2590}', // TR+BR (right half)
        0b1011 => '\u{259C}', // TL+TR+BR
        0b1100 => '\u{2584}', // BL+BR (lower half)
        0b1101 => '\u{2599}', // TL+BL+BR
        0b1110 => '\u{259F}', // TR+BL+BR
        _ => '\u{2588}',      // all four
    }
}

/// Picks the quadrant glyph and fg/bg for one cell from its four samples
/// (top-left, top-right, bottom-left, bottom-right). Returns `None` if no
/// sample is opaque (the cell should be left untouched).
#[must_use]
pub fn quadrant_cell(samples: [(RgbColor, u8); 4], bg_fallback: RgbColor) -> Option<(char, RgbColor, RgbColor)> {
    let s: Vec<Sample> = samples
        .iter()
        .map(|&(rgb, a)| Sample { rgb, opaque: a >= super::partition::ALPHA_THRESHOLD })
        .collect();
    if all_transparent(&s) {
        return None;
    }
    let Partition { pattern, fg, bg } = partition_min_error(&s, bg_fallback);
    Some((quadrant_glyph(pattern), fg, bg))
}
