// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Braille blitting (2 columns x 4 rows per cell, §4.3): a single
//! foreground color per cell, dots set by a per-cell luminance threshold.

use super::sample::luminance_709;
use crate::core::cell::style::RgbColor;

pub const SUB_X_PER_CELL: u32 = 2;
pub const SUB_Y_PER_CELL: u32 = 4;

/// Maps sample-order `(row, col)` — row 0..4, col 0..2 — to its Unicode
/// braille dot bit. Dot numbering follows the standard braille cell
/// layout (dots 1-2-3-7 down the left column, 4-5-6-8 down the right),
/// which is why the bottom row's bits (6, 7) are out of row order.
const DOT_BIT: [[u32; 2]; 4] = [
    [0, 3], // dots 1, 4
    [1, 4], // dots 2, 5
    [2, 5], // dots 3, 6
    [6, 7], // dots 7, 8
];

/// Chosen braille glyph for one cell: a single dot pattern, fg = mean of
/// the samples whose luminance is at/above threshold, bg = mean of the
/// rest (or the underlying cell background if one side is empty).
#[must_use]
pub fn braille_cell(samples: [(RgbColor, u8); 8], cell_background: RgbColor) -> (char, RgbColor, RgbColor) {
    // `samples` is laid out row-major: index = row * 2 + col.
    let threshold = samples.iter().map(|&(rgb, _)| luminance_709(rgb)).sum::<f64>() / samples.len() as f64;

    let mut pattern = 0u32;
    let mut set_sum = [0i64; 3];
    let mut set_count = 0i64;
    let mut clear_sum = [0i64; 3];
    let mut clear_count = 0i64;

    for row in 0..4 {
        for col in 0..2 {
            let (rgb, _alpha) = samples[row * 2 + col];
            let set = luminance_709(rgb) >= threshold;
            if set {
                pattern |= 1 << DOT_BIT[row][col];
                set_sum[0] += i64::from(rgb.r);
                set_sum[1] += i64::from(rgb.g);
                set_sum[2] += i64::from(rgb.b);
                set_count += 1;
            } else {
                clear_sum[0] += i64::from(rgb.r);
                clear_sum[1] += i64::from(rgb.g);
                clear_sum[2] += i64::from(rgb.b);
                clear_count += 1;
            }
        }
    }

    let fg = mean_or(set_sum, set_count, cell_background);
    let bg = mean_or(clear_sum, clear_count, cell_background);
    let glyph = char::from_u32(0x2800 + pattern).unwrap_or('\u{2800}');
    (glyph, fg, bg)
}

fn mean_or(sum: [i64; 3], count: i64, fallback: RgbColor) -> RgbColor {
    if count == 0 {
        return fallback;
    }
    RgbColor::new(
        u8::try_from(sum[0] / count).unwrap_or(u8::MAX),
        u8::try_from(sum[1] / count).unwrap_or(u8::MAX),
        u8::try_from(sum[2] / count).unwrap_or(u8::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_bright_samples_set_every_dot() {
        let samples = [(RgbColor::WHITE, 255); 8];
        let (glyph, fg, _bg) = braille_cell(samples, RgbColor::BLACK);
        // Every luminance equals the mean, so every dot is "at or above".
        assert_eq!(glyph, '\u{28FF}');
        assert_eq!(fg, RgbColor::WHITE);
    }

    #[test]
    fn glyph_is_always_in_braille_block() {
        let samples = [(RgbColor::new(5, 250, 10), 200); 8];
        let (glyph, _, _) = braille_cell(samples, RgbColor::BLACK);
        assert!(('\u{2800}'..='\u{28FF}').contains(&glyph));
    }
}
