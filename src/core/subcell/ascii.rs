// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! ASCII fallback blitting (§4.3): a fixed luminance ramp, one character
//! per cell, no sub-cell resolution. Used when the terminal is a pipe,
//! reports dumb, or does not report Unicode support.

use super::sample::luminance_709;
use crate::core::cell::style::RgbColor;

/// Darkest to brightest. Ten steps keeps the ramp simple and monotonic
/// without claiming more gradation than a plain ASCII terminal can show.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Picks the ramp character for one cell from its single representative
/// sample (typically the cell-area average). `fg` is returned unchanged
/// for the caller to apply as the cell's foreground style.
#[must_use]
pub fn ascii_cell(sample: RgbColor, alpha: u8) -> Option<(char, RgbColor)> {
    if alpha < super::partition::ALPHA_THRESHOLD {
        return None;
    }
    let lum = luminance_709(sample) / 255.0;
    let idx = ((lum * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1);
    Some((char::from(RAMP[idx]), sample))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_sample_yields_none() {
        assert!(ascii_cell(RgbColor::WHITE, 0).is_none());
    }

    #[test]
    fn black_maps_to_first_ramp_character() {
        let (ch, _) = ascii_cell(RgbColor::BLACK, 255).unwrap();
        assert_eq!(ch, ' ');
    }

    #[test]
    fn white_maps_to_last_ramp_character() {
        let (ch, _) = ascii_cell(RgbColor::WHITE, 255).unwrap();
        assert_eq!(ch, '@');
    }
}
