// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Two-color partitioning for the quadrant and sextant blitters (§4.3
//! "Partitioning"): exhaustive search over all `2^N` two-class patterns,
//! picking the one with minimum summed squared RGB error.

use super::sample::sq_dist;
use crate::core::cell::style::RgbColor;

/// One sub-cell sample: its color (already background-substituted below
/// the alpha threshold) and whether it was opaque.
#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub rgb: RgbColor,
    pub opaque: bool,
}

/// The alpha threshold below which a sub-pixel uses the cell's current
/// background instead of its own (likely near-transparent) color.
pub const ALPHA_THRESHOLD: u8 = 128;

/// The chosen two-color partition: `pattern` bit `i` set means sample `i`
/// belongs to the "set" (foreground) class.
#[derive(Clone, Copy, Debug)]
pub struct Partition {
    pub pattern: u32,
    pub fg: RgbColor,
    pub bg: RgbColor,
}

fn class_mean(samples: &[Sample], pattern: u32, want_set: bool, fallback: RgbColor) -> RgbColor {
    let mut sum = [0i64; 3];
    let mut count = 0i64;
    for (i, s) in samples.iter().enumerate() {
        if !s.opaque {
            continue;
        }
        let set = (pattern >> i) & 1 == 1;
        if set != want_set {
            continue;
        }
        sum[0] += i64::from(s.rgb.r);
        sum[1] += i64::from(s.rgb.g);
        sum[2] += i64::from(s.rgb.b);
        count += 1;
    }
    if count == 0 {
        return fallback;
    }
    RgbColor::new(
        u8::try_from(sum[0] / count).unwrap_or(u8::MAX),
        u8::try_from(sum[1] / count).unwrap_or(u8::MAX),
        u8::try_from(sum[2] / count).unwrap_or(u8::MAX),
    )
}

/// Finds the minimum-squared-error two-color partition of `samples`
/// (`samples.len()` must be 4 for quadrant or 6 for sextant). Ties break
/// to the smallest pattern index, which falls out naturally from
/// iterating patterns in ascending order and only replacing the current
/// best on a strictly smaller error.
#[must_use]
pub fn partition_min_error(samples: &[Sample], bg_fallback: RgbColor) -> Partition {
    let n = samples.len();
    debug_assert!(n <= 8, "partition search is exhaustive over 2^n patterns");
    let total_patterns: u32 = 1 << n;

    let mut best_pattern = 0u32;
    let mut best_error = f64::INFINITY;
    let mut best_fg = bg_fallback;
    let mut best_bg = bg_fallback;

    for pattern in 0..total_patterns {
        let set_mean = class_mean(samples, pattern, true, bg_fallback);
        let clear_mean = class_mean(samples, pattern, false, bg_fallback);
        let mut error = 0.0;
        for (i, s) in samples.iter().enumerate() {
            let rgb = if s.opaque { s.rgb } else { bg_fallback };
            let set = (pattern >> i) & 1 == 1;
            let mean = if set { set_mean } else { clear_mean };
            error += sq_dist(rgb, mean);
        }
        if error < best_error {
            best_error = error;
            best_pattern = pattern;
            best_fg = set_mean;
            best_bg = clear_mean;
        }
    }

    Partition { pattern: best_pattern, fg: best_fg, bg: best_bg }
}

/// `true` if no sample in `samples` is opaque (the caller should then
/// skip the cell, preserving whatever was there before).
#[must_use]
pub fn all_transparent(samples: &[Sample]) -> bool { samples.iter().all(|s| !s.opaque) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_samples_two_colors_finds_exact_split() {
        let red = RgbColor::new(255, 0, 0);
        let blue = RgbColor::new(0, 0, 255);
        let samples = [
            Sample { rgb: red, opaque: true },
            Sample { rgb: red, opaque: true },
            Sample { rgb: blue, opaque: true },
            Sample { rgb: blue, opaque: true },
        ];
        let partition = partition_min_error(&samples, RgbColor::BLACK);
        assert_eq!(partition.pattern.count_ones(), 2);
        assert!(partition.fg == red || partition.fg == blue);
        assert!(partition.bg == red || partition.bg == blue);
        assert_ne!(partition.fg, partition.bg);
    }

    #[test]
    fn all_transparent_reports_true() {
        let samples = [Sample { rgb: RgbColor::BLACK, opaque: false }; 4];
        assert!(all_transparent(&samples));
    }

    #[test]
    fn tie_breaks_to_smallest_pattern_index() {
        // All samples identical: every pattern has the same error, so the
        // smallest pattern index (0, the all-clear pattern) must win.
        let samples = [Sample { rgb: RgbColor::new(10, 10, 10), opaque: true }; 4];
        let partition = partition_min_error(&samples, RgbColor::BLACK);
        assert_eq!(partition.pattern, 0);
    }
}
