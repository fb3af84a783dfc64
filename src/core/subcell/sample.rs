// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! RGBA source sampling for the sub-cell blitters (§4.3).
//!
//! Axis mapping is deterministic nearest-neighbor:
//! `floor((sub_coord * src_len) / (dst_cells * sub_per_cell))`, clamped to
//! `src_len - 1`.

use crate::core::cell::style::RgbColor;

/// A borrowed RGBA8 source image, row-major, four bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbaImage<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

impl<'a> RgbaImage<'a> {
    #[must_use]
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Self { Self { width, height, data } }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (RgbColor, u8) {
        let idx = (y * self.width + x) as usize * 4;
        let bytes = &self.data[idx..idx + 4];
        (RgbColor::new(bytes[0], bytes[1], bytes[2]), bytes[3])
    }
}

/// Maps `sub_coord` (0-based, in `0..dst_cells * sub_per_cell`) into a
/// source-axis index in `0..src_len`.
#[must_use]
pub fn map_axis(sub_coord: u32, src_len: u32, dst_cells: u32, sub_per_cell: u32) -> u32 {
    let denom = dst_cells.saturating_mul(sub_per_cell);
    if denom == 0 || src_len == 0 {
        return 0;
    }
    let mapped = (u64::from(sub_coord) * u64::from(src_len)) / u64::from(denom);
    u32::try_from(mapped).unwrap_or(u32::MAX).min(src_len.saturating_sub(1))
}

/// Samples the sub-pixel at `(cell_x, cell_y)` + `(sub_x, sub_y)` within a
/// `sub_x_per_cell x sub_y_per_cell` sub-cell grid, against `src` scaled
/// to a `dst_cols x dst_rows` destination.
#[must_use]
pub fn sample_sub_pixel(
    src: &RgbaImage<'_>,
    dst_cols: u32,
    dst_rows: u32,
    sub_x_per_cell: u32,
    sub_y_per_cell: u32,
    cell_x: u32,
    cell_y: u32,
    sub_x: u32,
    sub_y: u32,
) -> (RgbColor, u8) {
    let global_x = cell_x * sub_x_per_cell + sub_x;
    let global_y = cell_y * sub_y_per_cell + sub_y;
    let sx = map_axis(global_x, src.width, dst_cols, sub_x_per_cell);
    let sy = map_axis(global_y, src.height, dst_rows, sub_y_per_cell);
    src.pixel(sx, sy)
}

/// BT.709 relative luminance of an RGB triple, 0.0..=255.0.
#[must_use]
pub fn luminance_709(rgb: RgbColor) -> f64 {
    0.2126 * f64::from(rgb.r) + 0.7152 * f64::from(rgb.g) + 0.0722 * f64::from(rgb.b)
}

/// Squared Euclidean RGB distance.
#[must_use]
pub fn sq_dist(a: RgbColor, b: RgbColor) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    dr * dr + dg * dg + db * db
}
