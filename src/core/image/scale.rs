// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! RGBA scaling to a target pixel rectangle: FILL (stretch), CONTAIN
//! (letterbox, centered), and COVER (center-crop) (§4.9 "RGBA scaling").
//! Axis mapping is integer nearest-neighbor, reusing the same
//! `map_axis` the sub-cell blitters use (§4.3) so both paths agree on
//! how a source coordinate maps to a destination one.

use crate::core::subcell::sample::{RgbaImage, map_axis};

/// How source pixels are fit into a target pixel rectangle whose aspect
/// ratio may differ from the source's.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScaleMode {
    /// Stretch to exactly fill the target, ignoring aspect ratio.
    Fill,
    /// Preserve aspect ratio, fit entirely inside the target, centered;
    /// uncovered border pixels are fully transparent.
    Contain,
    /// Preserve aspect ratio, fully cover the target, centered; excess
    /// content outside the target is cropped.
    Cover,
}

/// Scales `src` to an RGBA8 buffer of exactly `target_w x target_h`
/// pixels under `mode`. Returns `target_w * target_h * 4` bytes,
/// row-major.
#[must_use]
pub fn scale_to_rgba(src: &RgbaImage<'_>, target_w: u32, target_h: u32, mode: ScaleMode) -> Vec<u8> {
    let mut out = vec![0u8; (target_w as usize) * (target_h as usize) * 4];
    if target_w == 0 || target_h == 0 || src.width == 0 || src.height == 0 {
        return out;
    }

    let (content_w, content_h) = match mode {
        ScaleMode::Fill => (target_w, target_h),
        ScaleMode::Contain => contain_dims(src.width, src.height, target_w, target_h),
        ScaleMode::Cover => cover_dims(src.width, src.height, target_w, target_h),
    };

    // CONTAIN/FILL: content fits inside (or exactly fills) the target, so it
    // is placed at a target-space offset and anything outside it is
    // transparent letterbox padding. COVER: content is at least as large as
    // the target in both axes, so instead of placing it we crop into its
    // center by offsetting the *content*-space coordinate we sample from.
    let (place_off_x, place_off_y) = (target_w.saturating_sub(content_w) / 2, target_h.saturating_sub(content_h) / 2);
    let (crop_off_x, crop_off_y) = (content_w.saturating_sub(target_w) / 2, content_h.saturating_sub(target_h) / 2);

    for ty in 0..target_h {
        for tx in 0..target_w {
            let dst_idx = ((ty * target_w + tx) as usize) * 4;
            let (cx, cy) = if mode == ScaleMode::Cover {
                (tx + crop_off_x, ty + crop_off_y)
            } else {
                if tx < place_off_x || ty < place_off_y || tx >= place_off_x + content_w || ty >= place_off_y + content_h {
                    // Outside the content rect (CONTAIN letterbox only):
                    // fully transparent, leave as zeroed.
                    continue;
                }
                (tx - place_off_x, ty - place_off_y)
            };
            let sx = map_axis(cx, src.width, content_w, 1);
            let sy = map_axis(cy, src.height, content_h, 1);
            let (rgb, a) = src.pixel(sx, sy);
            out[dst_idx] = rgb.r;
            out[dst_idx + 1] = rgb.g;
            out[dst_idx + 2] = rgb.b;
            out[dst_idx + 3] = a;
        }
    }
    out
}

/// The largest rectangle with `src`'s aspect ratio that fits entirely
/// inside `target_w x target_h`.
fn contain_dims(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let scale_w = u64::from(target_w) * u64::from(src_h);
    let scale_h = u64::from(target_h) * u64::from(src_w);
    if scale_w <= scale_h {
        // Width is the binding constraint.
        let h = (u64::from(target_w) * u64::from(src_h)) / u64::from(src_w);
        (target_w, u32::try_from(h).unwrap_or(target_h).max(1))
    } else {
        let w = (u64::from(target_h) * u64::from(src_w)) / u64::from(src_h);
        (u32::try_from(w).unwrap_or(target_w).max(1), target_h)
    }
}

/// The smallest rectangle with `src`'s aspect ratio that fully covers
/// `target_w x target_h` (the inverse binding direction of
/// [`contain_dims`]).
fn cover_dims(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let scale_w = u64::from(target_w) * u64::from(src_h);
    let scale_h = u64::from(target_h) * u64::from(src_w);
    if scale_w >= scale_h {
        let h = (u64::from(target_w) * u64::from(src_h)) / u64::from(src_w);
        (target_w, u32::try_from(h).unwrap_or(target_h).max(1))
    } else {
        let w = (u64::from(target_h) * u64::from(src_w)) / u64::from(src_h);
        (u32::try_from(w).unwrap_or(target_w).max(1), target_h)
    }
}
