// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The Sixel image encoder: uniform 6-level RGB quantization, a DCS `Pq`
//! raster-attribute header, and 6-row bands with run-length-encoded
//! column bitmaps (§4.9 "Sixel").

use crate::ansi::constants::{DCS, ST};
use crate::ansi::generator::write_decimal;
use crate::core::bounded::byte_builder::ByteBuilder;
use crate::core::cell::style::RgbColor;
use crate::core::subcell::sample::RgbaImage;
use crate::error::VtResult;

const ALPHA_THRESHOLD: u8 = 128;
const MIN_RUN_FOR_RLE: u32 = 4;

/// Quantizes one channel to a 0..=5 level: `floor((c*5 + 127) / 255)`
/// (§4.9, §8 scenario 6).
#[must_use]
pub fn quantize_level(c: u8) -> u8 {
    u8::try_from((u32::from(c) * 5 + 127) / 255).unwrap_or(5)
}

/// The 6x6x6 = 216-entry uniform palette index for a color, `r*36 +
/// g*6 + b` over quantized levels.
#[must_use]
pub fn palette_index(rgb: RgbColor) -> u32 {
    u32::from(quantize_level(rgb.r)) * 36 + u32::from(quantize_level(rgb.g)) * 6 + u32::from(quantize_level(rgb.b))
}

/// The RGB color a palette index represents, for defining it in the
/// Sixel color-table preamble (`#idx;2;R%;G%;B%`, in Sixel's 0..=100
/// percentage scale).
#[must_use]
fn palette_color_percent(idx: u32) -> (u32, u32, u32) {
    let r = idx / 36;
    let g = (idx / 6) % 6;
    let b = idx % 6;
    let pct = |level: u32| (level * 100) / 5;
    (pct(r), pct(g), pct(b))
}

fn push_run(out: &mut ByteBuilder, bits: u8, run: u32) -> VtResult<()> {
    let ch = 0x3F + bits;
    if run >= MIN_RUN_FOR_RLE {
        out.push_byte(b'!')?;
        write_decimal(out, run)?;
        out.push_byte(ch)
    } else {
        for _ in 0..run {
            out.push_byte(ch)?;
        }
        Ok(())
    }
}

/// Encodes `src` as a complete Sixel image sequence (cursor move, DCS
/// header, palette, bands, terminator). Pixels with alpha below
/// [`ALPHA_THRESHOLD`] are left unplotted (transparent, showing whatever
/// the terminal already has at that cell).
pub fn encode(out: &mut ByteBuilder, src: &RgbaImage<'_>, dst_col: u16, dst_row: u16) -> VtResult<()> {
    crate::ansi::generator::cursor_position(out, dst_row, dst_col)?;
    out.push_bytes(DCS)?;
    out.push_str("0;0;0q")?;

    // Raster attributes: pixel aspect 1:1, full image size.
    out.push_str("\"1;1;")?;
    write_decimal(out, src.width)?;
    out.push_byte(b';')?;
    write_decimal(out, src.height)?;

    // Collect present (opaque) palette indices up front, in ascending
    // order, so the palette preamble and per-band color order are both
    // deterministic regardless of scan order.
    let mut present = [false; 216];
    for y in 0..src.height {
        for x in 0..src.width {
            let (rgb, a) = src.pixel(x, y);
            if a >= ALPHA_THRESHOLD {
                present[palette_index(rgb) as usize] = true;
            }
        }
    }
    for (idx, is_present) in present.iter().enumerate() {
        if !is_present {
            continue;
        }
        let (r, g, b) = palette_color_percent(u32::try_from(idx).unwrap_or(0));
        out.push_byte(b'#')?;
        write_decimal(out, u32::try_from(idx).unwrap_or(0))?;
        out.push_str(";2;")?;
        write_decimal(out, r)?;
        out.push_byte(b';')?;
        write_decimal(out, g)?;
        out.push_byte(b';')?;
        write_decimal(out, b)?;
    }

    let mut band_top = 0u32;
    while band_top < src.height {
        let band_height = (src.height - band_top).min(6);
        for (idx, is_present) in present.iter().enumerate() {
            if !is_present {
                continue;
            }
            out.push_byte(b'#')?;
            write_decimal(out, u32::try_from(idx).unwrap_or(0))?;
            let mut run_bits: Option<u8> = None;
            let mut run_len = 0u32;
            for x in 0..src.width {
                let mut bits = 0u8;
                for dy in 0..band_height {
                    let (rgb, a) = src.pixel(x, band_top + dy);
                    if a >= ALPHA_THRESHOLD && palette_index(rgb) as usize == idx {
                        bits |= 1 << dy;
                    }
                }
                match run_bits {
                    Some(b) if b == bits => run_len += 1,
                    _ => {
                        if let Some(b) = run_bits {
                            push_run(out, b, run_len)?;
                        }
                        run_bits = Some(bits);
                        run_len = 1;
                    }
                }
            }
            if let Some(b) = run_bits {
                push_run(out, b, run_len)?;
            }
            out.push_byte(b'$')?;
        }
        out.push_byte(b'-')?;
        band_top += 6;
    }

    out.push_bytes(ST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_level_covers_full_0_to_5_range() {
        assert_eq!(quantize_level(0), 0);
        assert_eq!(quantize_level(255), 5);
    }

    #[test]
    fn palette_index_is_unique_per_distinct_quantized_color() {
        let a = palette_index(RgbColor::new(0, 0, 0));
        let b = palette_index(RgbColor::new(255, 255, 255));
        assert_ne!(a, b);
        assert!(a < 216 && b < 216);
    }

    #[test]
    fn solid_color_image_encodes_without_error_and_contains_its_palette_entry() {
        let data = vec![10u8, 20, 30, 255].repeat(4); // 2x2, one color.
        let src = RgbaImage::new(2, 2, &data);
        let mut out = ByteBuilder::with_capacity(4096);
        encode(&mut out, &src, 0, 0).unwrap();
        let rendered = String::from_utf8(out.into_vec()).unwrap();
        let idx = palette_index(RgbColor::new(10, 20, 30));
        assert!(rendered.contains(&format!("#{idx};2;")));
        assert!(rendered.ends_with("\x1b\\"));
    }

    #[test]
    fn transparent_pixels_are_not_assigned_a_palette_entry() {
        let mut data = vec![0u8; 4];
        data[3] = 0; // alpha 0: fully transparent.
        let src = RgbaImage::new(1, 1, &data);
        let mut out = ByteBuilder::with_capacity(4096);
        encode(&mut out, &src, 0, 0).unwrap();
        let rendered = String::from_utf8(out.into_vec()).unwrap();
        assert!(!rendered.contains('#'));
    }

    #[test]
    fn long_runs_use_rle_marker() {
        // 8 identical opaque pixels in a single row -> one run of 8.
        let data = vec![1u8, 2, 3, 255].repeat(8);
        let src = RgbaImage::new(8, 1, &data);
        let mut out = ByteBuilder::with_capacity(4096);
        encode(&mut out, &src, 0, 0).unwrap();
        let rendered = String::from_utf8(out.into_vec()).unwrap();
        assert!(rendered.contains('!'));
    }
}
