// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Byte-sequence generation for the VT/ANSI output alphabet (§6). Every
//! function here writes directly into a caller-supplied [`ByteBuilder`]
//! so the diff renderer and image encoders never pay a per-sequence
//! allocation — only the one bounded output buffer.
//!
//! All row/column parameters are 0-based; each function performs the
//! 1-based conversion the terminal protocol expects.

use crate::core::bounded::byte_builder::ByteBuilder;
use crate::core::cell::style::{AttrFlags, Style};
use crate::error::VtResult;

use super::constants::*;

/// Writes `n`'s decimal ASCII digits, without allocating.
pub fn write_decimal(out: &mut ByteBuilder, n: u32) -> VtResult<()> {
    let mut digits = [0u8; 10];
    let mut i = digits.len();
    let mut rest = n;
    loop {
        i -= 1;
        digits[i] = b'0' + u8::try_from(rest % 10).unwrap_or(0);
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    out.push_bytes(&digits[i..])
}

/// `CSI <row+1>;<col+1> H`.
pub fn cursor_position(out: &mut ByteBuilder, row: u16, col: u16) -> VtResult<()> {
    out.push_bytes(CSI)?;
    write_decimal(out, u32::from(row) + 1)?;
    out.push_byte(b';')?;
    write_decimal(out, u32::from(col) + 1)?;
    out.push_byte(b'H')
}

/// `CSI <col+1> G`.
pub fn cursor_to_column(out: &mut ByteBuilder, col: u16) -> VtResult<()> {
    out.push_bytes(CSI)?;
    write_decimal(out, u32::from(col) + 1)?;
    out.push_byte(b'G')
}

fn cursor_relative(out: &mut ByteBuilder, n: u16, final_byte: u8) -> VtResult<()> {
    if n == 0 {
        return Ok(());
    }
    out.push_bytes(CSI)?;
    write_decimal(out, u32::from(n))?;
    out.push_byte(final_byte)
}

/// `CSI <n> C` — cursor forward.
pub fn cursor_forward(out: &mut ByteBuilder, n: u16) -> VtResult<()> { cursor_relative(out, n, b'C') }

/// `CSI <n> D` — cursor back.
pub fn cursor_back(out: &mut ByteBuilder, n: u16) -> VtResult<()> { cursor_relative(out, n, b'D') }

/// `\r` then `CSI <n> C` — often shorter than an absolute CUP.
pub fn carriage_return_then_forward(out: &mut ByteBuilder, n: u16) -> VtResult<()> {
    out.push_byte(b'\r')?;
    cursor_forward(out, n)
}

pub fn cursor_show(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(CURSOR_SHOW) }
pub fn cursor_hide(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(CURSOR_HIDE) }

/// `CSI <shape> SP q` (DECSCUSR).
pub fn cursor_shape(out: &mut ByteBuilder, shape: u8) -> VtResult<()> {
    out.push_bytes(CSI)?;
    write_decimal(out, u32::from(shape))?;
    out.push_bytes(b" q")
}

pub fn erase_display_all(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(ERASE_DISPLAY_ALL) }

pub fn sgr_reset(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(SGR_RESET) }

pub fn sync_update_begin(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(SYNC_UPDATE_BEGIN) }
pub fn sync_update_end(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(SYNC_UPDATE_END) }

/// `CSI <top+1> ; <bottom+1> r` (DECSTBM).
pub fn set_scroll_region(out: &mut ByteBuilder, top: u16, bottom: u16) -> VtResult<()> {
    out.push_bytes(CSI)?;
    write_decimal(out, u32::from(top) + 1)?;
    out.push_byte(b';')?;
    write_decimal(out, u32::from(bottom) + 1)?;
    out.push_byte(b'r')
}

pub fn reset_scroll_region(out: &mut ByteBuilder) -> VtResult<()> { out.push_bytes(CSI)?; out.push_byte(b'r') }

/// `CSI <n> L` — insert lines.
pub fn insert_lines(out: &mut ByteBuilder, n: u16) -> VtResult<()> { cursor_relative(out, n, b'L') }

/// `CSI <n> M` — delete lines.
pub fn delete_lines(out: &mut ByteBuilder, n: u16) -> VtResult<()> { cursor_relative(out, n, b'M') }

fn push_rgb_param(out: &mut ByteBuilder, prefix: &[u8], color: crate::core::cell::style::RgbColor) -> VtResult<()> {
    out.push_bytes(prefix)?;
    out.push_byte(b';')?;
    write_decimal(out, u32::from(color.r))?;
    out.push_byte(b';')?;
    write_decimal(out, u32::from(color.g))?;
    out.push_byte(b';')?;
    write_decimal(out, u32::from(color.b))
}

/// Builds the minimal `CSI ... m` sequence that transitions the
/// terminal's rendition from `prev` (or an unknown/default state, if
/// `None`) to `next`, re-emitting only the parameters that actually
/// changed. `None` for `prev` forces every parameter of `next` to be
/// emitted (§4.5 step 6's "style-valid" gate lives one layer up, in the
/// diff renderer, which decides whether to pass `None` or `Some`).
pub fn sgr_transition(out: &mut ByteBuilder, prev: Option<&Style>, next: &Style) -> VtResult<()> {
    if prev == Some(next) {
        return Ok(());
    }
    let attrs_changed = prev.is_none_or(|p| p.attrs != next.attrs);
    let fg_changed = prev.is_none_or(|p| p.fg != next.fg);
    let bg_changed = prev.is_none_or(|p| p.bg != next.bg);
    let underline_color_changed = prev.is_none_or(|p| p.underline_color != next.underline_color);

    if !attrs_changed && !fg_changed && !bg_changed && !underline_color_changed {
        return Ok(());
    }

    out.push_bytes(CSI)?;
    let mut first = true;
    let mut push_sep = |out: &mut ByteBuilder| -> VtResult<()> {
        if !first {
            out.push_byte(b';')?;
        }
        first = false;
        Ok(())
    };

    // A style reset is the cheapest way to clear attributes that used to
    // be set but are no longer in `next`; individual "turn off" SGR codes
    // (22, 23, 24...) would otherwise be needed per attribute. Any bit
    // present in `prev` but absent from `next` forces the reset, not just
    // BOLD or the all-attributes-cleared case.
    let lost_attrs = prev.is_some_and(|p| !next.attrs.contains(p.attrs));
    if lost_attrs {
        push_sep(out)?;
        out.push_byte(b'0')?;
    }

    if attrs_changed || lost_attrs {
        if next.attrs.contains(AttrFlags::BOLD) {
            push_sep(out)?;
            out.push_bytes(SGR_BOLD)?;
        }
        if next.attrs.contains(AttrFlags::DIM) {
            push_sep(out)?;
            out.push_bytes(SGR_DIM)?;
        }
        if next.attrs.contains(AttrFlags::ITALIC) {
            push_sep(out)?;
            out.push_bytes(SGR_ITALIC)?;
        }
        if next.attrs.contains(AttrFlags::UNDERLINE) {
            push_sep(out)?;
            out.push_bytes(SGR_UNDERLINE)?;
        }
        if next.attrs.contains(AttrFlags::BLINK) {
            push_sep(out)?;
            out.push_bytes(SGR_BLINK)?;
        }
        if next.attrs.contains(AttrFlags::REVERSE) {
            push_sep(out)?;
            out.push_bytes(SGR_REVERSE)?;
        }
        if next.attrs.contains(AttrFlags::HIDDEN) {
            push_sep(out)?;
            out.push_bytes(SGR_HIDDEN)?;
        }
        if next.attrs.contains(AttrFlags::STRIKETHROUGH) {
            push_sep(out)?;
            out.push_bytes(SGR_STRIKETHROUGH)?;
        }
        if next.attrs.contains(AttrFlags::OVERLINE) {
            push_sep(out)?;
            out.push_bytes(SGR_OVERLINE)?;
        }
    }

    if fg_changed || lost_attrs {
        push_sep(out)?;
        push_rgb_param(out, SGR_FG_RGB, next.fg)?;
    }
    if bg_changed || lost_attrs {
        push_sep(out)?;
        push_rgb_param(out, SGR_BG_RGB, next.bg)?;
    }
    if let Some(uc) = next.underline_color {
        if underline_color_changed || lost_attrs {
            push_sep(out)?;
            push_rgb_param(out, SGR_UNDERLINE_COLOR_RGB, uc)?;
        }
    }

    out.push_byte(b'm')
}

/// `OSC 8 ; ; <url> ST` (empty params field, per §6). `None` closes the
/// currently open hyperlink with an empty URL.
pub fn hyperlink(out: &mut ByteBuilder, url: Option<&str>) -> VtResult<()> {
    out.push_bytes(OSC)?;
    out.push_bytes(b"8;;")?;
    if let Some(url) = url {
        out.push_str(url)?;
    }
    out.push_bytes(ST)
}

/// `OSC 52 ; c ; <base64> ST` — clipboard write, already-base64-encoded
/// by the caller.
pub fn osc52_clipboard(out: &mut ByteBuilder, base64_payload: &str) -> VtResult<()> {
    out.push_bytes(OSC)?;
    out.push_bytes(b"52;c;")?;
    out.push_str(base64_payload)?;
    out.push_bytes(ST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::style::RgbColor;

    fn rendered(f: impl FnOnce(&mut ByteBuilder) -> VtResult<()>) -> String {
        let mut b = ByteBuilder::with_capacity(256);
        f(&mut b).unwrap();
        String::from_utf8(b.into_vec()).unwrap()
    }

    #[test]
    fn cursor_position_is_one_based() {
        assert_eq!(rendered(|o| cursor_position(o, 5, 10)), "\x1b[6;11H");
    }

    #[test]
    fn cursor_forward_zero_emits_nothing() {
        assert_eq!(rendered(|o| cursor_forward(o, 0)), "");
    }

    #[test]
    fn sgr_transition_from_none_emits_full_style() {
        let style = Style::new(RgbColor::new(1, 2, 3), RgbColor::new(4, 5, 6)).with_attrs(AttrFlags::BOLD);
        let out = rendered(|o| sgr_transition(o, None, &style));
        assert!(out.contains("38;2;1;2;3"));
        assert!(out.contains("48;2;4;5;6"));
        assert!(out.contains('1'));
    }

    #[test]
    fn sgr_transition_identical_styles_emits_nothing() {
        let style = Style::default();
        assert_eq!(rendered(|o| sgr_transition(o, Some(&style), &style)), "");
    }

    #[test]
    fn sgr_transition_dropping_an_attribute_resets_first() {
        let prev = Style::default().with_attrs(AttrFlags::BOLD);
        let next = Style::default();
        let out = rendered(|o| sgr_transition(o, Some(&prev), &next));
        assert!(out.starts_with("\x1b[0;"));
    }

    #[test]
    fn sgr_transition_dropping_one_of_several_attributes_still_resets() {
        // Bold survives, italic is dropped: losing *any* bit must still
        // force a reset, not just bold or the all-cleared case.
        let prev = Style::default().with_attrs(AttrFlags::BOLD.union(AttrFlags::ITALIC));
        let next = Style::default().with_attrs(AttrFlags::BOLD);
        let out = rendered(|o| sgr_transition(o, Some(&prev), &next));
        assert!(out.starts_with("\x1b[0;"), "expected a reset before re-applying bold: {out:?}");
        assert!(!out.contains(&String::from_utf8(SGR_ITALIC.to_vec()).unwrap()), "italic must not be re-emitted: {out:?}");
    }

    #[test]
    fn write_decimal_zero() {
        assert_eq!(rendered(|o| write_decimal(o, 0)), "0");
    }
}
