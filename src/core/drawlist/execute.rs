// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Executes a validated drawlist against a framebuffer (§4.2).
//!
//! Execution is all-or-nothing with respect to the caller's framebuffer:
//! [`execute`] renders into a clone of `fb` and only swaps it into the
//! caller's framebuffer once every command has run successfully. A
//! mid-list failure (a malformed blob record that [`super::validate::validate`]
//! cannot catch ahead of time, since it checks span bounds, not blob
//! contents) leaves the caller's framebuffer bit-identical to its
//! pre-call state.

use crate::core::cell::framebuffer::Rect;
use crate::core::cell::painter::Painter;
use crate::core::cell::{Framebuffer, Style};
use crate::core::text::width::EmojiWidthPolicy;
use crate::error::{VtError, VtResult};

use super::validate::ValidatedDrawlist;
use super::wire::Opcode;

/// Executes every command in `drawlist` against `fb` in order, using
/// `style` as the ambient style for text commands and `policy` for
/// grapheme width resolution.
///
/// # Errors
/// Propagates [`VtError::Limit`] on clip stack overflow and
/// [`VtError::InvalidArgument`] on malformed per-command payloads that
/// [`super::validate::validate`] cannot catch ahead of time (payload
/// values are range-checked but their *meaning*, e.g. a rect, is only
/// interpreted here). On any error, `fb` is left unchanged.
pub fn execute(drawlist: &ValidatedDrawlist<'_>, fb: &mut Framebuffer, style: Style, policy: EmojiWidthPolicy) -> VtResult<()> {
    let mut staging = fb.clone();
    execute_into(drawlist, &mut staging, style, policy)?;
    *fb = staging;
    Ok(())
}

fn execute_into(drawlist: &ValidatedDrawlist<'_>, fb: &mut Framebuffer, style: Style, policy: EmojiWidthPolicy) -> VtResult<()> {
    let mut painter = Painter::new(fb);
    for cmd in &drawlist.commands {
        let payload = &drawlist.buf[cmd.payload_offset..cmd.payload_offset + cmd.payload_size];
        match cmd.opcode {
            Opcode::Invalid => unreachable!("validate rejects INVALID opcodes before execute is reached"),
            Opcode::Clear => painter.clear(style),
            Opcode::FillRect => {
                let rect = read_rect(payload)?;
                painter.fill_rect(rect, style);
            }
            Opcode::PushClip => {
                let rect = read_rect(payload)?;
                painter.push_clip(rect)?;
            }
            Opcode::PopClip => painter.pop_clip(),
            Opcode::DrawText => {
                let (x, y, string_idx) = read_draw_text(payload)?;
                let text = string_for(drawlist, string_idx)?;
                painter.draw_text_bytes(x, y, text, style, policy);
            }
            Opcode::DrawTextRun => {
                let (x, y, blob_idx) = read_draw_text(payload)?;
                draw_text_run(&mut painter, drawlist, blob_idx, x, y, style, policy)?;
            }
        }
    }
    Ok(())
}

fn read_u32(buf: &[u8], offset: usize) -> VtResult<u32> {
    buf.get(offset..offset + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| VtError::invalid_argument("truncated command payload field"))
}

fn read_i32(buf: &[u8], offset: usize) -> VtResult<i32> { read_u32(buf, offset).map(|v| v as i32) }

fn read_rect(payload: &[u8]) -> VtResult<Rect> {
    if payload.len() < 16 {
        return Err(VtError::invalid_argument("rect payload too short"));
    }
    let x0 = read_i32(payload, 0)?;
    let y0 = read_i32(payload, 4)?;
    let width = read_i32(payload, 8)?;
    let height = read_i32(payload, 12)?;
    Ok(Rect::new(x0, y0, width, height))
}

fn read_draw_text(payload: &[u8]) -> VtResult<(i32, i32, u32)> {
    if payload.len() < 12 {
        return Err(VtError::invalid_argument("draw-text payload too short"));
    }
    let x = read_i32(payload, 0)?;
    let y = read_i32(payload, 4)?;
    let idx = read_u32(payload, 8)?;
    Ok((x, y, idx))
}

/// Draws a pre-segmented text run (§3 "DRAW_TEXT_RUN indexes a
/// pre-segmented blob"). The blob is a flat sequence of records, each
/// `[width: u8][glyph_len: u8][glyph_len bytes of UTF-8]`, so the painter
/// never has to re-run grapheme segmentation on the hot path — the
/// caller already paid that cost once when building the drawlist.
fn draw_text_run(
    painter: &mut Painter<'_>,
    drawlist: &ValidatedDrawlist<'_>,
    blob_idx: u32,
    x: i32,
    y: i32,
    style: Style,
    policy: EmojiWidthPolicy,
) -> VtResult<()> {
    let span = drawlist
        .blob_spans
        .get(blob_idx as usize)
        .ok_or_else(|| VtError::invalid_argument("blob index out of range at execute time"))?;
    let start = span.offset as usize;
    let end = start + span.len as usize;
    let blob = &drawlist.blob_bytes[start..end];

    let mut cursor = x;
    let mut i = 0usize;
    while i < blob.len() {
        if i + 2 > blob.len() {
            return Err(VtError::invalid_argument("truncated blob record header"));
        }
        let width = blob[i];
        let glyph_len = blob[i + 1] as usize;
        i += 2;
        let glyph_bytes = blob.get(i..i + glyph_len).ok_or_else(|| VtError::invalid_argument("truncated blob glyph bytes"))?;
        i += glyph_len;
        let text = std::str::from_utf8(glyph_bytes).map_err(|_| VtError::invalid_argument("blob glyph is not valid UTF-8"))?;
        painter.put_grapheme(cursor, y, text, style, policy);
        cursor += i32::from(width.max(1));
    }
    Ok(())
}

fn string_for<'a>(drawlist: &'a ValidatedDrawlist<'a>, idx: u32) -> VtResult<&'a str> {
    let span = drawlist
        .string_spans
        .get(idx as usize)
        .ok_or_else(|| VtError::invalid_argument("string index out of range at execute time"))?;
    let start = span.offset as usize;
    let end = start + span.len as usize;
    std::str::from_utf8(&drawlist.string_bytes[start..end])
        .map_err(|_| VtError::invalid_argument("string span is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::RgbColor;
    use crate::core::drawlist::validate::{Limits, validate};
    use crate::core::drawlist::wire::{COMMAND_HEADER_SIZE, HEADER_SIZE, Header, MAGIC, Opcode, SPAN_SIZE, VERSION};

    fn rect_payload(x0: i32, y0: i32, w: i32, h: i32) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&x0.to_le_bytes());
        v.extend_from_slice(&y0.to_le_bytes());
        v.extend_from_slice(&w.to_le_bytes());
        v.extend_from_slice(&h.to_le_bytes());
        v
    }

    fn cmd_header(opcode: u8, size: u32) -> Vec<u8> {
        let mut v = vec![opcode, 0, 0, 0];
        v.extend_from_slice(&size.to_le_bytes());
        v
    }

    #[test]
    fn clear_then_fill_rect_executes_in_order() {
        let fill_payload = rect_payload(0, 0, 2, 1);
        let mut cmds = Vec::new();
        cmds.extend_from_slice(&cmd_header(1, 0)); // CLEAR
        cmds.extend_from_slice(&cmd_header(2, fill_payload.len() as u32)); // FILL_RECT
        cmds.extend_from_slice(&fill_payload);

        let cmd_bytes = cmds.len() as u32;
        let total = HEADER_SIZE as u32 + cmd_bytes;
        let header = Header {
            magic: MAGIC,
            version: VERSION,
            header_size: HEADER_SIZE as u32,
            total_size: total,
            cmd_offset: HEADER_SIZE as u32,
            cmd_bytes,
            string_span_offset: 0,
            string_span_count: 0,
            string_bytes_offset: 0,
            string_bytes_len: 0,
            blob_span_offset: 0,
            blob_span_count: 0,
            blob_bytes_offset: 0,
            blob_bytes_len: 0,
        };
        let mut buf = Vec::new();
        header.write(&mut buf);
        buf.extend_from_slice(&cmds);

        let validated = validate(&buf, Limits::default()).unwrap();
        let mut fb = Framebuffer::new(4, 1);
        let style = Style::new(RgbColor::WHITE, RgbColor::BLACK);
        execute(&validated, &mut fb, style, EmojiWidthPolicy::Narrow).unwrap();
        assert_eq!(fb.get(0, 0).style, style);
        assert_eq!(fb.get(3, 0).style, Style::default());
        let _ = COMMAND_HEADER_SIZE;
    }

    #[test]
    fn draw_text_run_writes_presegmented_blob() {
        // One blob: two ASCII graphemes, each width 1.
        let blob = [1u8, 1, b'h', 1, 1, b'i'];
        let draw_text_run_payload = {
            let mut v = Vec::new();
            v.extend_from_slice(&0i32.to_le_bytes());
            v.extend_from_slice(&0i32.to_le_bytes());
            v.extend_from_slice(&0u32.to_le_bytes()); // blob index 0
            v
        };

        let mut cmds = Vec::new();
        cmds.extend_from_slice(&cmd_header(Opcode::DrawTextRun as u8, draw_text_run_payload.len() as u32));
        cmds.extend_from_slice(&draw_text_run_payload);
        let cmd_bytes = cmds.len() as u32;

        let blob_span_offset = HEADER_SIZE as u32 + cmd_bytes;
        let blob_bytes_offset = blob_span_offset + SPAN_SIZE as u32;
        let total = blob_bytes_offset + blob.len() as u32;

        let header = Header {
            magic: MAGIC,
            version: VERSION,
            header_size: HEADER_SIZE as u32,
            total_size: total,
            cmd_offset: HEADER_SIZE as u32,
            cmd_bytes,
            string_span_offset: 0,
            string_span_count: 0,
            string_bytes_offset: 0,
            string_bytes_len: 0,
            blob_span_offset,
            blob_span_count: 1,
            blob_bytes_offset,
            blob_bytes_len: blob.len() as u32,
        };
        let mut buf = Vec::new();
        header.write(&mut buf);
        buf.extend_from_slice(&cmds);
        buf.extend_from_slice(&0u32.to_le_bytes()); // span.offset
        buf.extend_from_slice(&(blob.len() as u32).to_le_bytes()); // span.len
        buf.extend_from_slice(&blob);

        let validated = validate(&buf, Limits::default()).unwrap();
        let mut fb = Framebuffer::new(4, 1);
        let style = Style::new(RgbColor::WHITE, RgbColor::BLACK);
        execute(&validated, &mut fb, style, EmojiWidthPolicy::Narrow).unwrap();
        assert_eq!(fb.get(0, 0).grapheme.as_str(), "h");
        assert_eq!(fb.get(1, 0).grapheme.as_str(), "i");
    }

    #[test]
    fn a_mid_list_failure_leaves_the_framebuffer_unchanged() {
        // A malformed blob record (glyph_len claims more bytes than the
        // blob actually has) is only caught at execute time, not by
        // validate(), which only checks the blob's span bounds. CLEAR runs
        // first and would mutate the framebuffer if execute wrote directly
        // into it instead of a staging clone.
        let blob = [1u8, 5, b'h']; // claims 5 glyph bytes, only 1 present
        let draw_text_run_payload = {
            let mut v = Vec::new();
            v.extend_from_slice(&0i32.to_le_bytes());
            v.extend_from_slice(&0i32.to_le_bytes());
            v.extend_from_slice(&0u32.to_le_bytes());
            v
        };

        let mut cmds = Vec::new();
        cmds.extend_from_slice(&cmd_header(Opcode::Clear as u8, 0));
        cmds.extend_from_slice(&cmd_header(Opcode::DrawTextRun as u8, draw_text_run_payload.len() as u32));
        cmds.extend_from_slice(&draw_text_run_payload);
        let cmd_bytes = cmds.len() as u32;

        let blob_span_offset = HEADER_SIZE as u32 + cmd_bytes;
        let blob_bytes_offset = blob_span_offset + SPAN_SIZE as u32;
        let total = blob_bytes_offset + blob.len() as u32;

        let header = Header {
            magic: MAGIC,
            version: VERSION,
            header_size: HEADER_SIZE as u32,
            total_size: total,
            cmd_offset: HEADER_SIZE as u32,
            cmd_bytes,
            string_span_offset: 0,
            string_span_count: 0,
            string_bytes_offset: 0,
            string_bytes_len: 0,
            blob_span_offset,
            blob_span_count: 1,
            blob_bytes_offset,
            blob_bytes_len: blob.len() as u32,
        };
        let mut buf = Vec::new();
        header.write(&mut buf);
        buf.extend_from_slice(&cmds);
        buf.extend_from_slice(&0u32.to_le_bytes()); // span.offset
        buf.extend_from_slice(&(blob.len() as u32).to_le_bytes()); // span.len
        buf.extend_from_slice(&blob);

        let validated = validate(&buf, Limits::default()).unwrap();
        let style = Style::new(RgbColor::WHITE, RgbColor::BLACK);
        let original = Framebuffer::new(4, 1);
        let mut fb = original.clone();
        let result = execute(&validated, &mut fb, style, EmojiWidthPolicy::Narrow);
        assert!(result.is_err());
        assert_eq!(fb.get(0, 0).grapheme.as_str(), original.get(0, 0).grapheme.as_str());
        assert_eq!(fb.get(0, 0).style, original.get(0, 0).style);
    }
}
