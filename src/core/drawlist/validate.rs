// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Validation of a drawlist v1 byte stream (§4.2). Rejects with a specific
//! error kind before any execution is attempted; execution never sees a
//! structurally invalid buffer.

use crate::core::bounded::checked_math::span_within;
use crate::error::{VtError, VtResult};

use super::wire::{COMMAND_HEADER_SIZE, CommandHeader, HEADER_SIZE, Header, MAGIC, Opcode, SPAN_SIZE, Span, VERSION};

/// Caps applied during validation (§4.2 "limits (max commands, max
/// strings, max blob bytes) are exceeded").
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_commands: u32,
    pub max_strings: u32,
    pub max_blob_bytes: u32,
}

impl Default for Limits {
    fn default() -> Self { Self { max_commands: 4096, max_strings: 4096, max_blob_bytes: 1 << 20 } }
}

/// A validated drawlist, ready for [`super::execute::execute`]. Holds
/// borrowed slices into the original buffer; no copies are made.
#[derive(Debug)]
pub struct ValidatedDrawlist<'a> {
    pub buf: &'a [u8],
    pub header: Header,
    pub commands: Vec<ValidatedCommand>,
    pub string_spans: Vec<Span>,
    pub string_bytes: &'a [u8],
    pub blob_spans: Vec<Span>,
    pub blob_bytes: &'a [u8],
}

#[derive(Clone, Copy, Debug)]
pub struct ValidatedCommand {
    pub opcode: Opcode,
    pub flags: u8,
    pub payload_offset: usize,
    pub payload_size: usize,
}

/// Validates `buf` as a drawlist v1 stream.
///
/// # Errors
/// Returns [`VtError::InvalidArgument`] for any structural defect (magic,
/// version, offsets, reserved bytes, span overlap, out-of-range string
/// index, negative-going clip depth) and [`VtError::Limit`] when the
/// configured [`Limits`] are exceeded.
pub fn validate<'a>(buf: &'a [u8], limits: Limits) -> VtResult<ValidatedDrawlist<'a>> {
    let header = Header::parse(buf).ok_or_else(|| VtError::invalid_argument("buffer shorter than drawlist header"))?;
    if header.magic != MAGIC {
        return Err(VtError::invalid_argument("drawlist magic mismatch"));
    }
    if header.version != VERSION {
        return Err(VtError::invalid_argument("unknown drawlist version"));
    }
    if header.header_size as usize != HEADER_SIZE {
        return Err(VtError::invalid_argument("drawlist header_size mismatch"));
    }
    let total_size = header.total_size as usize;
    if total_size > buf.len() {
        return Err(VtError::invalid_argument("drawlist total_size exceeds buffer"));
    }

    if !span_within(header.string_bytes_offset, header.string_bytes_len, header.total_size) {
        return Err(VtError::invalid_argument("string byte span out of bounds"));
    }
    if !span_within(header.blob_bytes_offset, header.blob_bytes_len, header.total_size) {
        return Err(VtError::invalid_argument("blob byte span out of bounds"));
    }
    let string_span_table_len = header.string_span_count.saturating_mul(SPAN_SIZE as u32);
    if !span_within(header.string_span_offset, string_span_table_len, header.total_size) {
        return Err(VtError::invalid_argument("string span table out of bounds"));
    }
    if header.string_span_count > limits.max_strings {
        return Err(VtError::limit("string count exceeds limit"));
    }
    if header.string_bytes_len > limits.max_blob_bytes {
        return Err(VtError::limit("string byte length exceeds limit"));
    }
    if header.blob_bytes_len > limits.max_blob_bytes {
        return Err(VtError::limit("blob byte length exceeds limit"));
    }

    let string_bytes_start = header.string_bytes_offset as usize;
    let string_bytes_end = string_bytes_start + header.string_bytes_len as usize;
    let string_bytes = &buf[string_bytes_start..string_bytes_end];

    let mut string_spans = Vec::with_capacity(header.string_span_count as usize);
    for i in 0..header.string_span_count {
        let offset = header.string_span_offset as usize + i as usize * SPAN_SIZE;
        let span = Span::parse(buf, offset).ok_or_else(|| VtError::invalid_argument("truncated string span entry"))?;
        if !span_within(span.offset, span.len, header.string_bytes_len) {
            return Err(VtError::invalid_argument("string span escapes string byte region"));
        }
        string_spans.push(span);
    }
    if spans_overlap(&string_spans) {
        return Err(VtError::invalid_argument("string spans overlap"));
    }

    let blob_bytes_start = header.blob_bytes_offset as usize;
    let blob_bytes_end = blob_bytes_start + header.blob_bytes_len as usize;
    let blob_bytes = &buf[blob_bytes_start..blob_bytes_end];

    let blob_span_table_len = header.blob_span_count.saturating_mul(SPAN_SIZE as u32);
    if !span_within(header.blob_span_offset, blob_span_table_len, header.total_size) {
        return Err(VtError::invalid_argument("blob span table out of bounds"));
    }

    let mut blob_spans = Vec::with_capacity(header.blob_span_count as usize);
    for i in 0..header.blob_span_count {
        let offset = header.blob_span_offset as usize + i as usize * SPAN_SIZE;
        let span = Span::parse(buf, offset).ok_or_else(|| VtError::invalid_argument("truncated blob span entry"))?;
        if !span_within(span.offset, span.len, header.blob_bytes_len) {
            return Err(VtError::invalid_argument("blob span escapes blob byte region"));
        }
        blob_spans.push(span);
    }
    if spans_overlap(&blob_spans) {
        return Err(VtError::invalid_argument("blob spans overlap"));
    }

    if !span_within(header.cmd_offset, header.cmd_bytes, header.total_size) {
        return Err(VtError::invalid_argument("command stream out of bounds"));
    }

    let mut commands = Vec::new();
    let mut cursor = header.cmd_offset as usize;
    let cmd_end = header.cmd_offset as usize + header.cmd_bytes as usize;
    let mut clip_depth: i64 = 0;
    let mut summed: u64 = 0;
    while cursor < cmd_end {
        if commands.len() as u32 >= limits.max_commands {
            return Err(VtError::limit("command count exceeds limit"));
        }
        let cmd_header = CommandHeader::parse(buf, cursor)
            .ok_or_else(|| VtError::invalid_argument("truncated command header"))?;
        if cmd_header.reserved != 0 {
            return Err(VtError::invalid_argument("nonzero reserved bytes in command header"));
        }
        let opcode = Opcode::from_u8(cmd_header.opcode)
            .ok_or_else(|| VtError::invalid_argument("unknown drawlist opcode"))?;
        let payload_offset = cursor + COMMAND_HEADER_SIZE;
        let payload_size = cmd_header.size as usize;
        if payload_offset + payload_size > cmd_end {
            return Err(VtError::invalid_argument("command payload escapes command stream"));
        }

        match opcode {
            Opcode::DrawText => {
                let idx = read_u32_at(buf, payload_offset)?;
                if idx >= header.string_span_count {
                    return Err(VtError::invalid_argument("DRAW_TEXT string index out of range"));
                }
            }
            Opcode::DrawTextRun => {
                let idx = read_u32_at(buf, payload_offset)?;
                let blob_span_count = header.blob_span_count;
                if idx >= blob_span_count {
                    return Err(VtError::invalid_argument("DRAW_TEXT_RUN blob index out of range"));
                }
            }
            Opcode::PushClip => clip_depth += 1,
            Opcode::PopClip => {
                clip_depth -= 1;
                if clip_depth < 0 {
                    return Err(VtError::invalid_argument("PUSH_CLIP/POP_CLIP stack would go negative"));
                }
            }
            Opcode::Invalid => return Err(VtError::invalid_argument("INVALID opcode present in command stream")),
            Opcode::Clear | Opcode::FillRect => {}
        }

        let advance = COMMAND_HEADER_SIZE + payload_size;
        summed += advance as u64;
        commands.push(ValidatedCommand { opcode, flags: cmd_header.flags, payload_offset, payload_size });
        cursor += advance;
    }
    if summed != u64::from(header.cmd_bytes) {
        return Err(VtError::invalid_argument("command sizes do not sum to cmd_bytes"));
    }

    Ok(ValidatedDrawlist { buf, header, commands, string_spans, string_bytes, blob_spans, blob_bytes })
}

fn read_u32_at(buf: &[u8], offset: usize) -> VtResult<u32> {
    buf.get(offset..offset + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| VtError::invalid_argument("truncated command payload"))
}

fn spans_overlap(spans: &[Span]) -> bool {
    let mut sorted: Vec<(u32, u32)> = spans.iter().map(|s| (s.offset, s.offset + s.len)).collect();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[0].1 > w[1].0)
}
