// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The event batch wire format v1 (§3 "Event batch v1", §4.8): a
//! little-endian header followed by 4-byte-aligned records, each
//! whole-or-not-at-all, with record-atomic truncation.

use crate::core::bounded::byte_builder::ByteBuilder;
use crate::error::{VtError, VtResult};

use super::types::{Event, EventPayload, KeyAction, KeyCode, Modifiers, MouseButtons, MouseKind};

pub const BATCH_MAGIC: u32 = 0x5456_4556; // "VEVT" read little-endian.
pub const BATCH_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 20;
pub const RECORD_HEADER_SIZE: usize = 12;

/// Set in the header's `flags` field once a record fails to fit.
pub const FLAG_TRUNCATED: u32 = 1 << 0;

const TYPE_KEY: u8 = 0;
const TYPE_TEXT: u8 = 1;
const TYPE_MOUSE: u8 = 2;
const TYPE_RESIZE: u8 = 3;
const TYPE_TICK: u8 = 4;
const TYPE_USER: u8 = 5;

fn key_code_to_wire(code: KeyCode) -> (u8, u32) {
    match code {
        KeyCode::Char(ch) => (0, ch as u32),
        KeyCode::Enter => (1, 0),
        KeyCode::Tab => (2, 0),
        KeyCode::Backspace => (3, 0),
        KeyCode::Escape => (4, 0),
        KeyCode::Up => (5, 0),
        KeyCode::Down => (6, 0),
        KeyCode::Left => (7, 0),
        KeyCode::Right => (8, 0),
        KeyCode::Home => (9, 0),
        KeyCode::End => (10, 0),
        KeyCode::PageUp => (11, 0),
        KeyCode::PageDown => (12, 0),
        KeyCode::Insert => (13, 0),
        KeyCode::Delete => (14, 0),
        KeyCode::F(n) => (15, u32::from(n)),
    }
}

fn key_code_from_wire(tag: u8, value: u32) -> VtResult<KeyCode> {
    Ok(match tag {
        0 => KeyCode::Char(char::from_u32(value).unwrap_or('\u{FFFD}')),
        1 => KeyCode::Enter,
        2 => KeyCode::Tab,
        3 => KeyCode::Backspace,
        4 => KeyCode::Escape,
        5 => KeyCode::Up,
        6 => KeyCode::Down,
        7 => KeyCode::Left,
        8 => KeyCode::Right,
        9 => KeyCode::Home,
        10 => KeyCode::End,
        11 => KeyCode::PageUp,
        12 => KeyCode::PageDown,
        13 => KeyCode::Insert,
        14 => KeyCode::Delete,
        15 => KeyCode::F(u8::try_from(value).unwrap_or(0)),
        _ => return Err(VtError::invalid_argument("unknown key code tag in event batch")),
    })
}

fn key_action_to_wire(action: KeyAction) -> u8 {
    match action {
        KeyAction::Press => 0,
        KeyAction::Repeat => 1,
        KeyAction::Release => 2,
    }
}

fn key_action_from_wire(v: u8) -> VtResult<KeyAction> {
    match v {
        0 => Ok(KeyAction::Press),
        1 => Ok(KeyAction::Repeat),
        2 => Ok(KeyAction::Release),
        _ => Err(VtError::invalid_argument("unknown key action in event batch")),
    }
}

fn mouse_kind_to_wire(kind: MouseKind) -> u8 {
    match kind {
        MouseKind::Move => 0,
        MouseKind::Down => 1,
        MouseKind::Up => 2,
        MouseKind::Drag => 3,
        MouseKind::Wheel => 4,
    }
}

fn mouse_kind_from_wire(v: u8) -> VtResult<MouseKind> {
    match v {
        0 => Ok(MouseKind::Move),
        1 => Ok(MouseKind::Down),
        2 => Ok(MouseKind::Up),
        3 => Ok(MouseKind::Drag),
        4 => Ok(MouseKind::Wheel),
        _ => Err(VtError::invalid_argument("unknown mouse kind in event batch")),
    }
}

fn payload_bytes(payload: &EventPayload, user_bytes: Option<&[u8]>) -> VtResult<(u8, Vec<u8>)> {
    match *payload {
        EventPayload::Key { code, mods, action } => {
            let (tag, value) = key_code_to_wire(code);
            let mut v = Vec::with_capacity(8);
            v.push(tag);
            v.extend_from_slice(&value.to_le_bytes());
            v.push(mods.bits());
            v.push(key_action_to_wire(action));
            v.push(0);
            Ok((TYPE_KEY, v))
        }
        EventPayload::Text(ch) => Ok((TYPE_TEXT, (ch as u32).to_le_bytes().to_vec())),
        EventPayload::Mouse { x, y, kind, buttons, mods, wheel_x, wheel_y } => {
            let mut v = Vec::with_capacity(12);
            v.extend_from_slice(&x.to_le_bytes());
            v.extend_from_slice(&y.to_le_bytes());
            v.push(mouse_kind_to_wire(kind));
            v.push(buttons.bits());
            v.push(mods.bits());
            #[allow(clippy::cast_sign_loss)]
            v.push(wheel_x as u8);
            #[allow(clippy::cast_sign_loss)]
            v.push(wheel_y as u8);
            v.extend_from_slice(&[0, 0, 0]);
            Ok((TYPE_MOUSE, v))
        }
        EventPayload::Resize { cols, rows } => {
            let mut v = Vec::with_capacity(4);
            v.extend_from_slice(&cols.to_le_bytes());
            v.extend_from_slice(&rows.to_le_bytes());
            Ok((TYPE_RESIZE, v))
        }
        EventPayload::Tick { dt_ms } => Ok((TYPE_TICK, dt_ms.to_le_bytes().to_vec())),
        EventPayload::User { tag, .. } => {
            let bytes = user_bytes.ok_or_else(|| VtError::invalid_argument("USER event packed without payload bytes"))?;
            if bytes.len() > 4096 {
                return Err(VtError::limit("USER payload exceeds 4096 bytes"));
            }
            let mut v = Vec::with_capacity(4 + bytes.len());
            v.extend_from_slice(&tag.to_le_bytes());
            v.extend_from_slice(bytes);
            Ok((TYPE_USER, v))
        }
    }
}

fn pad4(len: usize) -> usize { len.div_ceil(4) * 4 }

/// Appends event records into a bounded output buffer, patching the
/// header once finished.
#[derive(Debug)]
pub struct BatchWriter {
    out: ByteBuilder,
    event_count: u32,
    truncated: bool,
}

impl BatchWriter {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        let mut out = ByteBuilder::with_capacity(cap);
        // Header placeholder; patched in `finish`.
        let _ = out.push_bytes(&[0u8; HEADER_SIZE]);
        Self { out, event_count: 0, truncated: false }
    }

    /// Appends one event's record. `user_bytes` must be `Some` exactly
    /// when `event.payload` is [`EventPayload::User`].
    ///
    /// If the fully-padded record does not fit in the remaining output
    /// cap, the record is not written at all (no partial record), the
    /// batch's truncated flag latches, and subsequent calls are no-ops
    /// until [`Self::finish`].
    pub fn push_event(&mut self, event: &Event, user_bytes: Option<&[u8]>) -> VtResult<()> {
        if self.truncated {
            return Ok(());
        }
        let (type_tag, payload) = payload_bytes(&event.payload, user_bytes)?;
        let unpadded = RECORD_HEADER_SIZE + payload.len();
        let record_size = pad4(unpadded);
        if !self.out.would_fit(record_size) {
            self.truncated = true;
            return Ok(());
        }
        let time_ms = u32::try_from(event.time_ms).unwrap_or(u32::MAX);
        self.out.push_byte(type_tag)?;
        self.out.push_byte(0)?; // reserved
        self.out.push_bytes(&0u16.to_le_bytes())?; // flags
        self.out.push_bytes(&u32::try_from(record_size).unwrap_or(0).to_le_bytes())?;
        self.out.push_bytes(&time_ms.to_le_bytes())?;
        self.out.push_bytes(&payload)?;
        let padding = record_size - unpadded;
        self.out.push_bytes(&vec![0u8; padding])?;
        self.event_count += 1;
        Ok(())
    }

    /// Patches the header's `event_count`, `total_size`, and `flags`
    /// fields and returns the finished batch bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        let total_size = u32::try_from(self.out.len()).unwrap_or(u32::MAX);
        let flags = if self.truncated { FLAG_TRUNCATED } else { 0 };
        self.out.patch_u32(0, BATCH_MAGIC);
        self.out.patch_u32(4, BATCH_VERSION);
        self.out.patch_u32(8, total_size);
        self.out.patch_u32(12, self.event_count);
        self.out.patch_u32(16, flags);
        self.out.into_vec()
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool { self.truncated }
}

/// A decoded batch header.
#[derive(Clone, Copy, Debug)]
pub struct BatchHeader {
    pub magic: u32,
    pub version: u32,
    pub total_size: u32,
    pub event_count: u32,
    pub flags: u32,
}

impl BatchHeader {
    #[must_use]
    pub fn truncated(&self) -> bool { self.flags & FLAG_TRUNCATED != 0 }
}

/// An event decoded back out of a batch. `User` payload bytes are
/// inlined (the batch crosses a process/wire boundary, so there is no
/// shared ring to reference by offset).
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedPayload {
    Key { code: KeyCode, mods: Modifiers, action: KeyAction },
    Text(char),
    Mouse { x: u16, y: u16, kind: MouseKind, buttons: MouseButtons, mods: Modifiers, wheel_x: i8, wheel_y: i8 },
    Resize { cols: u16, rows: u16 },
    Tick { dt_ms: u32 },
    User { tag: u32, bytes: Vec<u8> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedEvent {
    pub payload: DecodedPayload,
    pub time_ms: u32,
}

fn read_u32(buf: &[u8], offset: usize) -> VtResult<u32> {
    buf.get(offset..offset + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| VtError::invalid_argument("truncated batch field"))
}

/// Parses the fixed header at the start of `buf`.
///
/// # Errors
/// Returns [`VtError::InvalidArgument`] if `buf` is shorter than
/// [`HEADER_SIZE`], the magic does not match, or the version is unknown.
pub fn parse_header(buf: &[u8]) -> VtResult<BatchHeader> {
    if buf.len() < HEADER_SIZE {
        return Err(VtError::invalid_argument("buffer shorter than batch header"));
    }
    let magic = read_u32(buf, 0)?;
    if magic != BATCH_MAGIC {
        return Err(VtError::invalid_argument("event batch magic mismatch"));
    }
    let version = read_u32(buf, 4)?;
    if version != BATCH_VERSION {
        return Err(VtError::invalid_argument("unknown event batch version"));
    }
    Ok(BatchHeader { magic, version, total_size: read_u32(buf, 8)?, event_count: read_u32(buf, 12)?, flags: read_u32(buf, 16)? })
}

/// Decodes every complete record in `buf` following the header.
///
/// Record-atomic: a record whose declared `record_size` would run past
/// the end of `buf` is never partially decoded — decoding stops and
/// returns everything decoded so far (consistent with the writer's own
/// truncation: the header's `TRUNCATED` flag, when set, names exactly
/// this condition).
///
/// # Errors
/// Returns [`VtError::InvalidArgument`] if the header is malformed or a
/// record's type tag is unrecognized.
pub fn decode_batch(buf: &[u8]) -> VtResult<(BatchHeader, Vec<DecodedEvent>)> {
    let header = parse_header(buf)?;
    let mut events = Vec::with_capacity(header.event_count as usize);
    let mut cursor = HEADER_SIZE;
    while cursor + RECORD_HEADER_SIZE <= buf.len() && events.len() < header.event_count as usize {
        let type_tag = buf[cursor];
        let record_size = read_u32(buf, cursor + 4)? as usize;
        let time_ms = read_u32(buf, cursor + 8)?;
        if record_size < RECORD_HEADER_SIZE || cursor + record_size > buf.len() {
            break;
        }
        let payload = &buf[cursor + RECORD_HEADER_SIZE..cursor + record_size];
        let decoded = decode_payload(type_tag, payload)?;
        events.push(DecodedEvent { payload: decoded, time_ms });
        cursor += record_size;
    }
    Ok((header, events))
}

fn decode_payload(type_tag: u8, payload: &[u8]) -> VtResult<DecodedPayload> {
    match type_tag {
        TYPE_KEY => {
            if payload.len() < 8 {
                return Err(VtError::invalid_argument("truncated KEY record payload"));
            }
            let code = key_code_from_wire(payload[0], u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]))?;
            let mods = Modifiers::from_bits(payload[5]);
            let action = key_action_from_wire(payload[6])?;
            Ok(DecodedPayload::Key { code, mods, action })
        }
        TYPE_TEXT => {
            if payload.len() < 4 {
                return Err(VtError::invalid_argument("truncated TEXT record payload"));
            }
            let scalar = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
            Ok(DecodedPayload::Text(char::from_u32(scalar).unwrap_or('\u{FFFD}')))
        }
        TYPE_MOUSE => {
            if payload.len() < 9 {
                return Err(VtError::invalid_argument("truncated MOUSE record payload"));
            }
            let x = u16::from_le_bytes([payload[0], payload[1]]);
            let y = u16::from_le_bytes([payload[2], payload[3]]);
            let kind = mouse_kind_from_wire(payload[4])?;
            let buttons = MouseButtons::from_bits(payload[5]);
            let mods = Modifiers::from_bits(payload[6]);
            #[allow(clippy::cast_possible_wrap)]
            let wheel_x = payload[7] as i8;
            #[allow(clippy::cast_possible_wrap)]
            let wheel_y = payload[8] as i8;
            Ok(DecodedPayload::Mouse { x, y, kind, buttons, mods, wheel_x, wheel_y })
        }
        TYPE_RESIZE => {
            if payload.len() < 4 {
                return Err(VtError::invalid_argument("truncated RESIZE record payload"));
            }
            let cols = u16::from_le_bytes([payload[0], payload[1]]);
            let rows = u16::from_le_bytes([payload[2], payload[3]]);
            Ok(DecodedPayload::Resize { cols, rows })
        }
        TYPE_TICK => {
            if payload.len() < 4 {
                return Err(VtError::invalid_argument("truncated TICK record payload"));
            }
            Ok(DecodedPayload::Tick { dt_ms: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]) })
        }
        TYPE_USER => {
            if payload.len() < 4 {
                return Err(VtError::invalid_argument("truncated USER record payload"));
            }
            let tag = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
            Ok(DecodedPayload::User { tag, bytes: payload[4..].to_vec() })
        }
        _ => Err(VtError::invalid_argument("unknown event type tag in batch")),
    }
}
