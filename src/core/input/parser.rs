// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A deterministic VT/xterm byte-sequence decoder (§4.7).
//!
//! Recognizes arrow/navigation/function keys (both the `CSI ... ~` and
//! `SS3` families), SGR mouse reports, and bracketed-paste markers.
//! Anything else falls back to strict UTF-8 decoding, matching the
//! capability probe's opportunistic-parsing style (`capability::parse`)
//! but tuned for the hot keystroke path: no heap allocation, and a
//! **prefix mode** that stops before consuming a sequence that might
//! still be in flight rather than misinterpreting a truncated read.

use crate::core::events::types::{Event, EventPayload, KeyAction, KeyCode, Modifiers, MouseButtons, MouseKind};
use crate::core::text::utf8::{Utf8Decode, decode_one};

const ESC: u8 = 0x1B;
const CR: u8 = 0x0D;
const LF: u8 = 0x0A;
const TAB: u8 = 0x09;
const DEL: u8 = 0x7F;

const PASTE_END: &[u8] = b"\x1b[201~";

/// A stream decoder that carries only the one bit of cross-call state
/// bracketed paste needs (whether a paste is currently open); every other
/// sequence is decoded from the buffer alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputParser {
    in_paste: bool,
}

enum Step {
    /// `n` bytes (n >= 1) were consumed, producing zero or more events.
    Consumed(usize),
    /// The buffer ends mid-sequence; stop here and retry once more bytes
    /// arrive, per §4.7's prefix mode.
    Incomplete,
}

fn key_event(code: KeyCode, mods: Modifiers, time_ms: u64) -> Event {
    Event::new(EventPayload::Key { code, mods, action: KeyAction::Press }, time_ms)
}

/// The xterm modifier encoding (`1 + shift*1 + alt*2 + ctrl*4 + meta*8`)
/// happens to line up bit-for-bit with [`Modifiers`]'s own layout, so the
/// translation is a single subtract-and-mask.
fn modifiers_from_xterm_code(code: u32) -> Modifiers {
    Modifiers::from_bits(u8::try_from(code.saturating_sub(1)).unwrap_or(0) & 0x0F)
}

impl InputParser {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Decodes as many complete events as `buf` contains, calling `emit`
    /// for each (in strict left-to-right order of the byte that started
    /// it, §4.7 tie-break), and returns the number of bytes consumed.
    /// In full mode this is always `buf.len()`; a caller retrying a
    /// buffer that previously returned a shorter prefix is in prefix
    /// mode, and must re-append unconsumed bytes before the next call.
    pub fn parse(&mut self, buf: &[u8], time_ms: u64, mut emit: impl FnMut(Event)) -> usize {
        let mut i = 0;
        while i < buf.len() {
            let step = if self.in_paste {
                self.step_paste(&buf[i..], time_ms, &mut emit)
            } else {
                self.step(&buf[i..], time_ms, &mut emit)
            };
            match step {
                Step::Consumed(n) => i += n,
                Step::Incomplete => break,
            }
        }
        i
    }

    fn step_paste(&mut self, buf: &[u8], time_ms: u64, emit: &mut impl FnMut(Event)) -> Step {
        if buf.len() >= PASTE_END.len() {
            if &buf[..PASTE_END.len()] == PASTE_END {
                self.in_paste = false;
                return Step::Consumed(PASTE_END.len());
            }
        } else if &PASTE_END[..buf.len()] == buf {
            return Step::Incomplete;
        }
        match decode_one(buf) {
            Utf8Decode::Valid { ch, len } => {
                emit(Event::new(EventPayload::Text(ch), time_ms));
                Step::Consumed(len)
            }
            Utf8Decode::Invalid => {
                emit(Event::new(EventPayload::Text('\u{FFFD}'), time_ms));
                Step::Consumed(1)
            }
            Utf8Decode::Incomplete => Step::Incomplete,
        }
    }

    fn step(&mut self, buf: &[u8], time_ms: u64, emit: &mut impl FnMut(Event)) -> Step {
        match buf[0] {
            ESC => self.step_escape(buf, time_ms, emit),
            CR | LF => {
                emit(key_event(KeyCode::Enter, Modifiers::NONE, time_ms));
                Step::Consumed(1)
            }
            TAB => {
                emit(key_event(KeyCode::Tab, Modifiers::NONE, time_ms));
                Step::Consumed(1)
            }
            DEL => {
                emit(key_event(KeyCode::Backspace, Modifiers::NONE, time_ms));
                Step::Consumed(1)
            }
            _ => match decode_one(buf) {
                Utf8Decode::Valid { ch, len } => {
                    if (ch as u32) < 0x20 {
                        emit(key_event(KeyCode::Char(ch), Modifiers::NONE, time_ms));
                    } else {
                        emit(Event::new(EventPayload::Text(ch), time_ms));
                    }
                    Step::Consumed(len)
                }
                Utf8Decode::Invalid => {
                    emit(Event::new(EventPayload::Text('\u{FFFD}'), time_ms));
                    Step::Consumed(1)
                }
                Utf8Decode::Incomplete => Step::Incomplete,
            },
        }
    }

    fn step_escape(&mut self, buf: &[u8], time_ms: u64, emit: &mut impl FnMut(Event)) -> Step {
        match buf.get(1) {
            None => Step::Incomplete,
            Some(&b'[') => self.step_csi(buf, time_ms, emit),
            Some(&b'O') => step_ss3(buf, time_ms, emit),
            Some(_) => {
                // Not a recognized escape family: the ESC itself falls back
                // to the Escape key, and whatever follows is reparsed fresh
                // on the next byte (§4.7 "bare ESC falls back to Escape").
                emit(key_event(KeyCode::Escape, Modifiers::NONE, time_ms));
                Step::Consumed(1)
            }
        }
    }

    fn step_csi(&mut self, buf: &[u8], time_ms: u64, emit: &mut impl FnMut(Event)) -> Step {
        let tokens = match parse_csi_tokens(buf) {
            Ok(t) => t,
            Err(true) => return Step::Incomplete,
            Err(false) => {
                emit(key_event(KeyCode::Escape, Modifiers::NONE, time_ms));
                return Step::Consumed(1);
            }
        };

        match (tokens.marker, tokens.final_byte) {
            (None, b'A' | b'B' | b'C' | b'D' | b'H' | b'F') => {
                let code = match tokens.final_byte {
                    b'A' => KeyCode::Up,
                    b'B' => KeyCode::Down,
                    b'C' => KeyCode::Right,
                    b'D' => KeyCode::Left,
                    b'H' => KeyCode::Home,
                    _ => KeyCode::End,
                };
                let mods = tokens.param(1).map_or(Modifiers::NONE, modifiers_from_xterm_code);
                emit(key_event(code, mods, time_ms));
                Step::Consumed(tokens.consumed)
            }
            (None, b'~') => {
                let code0 = tokens.param(0).unwrap_or(1);
                if code0 == 200 {
                    self.in_paste = true;
                    return Step::Consumed(tokens.consumed);
                }
                if code0 == 201 {
                    // A stray end marker with no open paste: consume, emit nothing.
                    self.in_paste = false;
                    return Step::Consumed(tokens.consumed);
                }
                let Some(code) = function_key_for(code0) else {
                    return Step::Consumed(tokens.consumed);
                };
                let mods = tokens.param(1).map_or(Modifiers::NONE, modifiers_from_xterm_code);
                emit(key_event(code, mods, time_ms));
                Step::Consumed(tokens.consumed)
            }
            (Some(b'<'), b'M' | b'm') => {
                if tokens.param_count < 3 {
                    return Step::Consumed(tokens.consumed);
                }
                emit(sgr_mouse_event(&tokens, time_ms));
                Step::Consumed(tokens.consumed)
            }
            _ => Step::Consumed(tokens.consumed),
        }
    }
}

fn step_ss3(buf: &[u8], time_ms: u64, emit: &mut impl FnMut(Event)) -> Step {
    match buf.get(2) {
        None => Step::Incomplete,
        Some(&b) => {
            let code = match b {
                b'P' => KeyCode::F(1),
                b'Q' => KeyCode::F(2),
                b'R' => KeyCode::F(3),
                b'S' => KeyCode::F(4),
                b'A' => KeyCode::Up,
                b'B' => KeyCode::Down,
                b'C' => KeyCode::Right,
                b'D' => KeyCode::Left,
                b'H' => KeyCode::Home,
                b'F' => KeyCode::End,
                _ => {
                    emit(key_event(KeyCode::Escape, Modifiers::NONE, time_ms));
                    return Step::Consumed(1);
                }
            };
            emit(key_event(code, Modifiers::NONE, time_ms));
            Step::Consumed(3)
        }
    }
}

fn function_key_for(code: u32) -> Option<KeyCode> {
    Some(match code {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11 => KeyCode::F(1),
        12 => KeyCode::F(2),
        13 => KeyCode::F(3),
        14 => KeyCode::F(4),
        15 => KeyCode::F(5),
        17 => KeyCode::F(6),
        18 => KeyCode::F(7),
        19 => KeyCode::F(8),
        20 => KeyCode::F(9),
        21 => KeyCode::F(10),
        23 => KeyCode::F(11),
        24 => KeyCode::F(12),
        _ => return None,
    })
}

fn sgr_mouse_event(tokens: &CsiTokens, time_ms: u64) -> Event {
    let cb = tokens.param(0).unwrap_or(0);
    let cx = tokens.param(1).unwrap_or(1);
    let cy = tokens.param(2).unwrap_or(1);

    let base = cb & 0x03;
    let mut mods = Modifiers::NONE;
    if cb & 0x04 != 0 {
        mods = mods.union(Modifiers::SHIFT);
    }
    if cb & 0x08 != 0 {
        mods = mods.union(Modifiers::ALT);
    }
    if cb & 0x10 != 0 {
        mods = mods.union(Modifiers::CTRL);
    }
    let motion = cb & 0x20 != 0;
    let wheel = cb & 0x40 != 0;

    let x = u16::try_from(cx.saturating_sub(1)).unwrap_or(u16::MAX);
    let y = u16::try_from(cy.saturating_sub(1)).unwrap_or(u16::MAX);

    let buttons = match base {
        0 => MouseButtons::LEFT,
        1 => MouseButtons::MIDDLE,
        2 => MouseButtons::RIGHT,
        _ => MouseButtons::NONE,
    };

    let (kind, buttons, wheel_x, wheel_y) = if wheel {
        let wheel_y = match base {
            0 => -1,
            1 => 1,
            _ => 0,
        };
        let wheel_x = match base {
            2 => -1,
            3 => 1,
            _ => 0,
        };
        (MouseKind::Wheel, MouseButtons::NONE, wheel_x, wheel_y)
    } else if motion {
        let kind = if buttons == MouseButtons::NONE { MouseKind::Move } else { MouseKind::Drag };
        (kind, buttons, 0, 0)
    } else if tokens.final_byte == b'M' {
        (MouseKind::Down, buttons, 0, 0)
    } else {
        (MouseKind::Up, buttons, 0, 0)
    };

    Event::new(EventPayload::Mouse { x, y, kind, buttons, mods, wheel_x, wheel_y }, time_ms)
}

struct CsiTokens {
    marker: Option<u8>,
    params: [u32; 4],
    param_count: usize,
    final_byte: u8,
    consumed: usize,
}

impl CsiTokens {
    fn param(&self, idx: usize) -> Option<u32> { (idx < self.param_count).then_some(self.params[idx]) }
}

/// Tokenizes one `CSI` sequence starting at `buf[0] == ESC`, `buf[1] ==
/// '['`. `Err(true)` means the buffer ends mid-sequence (prefix mode);
/// `Err(false)` means the bytes seen so far can never form a valid CSI
/// sequence (e.g. a final byte outside 0x40..=0x7E).
fn parse_csi_tokens(buf: &[u8]) -> Result<CsiTokens, bool> {
    let mut i = 2; // past ESC [
    let marker = match buf.get(i) {
        Some(&b @ (b'?' | b'>' | b'<' | b'=')) => {
            i += 1;
            Some(b)
        }
        Some(_) => None,
        None => return Err(true),
    };

    let mut params = [0u32; 4];
    let mut param_count = 0usize;
    let mut cur: Option<u32> = None;
    loop {
        match buf.get(i) {
            Some(&b) if b.is_ascii_digit() => {
                cur = Some(cur.unwrap_or(0).saturating_mul(10).saturating_add(u32::from(b - b'0')));
                i += 1;
            }
            Some(&b';') => {
                if param_count < params.len() {
                    params[param_count] = cur.unwrap_or(0);
                    param_count += 1;
                }
                cur = None;
                i += 1;
            }
            Some(_) => break,
            None => return Err(true),
        }
    }
    if let Some(v) = cur {
        if param_count < params.len() {
            params[param_count] = v;
            param_count += 1;
        }
    }

    let Some(&final_byte) = buf.get(i) else { return Err(true) };
    if !(0x40..=0x7E).contains(&final_byte) {
        return Err(false);
    }
    i += 1;

    Ok(CsiTokens { marker, params, param_count, final_byte, consumed: i })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(parser: &mut InputParser, buf: &[u8], time_ms: u64) -> (usize, Vec<Event>) {
        let mut events = Vec::new();
        let consumed = parser.parse(buf, time_ms, |e| events.push(e));
        (consumed, events)
    }

    #[test]
    fn sgr_mouse_press_matches_spec_scenario() {
        let mut p = InputParser::new();
        let (consumed, events) = collect(&mut p, b"\x1b[<0;12;5M", 1000);
        assert_eq!(consumed, 10);
        assert_eq!(events.len(), 1);
        match events[0].payload {
            EventPayload::Mouse { x, y, kind, buttons, mods, .. } => {
                assert_eq!((x, y), (11, 4));
                assert_eq!(kind, MouseKind::Down);
                assert_eq!(buttons, MouseButtons::LEFT);
                assert_eq!(mods, Modifiers::NONE);
            }
            other => panic!("expected Mouse, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_escape_buffers_then_completes_as_f5() {
        let mut p = InputParser::new();
        let (consumed, events) = collect(&mut p, b"\x1b[1", 500);
        assert_eq!(consumed, 0);
        assert!(events.is_empty());

        let mut rest = b"\x1b[1".to_vec();
        rest.extend_from_slice(b"5~");
        let (consumed, events) = collect(&mut p, &rest, 500);
        assert_eq!(consumed, 5);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload, EventPayload::Key { code: KeyCode::F(5), mods: Modifiers::NONE, action: KeyAction::Press });
    }

    #[test]
    fn ctrl_up_arrow_carries_modifier() {
        let mut p = InputParser::new();
        let (_, events) = collect(&mut p, b"\x1b[1;5A", 0);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            EventPayload::Key { code: KeyCode::Up, mods: Modifiers::CTRL, action: KeyAction::Press }
        );
    }

    #[test]
    fn ss3_f1_is_recognized() {
        let mut p = InputParser::new();
        let (consumed, events) = collect(&mut p, b"\x1bOP", 0);
        assert_eq!(consumed, 3);
        assert_eq!(events[0].payload, EventPayload::Key { code: KeyCode::F(1), mods: Modifiers::NONE, action: KeyAction::Press });
    }

    #[test]
    fn bracketed_paste_content_is_emitted_as_text_not_keys() {
        let mut p = InputParser::new();
        let mut buf = b"\x1b[200~".to_vec();
        buf.extend_from_slice(b"hi\x1bq");
        buf.extend_from_slice(PASTE_END);
        let (consumed, events) = collect(&mut p, &buf, 0);
        assert_eq!(consumed, buf.len());
        let chars: Vec<char> =
            events.iter().map(|e| if let EventPayload::Text(c) = e.payload { c } else { panic!("expected Text") }).collect();
        assert_eq!(chars, vec!['h', 'i', '\u{1b}', 'q']);
        assert!(!p.in_paste);
    }

    #[test]
    fn control_bytes_map_to_named_keys() {
        let mut p = InputParser::new();
        let (_, events) = collect(&mut p, &[CR, LF, TAB, DEL], 0);
        let codes: Vec<KeyCode> =
            events.iter().map(|e| if let EventPayload::Key { code, .. } = e.payload { code } else { panic!() }).collect();
        assert_eq!(codes, vec![KeyCode::Enter, KeyCode::Enter, KeyCode::Tab, KeyCode::Backspace]);
    }

    #[test]
    fn bare_escape_falls_back_to_escape_key() {
        let mut p = InputParser::new();
        let (consumed, events) = collect(&mut p, b"\x1bq", 0);
        assert_eq!(consumed, 1);
        assert_eq!(events[0].payload, EventPayload::Key { code: KeyCode::Escape, mods: Modifiers::NONE, action: KeyAction::Press });
    }

    #[test]
    fn multibyte_utf8_text_decodes_as_one_event() {
        let mut p = InputParser::new();
        let (consumed, events) = collect(&mut p, "あ".as_bytes(), 0);
        assert_eq!(consumed, 3);
        assert_eq!(events[0].payload, EventPayload::Text('あ'));
    }

    #[test]
    fn invalid_utf8_yields_replacement_character() {
        let mut p = InputParser::new();
        let (consumed, events) = collect(&mut p, &[0xFF, b'x'], 0);
        assert_eq!(consumed, 2);
        assert_eq!(events[0].payload, EventPayload::Text('\u{FFFD}'));
        assert_eq!(events[1].payload, EventPayload::Text('x'));
    }

    #[test]
    fn events_within_one_buffer_are_emitted_left_to_right() {
        let mut p = InputParser::new();
        let (_, events) = collect(&mut p, b"a\x1b[Ab", 0);
        assert_eq!(events[0].payload, EventPayload::Text('a'));
        assert_eq!(events[1].payload, EventPayload::Key { code: KeyCode::Up, mods: Modifiers::NONE, action: KeyAction::Press });
        assert_eq!(events[2].payload, EventPayload::Text('b'));
    }

    #[test]
    fn full_mode_always_consumes_the_entire_buffer() {
        let mut p = InputParser::new();
        let buf = b"hello\x1b[<0;1;1Mworld\x1bOQ";
        let (consumed, _) = collect(&mut p, buf, 0);
        assert_eq!(consumed, buf.len());
    }
}
