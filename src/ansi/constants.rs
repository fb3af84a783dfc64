// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw byte-slice constants for the VT/ANSI output alphabet (§6 "VT/ANSI
//! output alphabet"). Kept as `&[u8]` rather than `&str` so callers never
//! pay a UTF-8 validity check for bytes that are ASCII by construction.

pub const ESC: u8 = 0x1B;
pub const CSI: &[u8] = b"\x1b[";
pub const OSC: &[u8] = b"\x1b]";
pub const DCS: &[u8] = b"\x1bP";
pub const APC: &[u8] = b"\x1b_";
pub const ST: &[u8] = b"\x1b\\";
pub const BEL: u8 = 0x07;

pub const SGR_RESET: &[u8] = b"\x1b[0m";
pub const SGR_BOLD: &[u8] = b"1";
pub const SGR_DIM: &[u8] = b"2";
pub const SGR_ITALIC: &[u8] = b"3";
pub const SGR_UNDERLINE: &[u8] = b"4";
pub const SGR_BLINK: &[u8] = b"5";
pub const SGR_REVERSE: &[u8] = b"7";
pub const SGR_HIDDEN: &[u8] = b"8";
pub const SGR_STRIKETHROUGH: &[u8] = b"9";
pub const SGR_OVERLINE: &[u8] = b"53";
pub const SGR_FG_RGB: &[u8] = b"38;2";
pub const SGR_BG_RGB: &[u8] = b"48;2";
pub const SGR_UNDERLINE_COLOR_RGB: &[u8] = b"58;2";

pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// DECSCUSR shapes (`CSI Ps SP q`).
pub const CURSOR_SHAPE_BLOCK_BLINK: u8 = 1;
pub const CURSOR_SHAPE_BLOCK_STEADY: u8 = 2;
pub const CURSOR_SHAPE_UNDERLINE_BLINK: u8 = 3;
pub const CURSOR_SHAPE_UNDERLINE_STEADY: u8 = 4;
pub const CURSOR_SHAPE_BAR_BLINK: u8 = 5;
pub const CURSOR_SHAPE_BAR_STEADY: u8 = 6;

pub const SYNC_UPDATE_BEGIN: &[u8] = b"\x1b[?2026h";
pub const SYNC_UPDATE_END: &[u8] = b"\x1b[?2026l";

pub const ERASE_DISPLAY_ALL: &[u8] = b"\x1b[2J";
pub const ERASE_LINE_ALL: &[u8] = b"\x1b[2K";

/// Capability probe queries (§6 "Probe queries emitted"), back-to-back,
/// in this order.
pub const PROBE_XTVERSION: &[u8] = b"\x1b[>0q";
pub const PROBE_DA1: &[u8] = b"\x1b[c";
pub const PROBE_DA2: &[u8] = b"\x1b[>c";
pub const PROBE_DECRQM_SYNC_UPDATE: &[u8] = b"\x1b[?2026$p";
pub const PROBE_DECRQM_GRAPHEME_CLUSTERING: &[u8] = b"\x1b[?2027$p";
pub const PROBE_DECRQM_PIXEL_MOUSE: &[u8] = b"\x1b[?1016$p";
pub const PROBE_DECRQM_BRACKETED_PASTE: &[u8] = b"\x1b[?2004$p";
pub const PROBE_WINDOW_TEXT_AREA_PIXELS: &[u8] = b"\x1b[16t";
pub const PROBE_WINDOW_TEXT_AREA_CHARS: &[u8] = b"\x1b[14t";

pub const BRACKETED_PASTE_ENABLE: &[u8] = b"\x1b[?2004h";
pub const BRACKETED_PASTE_DISABLE: &[u8] = b"\x1b[?2004l";
pub const MOUSE_TRACKING_SGR_ENABLE: &[u8] = b"\x1b[?1000h\x1b[?1006h";
pub const MOUSE_TRACKING_SGR_DISABLE: &[u8] = b"\x1b[?1000l\x1b[?1006l";

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const CRC32_POLY: u32 = 0xEDB8_8320;
