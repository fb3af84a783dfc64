// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Black-box tests that exercise a full pipeline across module
//! boundaries (drawlist -> framebuffer -> diff, and probe -> capability
//! profile), rather than one module in isolation.

use vtcore::core::capability::probe::layer_profile;
use vtcore::core::capability::profile::{CapabilityFlags, TerminalCapabilities, TerminalId};
use vtcore::core::cell::{Framebuffer, RgbColor, Style};
use vtcore::core::damage::DamageTracker;
use vtcore::core::diff::render::render_diff;
use vtcore::core::diff::{DesiredCursor, DiffLimits, TerminalState, TerminalStateValidity};
use vtcore::core::drawlist::execute::execute;
use vtcore::core::drawlist::validate::{Limits, validate};
use vtcore::core::drawlist::wire::{HEADER_SIZE, Header, MAGIC, VERSION};
use vtcore::core::text::width::EmojiWidthPolicy;

fn rect_payload(x0: i32, y0: i32, w: i32, h: i32) -> Vec<u8> {
    let mut v = Vec::new();
    for field in [x0, y0, w, h] {
        v.extend_from_slice(&field.to_le_bytes());
    }
    v
}

fn cmd_header(opcode: u8, size: u32) -> Vec<u8> {
    let mut v = vec![opcode, 0, 0, 0];
    v.extend_from_slice(&size.to_le_bytes());
    v
}

/// Builds a CLEAR + FILL_RECT(0,0,4,1) drawlist over a fresh 4x1 grid.
fn clear_then_fill_drawlist(fill_payload: &[u8]) -> Vec<u8> {
    let mut cmds = Vec::new();
    cmds.extend_from_slice(&cmd_header(1, 0)); // CLEAR
    cmds.extend_from_slice(&cmd_header(2, fill_payload.len() as u32)); // FILL_RECT
    cmds.extend_from_slice(fill_payload);

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
    buf
}

/// §8 scenario 1: CLEAR(black) + FILL_RECT(0,0,4,1,white) on a fresh 4x1
/// framebuffer, diffed against a screen-invalid previous state, emits a
/// display clear, a move to (0,0), one SGR transition, and four spaces.
#[test]
fn clear_then_fill_emits_minimal_diff_bytes() {
    let fill_payload = rect_payload(0, 0, 4, 1);
    let drawlist_bytes = clear_then_fill_drawlist(&fill_payload);
    let validated = validate(&drawlist_bytes, Limits::default()).unwrap();

    let style = Style::new(RgbColor::BLACK, RgbColor::WHITE);
    let prev = Framebuffer::new(4, 1);
    let mut next = Framebuffer::new(4, 1);
    execute(&validated, &mut next, style, EmojiWidthPolicy::Narrow).unwrap();

    let mut damage: DamageTracker<4> = DamageTracker::new(4, 1);
    damage.begin_frame(4, 1);
    damage.mark_full_frame();

    let initial = TerminalState::default(); // screen validity bit unset -> invalid.
    let desired = DesiredCursor { col: 0, row: 0, visible: true, shape: vtcore::ansi::constants::CURSOR_SHAPE_BLOCK_BLINK };
    let limits = DiffLimits { max_output_bytes: 1 << 16, sweep_threshold_rows: 8 };

    let outcome =
        render_diff(&prev, &next, &TerminalCapabilities::default(), &initial, desired, &limits, &damage, None, false).unwrap();
    let rendered = String::from_utf8(outcome.bytes).unwrap();

    assert!(rendered.starts_with("\x1b[2J"), "expected a leading display clear, got {rendered:?}");
    assert!(rendered.contains("\x1b[1;1H"), "expected a move to (0,0): {rendered:?}");
    assert!(rendered.contains("48;2;255;255;255"), "expected a white-bg SGR transition: {rendered:?}");
    assert_eq!(rendered.matches(' ').count(), 4, "expected exactly four space glyphs: {rendered:?}");
    assert_eq!(outcome.stats.dirty_rows, 1);
}

/// §8 scenario 7: a probe response interleaving XTVERSION, DA1 (sixel),
/// a DECRQM sync-update confirmation, and a cell-pixel window report
/// resolves to a Kitty profile with sixel and sync-update set and 8x16
/// cell pixel metrics.
#[test]
fn probe_response_resolves_to_kitty_profile_with_expected_capabilities() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"\x1bP>|kitty(0.26.0)\x1b\\");
    bytes.extend_from_slice(b"\x1b[?62;4c");
    bytes.extend_from_slice(b"\x1b[?2026;1$y");
    bytes.extend_from_slice(b"\x1b[6;16;8t");

    let (profile, passthrough) = layer_profile(TerminalCapabilities::default(), &bytes, TerminalId::Unknown);

    assert_eq!(profile.terminal_id, TerminalId::Kitty);
    assert!(profile.has(CapabilityFlags::SIXEL));
    assert!(profile.has(CapabilityFlags::SYNC_UPDATE));
    assert_eq!(profile.metrics.cell_width_px, Some(8));
    assert_eq!(profile.metrics.cell_height_px, Some(16));
    assert!(passthrough.is_empty());
}
