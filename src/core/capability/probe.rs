// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Builds the fixed capability-probe query batch and layers parsed
//! responses onto a baseline profile (§4.6).
//!
//! Actually issuing the query and reading the terminal's response is
//! platform I/O and lives outside this crate; this module only produces
//! the bytes to write and interprets whatever bytes come back.

use super::parse::{ProbeResponse, ScanResult, scan};
use super::profile::{CapabilityFlags, PixelMetrics, TerminalCapabilities, TerminalId};

/// Overall wall-clock budget for the probe (§4.6: "bounded, e.g. <= 500ms
/// overall"). Enforced by the platform I/O loop that drives this module,
/// not by any code here.
pub const TOTAL_PROBE_BUDGET_MS: u64 = 500;

/// Per-read slice budget (§4.6: "per-read slices <= 100ms").
pub const PER_READ_SLICE_MS: u64 = 100;

/// The fixed bytes to write at the start of a probe: XTVERSION, DA1, DA2,
/// DECRQM for synchronized-update/grapheme-clustering/pixel-mouse/
/// bracketed-paste, and two window-size reports.
#[must_use]
pub fn build_query_batch() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"\x1b[>q"); // XTVERSION request (wrapped DCS response)
    out.extend_from_slice(b"\x1b[c"); // DA1
    out.extend_from_slice(b"\x1b[>c"); // DA2
    for mode in [2026u32, 2027, 1016, 2004] {
        out.extend_from_slice(format!("\x1b[?{mode}$p").as_bytes());
    }
    out.extend_from_slice(b"\x1b[14t"); // window report, code 4 (text area size in pixels)
    out.extend_from_slice(b"\x1b[16t"); // window report, code 6 (cell size in pixels)
    out
}

/// Known-terminal capability defaults, keyed by the DA2 model number
/// (§4.6 "known-terminal defaults (a static table keyed by the detected
/// terminal id)"). Applied after the identifier is resolved but before
/// per-probe observations, so a DECRQM or DA1 bit always overrides the
/// table.
fn known_terminal_defaults(id: TerminalId) -> CapabilityFlags {
    use CapabilityFlags as F;
    match id {
        TerminalId::Kitty => {
            F::KITTY_GRAPHICS
                | F::KITTY_KEYBOARD
                | F::UNDERLINE_STYLES
                | F::COLORED_UNDERLINES
                | F::HYPERLINKS
                | F::SYNC_UPDATE
                | F::MOUSE
                | F::PIXEL_MOUSE
                | F::BRACKETED_PASTE
                | F::FOCUS_EVENTS
                | F::OSC52
        }
        TerminalId::ITerm2 => {
            F::ITERM2_IMAGES | F::HYPERLINKS | F::MOUSE | F::BRACKETED_PASTE | F::FOCUS_EVENTS | F::OSC52
        }
        TerminalId::Wezterm => {
            F::SIXEL
                | F::UNDERLINE_STYLES
                | F::COLORED_UNDERLINES
                | F::HYPERLINKS
                | F::SYNC_UPDATE
                | F::MOUSE
                | F::BRACKETED_PASTE
                | F::FOCUS_EVENTS
                | F::OSC52
        }
        TerminalId::Alacritty => F::MOUSE | F::BRACKETED_PASTE | F::FOCUS_EVENTS | F::OSC52,
        TerminalId::Xterm | TerminalId::GnomeVte => F::MOUSE | F::BRACKETED_PASTE | F::OSC52,
        TerminalId::Screen | TerminalId::Tmux | TerminalId::Unknown => F::empty(),
    }
}

fn identify(model: Option<u32>, xtversion: Option<&str>) -> TerminalId {
    if let Some(v) = xtversion {
        let lower = v.to_ascii_lowercase();
        if lower.contains("kitty") {
            return TerminalId::Kitty;
        }
        if lower.contains("wezterm") {
            return TerminalId::Wezterm;
        }
        if lower.contains("iterm") {
            return TerminalId::ITerm2;
        }
        if lower.contains("alacritty") {
            return TerminalId::Alacritty;
        }
        if lower.contains("xterm") {
            return TerminalId::Xterm;
        }
    }
    match model {
        Some(1) => TerminalId::Xterm,
        Some(_) => TerminalId::Unknown,
        None => TerminalId::Unknown,
    }
}

/// Environment-guessed terminal id, used when the probe times out or the
/// platform does not support it (§4.6). `term_program` and `term` mirror
/// the `TERM_PROGRAM`/`TERM` environment variables; reading the actual
/// environment is the caller's job (external collaborator).
#[must_use]
pub fn guess_from_environment(term_program: Option<&str>, term: Option<&str>) -> TerminalId {
    if let Some(tp) = term_program {
        let lower = tp.to_ascii_lowercase();
        if lower.contains("iterm") {
            return TerminalId::ITerm2;
        }
        if lower.contains("wezterm") {
            return TerminalId::Wezterm;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("kitty") {
            return TerminalId::Kitty;
        }
        if lower.contains("screen") {
            return TerminalId::Screen;
        }
        if lower.contains("tmux") {
            return TerminalId::Tmux;
        }
        if lower.contains("xterm") {
            return TerminalId::Xterm;
        }
    }
    TerminalId::Unknown
}

/// Layers `scan(bytes)`'s parsed responses onto a baseline profile,
/// returning the final profile and the preserved passthrough bytes.
///
/// Layering order: baseline -> known-terminal defaults -> per-probe
/// observations. DA1 is authoritative for sixel when its params include
/// capability `4`; DECRQM bits set their respective capability only when
/// observed set (value `1` or `3`, the DEC private-mode "set" values);
/// window reports populate pixel metrics.
#[must_use]
pub fn layer_profile(baseline: TerminalCapabilities, bytes: &[u8], fallback_id: TerminalId) -> (TerminalCapabilities, Vec<u8>) {
    let ScanResult { responses, passthrough, .. } = scan(bytes);

    let mut model = None;
    let mut xtversion = None;
    for r in &responses {
        match r {
            ProbeResponse::Da2 { model: m, .. } => model = Some(*m),
            ProbeResponse::XtVersion(v) => xtversion = Some(v.as_str()),
            _ => {}
        }
    }
    let terminal_id = {
        let id = identify(model, xtversion);
        if id == TerminalId::Unknown { fallback_id } else { id }
    };

    let mut profile = baseline;
    profile.terminal_id = terminal_id;
    profile.flags = profile.flags.union(known_terminal_defaults(terminal_id));

    let mut metrics = profile.metrics;
    for r in &responses {
        match r {
            ProbeResponse::Da1 { params } => {
                profile.flags = profile.flags.set(CapabilityFlags::SIXEL, params.contains(&4));
            }
            ProbeResponse::DecRqm { mode, value } => {
                let supported = *value == 1 || *value == 3;
                let bit = match mode {
                    2026 => Some(CapabilityFlags::SYNC_UPDATE),
                    2027 => Some(CapabilityFlags::GRAPHEME_CLUSTERS),
                    1016 => Some(CapabilityFlags::PIXEL_MOUSE),
                    2004 => Some(CapabilityFlags::BRACKETED_PASTE),
                    _ => None,
                };
                if let Some(bit) = bit {
                    profile.flags = profile.flags.set(bit, supported);
                }
            }
            ProbeResponse::WindowReport { code, height, width } => match code {
                4 => {
                    metrics.screen_width_px = Some(*width);
                    metrics.screen_height_px = Some(*height);
                }
                6 => {
                    metrics.cell_width_px = Some(*width);
                    metrics.cell_height_px = Some(*height);
                }
                _ => {}
            },
            ProbeResponse::XtVersion(_) | ProbeResponse::Da2 { .. } => {}
        }
    }
    profile.metrics = metrics;

    tracing::debug!(
        terminal_id = ?profile.terminal_id,
        flags = ?profile.flags,
        responses = responses.len(),
        passthrough_bytes = passthrough.len(),
        "capability probe layered"
    );

    (profile, passthrough)
}
