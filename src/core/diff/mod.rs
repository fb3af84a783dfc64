// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The diff renderer (§2.7, §4.5): the largest component in the engine —
//! turns a pair of framebuffers into the smallest VT/ANSI byte stream
//! that reconciles them under a pinned terminal capability profile and
//! an assumed initial terminal state.

pub mod hash;
pub mod render;
pub mod scroll;
pub mod sweep;

pub use hash::{RowFingerprint, RowHashCache, hash_row};
pub use render::render_diff;

use crate::core::cell::style::Style;

/// Which bits of a [`TerminalState`] the caller actually trusts. A clear
/// bit means the renderer must not assume that field's value and instead
/// emit it unconditionally (or, for `SCREEN`, rebuild from a blank
/// baseline — §4.5 step 1).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TerminalStateValidity(u8);

impl TerminalStateValidity {
    pub const CURSOR_POS: Self = Self(1 << 0);
    pub const CURSOR_VISIBLE: Self = Self(1 << 1);
    pub const CURSOR_SHAPE: Self = Self(1 << 2);
    pub const STYLE: Self = Self(1 << 3);
    pub const SCREEN: Self = Self(1 << 4);

    #[must_use]
    pub const fn empty() -> Self { Self(0) }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }

    #[must_use]
    pub const fn bits(self) -> u8 { self.0 }
}

impl std::ops::BitOr for TerminalStateValidity {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

/// The renderer's model of the terminal it is about to drive (§3
/// "Terminal state").
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TerminalState {
    pub cursor_col: u16,
    pub cursor_row: u16,
    pub cursor_visible: bool,
    /// A DECSCUSR shape code (§6's `ansi::constants::CURSOR_SHAPE_*`).
    pub cursor_shape: u8,
    pub style: Style,
    pub validity: TerminalStateValidity,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            cursor_col: 0,
            cursor_row: 0,
            cursor_visible: true,
            cursor_shape: crate::ansi::constants::CURSOR_SHAPE_BLOCK_BLINK,
            style: Style::default(),
            validity: TerminalStateValidity::empty(),
        }
    }
}

impl TerminalState {
    #[must_use]
    pub fn screen_valid(&self) -> bool { self.validity.contains(TerminalStateValidity::SCREEN) }
}

/// The cursor/visibility/shape the caller wants the terminal left in
/// once painting finishes (§4.5 step 6).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DesiredCursor {
    pub col: u16,
    pub row: u16,
    pub visible: bool,
    pub shape: u8,
}

/// Hard caps and thresholds the diff renderer is bound by.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DiffLimits {
    pub max_output_bytes: usize,
    /// Row-count threshold past which the sweep path is selected over
    /// the damage path even when damage hasn't latched full-frame
    /// (§4.5 step 3).
    pub sweep_threshold_rows: u16,
}

impl Default for DiffLimits {
    fn default() -> Self { Self { max_output_bytes: 1 << 20, sweep_threshold_rows: 8 } }
}

/// Which row-selection strategy a render used.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DiffPath {
    Sweep,
    Damage,
}

/// Everything the caller might want to log or assert on after a render.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct DiffStats {
    pub dirty_rows: u32,
    pub dirty_cells: u32,
    pub damage_rects: u32,
    pub damage_cells: u32,
    pub scroll_hit: bool,
    pub collision_guard_hits: u32,
    pub bytes_emitted: u32,
}

/// The full result of a successful [`render_diff`] call.
#[derive(Clone, Debug)]
pub struct DiffOutcome {
    pub bytes: Vec<u8>,
    pub final_state: TerminalState,
    pub stats: DiffStats,
    pub path: DiffPath,
}
