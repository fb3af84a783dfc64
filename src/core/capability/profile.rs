// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The terminal capability profile (§3 "Terminal capability profile") and
//! its force/suppress override projection.

/// A coarse terminal identity, used to key the known-terminal defaults
/// table (§4.6 layering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TerminalId {
    #[default]
    Unknown,
    Xterm,
    Kitty,
    ITerm2,
    Wezterm,
    Alacritty,
    GnomeVte,
    Screen,
    Tmux,
}

/// Packed capability bits. A bitset rather than individual `bool` fields
/// so the whole profile stays small and `Copy`, and so the override
/// projection can be a single bitwise operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CapabilityFlags(u32);

macro_rules! capability_bits {
    ($($name:ident = $bit:expr),* $(,)?) => {
        impl CapabilityFlags {
            $(pub const $name: Self = Self(1 << $bit);)*
        }
    };
}

capability_bits! {
    SIXEL = 0,
    KITTY_GRAPHICS = 1,
    ITERM2_IMAGES = 2,
    UNDERLINE_STYLES = 3,
    COLORED_UNDERLINES = 4,
    HYPERLINKS = 5,
    GRAPHEME_CLUSTERS = 6,
    OVERLINE = 7,
    PIXEL_MOUSE = 8,
    KITTY_KEYBOARD = 9,
    SYNC_UPDATE = 10,
    MOUSE = 11,
    BRACKETED_PASTE = 12,
    FOCUS_EVENTS = 13,
    OSC52 = 14,
    SCROLL_REGION = 15,
    CURSOR_SHAPE = 16,
    OUTPUT_WAIT_WRITABLE = 17,
}

impl CapabilityFlags {
    #[must_use]
    pub const fn empty() -> Self { Self(0) }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }

    #[must_use]
    pub const fn remove(self, other: Self) -> Self { Self(self.0 & !other.0) }

    #[must_use]
    pub const fn set(self, bit: Self, value: bool) -> Self {
        if value { self.union(bit) } else { self.remove(bit) }
    }

    #[must_use]
    pub const fn bits(self) -> u32 { self.0 }
}

impl std::ops::BitOr for CapabilityFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

/// Optional pixel metrics reported by window reports (§4.6).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PixelMetrics {
    pub cell_width_px: Option<u32>,
    pub cell_height_px: Option<u32>,
    pub screen_width_px: Option<u32>,
    pub screen_height_px: Option<u32>,
}

/// The fully layered capability profile the diff renderer and blitter
/// selector consume.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TerminalCapabilities {
    pub terminal_id: TerminalId,
    pub flags: CapabilityFlags,
    pub metrics: PixelMetrics,
    /// Resolves the otherwise-unspecified AUTO tie between sextant/
    /// quadrant/halfblock and braille in favor of braille when set.
    pub prefer_braille_in_auto: bool,
}

impl TerminalCapabilities {
    #[must_use]
    pub fn has(&self, bit: CapabilityFlags) -> bool { self.flags.contains(bit) }

    /// Applies a force/suppress override pair. When a bit is set in both
    /// masks, suppress wins (§4.6 "when they overlap, suppress wins").
    #[must_use]
    pub fn with_overrides(mut self, force: CapabilityFlags, suppress: CapabilityFlags) -> Self {
        self.flags = self.flags.union(force).remove(suppress);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppress_wins_over_force_on_overlap() {
        let base = TerminalCapabilities::default();
        let result = base.with_overrides(CapabilityFlags::SIXEL, CapabilityFlags::SIXEL);
        assert!(!result.has(CapabilityFlags::SIXEL));
    }

    #[test]
    fn force_sets_a_bit_not_present_in_baseline() {
        let base = TerminalCapabilities::default();
        let result = base.with_overrides(CapabilityFlags::KITTY_GRAPHICS, CapabilityFlags::empty());
        assert!(result.has(CapabilityFlags::KITTY_GRAPHICS));
    }

    #[test]
    fn suppress_clears_a_bit_present_in_baseline() {
        let mut base = TerminalCapabilities::default();
        base.flags = CapabilityFlags::MOUSE;
        let result = base.with_overrides(CapabilityFlags::empty(), CapabilityFlags::MOUSE);
        assert!(!result.has(CapabilityFlags::MOUSE));
    }
}
