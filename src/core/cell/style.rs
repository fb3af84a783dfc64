// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A cell's visual style: 24-bit foreground/background RGB, an attribute
//! bitset, an optional colored-underline RGB, and an optional hyperlink
//! reference index (§3 Cell).

/// 24-bit truecolor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((r, g, b): (u8, u8, u8)) -> Self { Self::new(r, g, b) }
}

/// Packed attribute bits. A `u16` rather than individual `bool` fields keeps
/// `Cell` (§3) fixed-size and `Copy`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct AttrFlags(u16);

impl AttrFlags {
    pub const BOLD: Self = Self(1 << 0);
    pub const DIM: Self = Self(1 << 1);
    pub const ITALIC: Self = Self(1 << 2);
    pub const UNDERLINE: Self = Self(1 << 3);
    pub const BLINK: Self = Self(1 << 4);
    pub const REVERSE: Self = Self(1 << 5);
    pub const HIDDEN: Self = Self(1 << 6);
    pub const STRIKETHROUGH: Self = Self(1 << 7);
    pub const OVERLINE: Self = Self(1 << 8);

    #[must_use]
    pub const fn empty() -> Self { Self(0) }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }

    #[must_use]
    pub const fn is_empty(self) -> bool { self.0 == 0 }

    #[must_use]
    pub const fn bits(self) -> u16 { self.0 }
}

impl std::ops::BitOr for AttrFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

/// Underline shape, when the capability profile advertises `underline_styles`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum UnderlineShape {
    #[default]
    Straight,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// A cell's full visual style.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Style {
    pub fg: RgbColor,
    pub bg: RgbColor,
    pub attrs: AttrFlags,
    pub underline_shape: UnderlineShape,
    /// `Some` only when `attrs` includes `UNDERLINE` and the profile
    /// advertises `colored_underlines`; otherwise the underline uses `fg`.
    pub underline_color: Option<RgbColor>,
    /// Index into the diff renderer's hyperlink-URL table, or `None`.
    pub hyperlink_ref: Option<u32>,
}

impl Style {
    #[must_use]
    pub const fn new(fg: RgbColor, bg: RgbColor) -> Self {
        Self {
            fg,
            bg,
            attrs: AttrFlags::empty(),
            underline_shape: UnderlineShape::Straight,
            underline_color: None,
            hyperlink_ref: None,
        }
    }

    #[must_use]
    pub const fn with_attrs(mut self, attrs: AttrFlags) -> Self {
        self.attrs = attrs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_flags_union_and_contains() {
        let s = AttrFlags::BOLD | AttrFlags::ITALIC;
        assert!(s.contains(AttrFlags::BOLD));
        assert!(s.contains(AttrFlags::ITALIC));
        assert!(!s.contains(AttrFlags::DIM));
    }

    #[test]
    fn default_style_is_black_on_black_no_attrs() {
        let s = Style::default();
        assert_eq!(s.fg, RgbColor::BLACK);
        assert!(s.attrs.is_empty());
    }
}
