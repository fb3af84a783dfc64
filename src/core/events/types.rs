// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The event tagged union (§3 Event) and its fixed-shape wire companions:
//! key codes, modifier/button bitsets, and mouse event kinds.

/// A single logical key, independent of the byte sequence that produced
/// it. `Char` carries the decoded scalar for printable keys; the rest are
/// non-printable named keys the input parser recognizes (§4.7).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
}

/// Packed modifier bits, shared by key and mouse events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const ALT: Self = Self(1 << 1);
    pub const CTRL: Self = Self(1 << 2);
    pub const SUPER: Self = Self(1 << 3);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn union(self, other: Self) -> Self { Self(self.0 | other.0) }

    #[must_use]
    pub const fn bits(self) -> u8 { self.0 }

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self { Self(bits) }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { self.union(rhs) }
}

/// Whether a key event is a fresh press, an OS-generated repeat, or a
/// release. Most terminal protocols only ever report `Press`; the
/// Kitty keyboard protocol is the one that can report all three.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

/// The kind of pointer event (§3 Event MOUSE).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MouseKind {
    Move,
    Down,
    Up,
    Drag,
    Wheel,
}

/// Packed mouse-button bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MouseButtons(u8);

impl MouseButtons {
    pub const NONE: Self = Self(0);
    pub const LEFT: Self = Self(1 << 0);
    pub const MIDDLE: Self = Self(1 << 1);
    pub const RIGHT: Self = Self(1 << 2);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }

    #[must_use]
    pub const fn bits(self) -> u8 { self.0 }

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self { Self(bits) }
}

/// The fixed-shape payload of one event. `User` never carries its bytes
/// inline — only a `tag` plus an `(offset, len)` reference into the
/// queue's separate byte ring (§3 Event queue), which is what keeps this
/// enum `Copy` and a fixed size regardless of payload length.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EventPayload {
    Key { code: KeyCode, mods: Modifiers, action: KeyAction },
    Text(char),
    Mouse { x: u16, y: u16, kind: MouseKind, buttons: MouseButtons, mods: Modifiers, wheel_x: i8, wheel_y: i8 },
    Resize { cols: u16, rows: u16 },
    Tick { dt_ms: u32 },
    User { tag: u32, offset: u32, len: u32 },
}

/// One queued event: its payload plus the millisecond timestamp it was
/// produced at.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Event {
    pub payload: EventPayload,
    pub time_ms: u64,
}

impl Event {
    #[must_use]
    pub const fn new(payload: EventPayload, time_ms: u64) -> Self { Self { payload, time_ms } }
}
