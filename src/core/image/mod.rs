// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Image protocol byte encoders: Kitty graphics (APC), Sixel (DCS), and
//! iTerm2 inline images (OSC 1337 + a minimal PNG encoder) (§4.9).
//!
//! Unlike the sub-cell blitters, these protocols hand the terminal actual
//! pixel data; the state machines and the Kitty placement cache live here
//! because they interact directly with the diff renderer's byte stream.

pub mod cache;
pub mod iterm2;
pub mod kitty;
pub mod png;
pub mod scale;
pub mod sixel;

pub use cache::{CacheSlot, KittyImageCache};
pub use scale::{ScaleMode, scale_to_rgba};

/// Which image protocol a caller selected. AUTO selection among these
/// lives one layer up (a caller/config concern); this crate only encodes
/// whichever protocol it's asked for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ImageProtocol {
    Kitty,
    Sixel,
    ITerm2,
}
