// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The cell model: [`framebuffer::Cell`], [`framebuffer::Framebuffer`],
//! [`style::Style`], and the [`painter::Painter`] that draws into a
//! framebuffer through a bounded clip stack (§3, §4.1).

pub mod framebuffer;
pub mod painter;
pub mod style;

pub use framebuffer::{Cell, Framebuffer, GraphemeBytes, Rect};
pub use painter::{MAX_CLIP_DEPTH, Painter};
pub use style::{AttrFlags, RgbColor, Style, UnderlineShape};
