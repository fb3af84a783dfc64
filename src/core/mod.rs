// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The rendering and I/O core (§2 "System overview"): bounded utilities,
//! UTF-8/width policy, the cell framebuffer and painter, the drawlist v1
//! codec, sub-cell blitters, the damage tracker, the diff renderer,
//! terminal capability detection, the input byte parser, the event
//! queue/packer, and the image protocol encoders.

pub mod bounded;
pub mod capability;
pub mod cell;
pub mod damage;
pub mod diff;
pub mod drawlist;
pub mod events;
pub mod image;
pub mod input;
pub mod subcell;
pub mod text;

pub use damage::DamageTracker;
