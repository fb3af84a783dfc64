// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The drawlist v1 codec: validate a little-endian tagged byte stream,
//! then execute it against a framebuffer (§4.2).

pub mod execute;
pub mod validate;
pub mod wire;

pub use execute::execute;
pub use validate::{Limits, ValidatedDrawlist, validate};
pub use wire::{Header, Opcode};
