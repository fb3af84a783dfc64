// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The error taxonomy for the whole crate.
//!
//! Every public entry point validates arguments first and returns one of the
//! six kinds below; no partial effects are ever committed on failure (see the
//! crate-level docs for the "no partial effects" contract).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type VtResult<T> = Result<T, VtError>;

/// The narrow, consistent error taxonomy described in the design notes.
///
/// There is intentionally no "success" variant here — `Result::Ok` already
/// carries that; widening this enum with an `Ok`-shaped variant would just
/// give every caller an extra case to match on for no semantic gain.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VtError {
    /// Null where non-null required, dimension mismatch, non-zero reserved
    /// field, out-of-range enum, clip-stack underflow, unknown opcode.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Any bound exceeded: output cap, command count, damage capacity,
    /// payload size, integer overflow in size/offset math. Always reported
    /// with fully reset outputs.
    #[error("limit exceeded: {0}")]
    Limit(&'static str),

    /// A feature not available in the active capability profile.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// A growable structure (arena, builder, queue backing) could not expand.
    #[error("out of memory: {0}")]
    Oom(&'static str),

    /// Wrapped from an external collaborator (platform I/O), surfaced
    /// without translation beyond code widening.
    #[error("platform error: {0}")]
    Platform(&'static str),
}

impl VtError {
    #[must_use]
    pub fn invalid_argument(msg: &'static str) -> Self { Self::InvalidArgument(msg) }

    #[must_use]
    pub fn limit(msg: &'static str) -> Self { Self::Limit(msg) }

    #[must_use]
    pub fn unsupported(msg: &'static str) -> Self { Self::Unsupported(msg) }

    #[must_use]
    pub fn oom(msg: &'static str) -> Self { Self::Oom(msg) }

    #[must_use]
    pub fn platform(msg: &'static str) -> Self { Self::Platform(msg) }
}
