// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A bump allocator with a hard cap and a fixed high-watermark.
//!
//! Two lifetimes use this: a per-frame arena that is reset exactly once per
//! `present` call, and a persistent arena that lives as long as the engine
//! and is never reset while in use (image cache blob storage). Both share
//! the same bump-and-reset discipline; which lifetime applies is a matter of
//! when the caller chooses to call [`Arena::reset`].

use crate::error::{VtError, VtResult};

/// A flat byte arena. Allocation is a bump of `high_water`; nothing is ever
/// freed individually, only reset as a whole.
#[derive(Debug)]
pub struct Arena {
    storage: Vec<u8>,
    high_water: usize,
    cap: usize,
}

impl Arena {
    /// Creates an arena with storage pre-sized to `cap` bytes. No partial
    /// effects: if the allocation fails the process aborts the same way any
    /// other infallible `Vec` allocation would (the crate doesn't attempt to
    /// recover from global allocator failure, consistent with `Oom` being
    /// reserved for *this* arena's bounded capacity being exhausted, not the
    /// system allocator failing outright).
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self { storage: vec![0_u8; cap], high_water: 0, cap }
    }

    #[must_use]
    pub fn capacity(&self) -> usize { self.cap }

    #[must_use]
    pub fn used(&self) -> usize { self.high_water }

    #[must_use]
    pub fn remaining(&self) -> usize { self.cap - self.high_water }

    /// Bump-allocates `len` bytes and returns a mutable view into them,
    /// zero-initialized. Returns `Oom` if the arena's high watermark would
    /// exceed its capacity; the arena is left unchanged on failure.
    pub fn alloc(&mut self, len: usize) -> VtResult<&mut [u8]> {
        let end = self
            .high_water
            .checked_add(len)
            .ok_or(VtError::oom("arena allocation size overflow"))?;
        if end > self.cap {
            return Err(VtError::oom("arena capacity exhausted"));
        }
        let start = self.high_water;
        self.high_water = end;
        for b in &mut self.storage[start..end] {
            *b = 0;
        }
        Ok(&mut self.storage[start..end])
    }

    /// Copies `bytes` into the arena and returns the byte-range (as a
    /// `(start, len)` offset pair rather than a pointer, per the "bounded
    /// buffers carried as pointer + capacity" re-architecture guidance).
    pub fn alloc_copy(&mut self, bytes: &[u8]) -> VtResult<(usize, usize)> {
        let start = self.high_water;
        let dst = self.alloc(bytes.len())?;
        dst.copy_from_slice(bytes);
        Ok((start, bytes.len()))
    }

    #[must_use]
    pub fn slice(&self, start: usize, len: usize) -> &[u8] { &self.storage[start..start + len] }

    /// Resets the high watermark to zero. Must be called exactly once per
    /// present for the per-frame arena; the persistent arena must never be
    /// reset while any of its offsets are still in use by the caller.
    pub fn reset(&mut self) { self.high_water = 0; }
}
