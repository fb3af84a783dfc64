// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! 64-bit row fingerprinting (§4.5 step 2), so whole rows can be
//! compared with a single integer equality check instead of a per-cell
//! walk. Built on `rustc-hash`'s FxHasher, a fast non-cryptographic hash
//! well suited to cache-key-style lookups like this one.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::core::cell::framebuffer::Framebuffer;

/// A row's fingerprint. Two rows with equal fingerprints are treated as
/// equal by the diff renderer's skip check; a collision would only ever
/// cause a row to be incorrectly skipped, so this is a best-effort
/// optimization rather than a correctness-load-bearing hash.
pub type RowFingerprint = u64;

/// Hashes row `y` of `fb` cell-by-cell: grapheme bytes, width, and every
/// style field, so that a style-only change (e.g. a color swap with the
/// same text) still changes the fingerprint.
#[must_use]
pub fn hash_row(fb: &Framebuffer, y: u16) -> RowFingerprint {
    let mut hasher = FxHasher::default();
    for x in 0..fb.cols() {
        let cell = fb.get(x, y);
        cell.grapheme.as_str().hash(&mut hasher);
        cell.width.hash(&mut hasher);
        cell.style.fg.r.hash(&mut hasher);
        cell.style.fg.g.hash(&mut hasher);
        cell.style.fg.b.hash(&mut hasher);
        cell.style.bg.r.hash(&mut hasher);
        cell.style.bg.g.hash(&mut hasher);
        cell.style.bg.b.hash(&mut hasher);
        cell.style.attrs.bits().hash(&mut hasher);
        cell.style.underline_shape.hash(&mut hasher);
        cell.style.underline_color.hash(&mut hasher);
        cell.style.hyperlink_ref.hash(&mut hasher);
    }
    hasher.finish()
}

/// A bounded per-row hash cache. `valid` gates whether `prev` can be
/// trusted without recomputation (§4.5 "using cache if
/// `prev_hashes_valid`"); on a dimension mismatch the cache is simply
/// resized and treated as invalid.
#[derive(Debug)]
pub struct RowHashCache {
    hashes: Vec<RowFingerprint>,
    valid: bool,
}

impl RowHashCache {
    #[must_use]
    pub fn new(rows: u16) -> Self { Self { hashes: vec![0; usize::from(rows)], valid: false } }

    #[must_use]
    pub fn is_valid(&self) -> bool { self.valid }

    #[must_use]
    pub fn rows(&self) -> u16 { u16::try_from(self.hashes.len()).unwrap_or(u16::MAX) }

    pub fn invalidate(&mut self) { self.valid = false; }

    /// Recomputes every row's hash from `fb` and marks the cache valid.
    /// Resizes first if `fb`'s row count no longer matches.
    pub fn refresh(&mut self, fb: &Framebuffer) {
        if self.hashes.len() != usize::from(fb.rows()) {
            self.hashes = vec![0; usize::from(fb.rows())];
        }
        for y in 0..fb.rows() {
            self.hashes[usize::from(y)] = hash_row(fb, y);
        }
        self.valid = true;
    }

    #[must_use]
    pub fn get(&self, y: u16) -> Option<RowFingerprint> {
        if self.valid { self.hashes.get(usize::from(y)).copied() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::style::{RgbColor, Style};

    #[test]
    fn identical_rows_hash_equal() {
        let a = Framebuffer::new(4, 1);
        let b = Framebuffer::new(4, 1);
        assert_eq!(hash_row(&a, 0), hash_row(&b, 0));
    }

    #[test]
    fn style_only_change_changes_the_hash() {
        let mut a = Framebuffer::new(4, 1);
        let mut b = Framebuffer::new(4, 1);
        let mut cell = b.get(0, 0).clone();
        cell.style = Style::new(RgbColor::WHITE, RgbColor::BLACK);
        b.set(0, 0, cell);
        assert_ne!(hash_row(&a, 0), hash_row(&b, 0));
        let _ = &mut a;
    }

    #[test]
    fn cache_starts_invalid_and_becomes_valid_after_refresh() {
        let fb = Framebuffer::new(3, 2);
        let mut cache = RowHashCache::new(2);
        assert!(!cache.is_valid());
        assert_eq!(cache.get(0), None);
        cache.refresh(&fb);
        assert!(cache.is_valid());
        assert_eq!(cache.get(0), Some(hash_row(&fb, 0)));
    }

    #[test]
    fn refresh_resizes_on_row_count_mismatch() {
        let fb = Framebuffer::new(3, 5);
        let mut cache = RowHashCache::new(2);
        cache.refresh(&fb);
        assert_eq!(cache.rows(), 5);
    }
}
