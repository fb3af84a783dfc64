// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The Kitty image placement cache: up to 64 slots, LRU-evicted, tracking
//! a terminal-assigned id, the caller's logical image id, content hash,
//! pixel dimensions, and a per-frame placed bit (§3 "Image frame", §4.9,
//! §8 "Kitty cache LRU").
//!
//! Sixel and iTerm2 need no persistent state across frames (§4.9), so
//! only Kitty gets a cache. Modeled as a fixed-size array rather than a
//! hash-map-backed LRU so it never allocates per frame, matching
//! [`crate::core::damage::DamageTracker`]'s
//! fixed-array discipline.

/// Default slot count (§3 "up to 64 LRU cache slots").
pub const DEFAULT_SLOTS: usize = 64;

/// Derives the `content_hash` half of a cache key from raw RGBA bytes
/// (SHA-256, truncated to its first 8 bytes). Callers that already track
/// their own cheap content fingerprint may use any `u64` they like instead
/// — this is just the crate's own recommended derivation when the caller
/// has nothing cheaper on hand.
#[must_use]
pub fn content_hash(rgba: &[u8]) -> u64 {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(rgba);
    u64::from_le_bytes(digest[..8].try_into().expect("SHA-256 digest is at least 8 bytes"))
}

/// One cached placement: the caller's logical image identity
/// (`image_id` + content hash + pixel dimensions, §3 "Image frame") mapped
/// to the id the terminal actually knows it by.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CacheSlot {
    pub kitty_id: u32,
    pub image_id: u32,
    pub content_hash: u64,
    pub px_w: u32,
    pub px_h: u32,
    last_used: u64,
    placed_this_frame: bool,
}

/// A fixed-capacity LRU cache of Kitty image placements.
#[derive(Debug)]
pub struct KittyImageCache<const N: usize = DEFAULT_SLOTS> {
    slots: [Option<CacheSlot>; N],
    tick: u64,
    next_kitty_id: u32,
}

impl<const N: usize> Default for KittyImageCache<N> {
    fn default() -> Self { Self::new() }
}

impl<const N: usize> KittyImageCache<N> {
    #[must_use]
    pub fn new() -> Self { Self { slots: [None; N], tick: 0, next_kitty_id: 1 } }

    /// Clears every slot's per-frame placed bit. Call once per present.
    pub fn begin_frame(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.placed_this_frame = false;
        }
    }

    /// Looks up a slot by `(image_id, content_hash, px_w, px_h)`, bumping
    /// its LRU tick and marking it placed this frame on a hit.
    pub fn find(&mut self, image_id: u32, content_hash: u64, px_w: u32, px_h: u32) -> Option<u32> {
        self.tick += 1;
        let tick = self.tick;
        for slot in self.slots.iter_mut().flatten() {
            if slot.image_id == image_id && slot.content_hash == content_hash && slot.px_w == px_w && slot.px_h == px_h
            {
                slot.last_used = tick;
                slot.placed_this_frame = true;
                return Some(slot.kitty_id);
            }
        }
        None
    }

    /// Assigns a fresh Kitty id for `(image_id, content_hash, px_w, px_h)`,
    /// evicting the least-recently-used occupied slot if every slot is
    /// full. Returns `(new_kitty_id, evicted_kitty_id)`; the caller must
    /// emit a delete for `evicted_kitty_id` before reusing its slot (§4.9
    /// "on collision or eviction the slot's previous Kitty id is deleted
    /// before reassignment").
    pub fn insert(&mut self, image_id: u32, content_hash: u64, px_w: u32, px_h: u32) -> (u32, Option<u32>) {
        self.tick += 1;
        let tick = self.tick;
        let kitty_id = self.next_kitty_id;
        self.next_kitty_id = self.next_kitty_id.wrapping_add(1).max(1);

        let free = self.slots.iter().position(Option::is_none);
        let (idx, evicted) = match free {
            Some(idx) => (idx, None),
            None => {
                let lru_idx = self
                    .slots
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, s)| s.map(|s| s.last_used).unwrap_or(0))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let evicted = self.slots[lru_idx].map(|s| s.kitty_id);
                (lru_idx, evicted)
            }
        };
        if let Some(evicted_id) = evicted {
            tracing::debug!(slot = idx, evicted_kitty_id = evicted_id, new_kitty_id = kitty_id, "kitty cache slot evicted");
        }
        self.slots[idx] = Some(CacheSlot {
            kitty_id,
            image_id,
            content_hash,
            px_w,
            px_h,
            last_used: tick,
            placed_this_frame: true,
        });
        (kitty_id, evicted)
    }

    /// Slots that were not placed this frame; the caller deletes each of
    /// these via [`crate::core::image::kitty::delete`] and then frees the
    /// slot (§4.9 "slots not placed this frame are released via delete").
    pub fn unplaced(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().flatten().filter(|s| !s.placed_this_frame).map(|s| s.kitty_id)
    }

    /// Frees every slot whose Kitty id is `kitty_id`. Called after the
    /// caller has emitted the corresponding delete byte sequence.
    pub fn release(&mut self, kitty_id: u32) {
        for slot in &mut self.slots {
            if slot.is_some_and(|s| s.kitty_id == kitty_id) {
                *slot = None;
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.slots.iter().flatten().count() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[must_use]
    pub fn capacity(&self) -> usize { N }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_find_hits() {
        let mut cache: KittyImageCache<4> = KittyImageCache::new();
        let (id, evicted) = cache.insert(1, 42, 10, 10);
        assert!(evicted.is_none());
        cache.begin_frame();
        assert_eq!(cache.find(1, 42, 10, 10), Some(id));
    }

    #[test]
    fn eviction_picks_least_recently_used() {
        let mut cache: KittyImageCache<2> = KittyImageCache::new();
        let (a, _) = cache.insert(1, 1, 1, 1);
        let (_b, _) = cache.insert(2, 1, 1, 1);
        // Touch `a` so it's more recently used than `b`.
        cache.begin_frame();
        cache.find(1, 1, 1, 1);
        // Inserting a third distinct image must evict `b`, not `a`.
        let (_c, evicted) = cache.insert(3, 1, 1, 1);
        assert_ne!(evicted, Some(a));
    }

    #[test]
    fn unplaced_after_a_frame_with_no_finds_lists_everything() {
        let mut cache: KittyImageCache<4> = KittyImageCache::new();
        let (id, _) = cache.insert(1, 1, 1, 1);
        cache.begin_frame();
        let unplaced: Vec<_> = cache.unplaced().collect();
        assert_eq!(unplaced, vec![id]);
    }

    #[test]
    fn k_plus_one_distinct_images_leave_exactly_slots_resident() {
        let mut cache: KittyImageCache<4> = KittyImageCache::new();
        for i in 0..6u32 {
            cache.begin_frame();
            cache.insert(i, 1, 1, 1);
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn release_frees_the_slot() {
        let mut cache: KittyImageCache<4> = KittyImageCache::new();
        let (id, _) = cache.insert(1, 1, 1, 1);
        cache.release(id);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn distinct_image_ids_with_matching_content_hash_and_dims_do_not_collide() {
        // Same content hash and pixel dimensions, different logical image
        // identity: §3 "Image frame" keys the cache on the full 4-tuple, so
        // these must occupy separate slots and not be found under the
        // wrong `image_id`.
        let mut cache: KittyImageCache<4> = KittyImageCache::new();
        let (id_a, _) = cache.insert(1, 99, 4, 4);
        let (id_b, _) = cache.insert(2, 99, 4, 4);
        assert_ne!(id_a, id_b);
        cache.begin_frame();
        assert_eq!(cache.find(1, 99, 4, 4), Some(id_a));
        assert_eq!(cache.find(2, 99, 4, 4), Some(id_b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn content_hash_is_deterministic_and_sensitive_to_input() {
        let a = content_hash(&[1, 2, 3, 4]);
        let b = content_hash(&[1, 2, 3, 4]);
        let c = content_hash(&[1, 2, 3, 5]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
