// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The event ring queue (§3 "Event queue", §4.8): a fixed-capacity ring of
//! event records plus a separate byte ring for `USER` payloads, sharing
//! one monotonically increasing dropped-event counter.

use crate::core::bounded::ring_buffer::{RingBuffer, RingBufferStack};

use super::types::{Event, EventPayload};

/// A single-producer/single-consumer ring queue. `N` bounds the number of
/// queued event records; `USER_BYTES` bounds the byte ring backing `USER`
/// payloads.
///
/// `USER` payload bytes wrap the same way the event ring does: reading a
/// popped `USER` event's bytes promptly (before enough further `USER`
/// pushes wrap the write cursor back over them) is the consumer's
/// responsibility, matching §3's "lifetime-tied to the popping consumer".
#[derive(Debug)]
pub struct EventQueue<const N: usize, const USER_BYTES: usize> {
    records: RingBufferStack<Event, N>,
    user_ring: Box<[u8; USER_BYTES]>,
    user_write: usize,
    dropped: u64,
}

impl<const N: usize, const USER_BYTES: usize> Default for EventQueue<N, USER_BYTES> {
    fn default() -> Self { Self::new() }
}

impl<const N: usize, const USER_BYTES: usize> EventQueue<N, USER_BYTES> {
    #[must_use]
    pub fn new() -> Self {
        Self { records: RingBufferStack::new(), user_ring: Box::new([0u8; USER_BYTES]), user_write: 0, dropped: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[must_use]
    pub fn is_full(&self) -> bool { self.records.is_full() }

    /// Total events dropped since construction (or the last [`Self::clear`]).
    #[must_use]
    pub fn dropped_count(&self) -> u64 { self.dropped }

    /// Writes `payload_bytes` into the user byte ring and returns the
    /// `(offset, len)` pair to embed in a `User` event. Wraps around the
    /// ring rather than failing; a payload longer than `USER_BYTES` is
    /// truncated to fit (callers are expected to keep payloads well under
    /// the ring's capacity, per §7's 4096-byte payload limit).
    fn stage_user_bytes(&mut self, payload_bytes: &[u8]) -> (u32, u32) {
        let len = payload_bytes.len().min(USER_BYTES);
        let offset = self.user_write;
        for (i, &b) in payload_bytes[..len].iter().enumerate() {
            self.user_ring[(offset + i) % USER_BYTES] = b;
        }
        self.user_write = (offset + len) % USER_BYTES;
        (u32::try_from(offset).unwrap_or(0), u32::try_from(len).unwrap_or(0))
    }

    /// Reads back `len` bytes starting at `offset` in the user byte ring
    /// (as written by [`Self::push_user`]), handling wraparound.
    #[must_use]
    pub fn read_user_bytes(&self, offset: u32, len: u32) -> Vec<u8> {
        let offset = offset as usize;
        let len = len as usize;
        (0..len).map(|i| self.user_ring[(offset + i) % USER_BYTES]).collect()
    }

    /// Pushes a non-`User` event, evicting the oldest queued event if the
    /// ring is full. Returns `true` if an eviction occurred (and
    /// increments [`Self::dropped_count`]).
    pub fn push(&mut self, payload: EventPayload, time_ms: u64) -> bool {
        let dropped = self.records.add(Event::new(payload, time_ms));
        if dropped {
            self.dropped += 1;
        }
        dropped
    }

    /// Pushes a `USER` event carrying `payload_bytes`, staging the bytes
    /// in the user byte ring first.
    pub fn push_user(&mut self, tag: u32, payload_bytes: &[u8], time_ms: u64) -> bool {
        let (offset, len) = self.stage_user_bytes(payload_bytes);
        self.push(EventPayload::User { tag, offset, len }, time_ms)
    }

    /// Pushes without evicting: if the ring is full the push is refused
    /// and `false` is returned (used for ticks, which should never evict
    /// a user-originated event, §4.8).
    pub fn try_push_no_drop(&mut self, payload: EventPayload, time_ms: u64) -> bool {
        if self.records.is_full() {
            return false;
        }
        self.records.add(Event::new(payload, time_ms));
        true
    }

    /// Pops the oldest queued event (FIFO).
    pub fn pop(&mut self) -> Option<Event> { self.records.remove() }

    pub fn clear(&mut self) {
        self.records.clear();
        self.user_write = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::types::{KeyAction, KeyCode, Modifiers};

    #[test]
    fn push_and_pop_preserve_order() {
        let mut q: EventQueue<4, 64> = EventQueue::new();
        q.push(EventPayload::Resize { cols: 80, rows: 24 }, 1);
        q.push(EventPayload::Tick { dt_ms: 16 }, 2);
        let a = q.pop().unwrap();
        let b = q.pop().unwrap();
        assert_eq!(a.time_ms, 1);
        assert_eq!(b.time_ms, 2);
    }

    #[test]
    fn push_drops_oldest_on_overflow_and_counts() {
        let mut q: EventQueue<2, 64> = EventQueue::new();
        q.push(EventPayload::Tick { dt_ms: 1 }, 1);
        q.push(EventPayload::Tick { dt_ms: 2 }, 2);
        let dropped = q.push(EventPayload::Tick { dt_ms: 3 }, 3);
        assert!(dropped);
        assert_eq!(q.dropped_count(), 1);
        let first = q.pop().unwrap();
        assert_eq!(first.time_ms, 2);
    }

    #[test]
    fn try_push_no_drop_refuses_when_full() {
        let mut q: EventQueue<1, 64> = EventQueue::new();
        assert!(q.try_push_no_drop(EventPayload::Tick { dt_ms: 1 }, 1));
        assert!(!q.try_push_no_drop(EventPayload::Tick { dt_ms: 2 }, 2));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn user_payload_round_trips_through_the_byte_ring() {
        let mut q: EventQueue<4, 64> = EventQueue::new();
        q.push_user(7, b"hello", 100);
        let ev = q.pop().unwrap();
        let EventPayload::User { tag, offset, len } = ev.payload else { panic!("expected User") };
        assert_eq!(tag, 7);
        assert_eq!(q.read_user_bytes(offset, len), b"hello");
    }

    #[test]
    fn key_event_fields_are_preserved() {
        let mut q: EventQueue<2, 16> = EventQueue::new();
        q.push(EventPayload::Key { code: KeyCode::Char('a'), mods: Modifiers::CTRL, action: KeyAction::Press }, 5);
        let ev = q.pop().unwrap();
        assert_eq!(ev.payload, EventPayload::Key { code: KeyCode::Char('a'), mods: Modifiers::CTRL, action: KeyAction::Press });
    }
}
