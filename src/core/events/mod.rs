// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The event model: a fixed-shape tagged union, a bounded ring queue, and
//! a little-endian batch wire format for moving events across a process
//! boundary (§3 "Event", "Event queue", "Event batch v1", §4.8).

pub mod batch;
pub mod queue;
pub mod types;

pub use batch::{BatchHeader, BatchWriter, DecodedEvent, DecodedPayload, decode_batch, parse_header};
pub use queue::EventQueue;
pub use types::{Event, EventPayload, KeyAction, KeyCode, Modifiers, MouseButtons, MouseKind};
