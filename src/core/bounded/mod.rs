// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Checked integer arithmetic, a bump-allocated arena with a fixed high
//! watermark, a growable byte builder with a hard cap, and a fixed-capacity
//! ring buffer. These are the leaf-most primitives every other component is
//! built on (§2.1 of the design).

pub mod arena;
pub mod byte_builder;
pub mod checked_math;
pub mod ring_buffer;

pub use arena::Arena;
pub use byte_builder::ByteBuilder;
pub use ring_buffer::RingBuffer;
