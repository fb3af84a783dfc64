// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The input byte parser: a deterministic VT/xterm sequence decoder that
//! turns raw platform bytes into normalized [`Event`](crate::core::events::Event)
//! values (§4.7).

pub mod parser;

pub use parser::InputParser;
