// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! UTF-8 decoding + width policy (§2.2).

pub mod grapheme;
pub mod tab_stops;
pub mod utf8;
pub mod width;

pub use grapheme::{Grapheme, graphemes};
pub use tab_stops::next_tab_stop;
pub use utf8::{Utf8Decode, decode_one, decode_one_lossy};
pub use width::{EmojiWidthPolicy, char_width};
