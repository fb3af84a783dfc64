// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Shared VT/ANSI byte-sequence generation (§6 "VT/ANSI output alphabet"),
//! used by the diff renderer and the image protocol encoders.

pub mod constants;
pub mod generator;

pub use generator::{
    carriage_return_then_forward, cursor_back, cursor_forward, cursor_hide, cursor_position, cursor_shape,
    cursor_show, cursor_to_column, delete_lines, erase_display_all, hyperlink, insert_lines, osc52_clipboard,
    reset_scroll_region, set_scroll_region, sgr_reset, sgr_transition, sync_update_begin, sync_update_end,
    write_decimal,
};
