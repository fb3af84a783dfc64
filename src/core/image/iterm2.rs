// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The iTerm2 inline image protocol: OSC 1337 with a base64-encoded PNG
//! payload (§4.9 "iTerm2").

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::ansi::constants::{BEL, OSC};
use crate::ansi::generator::{cursor_position, write_decimal};
use crate::core::bounded::byte_builder::ByteBuilder;
use crate::core::image::png::encode_rgba;
use crate::error::VtResult;

/// Encodes `rgba` as a PNG and wraps it in an OSC 1337 inline-image
/// sequence, placed at `(dst_col, dst_row)` and sized to `cell_cols x
/// cell_rows` terminal cells (§4.9, §6 "OSC 1337 inline image").
pub fn encode(
    out: &mut ByteBuilder,
    dst_col: u16,
    dst_row: u16,
    cell_cols: u16,
    cell_rows: u16,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> VtResult<()> {
    cursor_position(out, dst_row, dst_col)?;
    let png = encode_rgba(width, height, rgba);
    let b64 = BASE64.encode(&png);

    out.push_bytes(OSC)?;
    out.push_str("1337;File=inline=1;width=")?;
    write_decimal(out, u32::from(cell_cols))?;
    out.push_str(";height=")?;
    write_decimal(out, u32::from(cell_rows))?;
    out.push_str(";preserveAspectRatio=1;size=")?;
    write_decimal(out, u32::try_from(png.len()).unwrap_or(u32::MAX))?;
    out.push_byte(b':')?;
    out.push_str(&b64)?;
    out.push_byte(BEL)
}
