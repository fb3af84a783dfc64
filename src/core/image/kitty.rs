// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The Kitty graphics protocol: APC transmit/place/delete (§4.9 "Kitty").
//!
//! Base64 + chunked APC transmission with an `m` continuation flag,
//! writing into a bounded [`ByteBuilder`] instead of allocating a
//! `String` per call, using the 32-bit placement ids and RGBA `f=32`
//! transmission format §4.9 specifies.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::ansi::constants::{APC, ST};
use crate::ansi::generator::{cursor_position, write_decimal};
use crate::core::bounded::byte_builder::ByteBuilder;
use crate::error::VtResult;

/// Raw bytes per APC transmit chunk before base64 (§4.9: "chunks of
/// ≤3072 raw bytes (≤4096 base64 bytes)" — 3072 / 3 * 4 = 4096 exactly).
pub const CHUNK_RAW_BYTES: usize = 3072;

fn str_of(bytes: &[u8]) -> &str {
    // Base64's alphabet is a strict subset of ASCII, so this never fails
    // for input produced by `BASE64.encode`.
    std::str::from_utf8(bytes).expect("base64 output is always valid UTF-8")
}

/// Transmits `rgba` (width*height*4 bytes) as a new Kitty image with id
/// `image_id`, in ≤[`CHUNK_RAW_BYTES`]-byte chunks. The first chunk
/// carries the transmission metadata (`a=t,f=32,i=,s=,v=`); every chunk
/// (including the first) carries `m=1` except the last, which carries
/// `m=0` (§4.9).
pub fn transmit(out: &mut ByteBuilder, image_id: u32, width: u32, height: u32, rgba: &[u8]) -> VtResult<()> {
    let b64 = BASE64.encode(rgba);
    let chunk_b64_len = (CHUNK_RAW_BYTES / 3) * 4;
    let chunks: Vec<&str> =
        if b64.is_empty() { vec![""] } else { b64.as_bytes().chunks(chunk_b64_len).map(str_of).collect() };

    for (i, chunk) in chunks.iter().enumerate() {
        let is_last = i + 1 == chunks.len();
        let m = if is_last { "0" } else { "1" };
        out.push_bytes(APC)?;
        out.push_byte(b'G')?;
        if i == 0 {
            out.push_str("a=t,f=32,i=")?;
            write_decimal(out, image_id)?;
            out.push_str(",s=")?;
            write_decimal(out, width)?;
            out.push_str(",v=")?;
            write_decimal(out, height)?;
            out.push_str(",m=")?;
            out.push_str(m)?;
        } else {
            out.push_str("m=")?;
            out.push_str(m)?;
        }
        out.push_byte(b';')?;
        out.push_str(chunk)?;
        out.push_bytes(ST)?;
    }
    Ok(())
}

/// Places a previously-transmitted image at `(col, row)`, sized to
/// `cols x rows` cells (§4.9 "place with CUP + APC `a=p,i=,c=,r=,z=`").
pub fn place(out: &mut ByteBuilder, image_id: u32, col: u16, row: u16, cols: u16, rows: u16) -> VtResult<()> {
    cursor_position(out, row, col)?;
    out.push_bytes(APC)?;
    out.push_str("Ga=p,i=")?;
    write_decimal(out, image_id)?;
    out.push_str(",c=")?;
    write_decimal(out, u32::from(cols))?;
    out.push_str(",r=")?;
    write_decimal(out, u32::from(rows))?;
    out.push_str(",z=0")?;
    out.push_bytes(ST)
}

/// Deletes a previously-transmitted image (§4.9 "delete with APC
/// `a=d,d=i,i=`").
pub fn delete(out: &mut ByteBuilder, image_id: u32) -> VtResult<()> {
    out.push_bytes(APC)?;
    out.push_str("Ga=d,d=i,i=")?;
    write_decimal(out, image_id)?;
    out.push_bytes(ST)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(f: impl FnOnce(&mut ByteBuilder) -> VtResult<()>) -> String {
        let mut b = ByteBuilder::with_capacity(1 << 16);
        f(&mut b).unwrap();
        String::from_utf8(b.into_vec()).unwrap()
    }

    #[test]
    fn small_image_transmits_in_a_single_chunk_with_m_zero() {
        let rgba = vec![0u8; 4 * 4 * 4];
        let out = rendered(|o| transmit(o, 7, 4, 4, &rgba));
        assert!(out.contains("a=t,f=32,i=7,s=4,v=4"));
        assert!(out.contains("m=0"));
        assert_eq!(out.matches("\x1b_G").count(), 1);
    }

    #[test]
    fn large_image_splits_into_multiple_chunks_with_correct_m_flags() {
        // 64x64 RGBA = 16384 bytes, comfortably more than one 3072-byte chunk.
        let rgba = vec![9u8; 64 * 64 * 4];
        let out = rendered(|o| transmit(o, 1, 64, 64, &rgba));
        let chunk_count = out.matches("\x1b_G").count();
        assert!(chunk_count > 1);
        // Exactly one chunk (the last) carries m=0.
        assert_eq!(out.matches("m=0").count(), 1);
        assert_eq!(out.matches("m=1").count(), chunk_count - 1);
    }

    #[test]
    fn place_emits_cursor_position_before_the_apc() {
        let out = rendered(|o| place(o, 3, 5, 2, 10, 6));
        assert!(out.starts_with("\x1b[3;6H"));
        assert!(out.contains("a=p,i=3,c=10,r=6,z=0"));
    }

    #[test]
    fn delete_references_the_given_image_id() {
        let out = rendered(|o| delete(o, 42));
        assert!(out.contains("a=d,d=i,i=42"));
    }
}
