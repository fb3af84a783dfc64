// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A minimal PNG encoder for RGBA8 buffers: signature, one IHDR chunk, one
//! IDAT chunk (a zlib stream of stored-deflate blocks — no actual
//! compression), and an empty IEND (§4.9, §6 "Minimal PNG emitter").
//! CRC32 and Adler32 tables are computed at runtime rather than baked in
//! as `const` tables, keeping this encoder free of any bundled asset
//! data.

use crate::ansi::constants::{CRC32_POLY, PNG_SIGNATURE};

const MAX_STORED_BLOCK: usize = 65535;

fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0u32;
    while (n as usize) < 256 {
        let mut c = n;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { CRC32_POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n as usize] = c;
        n += 1;
    }
    table
}

fn crc32(table: &[u32; 256], data: &[u8]) -> u32 {
    let mut c = 0xFFFF_FFFFu32;
    for &b in data {
        c = table[((c ^ u32::from(b)) & 0xFF) as usize] ^ (c >> 8);
    }
    c ^ 0xFFFF_FFFF
}

fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + u32::from(byte)) % MOD_ADLER;
        b = (b + a) % MOD_ADLER;
    }
    (b << 16) | a
}

fn push_chunk(out: &mut Vec<u8>, table: &[u32; 256], chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&u32::try_from(data.len()).unwrap_or(u32::MAX).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    let mut crc_input = Vec::with_capacity(4 + data.len());
    crc_input.extend_from_slice(chunk_type);
    crc_input.extend_from_slice(data);
    out.extend_from_slice(&crc32(table, &crc_input).to_be_bytes());
}

/// Deflate "stored" blocks: no compression, just length-prefixed raw
/// bytes, each block capped at 65535 bytes (§6 `final | len LE | ~len LE
/// | raw`).
fn stored_deflate(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / MAX_STORED_BLOCK + 8);
    if raw.is_empty() {
        out.push(1); // BFINAL=1, BTYPE=00, on an otherwise-empty stream.
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0xFFFFu16.to_le_bytes());
        return out;
    }
    let mut offset = 0;
    while offset < raw.len() {
        let end = (offset + MAX_STORED_BLOCK).min(raw.len());
        let chunk = &raw[offset..end];
        let is_final = end == raw.len();
        out.push(u8::from(is_final));
        let len = u16::try_from(chunk.len()).expect("chunk capped at MAX_STORED_BLOCK");
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(chunk);
        offset = end;
    }
    out
}

/// Encodes an RGBA8 buffer (`width * height * 4` bytes, row-major) as a
/// complete PNG file.
///
/// # Panics
/// Panics if `rgba.len() != width * height * 4` (programmer error: the
/// caller owns both the buffer and its declared dimensions).
#[must_use]
pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    assert_eq!(rgba.len(), (width as usize) * (height as usize) * 4, "RGBA buffer size must match width*height*4");
    let table = crc32_table();

    let mut out = Vec::with_capacity(rgba.len() + 128);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type: RGBA
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    push_chunk(&mut out, &table, b"IHDR", &ihdr);

    // Filter type 0 ("none") prefixed to every scanline.
    let row_bytes = (width as usize) * 4;
    let mut raw = Vec::with_capacity((row_bytes + 1) * (height as usize));
    for row in rgba.chunks_exact(row_bytes) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut zlib = Vec::with_capacity(raw.len() + 6);
    zlib.extend_from_slice(&[0x78, 0x01]);
    zlib.extend_from_slice(&stored_deflate(&raw));
    zlib.extend_from_slice(&adler32(&raw).to_be_bytes());
    push_chunk(&mut out, &table, b"IDAT", &zlib);

    push_chunk(&mut out, &table, b"IEND", &[]);
    out
}
