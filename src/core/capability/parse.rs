// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Opportunistic parsing of probe responses out of an arbitrarily
//! interleaved byte stream (§4.6). Unrecognized bytes are preserved as
//! passthrough rather than discarded, so keystrokes that arrived during
//! probing are not lost.

const ESC: u8 = 0x1B;

/// One recognized probe response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeResponse {
    XtVersion(String),
    Da1 { params: Vec<u32> },
    Da2 { model: u32, version: u32, secondary: u32 },
    DecRqm { mode: u32, value: u32 },
    WindowReport { code: u32, height: u32, width: u32 },
}

/// The outcome of scanning one byte buffer: every recognized response, the
/// bytes that were not part of a recognized response (preserved in
/// order), and whether the buffer ended mid-sequence (more bytes needed).
#[derive(Debug, Default)]
pub struct ScanResult {
    pub responses: Vec<ProbeResponse>,
    pub passthrough: Vec<u8>,
    pub incomplete_tail: bool,
}

/// Scans `buf` left to right, extracting every recognized probe response.
/// Any trailing bytes that look like the start of a recognized sequence
/// but are not yet complete are left unconsumed (`incomplete_tail` is
/// set) so the caller can re-feed them prefixed to the next read.
#[must_use]
pub fn scan(buf: &[u8]) -> ScanResult {
    let mut result = ScanResult::default();
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == ESC {
            match try_parse_escape(&buf[i..]) {
                EscapeParse::Matched { response, consumed } => {
                    if let Some(r) = response {
                        result.responses.push(r);
                    }
                    i += consumed;
                    continue;
                }
                EscapeParse::Incomplete => {
                    result.incomplete_tail = true;
                    break;
                }
                EscapeParse::NotRecognized => {
                    result.passthrough.push(buf[i]);
                    i += 1;
                }
            }
        } else {
            result.passthrough.push(buf[i]);
            i += 1;
        }
    }
    result
}

enum EscapeParse {
    Matched { response: Option<ProbeResponse>, consumed: usize },
    Incomplete,
    NotRecognized,
}

fn try_parse_escape(buf: &[u8]) -> EscapeParse {
    if buf.len() < 2 {
        return EscapeParse::Incomplete;
    }
    match buf[1] {
        b'P' => parse_dcs(buf),
        b'[' => parse_csi(buf),
        _ => EscapeParse::NotRecognized,
    }
}

fn parse_dcs(buf: &[u8]) -> EscapeParse {
    // XTVERSION: ESC P > | <text> ESC \
    if buf.len() < 4 || buf[2] != b'>' || buf[3] != b'|' {
        return EscapeParse::NotRecognized;
    }
    let mut j = 4;
    while j + 1 < buf.len() {
        if buf[j] == ESC && buf[j + 1] == b'\\' {
            let text = String::from_utf8_lossy(&buf[4..j]).into_owned();
            return EscapeParse::Matched { response: Some(ProbeResponse::XtVersion(text)), consumed: j + 2 };
        }
        j += 1;
    }
    EscapeParse::Incomplete
}

struct CsiTokens {
    marker: Option<u8>,
    params: Vec<u32>,
    intermediate: Option<u8>,
    final_byte: u8,
    consumed: usize,
}

fn parse_csi_tokens(buf: &[u8]) -> Result<CsiTokens, bool /* incomplete */> {
    let mut i = 2; // past ESC [
    let marker = match buf.get(i) {
        Some(&b @ (b'?' | b'>' | b'<' | b'=')) => {
            i += 1;
            Some(b)
        }
        Some(_) => None,
        None => return Err(true),
    };

    let param_start = i;
    while let Some(&b) = buf.get(i) {
        if b.is_ascii_digit() || b == b';' {
            i += 1;
        } else {
            break;
        }
    }
    let params: Vec<u32> = buf[param_start..i]
        .split(|&b| b == b';')
        .map(|chunk| std::str::from_utf8(chunk).ok().and_then(|s| s.parse().ok()).unwrap_or(0))
        .collect();

    let intermediate = match buf.get(i) {
        Some(&b) if (0x20..=0x2F).contains(&b) => {
            i += 1;
            Some(b)
        }
        Some(_) => None,
        None => return Err(true),
    };

    let Some(&final_byte) = buf.get(i) else { return Err(true) };
    if !(0x40..=0x7E).contains(&final_byte) {
        return Err(false);
    }
    i += 1;

    Ok(CsiTokens { marker, params, intermediate, final_byte, consumed: i })
}

fn parse_csi(buf: &[u8]) -> EscapeParse {
    let tokens = match parse_csi_tokens(buf) {
        Ok(t) => t,
        Err(true) => return EscapeParse::Incomplete,
        Err(false) => return EscapeParse::NotRecognized,
    };
    let response = match (tokens.marker, tokens.intermediate, tokens.final_byte) {
        (Some(b'?'), None, b'c') => Some(ProbeResponse::Da1 { params: tokens.params }),
        (Some(b'>'), None, b'c') => {
            let model = tokens.params.first().copied().unwrap_or(0);
            let version = tokens.params.get(1).copied().unwrap_or(0);
            let secondary = tokens.params.get(2).copied().unwrap_or(0);
            Some(ProbeResponse::Da2 { model, version, secondary })
        }
        (Some(b'?'), Some(b'$'), b'y') => {
            let mode = tokens.params.first().copied().unwrap_or(0);
            let value = tokens.params.get(1).copied().unwrap_or(0);
            Some(ProbeResponse::DecRqm { mode, value })
        }
        (None, None, b't') => {
            let code = tokens.params.first().copied().unwrap_or(0);
            let height = tokens.params.get(1).copied().unwrap_or(0);
            let width = tokens.params.get(2).copied().unwrap_or(0);
            Some(ProbeResponse::WindowReport { code, height, width })
        }
        _ => None,
    };
    EscapeParse::Matched { response, consumed: tokens.consumed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_xtversion() {
        let mut buf = vec![ESC, b'P', b'>', b'|'];
        buf.extend_from_slice(b"XTerm(388)");
        buf.extend_from_slice(&[ESC, b'\\']);
        let result = scan(&buf);
        assert_eq!(result.responses, vec![ProbeResponse::XtVersion("XTerm(388)".to_string())]);
        assert!(result.passthrough.is_empty());
    }

    #[test]
    fn parses_da1_with_sixel_capability() {
        let buf = format!("\x1b[?62;4;22c").into_bytes();
        let result = scan(&buf);
        assert_eq!(result.responses, vec![ProbeResponse::Da1 { params: vec![62, 4, 22] }]);
    }

    #[test]
    fn parses_decrqm_response() {
        let buf = b"\x1b[?2026;1$y".to_vec();
        let result = scan(&buf);
        assert_eq!(result.responses, vec![ProbeResponse::DecRqm { mode: 2026, value: 1 }]);
    }

    #[test]
    fn parses_window_report() {
        let buf = b"\x1b[4;600;800t".to_vec();
        let result = scan(&buf);
        assert_eq!(result.responses, vec![ProbeResponse::WindowReport { code: 4, height: 600, width: 800 }]);
    }

    #[test]
    fn preserves_interleaved_passthrough_bytes() {
        let mut buf = b"hello".to_vec();
        buf.extend_from_slice(b"\x1b[?62;4c");
        buf.extend_from_slice(b"world");
        let result = scan(&buf);
        assert_eq!(result.passthrough, b"helloworld");
        assert_eq!(result.responses.len(), 1);
    }

    #[test]
    fn incomplete_sequence_at_end_is_not_consumed() {
        let buf = b"\x1b[?62;4".to_vec();
        let result = scan(&buf);
        assert!(result.incomplete_tail);
        assert!(result.responses.is_empty());
    }
}
