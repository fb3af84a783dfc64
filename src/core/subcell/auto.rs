// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! AUTO blitter mode selection (§4.3).

use crate::core::capability::{CapabilityFlags, TerminalCapabilities};

/// The set of sub-cell blitting modes a caller may request. `Pixel` names
/// a native pixel protocol (Kitty/Sixel/iTerm2); it is not a sub-cell
/// mode and AUTO never selects it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlitMode {
    Auto,
    Ascii,
    Halfblock,
    Quadrant,
    Sextant,
    Braille,
    Pixel,
}

/// How far up the glyph-density ladder the destination's font/renderer is
/// known to go. This is a property of the font and terminal renderer, not
/// the VT protocol, so it is not part of [`TerminalCapabilities`]; the
/// caller supplies it (typically from a one-time render probe or a
/// configuration default — both external collaborators).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum GlyphTier {
    /// Only ASCII is trusted to render.
    AsciiOnly,
    /// Plain half/quadrant block elements (U+2580 range) render correctly.
    Blocks,
    /// The Legacy Computing sextant block (U+1FB00 range) also renders.
    Sextants,
}

/// Whether the destination is a real interactive terminal capable of
/// rendering Unicode block/sextant/braille glyphs, as opposed to a pipe
/// or a terminal that has reported `dumb`/non-Unicode support.
#[derive(Clone, Copy, Debug)]
pub struct OutputEnvironment {
    pub is_pipe_or_dumb: bool,
    pub supports_unicode: bool,
    pub glyph_tier: GlyphTier,
}

/// Resolves `requested` against `caps`/`env`. AUTO is resolved in the
/// fixed order from §4.3: pipe/dumb -> ASCII; not-Unicode -> ASCII;
/// explicit braille-in-auto -> BRAILLE; sextant -> SEXTANT; quadrant ->
/// QUADRANT; halfblock -> HALFBLOCK; else ASCII. An explicit `Pixel`
/// request is rejected: pixel protocols are a different layer (§4.9),
/// selected by the caller, never by this function.
///
/// # Errors
/// Returns [`crate::error::VtError::Unsupported`] if `requested` is
/// [`BlitMode::Pixel`].
pub fn resolve_blit_mode(
    requested: BlitMode,
    caps: &TerminalCapabilities,
    env: OutputEnvironment,
) -> Result<BlitMode, crate::error::VtError> {
    if requested == BlitMode::Pixel {
        return Err(crate::error::VtError::unsupported("PIXEL is not a sub-cell blit mode"));
    }
    if requested != BlitMode::Auto {
        return Ok(requested);
    }
    if env.is_pipe_or_dumb {
        return Ok(BlitMode::Ascii);
    }
    if !env.supports_unicode {
        return Ok(BlitMode::Ascii);
    }
    if caps.prefer_braille_in_auto {
        return Ok(BlitMode::Braille);
    }
    match env.glyph_tier {
        GlyphTier::Sextants => Ok(BlitMode::Sextant),
        GlyphTier::Blocks => Ok(BlitMode::Quadrant),
        GlyphTier::AsciiOnly => {
            // Quadrant still outranks halfblock whenever the renderer can
            // be trusted with 2x2 block glyphs at all; halfblock is the
            // last stop before ASCII, reached only when grapheme support
            // is entirely unknown but Unicode itself is still reported.
            if caps.has(CapabilityFlags::GRAPHEME_CLUSTERS) {
                Ok(BlitMode::Halfblock)
            } else {
                Ok(BlitMode::Ascii)
            }
        }
    }
}
