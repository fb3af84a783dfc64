// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! East-Asian width policy, with an explicit switch for how emoji are
//! treated (some terminals render emoji as wide glyphs regardless of the
//! Unicode East-Asian-Width property; others render them narrow).

use unicode_width::UnicodeWidthChar;

/// How to size scalars in the "ambiguous" emoji range. The crate never
/// guesses this from an environment variable itself (configuration loading
/// is an external collaborator) — callers set it from whatever capability
/// detection or configuration they have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmojiWidthPolicy {
    /// Use the plain East-Asian-Width property (`unicode-width`'s default).
    #[default]
    Narrow,
    /// Force scalars in the common emoji blocks to width 2, overriding
    /// `unicode-width` when it would otherwise report width 1.
    Wide,
}

/// Returns `0`, `1`, or `2`: the cell width of `ch` under `policy`. Control
/// characters and the cell-continuation placeholder both report `0` from
/// the caller's perspective (control chars are not routed here — the
/// painter special-cases tab/newline before reaching the width policy).
#[must_use]
pub fn char_width(ch: char, policy: EmojiWidthPolicy) -> u8 {
    let base = UnicodeWidthChar::width(ch).unwrap_or(0);
    if policy == EmojiWidthPolicy::Wide && base < 2 && is_emoji_block(ch) {
        return 2;
    }
    // `unicode-width` caps width reports at 2 already; be defensive anyway.
    u8::try_from(base).unwrap_or(2).min(2)
}

/// Whether `ch` falls in one of the commonly-emoji Unicode blocks. This is
/// intentionally a coarse block check, not a full emoji-presentation
/// algorithm (variation selectors, ZWJ sequences): per-grapheme-cluster
/// emoji width resolution happens one layer up, in `grapheme.rs`, which
/// already has the whole cluster in hand.
#[must_use]
fn is_emoji_block(ch: char) -> bool {
    let c = ch as u32;
    matches!(c,
        0x1F300..=0x1FAFF // Misc symbols/pictographs, transport, supplemental symbols, symbols & pictographs extended-A.
        | 0x2600..=0x27BF  // Misc symbols, dingbats.
        | 0x2190..=0x21FF  // Arrows (subset commonly rendered wide as emoji).
        | 0x1F1E6..=0x1F1FF // Regional indicators (flag halves).
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_width_one() {
        assert_eq!(char_width('A', EmojiWidthPolicy::Narrow), 1);
    }

    #[test]
    fn cjk_is_width_two() {
        assert_eq!(char_width('あ', EmojiWidthPolicy::Narrow), 2);
    }

    #[test]
    fn control_char_is_width_zero() {
        assert_eq!(char_width('\u{0007}', EmojiWidthPolicy::Narrow), 0);
    }

    #[test]
    fn emoji_wide_policy_forces_width_two() {
        let ch = '\u{2714}'; // heavy check mark, ambiguous/narrow in many fonts.
        assert_eq!(char_width(ch, EmojiWidthPolicy::Wide), 2);
    }
}
