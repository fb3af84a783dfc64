// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Grapheme cluster boundaries (via `unicode-segmentation`) combined with
//! the width policy to give each cluster a single cell width.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{EmojiWidthPolicy, char_width};

/// Maximum grapheme byte length a cell can hold (§3 Cell: "grapheme bytes
/// (<=32 bytes of UTF-8)"). Clusters longer than this are a defect in the
/// input data (the painter substitutes U+FFFD instead of storing them).
pub const MAX_GRAPHEME_BYTES: usize = 32;

/// One grapheme cluster with its resolved cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grapheme<'a> {
    pub text: &'a str,
    pub width: u8,
}

/// Splits `s` into grapheme clusters, each tagged with its cell width under
/// `policy`. A cluster's width is the widest scalar it contains (combining
/// marks and variation selectors are width 0 and never widen a cluster;
/// a base character followed by an emoji variation selector keeps the base
/// character's resolved width).
pub fn graphemes(s: &str, policy: EmojiWidthPolicy) -> impl Iterator<Item = Grapheme<'_>> {
    s.graphemes(true).map(move |g| {
        let width = g.chars().map(|ch| char_width(ch, policy)).max().unwrap_or(0);
        Grapheme { text: g, width }
    })
}

/// Returns the first grapheme cluster of `s` (if any) with its width. This
/// is what the painter calls per write: one cluster, one or two cells.
#[must_use]
pub fn first_grapheme(s: &str, policy: EmojiWidthPolicy) -> Option<Grapheme<'_>> {
    graphemes(s, policy).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_string_splits_into_single_byte_clusters() {
        let gs: Vec<_> = graphemes("ab", EmojiWidthPolicy::Narrow).collect();
        assert_eq!(gs.len(), 2);
        assert_eq!(gs[0].text, "a");
        assert_eq!(gs[0].width, 1);
    }

    #[test]
    fn combining_mark_stays_in_the_same_cluster() {
        // 'e' + combining acute accent (U+0301) is one grapheme cluster.
        let s = "e\u{0301}";
        let gs: Vec<_> = graphemes(s, EmojiWidthPolicy::Narrow).collect();
        assert_eq!(gs.len(), 1);
        assert_eq!(gs[0].width, 1);
    }

    #[test]
    fn wide_cjk_cluster_reports_width_two() {
        let g = first_grapheme("漢字", EmojiWidthPolicy::Narrow).unwrap();
        assert_eq!(g.text, "漢");
        assert_eq!(g.width, 2);
    }

    #[test]
    fn grapheme_under_max_bytes() {
        let g = first_grapheme("a", EmojiWidthPolicy::Narrow).unwrap();
        assert!(g.text.len() <= MAX_GRAPHEME_BYTES);
    }
}
