// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The painter: a bounded clip-rectangle stack wrapped around a
//! [`Framebuffer`], exposing the drawing primitives that the drawlist
//! executor and widget layers call (§4.1).

use crate::core::text::grapheme::MAX_GRAPHEME_BYTES;
use crate::core::text::width::EmojiWidthPolicy;
use crate::core::text::first_grapheme;
use crate::error::{VtError, VtResult};

use super::framebuffer::{Cell, Framebuffer, Rect};
use super::style::Style;

/// Clip stack depth is bounded; pushing past this returns
/// [`VtError::Limit`] rather than growing unboundedly.
pub const MAX_CLIP_DEPTH: usize = 64;

/// Wraps a [`Framebuffer`] with a bounded clip-rectangle stack. Every
/// drawing primitive clips to the intersection of the framebuffer bounds
/// and every rectangle currently on the stack.
#[derive(Debug)]
pub struct Painter<'fb> {
    fb: &'fb mut Framebuffer,
    clip_stack: Vec<Rect>,
}

impl<'fb> Painter<'fb> {
    #[must_use]
    pub fn new(fb: &'fb mut Framebuffer) -> Self { Self { fb, clip_stack: Vec::new() } }

    /// The effective clip: the framebuffer's bounds intersected with every
    /// rectangle currently pushed.
    #[must_use]
    pub fn current_clip(&self) -> Rect {
        self.clip_stack.iter().fold(self.fb.bounds(), |acc, r| acc.intersect(r))
    }

    /// Pushes `rect` (already intersected against the current clip) onto
    /// the stack.
    ///
    /// # Errors
    /// Returns [`VtError::Limit`] if the stack is already at
    /// [`MAX_CLIP_DEPTH`].
    pub fn push_clip(&mut self, rect: Rect) -> VtResult<()> {
        if self.clip_stack.len() >= MAX_CLIP_DEPTH {
            return Err(VtError::limit("clip stack depth exceeded"));
        }
        let effective = self.current_clip().intersect(&rect);
        self.clip_stack.push(effective);
        Ok(())
    }

    /// Pops the most recently pushed clip rectangle, if any.
    pub fn pop_clip(&mut self) { self.clip_stack.pop(); }

    #[must_use]
    pub fn clip_depth(&self) -> usize { self.clip_stack.len() }

    /// Clears the whole framebuffer to `style`, bypassing the clip stack
    /// (§4.1: "clear" is a whole-grid primitive).
    pub fn clear(&mut self, style: Style) { self.fb.clear(style); }

    /// Fills every cell of `rect`, clipped to the current clip, with a
    /// space of `style`. Any wide-glyph pair straddling the fill boundary
    /// is repaired (its orphaned half collapses to a plain space).
    pub fn fill_rect(&mut self, rect: Rect, style: Style) {
        let clip = self.current_clip().intersect(&rect);
        if clip.is_empty() {
            return;
        }
        self.repair_boundary(clip);
        for y in clip.y0..clip.y1 {
            for x in clip.x0..clip.x1 {
                self.fb.set(as_u16(x), as_u16(y), Cell::space(style));
            }
        }
    }

    /// Writes one grapheme cluster at `(x, y)`, clipped to the current
    /// clip. Width-2 clusters occupy `(x, y)` and `(x+1, y)`; if the
    /// second cell falls outside the clip the whole write is dropped (a
    /// wide glyph is never split across a clip boundary). Clusters over
    /// the 32-byte cap are replaced with U+FFFD.
    pub fn put_grapheme(&mut self, x: i32, y: i32, text: &str, style: Style, policy: EmojiWidthPolicy) {
        let clip = self.current_clip();
        if !clip.contains(x, y) {
            return;
        }
        let Some(g) = first_grapheme(text, policy) else { return };
        let cell = if g.text.len() > MAX_GRAPHEME_BYTES {
            Cell::replacement(style)
        } else {
            let mut c = Cell::space(style);
            c.grapheme = super::framebuffer::GraphemeBytes::from(g.text);
            c.width = g.width;
            c
        };
        if cell.width == 2 {
            if !clip.contains(x + 1, y) {
                return;
            }
            self.repair_boundary(Rect::new(x, y, 2, 1));
            self.fb.set(as_u16(x), as_u16(y), cell.clone());
            self.fb.set(as_u16(x + 1), as_u16(y), Cell::continuation(style));
        } else {
            self.repair_boundary(Rect::new(x, y, 1, 1));
            self.fb.set(as_u16(x), as_u16(y), cell);
        }
    }

    /// Writes `text` left to right starting at `(x, y)`, one grapheme per
    /// call to [`Self::put_grapheme`], advancing by each cluster's width.
    /// Stops at the clip's right edge; does not wrap.
    pub fn draw_text_bytes(&mut self, x: i32, y: i32, text: &str, style: Style, policy: EmojiWidthPolicy) {
        let mut cursor = x;
        for g in crate::core::text::graphemes(text, policy) {
            if cursor >= self.current_clip().x1 {
                break;
            }
            self.put_grapheme(cursor, y, g.text, style, policy);
            cursor += i32::from(g.width.max(1));
        }
    }

    /// Copies `src` from `other` into this painter's framebuffer at
    /// `dst_origin`, clipped to the current clip. Source and destination
    /// regions may not overlap (distinct framebuffers).
    pub fn blit_rect(&mut self, dst_origin: (i32, i32), other: &Framebuffer, src: Rect) {
        let (dx, dy) = dst_origin;
        let src = src.intersect(&other.bounds());
        if src.is_empty() {
            return;
        }
        for sy in src.y0..src.y1 {
            for sx in src.x0..src.x1 {
                let tx = dx + (sx - src.x0);
                let ty = dy + (sy - src.y0);
                if !self.current_clip().contains(tx, ty) {
                    continue;
                }
                let source_cell = other.get(as_u16(sx), as_u16(sy));
                if source_cell.is_continuation() {
                    continue;
                }
                if source_cell.is_wide_lead() {
                    if !self.current_clip().contains(tx + 1, ty) {
                        continue;
                    }
                    self.repair_boundary(Rect::new(tx, ty, 2, 1));
                    self.fb.set(as_u16(tx), as_u16(ty), source_cell.clone());
                    self.fb.set(as_u16(tx + 1), as_u16(ty), Cell::continuation(source_cell.style));
                } else {
                    self.repair_boundary(Rect::new(tx, ty, 1, 1));
                    self.fb.set(as_u16(tx), as_u16(ty), source_cell.clone());
                }
            }
        }
    }

    /// Before writing into `rect`, collapses any wide-glyph pair whose
    /// lead or continuation cell sits on the boundary of `rect` but whose
    /// partner does not, so the grid invariant holds after the write.
    fn repair_boundary(&mut self, rect: Rect) {
        if rect.x0 > self.fb.bounds().x0 {
            self.fb.repair_orphan_at(as_u16(rect.x0 - 1), as_u16(rect.y0));
        }
        for y in rect.y0..rect.y1 {
            self.fb.repair_orphan_at(as_u16(rect.x0), as_u16(y));
            if rect.x1 < self.fb.bounds().x1 {
                self.fb.repair_orphan_at(as_u16(rect.x1 - 1), as_u16(y));
                self.fb.repair_orphan_at(as_u16(rect.x1), as_u16(y));
            }
        }
    }
}

fn as_u16(v: i32) -> u16 { u16::try_from(v.max(0)).unwrap_or(u16::MAX) }
