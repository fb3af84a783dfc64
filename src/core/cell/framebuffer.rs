// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The cell grid (§3 Framebuffer, §3 Cell).
//!
//! Invariant enforced everywhere a cell is written: for every lead cell of
//! width 2 at `(x, y)` there is exactly one continuation cell (width 0) at
//! `(x+1, y)` with identical style; no continuation cell exists without a
//! lead cell immediately to its left.

use smallstr::SmallString;

use crate::core::text::grapheme::MAX_GRAPHEME_BYTES;

use super::style::Style;

pub type GraphemeBytes = SmallString<[u8; MAX_GRAPHEME_BYTES]>;

/// One character position. `width` is `0` (continuation), `1` (normal), or
/// `2` (wide lead).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Cell {
    pub grapheme: GraphemeBytes,
    pub width: u8,
    pub style: Style,
}

impl Cell {
    #[must_use]
    pub fn space(style: Style) -> Self {
        Self { grapheme: GraphemeBytes::from(" "), width: 1, style }
    }

    /// A width-0 placeholder that is never directly addressable as a lead
    /// cell: the right half of a wide glyph.
    #[must_use]
    pub fn continuation(style: Style) -> Self {
        Self { grapheme: GraphemeBytes::new(), width: 0, style }
    }

    #[must_use]
    pub fn replacement(style: Style) -> Self {
        Self { grapheme: GraphemeBytes::from("\u{FFFD}"), width: 1, style }
    }

    #[must_use]
    pub fn is_continuation(&self) -> bool { self.width == 0 }

    #[must_use]
    pub fn is_wide_lead(&self) -> bool { self.width == 2 }
}

impl Default for Cell {
    fn default() -> Self { Self::space(Style::default()) }
}

/// A signed-integer rectangle in cell coordinates, half-open on both axes:
/// `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: i32, y0: i32, width: i32, height: i32) -> Self {
        Self { x0, y0, x1: x0 + width, y1: y0 + height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.x1 <= self.x0 || self.y1 <= self.y0 }

    #[must_use]
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// The rectangular grid of cells. Owns its backing storage exclusively; a
/// resize allocates a new backing and only releases the old one once the
/// new allocation has succeeded (no partial effects on resize failure,
/// though on this allocator a failed `Vec` allocation aborts the process
/// the same way it would anywhere else in safe Rust).
#[derive(Clone, Debug)]
pub struct Framebuffer {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Framebuffer {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        let area = usize::from(cols) * usize::from(rows);
        Self { cols, rows, cells: vec![Cell::default(); area] }
    }

    #[must_use]
    pub fn cols(&self) -> u16 { self.cols }

    #[must_use]
    pub fn rows(&self) -> u16 { self.rows }

    #[must_use]
    pub fn bounds(&self) -> Rect { Rect::new(0, 0, i32::from(self.cols), i32::from(self.rows)) }

    fn index(&self, x: u16, y: u16) -> usize { usize::from(y) * usize::from(self.cols) + usize::from(x) }

    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool { self.bounds().contains(x, y) }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> &Cell { &self.cells[self.index(x, y)] }

    pub fn get_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        let idx = self.index(x, y);
        &mut self.cells[idx]
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let idx = self.index(x, y);
        self.cells[idx] = cell;
    }

    /// Overwrite every cell with a space of `style`. Ignores the clip stack
    /// by design — this establishes a whole-grid baseline.
    pub fn clear(&mut self, style: Style) {
        for cell in &mut self.cells {
            *cell = Cell::space(style);
        }
    }

    /// Allocates a new backing of `(cols, rows)`, preserving the overlap
    /// with the old grid (top-left aligned) and filling any newly exposed
    /// cells with a space of `fill_style`. The old backing is only dropped
    /// once the new one has been fully built.
    #[must_use]
    pub fn resized(&self, cols: u16, rows: u16, fill_style: Style) -> Self {
        let mut next = Self::new(cols, rows);
        let copy_cols = self.cols.min(cols);
        let copy_rows = self.rows.min(rows);
        for y in 0..copy_rows {
            for x in 0..copy_cols {
                next.set(x, y, self.get(x, y).clone());
            }
        }
        // A column shrink can cut a copied row through the middle of a wide
        // lead/continuation pair (the continuation lived at `copy_cols` in
        // the old grid and was never copied). Repair the rightmost copied
        // column so `next` never carries an orphaned lead.
        if copy_cols > 0 {
            for y in 0..copy_rows {
                next.repair_orphan_at(copy_cols - 1, y);
            }
        }
        for y in 0..rows {
            for x in 0..cols {
                if x >= copy_cols || y >= copy_rows {
                    next.set(x, y, Cell::space(fill_style));
                }
            }
        }
        next
    }

    /// Clears exactly the one partner cell of a wide pair that is about to
    /// become orphaned, without touching anything else (the painter's
    /// "bounded invariant repair" exception, §4.1).
    pub(crate) fn repair_orphan_at(&mut self, x: u16, y: u16) {
        if x >= self.cols || y >= self.rows {
            return;
        }
        let cell = self.get(x, y);
        if cell.is_wide_lead() {
            // The continuation to the right is about to be orphaned if it
            // exists within bounds; collapse the lead into a plain space.
            if x + 1 < self.cols {
                self.set(x + 1, y, Cell::space(cell.style));
            }
            self.set(x, y, Cell::space(self.get(x, y).style));
        } else if cell.is_continuation() && x > 0 {
            self.set(x - 1, y, Cell::space(cell.style));
            self.set(x, y, Cell::space(self.get(x, y).style));
        }
    }

    /// Checks the wide-glyph pair invariant across the whole grid. Used by
    /// tests and debug assertions, not on the render hot path.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let cell = self.get(x, y);
                if cell.is_wide_lead() {
                    if x + 1 >= self.cols {
                        return false;
                    }
                    let partner = self.get(x + 1, y);
                    if !partner.is_continuation() || partner.style != cell.style {
                        return false;
                    }
                } else if cell.is_continuation() {
                    if x == 0 {
                        return false;
                    }
                    if !self.get(x - 1, y).is_wide_lead() {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_framebuffer_is_all_spaces_and_holds_invariant() {
        let fb = Framebuffer::new(4, 2);
        assert!(fb.invariant_holds());
        assert_eq!(fb.get(0, 0).grapheme.as_str(), " ");
    }

    #[test]
    fn clear_ignores_clip_and_fills_whole_grid() {
        let mut fb = Framebuffer::new(3, 1);
        let style = Style::new(super::super::style::RgbColor::WHITE, super::super::style::RgbColor::BLACK);
        fb.clear(style);
        for x in 0..3 {
            assert_eq!(fb.get(x, 0).style, style);
        }
    }

    #[test]
    fn resized_preserves_overlap_and_fills_new_area() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set(0, 0, Cell::replacement(Style::default()));
        let bigger = fb.resized(4, 2, Style::default());
        assert_eq!(bigger.get(0, 0).grapheme.as_str(), "\u{FFFD}");
        assert_eq!(bigger.get(3, 0).grapheme.as_str(), " ");
    }

    #[test]
    fn resized_narrower_through_a_wide_pair_leaves_no_orphan() {
        let mut fb = Framebuffer::new(4, 1);
        let mut lead = Cell::default();
        lead.width = 2;
        fb.set(2, 0, lead.clone());
        fb.set(3, 0, Cell::continuation(lead.style));
        assert!(fb.invariant_holds());

        // Shrinking to 3 columns cuts the pair at (2,0)/(3,0) in half.
        let narrower = fb.resized(3, 1, Style::default());
        assert!(narrower.invariant_holds());
        assert!(!narrower.get(2, 0).is_wide_lead());
    }

    #[test]
    fn repair_orphan_clears_continuation_partner() {
        let mut fb = Framebuffer::new(3, 1);
        let mut lead = Cell::default();
        lead.width = 2;
        fb.set(0, 0, lead.clone());
        fb.set(1, 0, Cell::continuation(lead.style));
        fb.repair_orphan_at(0, 0);
        assert!(!fb.get(0, 0).is_wide_lead());
        assert!(!fb.get(1, 0).is_continuation());
    }
}
