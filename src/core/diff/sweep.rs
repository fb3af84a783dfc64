// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Per-row cell diffing and byte emission (§4.5 step 5): the inner loop
//! shared by both the sweep and damage paths — only the set of rows (and,
//! for the damage path, the column range within each row) differs.

use crate::ansi;
use crate::core::bounded::byte_builder::ByteBuilder;
use crate::core::cell::framebuffer::Framebuffer;
use crate::core::cell::style::Style;
use crate::error::VtResult;

/// Tracks where the real cursor is (as far as this render knows) and
/// what style it last emitted, so cursor moves and SGR runs stay
/// minimal across the whole frame, not just within one row.
#[derive(Debug)]
pub struct CursorModel {
    pub col: u16,
    pub row: u16,
    pub style: Option<Style>,
}

impl CursorModel {
    #[must_use]
    pub fn new(col: u16, row: u16, style: Option<Style>) -> Self { Self { col, row, style } }

    /// Moves to `(target_col, target_row)` using whichever of CUP,
    /// CR+CUF, or a relative CUF/CUB is shortest, breaking ties in that
    /// listed order.
    pub fn move_to(&mut self, out: &mut ByteBuilder, target_col: u16, target_row: u16) -> VtResult<()> {
        if self.col == target_col && self.row == target_row {
            return Ok(());
        }

        let mut cup = ByteBuilder::with_capacity(24);
        ansi::cursor_position(&mut cup, target_row, target_col)?;

        let same_row = self.row == target_row;
        let mut relative = ByteBuilder::with_capacity(24);
        if same_row {
            if target_col >= self.col {
                ansi::cursor_forward(&mut relative, target_col - self.col)?;
            } else {
                ansi::cursor_back(&mut relative, self.col - target_col)?;
            }
        }

        let mut cr_forward = ByteBuilder::with_capacity(24);
        if same_row {
            ansi::carriage_return_then_forward(&mut cr_forward, target_col)?;
        }

        let mut best = cup.as_slice();
        if same_row && !relative.is_empty() && relative.len() < best.len() {
            best = relative.as_slice();
        }
        if same_row && cr_forward.len() < best.len() {
            best = cr_forward.as_slice();
        }
        // A same-row no-op move (target == current) never reaches here
        // (handled above); an empty `relative` only occurs when
        // `target_col == self.col`, which can't coincide with a
        // different `target_row` while `same_row` is true.
        out.push_bytes(best)?;

        self.col = target_col;
        self.row = target_row;
        Ok(())
    }
}

/// Diffs row `y` over columns `[x0, x1)`, writing only the run from the
/// first to the last differing column. Returns the number of cells that
/// actually differed.
pub fn diff_row(
    out: &mut ByteBuilder,
    prev: &Framebuffer,
    next: &Framebuffer,
    y: u16,
    x0: u16,
    x1: u16,
    cursor: &mut CursorModel,
) -> VtResult<u32> {
    let mut first_diff = None;
    let mut last_diff = None;
    let mut x = x0;
    while x < x1 {
        let pc = prev.get(x, y);
        let nc = next.get(x, y);
        if pc.grapheme != nc.grapheme || pc.width != nc.width || pc.style != nc.style {
            if first_diff.is_none() {
                first_diff = Some(x);
            }
            last_diff = Some(x);
        }
        x += 1;
    }

    let (Some(first), Some(last)) = (first_diff, last_diff) else {
        return Ok(0);
    };

    cursor.move_to(out, first, y)?;

    let mut dirty_cells = 0u32;
    let mut x = first;
    while x <= last {
        let cell = next.get(x, y);
        if cell.is_continuation() {
            x += 1;
            continue;
        }
        ansi::sgr_transition(out, cursor.style.as_ref(), &cell.style)?;
        cursor.style = Some(cell.style);
        out.push_str(cell.grapheme.as_str())?;
        dirty_cells += 1;
        let advance = if cell.is_wide_lead() { 2 } else { 1 };
        cursor.col = cursor.col.saturating_add(advance);
        x += advance;
    }
    cursor.row = y;
    Ok(dirty_cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::framebuffer::Cell;
    use crate::core::cell::style::RgbColor;

    #[test]
    fn unchanged_row_emits_nothing() {
        let prev = Framebuffer::new(4, 1);
        let next = Framebuffer::new(4, 1);
        let mut out = ByteBuilder::with_capacity(64);
        let mut cursor = CursorModel::new(0, 0, None);
        let dirty = diff_row(&mut out, &prev, &next, 0, 0, 4, &mut cursor).unwrap();
        assert_eq!(dirty, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn single_cell_change_emits_move_and_glyph() {
        let prev = Framebuffer::new(4, 1);
        let mut next = Framebuffer::new(4, 1);
        next.set(2, 0, Cell::space(Style::new(RgbColor::WHITE, RgbColor::BLACK)));
        let mut out = ByteBuilder::with_capacity(64);
        let mut cursor = CursorModel::new(0, 0, None);
        let dirty = diff_row(&mut out, &prev, &next, 0, 0, 4, &mut cursor).unwrap();
        assert_eq!(dirty, 1);
        let rendered = String::from_utf8(out.into_vec()).unwrap();
        assert!(rendered.contains("3H") || rendered.contains('C'));
        assert_eq!(cursor.col, 3);
    }

    #[test]
    fn wide_lead_and_continuation_count_as_one_emitted_cell() {
        let prev = Framebuffer::new(4, 1);
        let mut next = Framebuffer::new(4, 1);
        let mut lead = Cell::default();
        lead.grapheme = crate::core::cell::framebuffer::GraphemeBytes::from("\u{3042}");
        lead.width = 2;
        next.set(0, 0, lead.clone());
        next.set(1, 0, Cell::continuation(lead.style));
        let mut out = ByteBuilder::with_capacity(64);
        let mut cursor = CursorModel::new(0, 0, None);
        let dirty = diff_row(&mut out, &prev, &next, 0, 0, 4, &mut cursor).unwrap();
        assert_eq!(dirty, 1);
        assert_eq!(cursor.col, 2);
    }
}
