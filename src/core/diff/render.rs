// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The diff renderer's top-level pipeline (§4.5): path selection,
//! optional scroll optimization, per-row emission, and the final
//! cursor/style/visibility epilogue.

use crate::ansi;
use crate::core::bounded::byte_builder::ByteBuilder;
use crate::core::capability::profile::{CapabilityFlags, TerminalCapabilities};
use crate::core::cell::framebuffer::Framebuffer;
use crate::core::cell::style::Style;
use crate::core::damage::DamageTracker;
use crate::error::{VtError, VtResult};

use super::hash::{RowHashCache, hash_row};
use super::scroll::{collision_guard_holds, detect_scroll, worth_scrolling};
use super::sweep::{CursorModel, diff_row};
use super::{DesiredCursor, DiffLimits, DiffOutcome, DiffPath, DiffStats, TerminalState, TerminalStateValidity};

/// An estimate of a typical full-row redraw's byte cost, used only to
/// decide whether a detected scroll shift is worth emitting.
const ESTIMATED_ROW_REDRAW_BYTES: u32 = 24;

/// Produces the minimal VT/ANSI byte stream that reconciles `prev` into
/// `next` (§4.5).
///
/// # Errors
/// Returns [`VtError::InvalidArgument`] if `prev` and `next` have
/// different dimensions, or [`VtError::Limit`] if the computed output
/// would exceed `limits.max_output_bytes` (outputs are not partially
/// returned on `Limit`).
pub fn render_diff<const N: usize>(
    prev: &Framebuffer,
    next: &Framebuffer,
    caps: &TerminalCapabilities,
    initial: &TerminalState,
    desired: DesiredCursor,
    limits: &DiffLimits,
    damage: &DamageTracker<N>,
    row_hashes: Option<&mut RowHashCache>,
    scroll_optimize: bool,
) -> VtResult<DiffOutcome> {
    if prev.cols() != next.cols() || prev.rows() != next.rows() {
        return Err(VtError::invalid_argument("prev/next framebuffer dimension mismatch"));
    }

    let mut out = ByteBuilder::with_capacity(limits.max_output_bytes);
    let mut stats = DiffStats::default();
    let rows = next.rows();
    let cols = next.cols();

    let screen_valid = initial.screen_valid();
    if !screen_valid {
        ansi::erase_display_all(&mut out)?;
    }

    let next_hashes: Vec<_> = (0..rows).map(|y| hash_row(next, y)).collect();
    let prev_hashes: Vec<_> = match &row_hashes {
        Some(cache) if cache.is_valid() && cache.rows() == rows => (0..rows).map(|y| cache.get(y).unwrap_or(0)).collect(),
        _ => (0..rows).map(|y| hash_row(prev, y)).collect(),
    };

    let full_frame = !screen_valid || damage.full_frame();
    let changed_rows: Vec<u16> = if full_frame {
        (0..rows).collect()
    } else {
        (0..rows).filter(|&y| prev_hashes[usize::from(y)] != next_hashes[usize::from(y)]).collect()
    };

    let path = if full_frame || changed_rows.len() > usize::from(limits.sweep_threshold_rows) { DiffPath::Sweep } else { DiffPath::Damage };

    let mut cursor = CursorModel::new(
        initial.cursor_col,
        initial.cursor_row,
        initial.validity.contains(TerminalStateValidity::STYLE).then_some(initial.style),
    );

    let mut rows_handled_by_scroll = vec![false; usize::from(rows)];

    if scroll_optimize && caps.has(CapabilityFlags::SCROLL_REGION) {
        if let Some(shift) = detect_scroll(&prev_hashes, &next_hashes) {
            if worth_scrolling(&shift, ESTIMATED_ROW_REDRAW_BYTES) {
                if collision_guard_holds(&prev_hashes, &next_hashes, &shift) {
                    emit_scroll(&mut out, &shift)?;
                    for y in shift.y0..shift.y1 {
                        rows_handled_by_scroll[usize::from(y)] = true;
                    }
                    stats.scroll_hit = true;
                } else {
                    stats.collision_guard_hits += 1;
                }
            }
        }
    }

    match path {
        DiffPath::Sweep => {
            for &y in &changed_rows {
                if rows_handled_by_scroll[usize::from(y)] {
                    continue;
                }
                let dirty = diff_row(&mut out, prev, next, y, 0, cols, &mut cursor)?;
                if dirty > 0 {
                    stats.dirty_rows += 1;
                    stats.dirty_cells += dirty;
                }
            }
        }
        DiffPath::Damage => {
            stats.damage_rects = u32::try_from(damage.rects().len()).unwrap_or(u32::MAX);
            stats.damage_cells = damage.count_cells();
            for rect in damage.rects() {
                let y0 = u16::try_from(rect.y0.max(0)).unwrap_or(0);
                let y1 = u16::try_from(rect.y1.max(0)).unwrap_or(0).min(rows);
                let x0 = u16::try_from(rect.x0.max(0)).unwrap_or(0);
                let x1 = u16::try_from(rect.x1.max(0)).unwrap_or(0).min(cols);
                if x0 >= x1 {
                    continue;
                }
                for y in y0..y1 {
                    if rows_handled_by_scroll[usize::from(y)] {
                        continue;
                    }
                    let dirty = diff_row(&mut out, prev, next, y, x0, x1, &mut cursor)?;
                    if dirty > 0 {
                        stats.dirty_rows += 1;
                        stats.dirty_cells += dirty;
                    }
                }
            }
        }
    }

    // Step 6: reset style only if something is still set and the caller
    // trusted the initial style.
    if initial.validity.contains(TerminalStateValidity::STYLE) {
        if let Some(style) = cursor.style {
            if style != Style::default() {
                ansi::sgr_reset(&mut out)?;
            }
        }
    }

    cursor.move_to(&mut out, desired.col, desired.row)?;

    if desired.visible != initial.cursor_visible || !initial.validity.contains(TerminalStateValidity::CURSOR_VISIBLE) {
        if desired.visible { ansi::cursor_show(&mut out)?; } else { ansi::cursor_hide(&mut out)?; }
    }
    if caps.has(CapabilityFlags::CURSOR_SHAPE)
        && (desired.shape != initial.cursor_shape || !initial.validity.contains(TerminalStateValidity::CURSOR_SHAPE))
    {
        ansi::cursor_shape(&mut out, desired.shape)?;
    }

    if caps.has(CapabilityFlags::SYNC_UPDATE) {
        let wrapped_len = SYNC_WRAP_OVERHEAD.saturating_add(out.len());
        if wrapped_len <= limits.max_output_bytes {
            let body = out.into_vec();
            let mut wrapped = ByteBuilder::with_capacity(limits.max_output_bytes);
            ansi::sync_update_begin(&mut wrapped)?;
            wrapped.push_bytes(&body)?;
            ansi::sync_update_end(&mut wrapped)?;
            out = wrapped;
        }
    }

    stats.bytes_emitted = u32::try_from(out.len()).unwrap_or(u32::MAX);

    if let Some(cache) = row_hashes {
        cache.refresh(next);
    }

    let mut final_state = *initial;
    final_state.cursor_col = desired.col;
    final_state.cursor_row = desired.row;
    final_state.cursor_visible = desired.visible;
    final_state.cursor_shape = desired.shape;
    final_state.style = Style::default();
    final_state.validity = TerminalStateValidity::CURSOR_POS
        .union(TerminalStateValidity::CURSOR_VISIBLE)
        .union(TerminalStateValidity::CURSOR_SHAPE)
        .union(TerminalStateValidity::STYLE)
        .union(TerminalStateValidity::SCREEN);

    tracing::debug!(?path, ?stats, "diff renderer present");

    Ok(DiffOutcome { bytes: out.into_vec(), final_state, stats, path })
}

const SYNC_WRAP_OVERHEAD: usize = crate::ansi::constants::SYNC_UPDATE_BEGIN.len() + crate::ansi::constants::SYNC_UPDATE_END.len();

fn emit_scroll(out: &mut ByteBuilder, shift: &super::scroll::ScrollShift) -> VtResult<()> {
    ansi::set_scroll_region(out, shift.y0, shift.y1 - 1)?;
    ansi::cursor_position(out, shift.y0, 0)?;
    if shift.shift > 0 {
        ansi::delete_lines(out, u16::try_from(shift.shift).unwrap_or(0))?;
    } else {
        ansi::insert_lines(out, u16::try_from(-shift.shift).unwrap_or(0))?;
    }
    ansi::reset_scroll_region(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::framebuffer::Cell;
    use crate::core::cell::style::RgbColor;

    fn limits() -> DiffLimits { DiffLimits { max_output_bytes: 1 << 16, sweep_threshold_rows: 2 } }

    fn desired_at(col: u16, row: u16) -> DesiredCursor {
        DesiredCursor { col, row, visible: true, shape: crate::ansi::constants::CURSOR_SHAPE_BLOCK_BLINK }
    }

    #[test]
    fn dimension_mismatch_is_invalid_argument() {
        let prev = Framebuffer::new(4, 1);
        let next = Framebuffer::new(5, 1);
        let damage: DamageTracker<4> = DamageTracker::new(4, 1);
        let err = render_diff(&prev, &next, &TerminalCapabilities::default(), &TerminalState::default(), desired_at(0, 0), &limits(), &damage, None, false)
            .unwrap_err();
        assert_eq!(err, VtError::invalid_argument("prev/next framebuffer dimension mismatch"));
    }

    #[test]
    fn invalid_screen_prepends_clear_and_marks_everything_dirty() {
        let prev = Framebuffer::new(3, 1);
        let mut next = Framebuffer::new(3, 1);
        next.set(1, 0, Cell::space(Style::new(RgbColor::WHITE, RgbColor::BLACK)));
        let mut damage: DamageTracker<4> = DamageTracker::new(3, 1);
        damage.begin_frame(3, 1);
        let initial = TerminalState::default();
        let outcome = render_diff(&prev, &next, &TerminalCapabilities::default(), &initial, desired_at(0, 0), &limits(), &damage, None, false).unwrap();
        let rendered = String::from_utf8(outcome.bytes.clone()).unwrap();
        assert!(rendered.contains("\x1b[2J"));
        assert_eq!(outcome.stats.dirty_rows, 1);
    }

    #[test]
    fn identical_frames_with_valid_screen_emit_no_row_writes() {
        let prev = Framebuffer::new(3, 1);
        let next = Framebuffer::new(3, 1);
        let mut damage: DamageTracker<4> = DamageTracker::new(3, 1);
        damage.begin_frame(3, 1);
        let mut initial = TerminalState::default();
        initial.validity = initial.validity.union(TerminalStateValidity::SCREEN);
        let outcome = render_diff(&prev, &next, &TerminalCapabilities::default(), &initial, desired_at(0, 0), &limits(), &damage, None, false).unwrap();
        assert_eq!(outcome.stats.dirty_rows, 0);
    }

    #[test]
    fn scroll_by_one_row_is_detected_and_hits() {
        // §8 scenario 3: prev rows = [A,B,C], next rows = [B,C,D].
        let mut prev = Framebuffer::new(1, 3);
        let mut next = Framebuffer::new(1, 3);
        for (y, ch) in [(0u16, "A"), (1, "B"), (2, "C")] {
            prev.set(0, y, Cell { grapheme: crate::core::cell::framebuffer::GraphemeBytes::from(ch), width: 1, style: Style::default() });
        }
        for (y, ch) in [(0u16, "B"), (1, "C"), (2, "D")] {
            next.set(0, y, Cell { grapheme: crate::core::cell::framebuffer::GraphemeBytes::from(ch), width: 1, style: Style::default() });
        }
        let mut damage: DamageTracker<8> = DamageTracker::new(1, 3);
        damage.begin_frame(1, 3);
        damage.mark_full_frame();
        let mut caps = TerminalCapabilities::default();
        caps.flags = CapabilityFlags::SCROLL_REGION;
        let mut initial = TerminalState::default();
        initial.validity = initial.validity.union(TerminalStateValidity::SCREEN);
        let outcome = render_diff(&prev, &next, &caps, &initial, desired_at(0, 0), &limits(), &damage, None, true).unwrap();
        assert!(outcome.stats.scroll_hit);
        assert_eq!(outcome.stats.dirty_rows, 1);
    }
}
