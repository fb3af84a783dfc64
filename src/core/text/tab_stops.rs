// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tab-stop computation: where a cursor at column `col` lands after a tab,
//! given a tab width (commonly 8).

/// The next tab stop strictly after `col`, under a tab width of `tab_width`
/// columns (0 and negative widths are treated as 1 to avoid an infinite
/// loop / division by zero).
#[must_use]
pub fn next_tab_stop(col: usize, tab_width: usize) -> usize {
    let width = tab_width.max(1);
    (col / width + 1) * width
}
