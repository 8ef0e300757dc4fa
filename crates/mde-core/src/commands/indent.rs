//! Tab / Shift-Tab.

use super::{lines_in, map_through};
use crate::changes::Change;
use crate::document::Document;
use crate::state::{EditorState, Transaction};
use crate::text::leading_whitespace;
use crate::transform::{RangeEdit, change_by_range};
use crate::types::{Affinity, SelectionRange};

/// Columns a tab indent unit stands for when removing spaces.
const TAB_WIDTH: usize = 4;

/// Insert the indent unit at the cursor, or at the start of every line a
/// non-empty range touches.
pub fn indent(state: &EditorState) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    let doc = &state.doc;
    let unit = state.indent_unit.as_str();
    change_by_range(state, "input.indent", |range| {
        let changes = if range.is_empty() {
            vec![Change::insert(range.head, unit)]
        } else {
            lines_in(doc, range.from(), range.to())
                .into_iter()
                .map(|line| Change::insert(line.from, unit))
                .collect()
        };
        let mapped = map_through(doc, &changes, range, Affinity::After);
        RangeEdit::changed(changes, mapped)
    })
}

/// Remove one level of indentation from every touched line: one tab, or
/// as many leading spaces as the indent unit is wide.
pub fn indent_less(state: &EditorState) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    let doc = &state.doc;
    let width = unit_width(&state.indent_unit);
    change_by_range(state, "delete.dedent", |range| dedent_range(doc, width, range))
}

fn dedent_range(doc: &Document, width: usize, range: SelectionRange) -> RangeEdit {
    let mut changes = Vec::new();
    for line in lines_in(doc, range.from(), range.to()) {
        let indent = leading_whitespace(&line.text);
        if let Some(tab) = indent.chars().position(|c| c == '\t') {
            changes.push(Change::delete(line.from + tab..line.from + tab + 1));
            continue;
        }
        let spaces = indent.chars().take_while(|&c| c == ' ').count().min(width);
        if spaces > 0 {
            changes.push(Change::delete(line.from..line.from + spaces));
        }
    }
    if changes.is_empty() {
        return RangeEdit::Skipped(range);
    }
    let mapped = map_through(doc, &changes, range, Affinity::After);
    RangeEdit::changed(changes, mapped)
}

fn unit_width(unit: &str) -> usize {
    if unit.contains('\t') {
        TAB_WIDTH
    } else {
        unit.chars().count().max(1)
    }
}
