//! Inline toggles: bold, italic, strikethrough, inline code.

use std::ops::Range;

use crate::changes::Change;
use crate::document::Document;
use crate::state::{EditorState, Transaction};
use crate::syntax::{NodeKind, Side};
use crate::transform::{RangeEdit, change_by_range};
use crate::types::SelectionRange;

/// Wrap each selection range in `mark`, or unwrap it if it already sits in
/// a `kind` node.
pub fn toggle_inline(state: &EditorState, kind: NodeKind, mark: &str) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    let event = format!("toggle.{kind}");
    let doc = &state.doc;
    change_by_range(state, &event, |range| toggle_range(doc, &kind, mark, range))
}

fn toggle_range(doc: &Document, kind: &NodeKind, mark: &str, range: SelectionRange) -> RangeEdit {
    if doc.spans_lines(range.from(), range.to()) || !doc.is_markdown_at(range.from()) {
        return RangeEdit::Skipped(range);
    }

    let mut node = doc.resolve(range.from(), Side::Cover);
    if matches!(node.kind(), NodeKind::Link | NodeKind::Image) {
        return RangeEdit::Skipped(range);
    }
    if !range.is_empty() && matches!(node.kind(), NodeKind::Document | NodeKind::Paragraph) {
        node = doc.resolve(range.from(), Side::After);
    }

    let enclosing = node
        .ancestors()
        .find(|n| n.kind() == kind || n.kind() == &NodeKind::Paragraph)
        .filter(|n| n.kind() == kind && n.to() >= range.to());
    if let Some(node) = enclosing {
        let (Some(open), Some(close)) = (node.first_child(), node.last_child()) else {
            return RangeEdit::Skipped(range);
        };
        let open = open.from()..open.to();
        let close_from = close.from();
        tracing::trace!(?open, close_from, "removing {kind}");
        return RangeEdit::changed(
            vec![Change::delete(open.clone()), Change::delete(close_from..close.to())],
            SelectionRange::new(
                unwrap_pos(range.anchor, &open, close_from),
                unwrap_pos(range.head, &open, close_from),
            ),
        );
    }

    if doc
        .code_node_at(range.from(), false)
        .is_some_and(|n| n.kind().is_code_block())
    {
        return RangeEdit::Skipped(range);
    }

    let from_node = doc.resolve(range.from(), Side::Cover);
    let to_node = doc.resolve(range.to(), Side::Cover);
    if from_node != to_node
        && !(from_node.kind().allows_inline_span() && to_node.kind().allows_inline_span())
    {
        tracing::trace!(?from_node, ?to_node, "range crosses incompatible nodes");
        return RangeEdit::Skipped(range);
    }

    let len = mark.chars().count();
    RangeEdit::changed(
        vec![
            Change::insert(range.from(), mark),
            Change::insert(range.to(), mark),
        ],
        SelectionRange::new(range.anchor + len, range.head + len),
    )
}

/// Where `pos` lands once the opening mark is removed. Positions inside
/// either mark clamp to the content between them; only the opening mark's
/// length shifts the result, so marks of unequal length are fine.
pub(crate) fn unwrap_pos(pos: usize, open: &Range<usize>, close_from: usize) -> usize {
    let content_end = close_from.max(open.end);
    pos.max(open.end).min(content_end) - open.end + open.start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextBuffer;
    use crate::types::Selection;

    fn run(text: &str, anchor: usize, head: usize, kind: NodeKind, mark: &str) -> Option<(String, SelectionRange)> {
        let state = EditorState::new(text, Selection::single(anchor, head));
        let tr = toggle_inline(&state, kind, mark)?;
        let next = state.apply(&tr).ok()?;
        Some((next.doc.text().to_string(), next.selection.main()))
    }

    #[test]
    fn test_bold_round_trip() {
        let (text, sel) = run("hello", 0, 5, NodeKind::StrongEmphasis, "**").unwrap();
        assert_eq!(text, "**hello**");
        assert_eq!(sel, SelectionRange::new(2, 7));

        let (text, sel) = run(&text, sel.anchor, sel.head, NodeKind::StrongEmphasis, "**").unwrap();
        assert_eq!(text, "hello");
        assert_eq!(sel, SelectionRange::new(0, 5));
    }

    #[test]
    fn test_backwards_selection_keeps_direction() {
        let (text, sel) = run("say hello", 9, 4, NodeKind::Emphasis, "_").unwrap();
        assert_eq!(text, "say _hello_");
        assert_eq!(sel, SelectionRange::new(10, 5));
    }

    #[test]
    fn test_shift_by_mark_length() {
        let (_, sel) = run("0123456789ab", 5, 10, NodeKind::StrongEmphasis, "**").unwrap();
        assert_eq!(sel, SelectionRange::new(7, 12));
    }

    #[test]
    fn test_empty_cursor_inserts_both_marks() {
        let (text, sel) = run("plain text", 4, 4, NodeKind::StrongEmphasis, "**").unwrap();
        assert_eq!(text, "plai****n text");
        assert_eq!(sel, SelectionRange::cursor(6));
    }

    #[test]
    fn test_cursor_inside_bold_unwraps() {
        let (text, sel) = run("a **bold** b", 6, 6, NodeKind::StrongEmphasis, "**").unwrap();
        assert_eq!(text, "a bold b");
        assert_eq!(sel, SelectionRange::cursor(4));
    }

    #[test]
    fn test_strikethrough_unwrap() {
        let (text, _) = run("~~gone~~", 2, 6, NodeKind::Strikethrough, "~~").unwrap();
        assert_eq!(text, "gone");
    }

    #[test]
    fn test_multi_line_rejected() {
        assert!(run("one\ntwo", 0, 7, NodeKind::StrongEmphasis, "**").is_none());
    }

    #[test]
    fn test_inside_link_rejected() {
        assert!(run("[text](http://x)", 2, 4, NodeKind::StrongEmphasis, "**").is_none());
    }

    #[test]
    fn test_inside_code_block_rejected() {
        assert!(run("    code here\n", 6, 8, NodeKind::StrongEmphasis, "**").is_none());
    }

    #[test]
    fn test_inside_tagged_fence_rejected() {
        assert!(run("```rust\nlet x;\n```", 9, 12, NodeKind::StrongEmphasis, "**").is_none());
    }

    #[test]
    fn test_read_only() {
        let state = EditorState::new("hello", Selection::single(0, 5)).with_read_only(true);
        assert!(bold_state(&state).is_none());
    }

    fn bold_state(state: &EditorState) -> Option<Transaction> {
        toggle_inline(state, NodeKind::StrongEmphasis, "**")
    }

    #[test]
    fn test_multiple_ranges() {
        let state = EditorState::new(
            "one two",
            Selection::new(vec![SelectionRange::new(0, 3), SelectionRange::new(4, 7)], 1),
        );
        let tr = bold_state(&state).unwrap();
        let next = state.apply(&tr).unwrap();
        assert_eq!(next.doc.text().to_string(), "**one** **two**");
        assert_eq!(
            next.selection.ranges(),
            &[SelectionRange::new(2, 5), SelectionRange::new(10, 13)]
        );
        assert_eq!(next.selection.main_index(), 1);
    }

    #[test]
    fn test_two_cursors_in_one_bold_span() {
        let state = EditorState::new(
            "**abcd**",
            Selection::new(vec![SelectionRange::cursor(3), SelectionRange::cursor(5)], 0),
        );
        let tr = bold_state(&state).unwrap();
        let next = state.apply(&tr).unwrap();
        assert_eq!(next.doc.text().to_string(), "abcd");
        assert_eq!(
            next.selection.ranges(),
            &[SelectionRange::cursor(1), SelectionRange::cursor(3)]
        );
    }

    #[test]
    fn test_unwrap_pos_asymmetric_marks() {
        // "~~ab~" : a two-char opening mark and a one-char closing mark.
        let open = 0..2;
        let close_from = 4;
        assert_eq!(unwrap_pos(0, &open, close_from), 0);
        assert_eq!(unwrap_pos(1, &open, close_from), 0);
        assert_eq!(unwrap_pos(3, &open, close_from), 1);
        assert_eq!(unwrap_pos(5, &open, close_from), 2);
    }

    #[test]
    fn test_unwrap_pos_symmetric_marks() {
        // "**hello**"
        let open = 0..2;
        assert_eq!(unwrap_pos(2, &open, 7), 0);
        assert_eq!(unwrap_pos(7, &open, 7), 5);
        assert_eq!(unwrap_pos(9, &open, 7), 5);
    }
}
