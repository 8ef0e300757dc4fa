//! Block insertion (horizontal rules, tables) padded with blank lines.

use super::inside_code_block;
use crate::changes::Change;
use crate::document::Document;
use crate::state::{EditorState, Transaction};
use crate::text::is_blank;
use crate::transform::{RangeEdit, change_by_range};
use crate::types::SelectionRange;

/// Replace each range with `content` as a standalone block. Blank lines are
/// added before and after as needed to separate it from neighbouring text;
/// the cursor lands right after the content.
pub fn insert_block(state: &EditorState, content: &str) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    let doc = &state.doc;
    change_by_range(state, "input.block", |range| block_range(doc, content, range))
}

fn block_range(doc: &Document, content: &str, range: SelectionRange) -> RangeEdit {
    let (from, to) = (range.from(), range.to());
    if inside_code_block(doc, from) || inside_code_block(doc, to) {
        return RangeEdit::Skipped(range);
    }

    let from_line = doc.line_at(from);
    let to_line = doc.line_at(to);

    let before = if from > from_line.from && !is_blank(&doc.slice(from_line.from..from)) {
        "\n\n"
    } else if doc
        .line(from_line.number.saturating_sub(1))
        .is_some_and(|prev| !prev.is_blank())
    {
        "\n"
    } else {
        ""
    };

    let after = if !is_blank(&doc.slice(to..to_line.to)) || to_line.number == doc.lines() {
        "\n\n"
    } else if doc.line(to_line.number + 1).is_some_and(|next| next.is_blank()) {
        "\n"
    } else {
        "\n\n"
    };

    let cursor = from + before.len() + content.chars().count();
    RangeEdit::changed(
        vec![Change::new(from, to, format!("{before}{content}{after}"))],
        SelectionRange::cursor(cursor),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{HORIZONTAL_RULE, TABLE};
    use crate::state::EditorView;
    use crate::types::Selection;

    fn insert(text: &str, anchor: usize, head: usize, content: &str) -> (bool, String, SelectionRange) {
        let mut view = EditorView::new(EditorState::new(text, Selection::single(anchor, head)));
        let applied = view.run(|s| insert_block(s, content));
        (applied, view.text(), view.selection().main())
    }

    #[test]
    fn test_rule_after_text() {
        let (applied, text, sel) = insert("para", 4, 4, HORIZONTAL_RULE);
        assert!(applied);
        assert_eq!(text, "para\n\n-----\n\n");
        assert_eq!(sel, SelectionRange::cursor(11));
    }

    #[test]
    fn test_rule_in_empty_doc() {
        let (_, text, sel) = insert("", 0, 0, HORIZONTAL_RULE);
        assert_eq!(text, "-----\n\n");
        assert_eq!(sel, SelectionRange::cursor(5));
    }

    #[test]
    fn test_rule_on_blank_line_after_text() {
        // Cursor on the empty line below a paragraph, text follows directly.
        // The line's own break stays, so the rule ends up two blank lines
        // above the next paragraph.
        let (_, text, sel) = insert("above\n\nbelow", 6, 6, HORIZONTAL_RULE);
        assert_eq!(text, "above\n\n-----\n\n\nbelow");
        assert_eq!(sel, SelectionRange::cursor(12));
    }

    #[test]
    fn test_rule_single_break_before_blank_line() {
        let (_, text, sel) = insert("above\n\n\nbelow", 6, 6, HORIZONTAL_RULE);
        assert_eq!(text, "above\n\n-----\n\n\nbelow");
        assert_eq!(sel, SelectionRange::cursor(12));
    }

    #[test]
    fn test_table_replaces_selection() {
        let (_, text, sel) = insert("x\n\nold\n", 3, 6, TABLE);
        assert_eq!(text, format!("x\n\n{TABLE}\n\n"));
        assert_eq!(sel, SelectionRange::cursor(3 + TABLE.chars().count()));
    }

    #[test]
    fn test_inside_code_block_skipped() {
        let (applied, text, _) = insert("```\ncode\n```", 6, 6, HORIZONTAL_RULE);
        assert!(!applied);
        assert_eq!(text, "```\ncode\n```");
    }
}
