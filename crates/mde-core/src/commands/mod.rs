//! Markdown editing commands.
//!
//! Every command has the [`Command`](crate::state::Command) shape: it reads
//! an [`EditorState`] and returns the transaction to dispatch, or `None`
//! when it does not apply (read-only editor, no valid target).

pub mod block;
pub mod code;
pub mod indent;
pub mod inline;
pub mod newline;
pub mod template;

use crate::changes::{Change, ChangeSet};
use crate::document::Document;
use crate::state::{EditorState, Transaction};
use crate::syntax::NodeKind;
use crate::text::Line;
use crate::types::{Affinity, SelectionRange};

pub use block::{BlockKind, toggle_block, toggle_heading};
pub use code::code;
pub use indent::{indent, indent_less};
pub use inline::toggle_inline;
pub use newline::insert_block;
pub use template::{Snippet, SnippetSession, insert_template};

pub const IMAGE_TEMPLATE: &str = r#"![${alt}](${url} "${title}") ${}"#;
pub const LINK_TEMPLATE: &str = "[${link}](${url}) ${}";
pub const HORIZONTAL_RULE: &str = "-----";
pub const TABLE: &str = "| Column 1 | Column 2 | Column 3 |\n\
                         | -------- | -------- | -------- |\n\
                         | Text     | Text     | Text     |";

pub fn bold(state: &EditorState) -> Option<Transaction> {
    toggle_inline(state, NodeKind::StrongEmphasis, "**")
}

pub fn italic(state: &EditorState) -> Option<Transaction> {
    toggle_inline(state, NodeKind::Emphasis, "_")
}

pub fn strikethrough(state: &EditorState) -> Option<Transaction> {
    toggle_inline(state, NodeKind::Strikethrough, "~~")
}

/// Cycle the heading level of every touched line: none, 1 … 6, none.
pub fn heading(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, None)
}

pub fn heading1(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, Some(1))
}

pub fn heading2(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, Some(2))
}

pub fn heading3(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, Some(3))
}

pub fn heading4(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, Some(4))
}

pub fn heading5(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, Some(5))
}

pub fn heading6(state: &EditorState) -> Option<Transaction> {
    toggle_heading(state, Some(6))
}

pub fn quote(state: &EditorState) -> Option<Transaction> {
    toggle_block(state, BlockKind::Quote)
}

pub fn unordered_list(state: &EditorState) -> Option<Transaction> {
    toggle_block(state, BlockKind::UnorderedList)
}

pub fn ordered_list(state: &EditorState) -> Option<Transaction> {
    toggle_block(state, BlockKind::OrderedList)
}

pub fn link(state: &EditorState) -> Option<Transaction> {
    insert_template(state, LINK_TEMPLATE)
}

pub fn image(state: &EditorState) -> Option<Transaction> {
    insert_template(state, IMAGE_TEMPLATE)
}

/// Horizontal rule on its own paragraph.
pub fn line(state: &EditorState) -> Option<Transaction> {
    insert_block(state, HORIZONTAL_RULE)
}

pub fn table(state: &EditorState) -> Option<Transaction> {
    insert_block(state, TABLE)
}

/// Every line touched by `from..=to`, in order.
pub(crate) fn lines_in(doc: &Document, from: usize, to: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut pos = from;
    loop {
        let line = doc.line_at(pos);
        let next = line.to + 1;
        lines.push(line);
        if next > to || next > doc.len_chars() {
            break;
        }
        pos = next;
    }
    lines
}

/// `range` as it reads after applying `changes` alone.
pub(crate) fn map_through(
    doc: &Document,
    changes: &[Change],
    range: SelectionRange,
    affinity: Affinity,
) -> SelectionRange {
    match ChangeSet::new(doc.len_chars(), changes.to_vec()) {
        Ok(set) => range.map(&set, affinity),
        Err(err) => {
            tracing::warn!(error = %err, "range changes do not form a change set");
            range
        }
    }
}

/// Whether `pos` sits inside a code block rather than on its edge.
pub(crate) fn inside_code_block(doc: &Document, pos: usize) -> bool {
    doc.code_node_at(pos, false)
        .is_some_and(|node| node.kind().is_code_block() && pos > node.from() && pos < node.to())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_in() {
        let doc = Document::new("a\nbb\nccc");
        let numbers: Vec<usize> = lines_in(&doc, 1, 6).iter().map(|l| l.number).collect();
        assert_eq!(numbers, [1, 2, 3]);
        assert_eq!(lines_in(&doc, 2, 2).len(), 1);
        // A range ending right after a newline touches the next line.
        assert_eq!(lines_in(&doc, 0, 2).len(), 2);
    }

    #[test]
    fn test_lines_in_trailing_newline() {
        let doc = Document::new("a\n");
        assert_eq!(lines_in(&doc, 0, 2).len(), 2);
    }
}
