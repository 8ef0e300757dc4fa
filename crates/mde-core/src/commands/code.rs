//! The code toggle.
//!
//! Picks between inline code, indented blocks and fenced blocks from the
//! selection shape and the code node (if any) around it:
//!
//! - several ranges, or one single-line range outside code (other than a
//!   bare cursor at the start of a line): toggle inline code
//! - inside an indented block: strip one level of indentation from it
//! - inside a fenced block: remove the fence lines, unless the selection
//!   runs past the block
//! - otherwise: wrap the range in a fence, unless that would cut through
//!   another fenced block

use super::inline::toggle_inline;
use super::lines_in;
use crate::changes::{Change, ChangeSet};
use crate::document::Document;
use crate::state::{EditorState, Transaction};
use crate::syntax::{NodeKind, SyntaxNode};
use crate::text::leading_whitespace;
use crate::types::{Selection, SelectionRange};

const FENCE_OPEN: &str = "```\n";
const FENCE_CLOSE: &str = "\n```";
/// Columns one level of indented code takes.
const CODE_INDENT: usize = 4;

pub fn code(state: &EditorState) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    if state.selection.len() > 1 {
        return toggle_inline(state, NodeKind::InlineCode, "`");
    }

    let doc = &state.doc;
    let range = state.selection.main();
    let node = doc.code_node_at(range.from(), false);
    let line = doc.line_at(range.from());
    let multi_line = doc.spans_lines(range.from(), range.to());
    let cursor_at_line_start = range.is_empty() && range.from() == line.from;

    let in_inline_code = node.is_some_and(|n| n.kind() == &NodeKind::InlineCode);
    if !multi_line && (in_inline_code || (node.is_none() && !cursor_at_line_start)) {
        return toggle_inline(state, NodeKind::InlineCode, "`");
    }

    match node.map(|n| (n, n.kind())) {
        Some((block, NodeKind::CodeBlock)) => dedent_block(doc, block),
        Some((fence, NodeKind::FencedCode)) => {
            if fence.to() < range.to() {
                tracing::debug!(fence_end = fence.to(), "selection leaves the fenced block");
                return None;
            }
            unwrap_fence(doc, fence)
        }
        _ => wrap_in_fence(doc, range, line.to),
    }
}

/// Strip one indentation level from every line of an indented block: one
/// tab if the indent has one, otherwise up to four spaces.
fn dedent_block(doc: &Document, block: SyntaxNode<'_>) -> Option<Transaction> {
    let mut changes = Vec::new();
    for line in lines_in(doc, block.from(), block.to()) {
        let indent = leading_whitespace(&line.text);
        if indent.is_empty() {
            continue;
        }
        match indent.chars().position(|c| c == '\t') {
            Some(tab) => changes.push(Change::delete(line.from + tab..line.from + tab + 1)),
            None => {
                let spaces = indent.chars().take_while(|&c| c == ' ').count();
                changes.push(Change::delete(line.from..line.from + spaces.min(CODE_INDENT)));
            }
        }
    }
    commit(doc, changes, None)
}

fn unwrap_fence(doc: &Document, fence: SyntaxNode<'_>) -> Option<Transaction> {
    let open_end = (doc.line_at(fence.from()).to + 1).min(doc.len_chars());
    let mut changes = vec![Change::delete(fence.from()..open_end)];

    let closed = fence
        .children()
        .filter(|c| c.kind() == &NodeKind::CodeMark)
        .count()
        > 1;
    if closed {
        let close_from = doc
            .line_at(fence.to())
            .from
            .saturating_sub(1)
            .max(open_end);
        changes.push(Change::delete(close_from..fence.to()));
    }
    commit(doc, changes, None)
}

fn wrap_in_fence(doc: &Document, range: SelectionRange, line_end: usize) -> Option<Transaction> {
    if range.to() > line_end {
        for line in lines_in(doc, line_end + 1, range.to()) {
            if doc
                .code_node_at(line.from, false)
                .is_some_and(|n| n.kind() == &NodeKind::FencedCode)
            {
                tracing::debug!(line = line.number, "wrapping would split a fenced block");
                return None;
            }
        }
    }

    let shift = FENCE_OPEN.chars().count();
    let changes = vec![
        Change::insert(range.from(), FENCE_OPEN),
        Change::insert(range.to(), FENCE_CLOSE),
    ];
    let selection = Selection::single(range.anchor + shift, range.head + shift);
    commit(doc, changes, Some(selection))
}

fn commit(doc: &Document, changes: Vec<Change>, selection: Option<Selection>) -> Option<Transaction> {
    let changes = match ChangeSet::new(doc.len_chars(), changes) {
        Ok(changes) => changes,
        Err(err) => {
            tracing::warn!(error = %err, "code toggle produced invalid changes");
            return None;
        }
    };
    if changes.is_empty() {
        return None;
    }
    Some(Transaction::new(changes, selection, "toggle.code"))
}
