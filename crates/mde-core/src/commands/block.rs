//! Line-prefix toggles: headings, quotes, and lists.

use std::sync::LazyLock;

use regex::Regex;

use super::{lines_in, map_through};
use crate::changes::Change;
use crate::document::Document;
use crate::state::{EditorState, Transaction};
use crate::syntax::{NodeKind, Side};
use crate::text::leading_whitespace;
use crate::transform::{RangeEdit, change_by_range};
use crate::types::{Affinity, SelectionRange};

static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)>\s+").unwrap());
static UNORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)([*+-])\s+").unwrap());
static ORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)\d+\.\s+").unwrap());

/// Set every touched line to heading `level`, or cycle the level when
/// `None` (an unmarked line becomes level 1, level 6 loses its mark).
/// Lines inside code blocks are left alone.
pub fn toggle_heading(state: &EditorState, level: Option<u8>) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    let doc = &state.doc;
    change_by_range(state, "toggle.heading", |range| {
        let mut changes = Vec::new();
        for line in lines_in(doc, range.from(), range.to()) {
            if !doc.is_markdown_at(line.from.max(range.from())) {
                continue;
            }
            let heading = doc
                .resolve(line.to, Side::Before)
                .ancestors()
                .find(|n| matches!(n.kind(), NodeKind::Heading { setext: false, .. }));
            let mark = heading.and_then(|h| {
                h.first_child()
                    .filter(|m| m.kind() == &NodeKind::HeaderMark)
                    .map(|m| (h.from().max(line.from), m.from(), m.to()))
            });

            match mark {
                Some((start, mark_from, mark_to)) => {
                    let current = mark_to - mark_from;
                    let target = level.map_or((current + 1) % 7, usize::from);
                    let rest = doc.slice(mark_to..line.to);
                    let space = leading_whitespace(&rest).chars().count();
                    if level.is_some() && target == current && space == 1 {
                        continue;
                    }
                    changes.push(Change::new(start, mark_to, heading_prefix(target)));
                    changes.push(Change::delete(mark_to..mark_to + space));
                }
                None => {
                    if doc
                        .code_node_at(line.to, true)
                        .is_some_and(|n| n.kind().is_code_block())
                    {
                        continue;
                    }
                    let target = level.map_or(1, usize::from);
                    let indent = leading_whitespace(&line.text).chars().count();
                    changes.push(Change::new(
                        line.from,
                        line.from + indent,
                        heading_prefix(target),
                    ));
                }
            }
        }
        let range = map_through(doc, &changes, range, Affinity::After);
        RangeEdit::changed(changes, range)
    })
}

fn heading_prefix(level: usize) -> String {
    if level == 0 {
        String::new()
    } else {
        format!("{} ", "#".repeat(level))
    }
}

/// Line-prefix block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Quote,
    UnorderedList,
    OrderedList,
}

impl BlockKind {
    fn pattern(self) -> &'static Regex {
        match self {
            BlockKind::Quote => &QUOTE,
            BlockKind::UnorderedList => &UNORDERED,
            BlockKind::OrderedList => &ORDERED,
        }
    }

    /// Prefix for the `n`th line (1-based) of the range.
    fn marker(self, n: usize) -> String {
        match self {
            BlockKind::Quote => "> ".to_string(),
            BlockKind::UnorderedList => "* ".to_string(),
            BlockKind::OrderedList => format!("{n}. "),
        }
    }

    fn event(self) -> &'static str {
        match self {
            BlockKind::Quote => "toggle.quote",
            BlockKind::UnorderedList => "toggle.unorderedList",
            BlockKind::OrderedList => "toggle.orderedList",
        }
    }
}

/// Add or strip a quote/list prefix on every touched line. The first line
/// decides the direction. Touching a fenced code line cancels the whole
/// command.
pub fn toggle_block(state: &EditorState, kind: BlockKind) -> Option<Transaction> {
    if state.read_only {
        return None;
    }
    let doc = &state.doc;
    change_by_range(state, kind.event(), |range| block_range(doc, kind, range))
}

fn block_range(doc: &Document, kind: BlockKind, range: SelectionRange) -> RangeEdit {
    let pattern = kind.pattern();
    let exists = pattern.is_match(&doc.line_at(range.from()).text);

    let mut changes = Vec::new();
    for (idx, line) in lines_in(doc, range.from(), range.to()).into_iter().enumerate() {
        if doc
            .code_node_at(line.to, true)
            .is_some_and(|n| n.kind() == &NodeKind::FencedCode)
        {
            tracing::debug!(line = line.number, "fenced code in range, not toggling");
            return RangeEdit::Abort;
        }
        let text = if exists {
            pattern.replace(&line.text, "$1").into_owned()
        } else {
            format!("{}{}", kind.marker(idx + 1), line.text)
        };
        if text != line.text {
            changes.push(Change::new(line.from, line.to, text));
        }
    }
    let range = map_through(doc, &changes, range, Affinity::After);
    RangeEdit::changed(changes, range)
}
