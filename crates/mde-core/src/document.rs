//! Immutable document snapshots.
//!
//! A `Document` pairs the text with the syntax tree parsed from it. Edits
//! never mutate a document: applying a change set yields a new one with a
//! fresh tree, so commands can hold nodes borrowed from the snapshot they
//! were given for as long as they run.

use std::ops::Range;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::changes::ChangeSet;
use crate::error::ChangeError;
use crate::syntax::{NodeKind, Side, SyntaxNode, SyntaxTree};
use crate::text::{EditorRope, Line, TextBuffer};

#[derive(Debug, Clone)]
pub struct Document {
    text: EditorRope,
    tree: Arc<SyntaxTree>,
}

impl Document {
    pub fn new(text: impl Into<EditorRope>) -> Self {
        let text = text.into();
        let tree = Arc::new(SyntaxTree::parse(&text));
        Self { text, tree }
    }

    pub fn text(&self) -> &EditorRope {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_at(&self, pos: usize) -> Line {
        self.text.line_at(pos)
    }

    /// Line by 1-based number.
    pub fn line(&self, number: usize) -> Option<Line> {
        self.text.line(number)
    }

    pub fn lines(&self) -> usize {
        self.text.lines()
    }

    /// Text in `range`, or an empty string if the range is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> SmolStr {
        self.text.slice(range).unwrap_or_default()
    }

    /// Whether `from..to` crosses a line break.
    pub fn spans_lines(&self, from: usize, to: usize) -> bool {
        self.line_at(from).to < to
    }

    pub fn resolve(&self, pos: usize, side: Side) -> SyntaxNode<'_> {
        self.tree.resolve(pos, side)
    }

    /// Apply `changes`, producing the next snapshot.
    pub fn apply(&self, changes: &ChangeSet) -> Result<Document, ChangeError> {
        if changes.is_empty() {
            return Ok(self.clone());
        }
        let text = changes.apply(&self.text)?;
        tracing::trace!(
            changes = changes.changes().len(),
            len = text.len_chars(),
            "reparsing after edit"
        );
        Ok(Self::new(text))
    }

    /// The code node enclosing `pos`, if any.
    ///
    /// With `prefer_line_end` the lookup leans left so a block ending exactly
    /// at `pos` is found, and inline code is ignored. Without it, a miss is
    /// retried from the end of the line, which catches a cursor sitting
    /// before a fence that starts further along the same line.
    pub fn code_node_at(&self, pos: usize, prefer_line_end: bool) -> Option<SyntaxNode<'_>> {
        let side = if prefer_line_end {
            Side::Before
        } else {
            Side::Cover
        };
        let found = self
            .tree
            .resolve(pos, side)
            .ancestors()
            .find(|node| match node.kind() {
                NodeKind::InlineCode => !prefer_line_end,
                kind => kind.is_code_block(),
            });
        if found.is_some() || prefer_line_end {
            return found;
        }
        let line = self.line_at(pos);
        if pos + 1 != line.to {
            self.code_node_at(line.to, true)
        } else {
            None
        }
    }

    /// Whether `pos` is in markdown rather than an embedded language.
    ///
    /// The body of a fenced block with any info string belongs to that
    /// language, whether or not the language is known; everything else is
    /// markdown.
    pub fn is_markdown_at(&self, pos: usize) -> bool {
        !self.tree.resolve(pos, Side::Before).ancestors().any(|node| {
            node.kind() == &NodeKind::CodeText
                && node.parent().is_some_and(|fence| {
                    fence.kind() == &NodeKind::FencedCode
                        && fence.child(&NodeKind::CodeInfo).is_some()
                })
        })
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.text.to_string() == other.text.to_string()
    }
}

impl Eq for Document {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Change;

    #[test]
    fn test_apply_reparses() {
        let doc = Document::new("hello");
        let changes =
            ChangeSet::new(5, vec![Change::insert(0, "**"), Change::insert(5, "**")]).unwrap();
        let next = doc.apply(&changes).unwrap();
        assert_eq!(next.text().to_string(), "**hello**");
        assert_eq!(next.resolve(4, Side::Cover).kind(), &NodeKind::StrongEmphasis);
        // The old snapshot is untouched.
        assert_eq!(doc.text().to_string(), "hello");
    }

    #[test]
    fn test_code_node_inline() {
        let doc = Document::new("use `foo` here");
        let node = doc.code_node_at(6, false).unwrap();
        assert_eq!(node.kind(), &NodeKind::InlineCode);
        // Inline code never counts when leaning to the line end.
        assert!(doc.code_node_at(9, true).is_none());
    }

    #[test]
    fn test_code_node_retries_at_line_end() {
        let doc = Document::new("```\ncode\n```");
        // Cursor at the very start of the opening fence.
        let node = doc.code_node_at(0, false).unwrap();
        assert_eq!(node.kind(), &NodeKind::FencedCode);
        assert_eq!((node.from(), node.to()), (0, 12));
    }

    #[test]
    fn test_code_node_at_block_end() {
        let doc = Document::new("```\ncode\n```\nafter");
        assert_eq!(
            doc.code_node_at(12, true).map(|n| n.kind().clone()),
            Some(NodeKind::FencedCode)
        );
        assert!(doc.code_node_at(15, false).is_none());
    }

    #[test]
    fn test_is_markdown_at() {
        let doc = Document::new("```js\nlet a;\n```\n\n```\nplain\n```\n");
        assert!(doc.is_markdown_at(0));
        assert!(!doc.is_markdown_at(8));
        // Untagged fences stay markdown.
        assert!(doc.is_markdown_at(24));
    }

    #[test]
    fn test_spans_lines() {
        let doc = Document::new("ab\ncd");
        assert!(!doc.spans_lines(0, 2));
        assert!(doc.spans_lines(1, 4));
    }
}
