//! Markdown syntax tree.
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Children are owned
//! as ordered id lists; the parent link is a plain index used only for
//! walking upwards. Offsets are char offsets into the document.
//!
//! Structure comes from the `markdown` crate's mdast (GFM). Delimiter
//! tokens (emphasis marks, code fences, heading marks) are not nodes in
//! mdast, so they are recovered from the source text after the fact.

use std::fmt;

use markdown::mdast;
use smol_str::SmolStr;

use crate::text::{EditorRope, TextBuffer};

/// Node type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading { level: u8, setext: bool },
    /// The `#` run of an ATX heading, or the underline of a setext heading.
    HeaderMark,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    /// Indented code block.
    CodeBlock,
    FencedCode,
    /// Fence run or inline code backtick run.
    CodeMark,
    /// Info string after an opening fence.
    CodeInfo,
    CodeText,
    InlineCode,
    Emphasis,
    StrongEmphasis,
    Strikethrough,
    EmphasisMark,
    StrikethroughMark,
    Link,
    Image,
    HorizontalRule,
    Table,
    Other(SmolStr),
}

impl NodeKind {
    /// Containers an inline toggle may cross between its two endpoints.
    pub fn allows_inline_span(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Paragraph
                | NodeKind::Blockquote
                | NodeKind::BulletList
                | NodeKind::OrderedList
                | NodeKind::ListItem
                | NodeKind::Heading { .. }
        )
    }

    pub fn is_code_block(&self) -> bool {
        matches!(self, NodeKind::CodeBlock | NodeKind::FencedCode)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Heading {
                level,
                setext: false,
            } => write!(f, "ATXHeading{level}"),
            NodeKind::Heading {
                level,
                setext: true,
            } => write!(f, "SetextHeading{level}"),
            NodeKind::Other(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Which way [`SyntaxTree::resolve`] leans at node boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Enter nodes that end at the position.
    Before,
    /// Enter only nodes that cover the position on both sides.
    #[default]
    Cover,
    /// Enter nodes that start at the position.
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub from: usize,
    pub to: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Immutable syntax tree for one document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Parse `rope` as GitHub-flavoured markdown.
    ///
    /// If the parser rejects the input the tree degrades to a bare
    /// `Document` node, which makes every command treat the text as plain.
    pub fn parse(rope: &EditorRope) -> Self {
        let source = rope.to_string();
        let mut builder = Builder::new(rope);
        match markdown::to_mdast(&source, &markdown::ParseOptions::gfm()) {
            Ok(root) => builder.build_children(&root, NodeId::ROOT),
            Err(err) => {
                tracing::warn!(error = %err, "markdown parse failed, using flat tree");
            }
        }
        builder.finish()
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.node(NodeId::ROOT)
    }

    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, id }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Innermost node at `pos`, leaning per `side`.
    pub fn resolve(&self, pos: usize, side: Side) -> SyntaxNode<'_> {
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                let (from, to) = (child.from(), child.to());
                let enter = match side {
                    Side::Before => from < pos && pos <= to,
                    Side::Cover => from < pos && pos < to,
                    Side::After => from <= pos && pos < to,
                };
                if enter {
                    node = child;
                    continue 'descend;
                }
                if from > pos {
                    break;
                }
            }
            return node;
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Borrowed cursor onto one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'t NodeKind {
        &self.tree.data(self.id).kind
    }

    pub fn from(&self) -> usize {
        self.tree.data(self.id).from
    }

    pub fn to(&self) -> usize {
        self.tree.data(self.id).to
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    pub fn children(self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id).children.iter().map(move |&id| tree.node(id))
    }

    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().next()
    }

    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.children().last()
    }

    /// First child of the given kind.
    pub fn child(&self, kind: &NodeKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// This node followed by its parents up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        std::iter::successors(Some(self), |node| node.parent())
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.kind(), self.from(), self.to())
    }
}

struct Builder<'a> {
    rope: &'a EditorRope,
    nodes: Vec<NodeData>,
}

impl<'a> Builder<'a> {
    fn new(rope: &'a EditorRope) -> Self {
        Self {
            rope,
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                from: 0,
                to: rope.len_chars(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn finish(mut self) -> SyntaxTree {
        // Synthesised marks are pushed before mdast children.
        for idx in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[idx].children);
            children.sort_by_key(|id| (self.nodes[id.index()].from, self.nodes[id.index()].to));
            self.nodes[idx].children = children;
        }
        SyntaxTree { nodes: self.nodes }
    }

    fn push(&mut self, kind: NodeKind, from: usize, to: usize, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            from,
            to,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    fn build_children(&mut self, node: &mdast::Node, parent: NodeId) {
        if let Some(children) = node.children() {
            for child in children {
                self.build(child, parent);
            }
        }
    }

    fn build(&mut self, node: &mdast::Node, parent: NodeId) {
        let Some(position) = node.position() else {
            self.build_children(node, parent);
            return;
        };
        let from = self.rope.byte_to_char(position.start.offset);
        let to = self.rope.byte_to_char(position.end.offset);

        use mdast::Node as N;
        let kind = match node {
            N::Text(_) => return,
            N::Root(_) => return self.build_children(node, parent),
            N::Heading(heading) => return self.heading(node, heading.depth, from, to, parent),
            N::Code(_) => return self.code(from, to, parent),
            N::Strong(_) => return self.delimited(node, NodeKind::StrongEmphasis, from, to, parent),
            N::Emphasis(_) => return self.delimited(node, NodeKind::Emphasis, from, to, parent),
            N::Delete(_) => return self.delimited(node, NodeKind::Strikethrough, from, to, parent),
            N::InlineCode(_) => return self.delimited(node, NodeKind::InlineCode, from, to, parent),
            N::Paragraph(_) => NodeKind::Paragraph,
            N::Blockquote(_) => NodeKind::Blockquote,
            N::List(list) if list.ordered => NodeKind::OrderedList,
            N::List(_) => NodeKind::BulletList,
            N::ListItem(_) => NodeKind::ListItem,
            N::Link(_) | N::LinkReference(_) => NodeKind::Link,
            N::Image(_) | N::ImageReference(_) => NodeKind::Image,
            N::ThematicBreak(_) => NodeKind::HorizontalRule,
            N::Table(_) => NodeKind::Table,
            N::TableRow(_) => NodeKind::Other(SmolStr::new_static("TableRow")),
            N::TableCell(_) => NodeKind::Other(SmolStr::new_static("TableCell")),
            N::Html(_) => NodeKind::Other(SmolStr::new_static("HTMLBlock")),
            N::Break(_) => NodeKind::Other(SmolStr::new_static("HardBreak")),
            N::Definition(_) => NodeKind::Other(SmolStr::new_static("LinkReference")),
            N::FootnoteDefinition(_) => NodeKind::Other(SmolStr::new_static("FootnoteDefinition")),
            N::FootnoteReference(_) => NodeKind::Other(SmolStr::new_static("FootnoteReference")),
            _ => NodeKind::Other(SmolStr::new_static("Unknown")),
        };
        let id = self.push(kind, from, to, parent);
        self.build_children(node, id);
    }

    /// Inline span whose delimiters sit at both ends of its range.
    fn delimited(
        &mut self,
        node: &mdast::Node,
        kind: NodeKind,
        from: usize,
        to: usize,
        parent: NodeId,
    ) {
        let (mark_kind, open, close) = match kind {
            NodeKind::StrongEmphasis => (NodeKind::EmphasisMark, 2, 2),
            NodeKind::Emphasis => (NodeKind::EmphasisMark, 1, 1),
            NodeKind::Strikethrough => (
                NodeKind::StrikethroughMark,
                self.run_len(from, '~'),
                self.run_len_back(to, '~'),
            ),
            _ => (
                NodeKind::CodeMark,
                self.run_len(from, '`'),
                self.run_len_back(to, '`'),
            ),
        };
        let id = self.push(kind, from, to, parent);
        let open_end = (from + open).min(to);
        let close_start = to.saturating_sub(close).max(open_end);
        self.push(mark_kind.clone(), from, open_end, id);
        self.push(mark_kind, close_start, to, id);
        self.build_children(node, id);
    }

    fn heading(&mut self, node: &mdast::Node, level: u8, from: usize, to: usize, parent: NodeId) {
        let mark_start = self.skip_blanks(from);
        if self.rope.char_at(mark_start) == Some('#') {
            // ATX headings own their whole line, trailing whitespace included.
            let to = to.max(self.rope.line_at(from).to);
            let id = self.push(
                NodeKind::Heading {
                    level,
                    setext: false,
                },
                from,
                to,
                parent,
            );
            let mark_end = mark_start + self.run_len(mark_start, '#');
            self.push(NodeKind::HeaderMark, mark_start, mark_end, id);
            self.build_children(node, id);
            return;
        }

        let id = self.push(
            NodeKind::Heading {
                level,
                setext: true,
            },
            from,
            to,
            parent,
        );
        let underline = self.rope.line_at(to);
        let start = self.skip_blanks(underline.from);
        if let Some(ch @ ('=' | '-')) = self.rope.char_at(start) {
            let end = (start + self.run_len(start, ch)).min(to);
            self.push(NodeKind::HeaderMark, start, end, id);
        }
        self.build_children(node, id);
    }

    fn code(&mut self, from: usize, to: usize, parent: NodeId) {
        let start = self.skip_blanks(from);
        let fence = match self.rope.char_at(start) {
            Some(ch @ ('`' | '~')) if self.run_len(start, ch) >= 3 => {
                Some((ch, self.run_len(start, ch)))
            }
            _ => None,
        };
        let Some((fence_char, fence_len)) = fence else {
            let id = self.push(NodeKind::CodeBlock, from, to, parent);
            self.push(NodeKind::CodeText, from, to, id);
            return;
        };

        let id = self.push(NodeKind::FencedCode, from, to, parent);
        let open_end = start + fence_len;
        self.push(NodeKind::CodeMark, start, open_end, id);

        let first = self.rope.line_at(from);
        let info_end = first.to.min(to);
        let info_from = self.skip_blanks(open_end).min(info_end);
        let mut info_to = info_end;
        while info_to > info_from && self.is_blank_at(info_to - 1) {
            info_to -= 1;
        }
        if info_to > info_from {
            self.push(NodeKind::CodeInfo, info_from, info_to, id);
        }

        if first.to >= to {
            return;
        }
        let body_from = first.to + 1;

        // A closing fence is a run at least as long as the opener, alone on
        // the node's last line (container prefixes aside).
        let mut close_end = to;
        while close_end > body_from && self.is_blank_at(close_end - 1) {
            close_end -= 1;
        }
        let close_len = self.run_len_back(close_end, fence_char);
        let close_start = close_end - close_len;
        let last = self.rope.line_at(close_end);
        let closed = close_len >= fence_len
            && last.number > first.number
            && self
                .rope
                .slice(last.from..close_start)
                .is_some_and(|prefix| prefix.chars().all(|c| c.is_whitespace() || c == '>'));

        let body_to = if closed {
            last.from.saturating_sub(1).max(body_from)
        } else {
            to
        };
        if body_to > body_from {
            self.push(NodeKind::CodeText, body_from, body_to, id);
        }
        if closed {
            self.push(NodeKind::CodeMark, close_start, close_end, id);
        }
    }

    fn is_blank_at(&self, pos: usize) -> bool {
        matches!(self.rope.char_at(pos), Some(' ' | '\t'))
    }

    fn skip_blanks(&self, mut pos: usize) -> usize {
        while self.is_blank_at(pos) {
            pos += 1;
        }
        pos
    }

    fn run_len(&self, start: usize, ch: char) -> usize {
        let mut len = 0;
        while self.rope.char_at(start + len) == Some(ch) {
            len += 1;
        }
        len
    }

    fn run_len_back(&self, end: usize, ch: char) -> usize {
        let mut len = 0;
        while len < end && self.rope.char_at(end - len - 1) == Some(ch) {
            len += 1;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SyntaxTree {
        SyntaxTree::parse(&EditorRope::from_str(text))
    }

    fn outline(node: SyntaxNode<'_>, out: &mut Vec<String>, depth: usize) {
        out.push(format!("{}{:?}", "  ".repeat(depth), node));
        for child in node.children() {
            outline(child, out, depth + 1);
        }
    }

    fn dump(text: &str) -> String {
        let tree = parse(text);
        let mut out = Vec::new();
        outline(tree.root(), &mut out, 0);
        out.join("\n")
    }

    #[test]
    fn test_strong_marks() {
        let tree = parse("a **bold** b");
        let node = tree.resolve(5, Side::Cover);
        assert_eq!(node.kind(), &NodeKind::StrongEmphasis);
        assert_eq!((node.from(), node.to()), (2, 10));
        let open = node.first_child().unwrap();
        let close = node.last_child().unwrap();
        assert_eq!((open.from(), open.to()), (2, 4));
        assert_eq!((close.from(), close.to()), (8, 10));
    }

    #[test]
    fn test_resolve_sides() {
        let tree = parse("`code` x");
        let in_code = |node: SyntaxNode<'_>| node.ancestors().any(|n| n.kind() == &NodeKind::InlineCode);
        // At the end of the inline code only Before enters it.
        let before = tree.resolve(6, Side::Before);
        assert_eq!(before.kind(), &NodeKind::CodeMark);
        assert!(in_code(before));
        assert_eq!(tree.resolve(6, Side::Cover).kind(), &NodeKind::Paragraph);
        // At its start only After does.
        assert!(in_code(tree.resolve(0, Side::After)));
        assert_eq!(tree.resolve(0, Side::Cover).kind(), &NodeKind::Document);
    }

    #[test]
    fn test_atx_heading_spans_line() {
        let tree = parse("## title  \nnext");
        let heading = tree.resolve(4, Side::Cover);
        assert_eq!(
            heading.kind(),
            &NodeKind::Heading {
                level: 2,
                setext: false
            }
        );
        assert_eq!(heading.to(), 10);
        let mark = heading.first_child().unwrap();
        assert_eq!(mark.kind(), &NodeKind::HeaderMark);
        assert_eq!((mark.from(), mark.to()), (0, 2));
    }

    #[test]
    fn test_empty_atx_heading() {
        let tree = parse("# ");
        let heading = tree.resolve(2, Side::Before);
        assert_eq!(heading.kind().to_string(), "ATXHeading1");
    }

    #[test]
    fn test_fenced_code_parts() {
        let text = "```rust\nlet x = 1;\n```\n";
        let tree = parse(text);
        insta::assert_snapshot!(dump(text), @r"
        Document@0..23
          FencedCode@0..22
            CodeMark@0..3
            CodeInfo@3..7
            CodeText@8..18
            CodeMark@19..22
        ");
        let body = tree.resolve(10, Side::Before);
        assert_eq!(body.kind(), &NodeKind::CodeText);
        assert_eq!(body.parent().unwrap().kind(), &NodeKind::FencedCode);
    }

    #[test]
    fn test_unclosed_fence_has_no_closing_mark() {
        let tree = parse("```\ncode");
        let fence = tree.resolve(5, Side::Cover);
        assert_eq!(fence.kind(), &NodeKind::CodeText);
        let fence = fence.parent().unwrap();
        assert_eq!(
            fence
                .children()
                .filter(|c| c.kind() == &NodeKind::CodeMark)
                .count(),
            1
        );
        assert!(fence.child(&NodeKind::CodeInfo).is_none());
    }

    #[test]
    fn test_indented_code() {
        let tree = parse("para\n\n    code\n");
        let node = tree.resolve(12, Side::Cover);
        assert_eq!(node.kind(), &NodeKind::CodeText);
        assert_eq!(node.parent().unwrap().kind(), &NodeKind::CodeBlock);
    }

    #[test]
    fn test_lists_and_quotes() {
        let tree = parse("> * item\n");
        let kinds: Vec<String> = tree
            .resolve(5, Side::Cover)
            .ancestors()
            .map(|n| n.kind().to_string())
            .collect();
        assert_eq!(
            kinds,
            ["Paragraph", "ListItem", "BulletList", "Blockquote", "Document"]
        );
    }

    #[test]
    fn test_strikethrough_marks() {
        let tree = parse("~~gone~~");
        let node = tree.resolve(3, Side::Cover);
        assert_eq!(node.kind(), &NodeKind::Strikethrough);
        assert_eq!(node.first_child().unwrap().to(), 2);
        assert_eq!(node.last_child().unwrap().from(), 6);
    }

    #[test]
    fn test_char_offsets_not_bytes() {
        // Multi-byte text before the strong span shifts byte offsets only.
        let tree = parse("héllo **b**");
        let node = tree.resolve(8, Side::Cover);
        assert_eq!(node.kind(), &NodeKind::StrongEmphasis);
        assert_eq!((node.from(), node.to()), (6, 11));
    }
}
