//! Template insertion with tab-stop fields.
//!
//! Template syntax:
//! - `${name}` a field whose placeholder text is `name`
//! - `${}` an empty field, usually the exit point
//! - `${2:name}` a field with an explicit tab order
//! - `\$` a literal dollar sign
//!
//! Numbered fields come first in number order, then unnumbered ones left to
//! right. Lines after the first inherit the indentation of the line the
//! template is inserted on.

use std::ops::Range;

use smol_str::SmolStr;

use super::inside_code_block;
use crate::changes::{Change, ChangeSet};
use crate::state::{EditorState, Transaction};
use crate::text::leading_whitespace;
use crate::types::{Affinity, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field { order: Option<u32>, name: SmolStr },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    segments: Vec<Segment>,
}

impl Snippet {
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.peek() {
                    Some(&next @ ('$' | '\\' | '{' | '}')) => {
                        text.push(next);
                        chars.next();
                    }
                    _ => text.push('\\'),
                },
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        // Not a field after all.
                        text.push_str("${");
                        text.push_str(&body);
                        continue;
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(parse_field(&body));
                }
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Self { segments }
    }

    /// Render the template. Returns the text and the field ranges (char
    /// offsets into the text) in tab order.
    pub fn expand(&self, indent: &str) -> (String, Vec<Range<usize>>) {
        let mut out = String::new();
        let mut len = 0;
        let mut fields: Vec<(Option<u32>, usize, Range<usize>)> = Vec::new();

        let push = |out: &mut String, len: &mut usize, s: &str| {
            for c in s.chars() {
                out.push(c);
                *len += 1;
                if c == '\n' {
                    out.push_str(indent);
                    *len += indent.chars().count();
                }
            }
        };

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => push(&mut out, &mut len, text),
                Segment::Field { order, name } => {
                    let start = len;
                    push(&mut out, &mut len, name);
                    fields.push((*order, fields.len(), start..len));
                }
            }
        }

        fields.sort_by_key(|(order, seen, _)| (order.is_none(), order.unwrap_or(0), *seen));
        (out, fields.into_iter().map(|(_, _, range)| range).collect())
    }
}

fn parse_field(body: &str) -> Segment {
    if let Some((num, name)) = body.split_once(':') {
        if let Ok(order) = num.parse::<u32>() {
            return Segment::Field {
                order: Some(order),
                name: SmolStr::new(name),
            };
        }
    }
    Segment::Field {
        order: None,
        name: SmolStr::new(body),
    }
}

/// Tab stops left behind by a template insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetSession {
    fields: Vec<Range<usize>>,
    active: usize,
}

impl SnippetSession {
    pub fn new(fields: Vec<Range<usize>>) -> Self {
        Self { fields, active: 0 }
    }

    pub fn fields(&self) -> &[Range<usize>] {
        &self.fields
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn current(&self) -> Option<Range<usize>> {
        self.fields.get(self.active).cloned()
    }

    /// Move to the neighbouring field, returning it.
    pub fn step(&mut self, forward: bool) -> Option<Range<usize>> {
        let next = if forward {
            self.active.checked_add(1)?
        } else {
            self.active.checked_sub(1)?
        };
        let field = self.fields.get(next)?.clone();
        self.active = next;
        Some(field)
    }

    /// On the last field there is nowhere left to go.
    pub fn is_finished(&self) -> bool {
        self.active + 1 >= self.fields.len()
    }

    /// Follow the fields through an edit. Text typed at a field's edges
    /// becomes part of the field.
    pub fn map(self, changes: &ChangeSet) -> Option<Self> {
        if self.fields.is_empty() {
            return None;
        }
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let start = changes.map_pos(f.start, Affinity::Before);
                let end = changes.map_pos(f.end, Affinity::After).max(start);
                start..end
            })
            .collect();
        Some(Self {
            fields,
            active: self.active,
        })
    }
}

/// Replace the selection with `template`, selecting the first field.
///
/// Single-range selections only, and never inside a code block.
pub fn insert_template(state: &EditorState, template: &str) -> Option<Transaction> {
    if state.read_only || state.selection.len() > 1 {
        return None;
    }
    let doc = &state.doc;
    let range = state.selection.main();
    if !doc.is_markdown_at(range.from()) {
        return None;
    }
    if inside_code_block(doc, range.from()) || inside_code_block(doc, range.to()) {
        tracing::debug!(?range, "template target inside code");
        return None;
    }

    let line = doc.line_at(range.from());
    let (text, fields) = Snippet::parse(template).expand(leading_whitespace(&line.text));
    let fields: Vec<Range<usize>> = fields
        .into_iter()
        .map(|f| range.from() + f.start..range.from() + f.end)
        .collect();

    let changes = ChangeSet::new(
        doc.len_chars(),
        vec![Change::new(range.from(), range.to(), text)],
    )
    .ok()?;
    let first = fields
        .first()
        .cloned()
        .unwrap_or(range.from()..range.from());

    let mut tr = Transaction::new(
        changes,
        Some(Selection::single(first.start, first.end)),
        "input.snippet",
    );
    tr.snippet = Some(SnippetSession::new(fields)).filter(|s| s.fields.len() > 1);
    Some(tr)
}
