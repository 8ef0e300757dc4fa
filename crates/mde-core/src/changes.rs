//! Text changes and change sets.
//!
//! A [`Change`] replaces a char range of the original document. A
//! [`ChangeSet`] is a validated, ordered batch of changes against one
//! document snapshot: every offset refers to the original text, never to
//! the result of an earlier change in the same set.

use smol_str::SmolStr;
use std::ops::Range;

use crate::error::ChangeError;
use crate::text::{EditorRope, TextBuffer};
use crate::types::Affinity;

/// Replace `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: SmolStr,
}

impl Change {
    pub fn new(from: usize, to: usize, insert: impl Into<SmolStr>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    /// Pure insertion at `at`.
    pub fn insert(at: usize, text: impl Into<SmolStr>) -> Self {
        Self::new(at, at, text)
    }

    /// Pure deletion of `range`.
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, SmolStr::default())
    }

    /// Chars removed from the original.
    pub fn deleted_len(&self) -> usize {
        self.to - self.from
    }

    /// Chars added to the result.
    pub fn inserted_len(&self) -> usize {
        self.insert.chars().count()
    }

    /// Whether applying this change would leave the text untouched.
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.insert.is_empty()
    }

    fn range(&self) -> Range<usize> {
        self.from..self.to
    }
}

/// Validate and order a batch of changes, carrying a tag alongside each.
///
/// No-ops are dropped, the batch is stably sorted by `(from, to)` so
/// insertions at one point keep their submission order, and identical
/// non-empty replacements (two selection ranges removing the same
/// delimiter) collapse into one that keeps the tags of all submitters.
pub(crate) fn normalize<T>(
    doc_len: usize,
    items: Vec<(Change, T)>,
) -> Result<Vec<(Change, Vec<T>)>, ChangeError> {
    let mut items: Vec<(Change, T)> = items
        .into_iter()
        .filter(|(change, _)| !change.is_noop())
        .collect();
    for (change, _) in &items {
        if change.from > change.to {
            return Err(ChangeError::Inverted {
                from: change.from,
                to: change.to,
            });
        }
        if change.to > doc_len {
            return Err(ChangeError::OutOfBounds {
                from: change.from,
                to: change.to,
                len: doc_len,
            });
        }
    }
    items.sort_by_key(|(change, _)| (change.from, change.to));

    let mut out: Vec<(Change, Vec<T>)> = Vec::with_capacity(items.len());
    for (change, tag) in items {
        if let Some((prev, tags)) = out.last_mut() {
            if prev.from < prev.to && *prev == change {
                tags.push(tag);
                continue;
            }
            if prev.to > change.from {
                return Err(ChangeError::Overlap {
                    first: prev.range(),
                    second: change.range(),
                });
            }
        }
        out.push((change, vec![tag]));
    }
    Ok(out)
}

/// An ordered, non-overlapping batch of changes against one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    doc_len: usize,
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Build a change set for a document of `doc_len` chars.
    pub fn new(doc_len: usize, changes: Vec<Change>) -> Result<Self, ChangeError> {
        let items = normalize(doc_len, changes.into_iter().map(|c| (c, ())).collect())?;
        Ok(Self::from_normalized(
            doc_len,
            items.into_iter().map(|(c, _)| c).collect(),
        ))
    }

    /// A change set that changes nothing.
    pub fn empty(doc_len: usize) -> Self {
        Self {
            doc_len,
            changes: Vec::new(),
        }
    }

    pub(crate) fn from_normalized(doc_len: usize, changes: Vec<Change>) -> Self {
        Self { doc_len, changes }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Length of the document this set applies to.
    pub fn len_before(&self) -> usize {
        self.doc_len
    }

    /// Length of the document after applying.
    pub fn len_after(&self) -> usize {
        self.changes.iter().fold(self.doc_len, |len, c| {
            len - c.deleted_len() + c.inserted_len()
        })
    }

    /// Map an offset in the original document to the changed one.
    ///
    /// A position at the start of a replaced span stays at its start. One
    /// strictly inside moves to the start (`Before`) or end (`After`) of the
    /// replacement. At a pure insertion point the affinity decides which
    /// side of the inserted text the position ends up on.
    pub fn map_pos(&self, pos: usize, affinity: Affinity) -> usize {
        // Last original offset consumed and its image in the new text.
        let mut orig = 0;
        let mut mapped = 0;
        for change in &self.changes {
            if pos < change.from {
                break;
            }
            let new_from = mapped + (change.from - orig);
            let inserted = change.inserted_len();
            if change.to > pos {
                return if pos == change.from || affinity == Affinity::Before {
                    new_from
                } else {
                    new_from + inserted
                };
            }
            if change.to == pos && change.from == change.to && affinity == Affinity::Before {
                return new_from;
            }
            orig = change.to;
            mapped = new_from + inserted;
        }
        mapped + (pos - orig)
    }

    /// Apply to `rope`, producing a new rope. The input is not modified.
    pub fn apply(&self, rope: &EditorRope) -> Result<EditorRope, ChangeError> {
        if rope.len_chars() != self.doc_len {
            return Err(ChangeError::LengthMismatch {
                expected: self.doc_len,
                actual: rope.len_chars(),
            });
        }
        let mut out = rope.clone();
        // Back to front so earlier offsets stay valid.
        for change in self.changes.iter().rev() {
            out.replace(change.range(), &change.insert);
        }
        Ok(out)
    }
}
