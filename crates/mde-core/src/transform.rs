//! Per-range edits merged into one transaction.
//!
//! A command describes what to do for each selection range on its own. The
//! engine validates the combined changes and works out where every range
//! ends up once all of them are applied.

use crate::changes::{Change, ChangeSet, normalize};
use crate::state::{EditorState, Transaction};
use crate::types::{Selection, SelectionRange};

/// What a command wants for one selection range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeEdit {
    /// Changes against the original document. `range` is the selection
    /// expressed in the text produced by these changes alone.
    Changed {
        changes: Vec<Change>,
        range: SelectionRange,
    },
    /// Leave this range alone; the command reports partial success.
    Skipped(SelectionRange),
    /// Discard the whole batch.
    Abort,
}

impl RangeEdit {
    pub fn changed(changes: Vec<Change>, range: SelectionRange) -> Self {
        RangeEdit::Changed { changes, range }
    }
}

/// Run `f` for every selection range and merge the results.
///
/// Returns `None` when any range aborts, the ranges' changes collide, or
/// nothing would change.
pub fn change_by_range(
    state: &EditorState,
    user_event: &str,
    mut f: impl FnMut(SelectionRange) -> RangeEdit,
) -> Option<Transaction> {
    let doc_len = state.doc.len_chars();
    let mut tagged: Vec<(Change, usize)> = Vec::new();
    let mut ranges = Vec::with_capacity(state.selection.len());
    let mut partial = false;

    for (owner, &range) in state.selection.ranges().iter().enumerate() {
        match f(range) {
            RangeEdit::Changed { changes, range } => {
                tagged.extend(changes.into_iter().map(|c| (c, owner)));
                ranges.push(range);
            }
            RangeEdit::Skipped(range) => {
                tracing::trace!(?range, event = user_event, "range skipped");
                partial = true;
                ranges.push(range);
            }
            RangeEdit::Abort => {
                tracing::debug!(event = user_event, "batch aborted");
                return None;
            }
        }
    }

    let merged = match normalize(doc_len, tagged) {
        Ok(merged) => merged,
        Err(err) => {
            tracing::warn!(error = %err, event = user_event, "selection ranges produced conflicting changes");
            return None;
        }
    };
    if merged.is_empty() {
        tracing::debug!(event = user_event, "nothing to change");
        return None;
    }

    let mapped = ranges
        .iter()
        .enumerate()
        .map(|(owner, range)| {
            SelectionRange::new(
                map_own_pos(range.anchor, owner, &merged),
                map_own_pos(range.head, owner, &merged),
            )
        })
        .collect();
    let selection = Selection::new(mapped, state.selection.main_index());
    let changes = ChangeSet::from_normalized(doc_len, merged.into_iter().map(|(c, _)| c).collect());

    let mut tr = Transaction::new(changes, Some(selection), user_event);
    tr.partial = partial;
    Some(tr)
}

/// Map `pos`, given in the coordinates after `owner`'s own changes, to the
/// coordinates after every change. Other ranges' insertions at `pos` push it
/// forward. A change submitted by several ranges counts as each one's own.
fn map_own_pos(pos: usize, owner: usize, merged: &[(Change, Vec<usize>)]) -> usize {
    // Source offset consumed so far and its image in own/final coordinates.
    let mut orig = 0;
    let mut own = 0;
    let mut fin = 0;
    for (change, owners) in merged {
        let gap = change.from - orig;
        if pos < own + gap {
            return fin + (pos - own);
        }
        let own_at = own + gap;
        let fin_at = fin + gap;
        let inserted = change.inserted_len();
        if owners.contains(&owner) {
            if pos < own_at + inserted {
                return fin_at + (pos - own_at);
            }
            own = own_at + inserted;
        } else {
            let deleted = change.deleted_len();
            if deleted > 0 && pos == own_at {
                return fin_at;
            }
            if pos < own_at + deleted {
                return fin_at + inserted;
            }
            own = own_at + deleted;
        }
        fin = fin_at + inserted;
        orig = change.to;
    }
    fin + (pos - own)
}
