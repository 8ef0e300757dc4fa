//! Editor state, transactions, and the view that commits them.
//!
//! Commands are pure: they read an [`EditorState`] and describe an edit as a
//! [`Transaction`]. The [`EditorView`] is the one place a transaction turns
//! into a new state.

use smol_str::SmolStr;

use crate::changes::ChangeSet;
use crate::commands::template::SnippetSession;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::ChangeError;
use crate::types::{Affinity, Selection};

/// Everything a command may look at.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub doc: Document,
    pub selection: Selection,
    pub read_only: bool,
    /// Whitespace inserted by the indent command.
    pub indent_unit: SmolStr,
}

impl EditorState {
    pub fn new(doc: impl Into<Document>, selection: Selection) -> Self {
        let doc = doc.into();
        let selection = selection.clamp(doc.len_chars());
        Self {
            doc,
            selection,
            read_only: false,
            indent_unit: SmolStr::new_static("  "),
        }
    }

    /// Take the editing options from a config.
    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.read_only = config.read_only;
        self.indent_unit = config.indent_unit.clone();
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// The state after `tr`. Without an explicit selection the current one
    /// is mapped through the changes.
    pub fn apply(&self, tr: &Transaction) -> Result<EditorState, ChangeError> {
        let doc = self.doc.apply(&tr.changes)?;
        let selection = match &tr.selection {
            Some(selection) => selection.clamp(doc.len_chars()),
            None => self.selection.map(&tr.changes, Affinity::Before),
        };
        Ok(EditorState {
            doc,
            selection,
            read_only: self.read_only,
            indent_unit: self.indent_unit.clone(),
        })
    }
}

/// A described edit: changes against the state's document plus the
/// selection to show afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub changes: ChangeSet,
    pub selection: Option<Selection>,
    /// Tag for history grouping, e.g. `toggle.StrongEmphasis`.
    pub user_event: SmolStr,
    /// Some selection ranges were left alone.
    pub partial: bool,
    /// Tab stops opened by a template insertion.
    pub snippet: Option<SnippetSession>,
}

impl Transaction {
    pub fn new(changes: ChangeSet, selection: Option<Selection>, user_event: &str) -> Self {
        Self {
            changes,
            selection,
            user_event: SmolStr::new(user_event),
            partial: false,
            snippet: None,
        }
    }
}

/// A command inspects the state and proposes an edit, or declines.
pub type Command = fn(&EditorState) -> Option<Transaction>;

/// Holds the current state and commits transactions against it.
#[derive(Debug, Clone)]
pub struct EditorView {
    state: EditorState,
    snippet: Option<SnippetSession>,
}

impl EditorView {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            snippet: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn text(&self) -> String {
        use crate::text::TextBuffer;
        self.state.doc.text().to_string()
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.state.selection = selection.clamp(self.state.doc.len_chars());
    }

    pub fn snippet(&self) -> Option<&SnippetSession> {
        self.snippet.as_ref()
    }

    /// Run a command. `false` means it did not apply, or only applied to
    /// some of the selection ranges.
    pub fn run(&mut self, command: impl FnOnce(&EditorState) -> Option<Transaction>) -> bool {
        match command(&self.state) {
            Some(tr) => {
                let partial = tr.partial;
                self.dispatch(tr) && !partial
            }
            None => false,
        }
    }

    /// Commit a transaction. Returns `false` if it does not fit the current
    /// document.
    pub fn dispatch(&mut self, tr: Transaction) -> bool {
        let next = match self.state.apply(&tr) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(error = %err, event = %tr.user_event, "dropping transaction");
                return false;
            }
        };
        tracing::debug!(
            event = %tr.user_event,
            changes = tr.changes.changes().len(),
            partial = tr.partial,
            "dispatch"
        );
        self.snippet = match tr.snippet {
            Some(session) => Some(session),
            None => self
                .snippet
                .take()
                .and_then(|session| session.map(&tr.changes)),
        };
        self.state = next;
        true
    }

    /// Select the next snippet field. Reaching the last one ends the session.
    pub fn next_field(&mut self) -> bool {
        self.move_field(true)
    }

    pub fn prev_field(&mut self) -> bool {
        self.move_field(false)
    }

    fn move_field(&mut self, forward: bool) -> bool {
        let Some(session) = self.snippet.as_mut() else {
            return false;
        };
        let Some(field) = session.step(forward) else {
            return false;
        };
        if session.is_finished() {
            self.snippet = None;
        }
        self.set_selection(Selection::single(field.start, field.end));
        true
    }
}
