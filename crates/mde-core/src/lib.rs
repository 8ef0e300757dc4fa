//! mde-core: syntax-tree-aware markdown editing commands.
//!
//! This crate provides:
//! - `Document`: an immutable rope snapshot with its parsed syntax tree
//! - `EditorState` / `Transaction`: command input and output
//! - `commands`: bold, italic, headings, lists, code, templates and more
//! - `Keymap` and `execute_action` for toolbar and shortcut dispatch
//! - upload placeholder and scroll sync state machines for editor hosts

pub mod actions;
pub mod changes;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod document;
pub mod error;
pub mod execute;
pub mod scroll_sync;
pub mod state;
pub mod syntax;
pub mod text;
pub mod transform;
pub mod types;
pub mod upload;

pub use actions::{EditorAction, Key, KeyCombo, KeydownResult, Keymap, Modifiers, shortcut_label};
pub use changes::{Change, ChangeSet};
pub use config::{EditorConfig, Platform};
pub use debounce::Debouncer;
pub use document::Document;
pub use error::{ChangeError, ConfigError, ParseError, UploadError};
pub use execute::{execute_action, handle_keydown};
pub use scroll_sync::{ScrollRequest, ScrollSource, ScrollSync};
pub use smol_str::SmolStr;
pub use state::{Command, EditorState, EditorView, Transaction};
pub use syntax::{NodeKind, Side, SyntaxNode, SyntaxTree};
pub use text::{EditorRope, Line, TextBuffer};
pub use transform::{RangeEdit, change_by_range};
pub use types::{Affinity, Selection, SelectionRange};
pub use upload::{PendingUpload, UploadFile, UploadResponse, Uploader};
