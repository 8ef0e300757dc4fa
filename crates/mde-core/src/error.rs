//! Error types for mde-core.
//!
//! Only structural mistakes surface here. A command that does not apply to
//! the current selection is not an error; it returns `None`/`false`.

use miette::Diagnostic;
use std::path::PathBuf;

/// A change list that cannot form a valid change set.
#[derive(thiserror::Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum ChangeError {
    /// A change reaches past the end of the document.
    #[error("change {from}..{to} is out of bounds for a document of {len} chars")]
    #[diagnostic(code(mde::change::out_of_bounds))]
    OutOfBounds { from: usize, to: usize, len: usize },

    /// A change with `from > to`.
    #[error("change {from}..{to} is inverted")]
    #[diagnostic(code(mde::change::inverted))]
    Inverted { from: usize, to: usize },

    /// Two changes touch the same source text.
    #[error("changes {first:?} and {second:?} overlap")]
    #[diagnostic(
        code(mde::change::overlap),
        help("changes from separate selection ranges must not share source text")
    )]
    Overlap {
        first: std::ops::Range<usize>,
        second: std::ops::Range<usize>,
    },

    /// Applying a change set to a document it was not built for.
    #[error("change set expects a document of {expected} chars, got {actual}")]
    #[diagnostic(code(mde::change::length_mismatch))]
    LengthMismatch { expected: usize, actual: usize },
}

/// Failure loading an [`EditorConfig`](crate::config::EditorConfig).
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    #[diagnostic(code(mde::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config format: {0}")]
    #[diagnostic(code(mde::config::format), help("use a .toml or .json file"))]
    UnsupportedFormat(String),

    #[error(transparent)]
    #[diagnostic(code(mde::config::toml))]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(mde::config::json))]
    Json(#[from] serde_json::Error),
}

/// A toolbar action name or key binding that could not be parsed.
#[derive(thiserror::Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown editor action `{0}`")]
    #[diagnostic(code(mde::action::unknown), help("`mde keys` lists the available actions"))]
    UnknownAction(String),

    #[error("invalid key binding `{0}`")]
    #[diagnostic(
        code(mde::keymap::invalid),
        help("bindings look like `Mod-b`, `Shift-Tab` or `Mod-Alt-c`")
    )]
    InvalidKey(String),
}

/// An upload server response that does not describe the uploaded file.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum UploadError {
    #[error("upload response is not a JSON object with a `url`")]
    #[diagnostic(code(mde::upload::response))]
    Response(#[from] serde_json::Error),
}
