//! Upload placeholders.
//!
//! Dropped or pasted files show up in the document as placeholder links
//! (`[001 waiting...]()`, with a leading `!` for images) while the host
//! uploads them. The uploader tracks ids and produces the transactions that
//! keep the placeholders current; the transfer itself belongs to the host.

use regex::Regex;
use serde::Deserialize;
use smol_str::{SmolStr, format_smolstr};

use crate::changes::{Change, ChangeSet};
use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::state::{EditorState, Transaction};
use crate::text::TextBuffer;
use crate::transform::{RangeEdit, change_by_range};
use crate::types::SelectionRange;

const WAITING: &str = " waiting...";

/// A file offered to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: SmolStr,
    /// MIME type, e.g. `image/png`.
    pub mime: SmolStr,
}

impl UploadFile {
    pub fn new(name: impl Into<SmolStr>, mime: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.contains("image")
    }
}

/// An accepted file and the id its placeholder carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub uid: SmolStr,
    pub file: UploadFile,
}

impl PendingUpload {
    /// Placeholder text with `text` after the id.
    pub fn placeholder(&self, text: &str) -> String {
        let bang = if self.file.is_image() { "!" } else { "" };
        format!("{bang}[{}{text}]()", self.uid)
    }

    /// Matches this upload's placeholder whatever its status text, plus up
    /// to two trailing newlines when `with_newlines`.
    fn pattern(&self, with_newlines: bool) -> Option<Regex> {
        let bang = if self.file.is_image() { "!" } else { "" };
        let mut pattern = format!(r"{}\[{}.*\]\(\)", regex::escape(bang), regex::escape(&self.uid));
        if with_newlines {
            pattern.push_str(r"\n{0,2}");
        }
        match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(error = %err, uid = %self.uid, "bad placeholder pattern");
                None
            }
        }
    }
}

/// What the upload server said about a finished file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub url: SmolStr,
    #[serde(default = "default_title")]
    pub title: SmolStr,
}

fn default_title() -> SmolStr {
    SmolStr::new_static("image")
}

impl UploadResponse {
    /// Read a JSON response body.
    pub fn from_body(body: &str) -> Result<Self, UploadError> {
        Ok(serde_json::from_str(body)?)
    }

    fn link(&self, image: bool) -> String {
        let bang = if image { "!" } else { "" };
        format!("{bang}[{}]({})", self.title, self.url)
    }
}

#[derive(Debug, Clone)]
pub struct Uploader {
    allowed: Vec<Regex>,
    index: u32,
}

impl Uploader {
    pub fn new(config: &UploadConfig) -> Self {
        let allowed = config
            .allowed_types
            .iter()
            .filter_map(|pattern| {
                let re = format!("^{}", regex::escape(pattern).replace(r"\*", ".*"));
                Regex::new(&re)
                    .inspect_err(|err| tracing::warn!(%pattern, error = %err, "ignoring upload type"))
                    .ok()
            })
            .collect();
        Self { allowed, index: 0 }
    }

    /// Whether `mime` matches an allowed type. No patterns allows anything.
    pub fn is_allowed(&self, mime: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|re| re.is_match(mime))
    }

    /// Give every allowed file an id; the rest are dropped.
    pub fn prepare(&mut self, files: impl IntoIterator<Item = UploadFile>) -> Vec<PendingUpload> {
        let accepted: Vec<UploadFile> = files
            .into_iter()
            .filter(|file| {
                let allowed = self.is_allowed(&file.mime);
                if !allowed {
                    tracing::debug!(name = %file.name, mime = %file.mime, "upload type not allowed");
                }
                allowed
            })
            .collect();
        accepted
            .into_iter()
            .map(|file| {
                self.index += 1;
                PendingUpload {
                    uid: format_smolstr!("{:03}", self.index),
                    file,
                }
            })
            .collect()
    }

    /// Accept a batch of files and replace the selection with their
    /// placeholders, separated by blank lines.
    pub fn begin(
        &mut self,
        state: &EditorState,
        files: impl IntoIterator<Item = UploadFile>,
    ) -> Option<(Vec<PendingUpload>, Transaction)> {
        if state.read_only {
            return None;
        }
        let uploads = self.prepare(files);
        if uploads.is_empty() {
            return None;
        }
        let mut text: String = uploads
            .iter()
            .map(|upload| upload.placeholder(WAITING))
            .collect::<Vec<_>>()
            .join("\n\n");
        text.push_str("\n\n");
        let tr = replace_selection(state, &text)?;
        Some((uploads, tr))
    }

    /// Report transfer progress. `None` means the placeholder is gone and
    /// the host should abort the transfer.
    pub fn progress(
        &self,
        state: &EditorState,
        upload: &PendingUpload,
        loaded: u64,
        total: u64,
    ) -> Option<Transaction> {
        let percent = if total == 0 { 100 } else { loaded.min(total) * 100 / total };
        let text = upload.placeholder(&format!(" Uploading... {percent}%"));
        rewrite(state, upload, &text)
    }

    /// Swap the placeholder for the final link, or insert the link at the
    /// selection if the placeholder was deleted meanwhile.
    pub fn succeed(
        &self,
        state: &EditorState,
        upload: &PendingUpload,
        response: &UploadResponse,
    ) -> Option<Transaction> {
        let link = response.link(upload.file.is_image());
        rewrite(state, upload, &link).or_else(|| replace_selection(state, &link))
    }

    /// Remove the placeholder along with the blank line after it.
    pub fn fail(&self, state: &EditorState, upload: &PendingUpload) -> Option<Transaction> {
        tracing::debug!(uid = %upload.uid, "upload failed");
        rewrite(state, upload, "")
    }
}

/// Replace every occurrence of the placeholder with `text`.
fn rewrite(state: &EditorState, upload: &PendingUpload, text: &str) -> Option<Transaction> {
    let re = upload.pattern(text.is_empty())?;
    let rope = state.doc.text();
    let source = rope.to_string();
    let changes: Vec<Change> = re
        .find_iter(&source)
        .map(|m| {
            Change::new(
                rope.byte_to_char(m.start()),
                rope.byte_to_char(m.end()),
                text.to_string(),
            )
        })
        .collect();
    if changes.is_empty() {
        tracing::trace!(uid = %upload.uid, "placeholder not found");
        return None;
    }
    match ChangeSet::new(state.doc.len_chars(), changes) {
        Ok(changes) => Some(Transaction::new(changes, None, "input.upload")),
        Err(err) => {
            tracing::warn!(error = %err, "placeholder matches overlap");
            None
        }
    }
}

fn replace_selection(state: &EditorState, text: &str) -> Option<Transaction> {
    let len = text.chars().count();
    change_by_range(state, "input.upload", |range| {
        RangeEdit::changed(
            vec![Change::new(range.from(), range.to(), text.to_string())],
            SelectionRange::cursor(range.from() + len),
        )
    })
}
