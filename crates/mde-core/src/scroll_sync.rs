//! Editor to preview scroll synchronisation.
//!
//! Decides which source line the preview should scroll to and when. The
//! host reports selection changes and editor scrolls, polls on its timer,
//! and maps the returned line to preview pixels itself.

use std::time::Duration;

use web_time::Instant;

use crate::config::ScrollSyncConfig;
use crate::debounce::Debouncer;
use crate::document::Document;
use crate::state::EditorState;
use crate::text::Line;

/// Slack added to the preview interval before following the cursor after
/// an edit, and the debounce for editor scroll events.
const SETTLE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSource {
    /// Following the cursor.
    Cursor,
    /// Following the top of the editor viewport.
    Viewport,
}

/// Ask the host to bring `line` (1-based) into view in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub line: usize,
    pub source: ScrollSource,
}

#[derive(Debug, Clone)]
pub struct ScrollSync {
    last_cursor_line: Option<usize>,
    last_scroll_line: Option<usize>,
    /// Set by an edit that moved the cursor to another line; swallows the
    /// scroll event the editor emits for it.
    lock_scroll: bool,
    to_cursor: Debouncer<()>,
    to_viewport: Debouncer<usize>,
}

impl ScrollSync {
    pub fn new(config: &ScrollSyncConfig) -> Self {
        Self {
            last_cursor_line: None,
            last_scroll_line: None,
            lock_scroll: false,
            to_cursor: Debouncer::new(Duration::from_millis(config.preview_interval_ms) + SETTLE),
            to_viewport: Debouncer::new(SETTLE),
        }
    }

    /// The selection changed. After an edit the preview has to re-render
    /// first, so following the cursor waits; a plain move follows now.
    pub fn on_selection(
        &mut self,
        state: &EditorState,
        doc_changed: bool,
        now: Instant,
    ) -> Option<ScrollRequest> {
        let cursor_line = state.doc.line_at(state.selection.main().head).number;
        self.lock_scroll = doc_changed && Some(cursor_line) != self.last_cursor_line;
        self.last_cursor_line = Some(cursor_line);
        self.to_viewport.cancel();

        if doc_changed {
            self.to_cursor.trigger(now, ());
            None
        } else {
            self.to_cursor.cancel();
            self.follow_cursor(state)
        }
    }

    /// The editor scrolled so that `first_visible_line` is at the top.
    pub fn on_scroll(&mut self, first_visible_line: usize, now: Instant) {
        if self.lock_scroll {
            tracing::trace!(first_visible_line, "scroll locked by edit");
        } else {
            self.to_cursor.cancel();
            self.to_viewport.trigger(now, first_visible_line);
        }
        self.lock_scroll = false;
    }

    /// Fire whatever became due by `now`.
    pub fn poll(&mut self, state: &EditorState, now: Instant) -> Option<ScrollRequest> {
        if self.to_cursor.poll(now).is_some() {
            return self.follow_cursor(state);
        }
        let first = self.to_viewport.poll(now)?;
        let line = state.doc.line(first).map(|line| non_blank_line(&state.doc, line))?;
        if self.last_scroll_line == Some(line.number) {
            return None;
        }
        // Viewport scrolls always re-sync on the next event.
        self.last_scroll_line = None;
        Some(ScrollRequest {
            line: line.number,
            source: ScrollSource::Viewport,
        })
    }

    /// Earliest instant `poll` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.to_cursor.deadline(), self.to_viewport.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn follow_cursor(&mut self, state: &EditorState) -> Option<ScrollRequest> {
        let line = non_blank_line(&state.doc, state.doc.line_at(state.selection.main().head));
        if self.last_scroll_line == Some(line.number) {
            return None;
        }
        self.last_scroll_line = Some(line.number);
        Some(ScrollRequest {
            line: line.number,
            source: ScrollSource::Cursor,
        })
    }
}

/// The nearest line with content: `line` itself, else the next non-blank
/// line below, else the nearest above. Lines in code blocks are returned
/// as they are.
pub fn non_blank_line(doc: &Document, line: Line) -> Line {
    if doc
        .code_node_at(line.from, false)
        .is_some_and(|node| node.kind().is_code_block())
    {
        return line;
    }

    let mut found = line.clone();
    while found.is_blank() {
        if found.to >= doc.len_chars() {
            break;
        }
        found = doc.line_at(found.to + 1);
    }
    while found.is_blank() {
        let start = line.from.min(found.from);
        if start == 0 {
            break;
        }
        found = doc.line_at(start - 1);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Selection;

    fn sync() -> ScrollSync {
        ScrollSync::new(&ScrollSyncConfig {
            preview_interval_ms: 700,
        })
    }

    fn number(doc: &Document, line: usize) -> usize {
        non_blank_line(doc, doc.line(line).unwrap()).number
    }

    #[test]
    fn test_non_blank_line() {
        let doc = Document::new("a\n\n\nb\n\n");
        assert_eq!(number(&doc, 1), 1);
        assert_eq!(number(&doc, 2), 4);
        // Nothing below, so look up.
        assert_eq!(number(&doc, 6), 4);
    }

    #[test]
    fn test_non_blank_line_in_code() {
        let doc = Document::new("```\n\ncode\n```");
        assert_eq!(number(&doc, 2), 2);
    }

    #[test]
    fn test_cursor_move_scrolls_now() {
        let mut sync = sync();
        let now = Instant::now();
        let state = EditorState::new("one\n\ntwo", Selection::cursor(5));
        let req = sync.on_selection(&state, false, now).unwrap();
        assert_eq!(req.line, 3);
        assert_eq!(req.source, ScrollSource::Cursor);
        // Same target line again: nothing to do.
        let state = EditorState::new("one\n\ntwo", Selection::cursor(6));
        assert_eq!(sync.on_selection(&state, false, now), None);
    }

    #[test]
    fn test_edit_waits_for_preview() {
        let mut sync = sync();
        let now = Instant::now();
        let state = EditorState::new("one\ntwo", Selection::cursor(5));
        assert_eq!(sync.on_selection(&state, true, now), None);
        assert_eq!(sync.next_deadline(), Some(now + Duration::from_millis(1000)));
        assert_eq!(sync.poll(&state, now + Duration::from_millis(999)), None);
        let req = sync.poll(&state, now + Duration::from_millis(1000)).unwrap();
        assert_eq!(req.line, 2);
    }

    #[test]
    fn test_scroll_after_edit_is_locked_once() {
        let mut sync = sync();
        let now = Instant::now();
        let state = EditorState::new("one\ntwo\nthree", Selection::cursor(5));
        sync.on_selection(&state, true, now);
        sync.on_scroll(1, now);
        // The edit's own scroll is ignored and the cursor follow stays armed.
        assert_eq!(sync.poll(&state, now + SETTLE).map(|r| r.source), None);
        let req = sync.poll(&state, now + Duration::from_millis(1000)).unwrap();
        assert_eq!(req.source, ScrollSource::Cursor);

        sync.on_scroll(3, now + Duration::from_millis(1100));
        assert!(sync.poll(&state, now + Duration::from_millis(1200)).is_none());
        let req = sync.poll(&state, now + Duration::from_millis(1400)).unwrap();
        assert_eq!(
            req,
            ScrollRequest {
                line: 3,
                source: ScrollSource::Viewport
            }
        );
    }

    #[test]
    fn test_scroll_cancels_cursor_follow() {
        let mut sync = sync();
        let now = Instant::now();
        let state = EditorState::new("one\ntwo", Selection::cursor(0));
        sync.on_selection(&state, false, now);
        // Edit on the same line: no lock.
        sync.on_selection(&state, true, now);
        sync.on_scroll(2, now);
        let req = sync.poll(&state, now + SETTLE).unwrap();
        assert_eq!(req.source, ScrollSource::Viewport);
        assert_eq!(sync.poll(&state, now + Duration::from_secs(2)), None);
    }
}
