//! Action execution.
//!
//! `execute_action` is the central dispatch from toolbar actions to
//! commands; `handle_keydown` adds the keymap lookup in front of it.

use crate::actions::{EditorAction, KeyCombo, KeydownResult, Keymap};
use crate::commands;
use crate::state::{EditorState, EditorView, Transaction};

/// Run the command behind `action` against `state`.
pub fn execute_action(state: &EditorState, action: &EditorAction) -> Option<Transaction> {
    let tr = match action {
        EditorAction::Bold => commands::bold(state),
        EditorAction::Italic => commands::italic(state),
        EditorAction::Strikethrough => commands::strikethrough(state),
        EditorAction::Heading => commands::heading(state),
        EditorAction::HeadingLevel(level) => commands::toggle_heading(state, Some((*level).clamp(1, 6))),
        EditorAction::Quote => commands::quote(state),
        EditorAction::Code => commands::code(state),
        EditorAction::Table => commands::table(state),
        EditorAction::Line => commands::line(state),
        EditorAction::UnorderedList => commands::unordered_list(state),
        EditorAction::OrderedList => commands::ordered_list(state),
        EditorAction::Link => commands::link(state),
        EditorAction::Image => commands::image(state),
        EditorAction::Indent => commands::indent(state),
        EditorAction::IndentLess => commands::indent_less(state),
    };
    if tr.is_none() {
        tracing::debug!(%action, "action did not apply");
    }
    tr
}

/// Handle a keydown event using the keymap.
///
/// Only shortcuts are handled here. Navigation and bare modifiers pass
/// through; other keys are left to the host's text input.
pub fn handle_keydown(view: &mut EditorView, keymap: &Keymap, combo: &KeyCombo) -> KeydownResult {
    if let Some(action) = keymap.lookup(combo) {
        return if view.run(|state| execute_action(state, &action)) {
            KeydownResult::Handled
        } else {
            KeydownResult::Declined
        };
    }
    if combo.key.is_navigation() || combo.key.is_modifier() {
        return KeydownResult::PassThrough;
    }
    KeydownResult::NotHandled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Key, Modifiers};
    use crate::config::Platform;
    use crate::types::{Selection, SelectionRange};

    fn view(text: &str, anchor: usize, head: usize) -> EditorView {
        EditorView::new(EditorState::new(text, Selection::single(anchor, head)))
    }

    #[test]
    fn test_every_action_dispatches() {
        let state = EditorState::new("word", Selection::single(0, 4));
        for action in EditorAction::ALL {
            if action == EditorAction::IndentLess {
                assert!(execute_action(&state, &action).is_none());
            } else {
                assert!(execute_action(&state, &action).is_some(), "{action}");
            }
        }
    }

    #[test]
    fn test_heading_level() {
        let mut view = view("title", 0, 0);
        assert!(view.run(|s| execute_action(s, &EditorAction::HeadingLevel(2))));
        assert_eq!(view.text(), "## title");
    }

    #[test]
    fn test_keydown_bold() {
        let keymap = Keymap::default_bindings(Platform::Mac);
        let mut view = view("hello", 0, 5);
        let combo = KeyCombo::primary(Key::character("b"), Platform::Mac);
        assert_eq!(handle_keydown(&mut view, &keymap, &combo), KeydownResult::Handled);
        assert_eq!(view.text(), "**hello**");
        assert_eq!(view.selection().main(), SelectionRange::new(2, 7));
    }

    #[test]
    fn test_keydown_shift_tab() {
        let keymap = Keymap::default_bindings(Platform::Other);
        let mut view = view("  item", 3, 3);
        let combo = KeyCombo::with_modifiers(Key::Tab, Modifiers::SHIFT);
        assert_eq!(handle_keydown(&mut view, &keymap, &combo), KeydownResult::Handled);
        assert_eq!(view.text(), "item");
    }

    #[test]
    fn test_keydown_declined_and_unbound() {
        let keymap = Keymap::default_bindings(Platform::Other);
        let mut view = view("flush", 0, 0);
        let shift_tab = KeyCombo::with_modifiers(Key::Tab, Modifiers::SHIFT);
        assert_eq!(handle_keydown(&mut view, &keymap, &shift_tab), KeydownResult::Declined);
        assert_eq!(
            handle_keydown(&mut view, &keymap, &KeyCombo::new(Key::ArrowDown)),
            KeydownResult::PassThrough
        );
        assert_eq!(
            handle_keydown(&mut view, &keymap, &KeyCombo::new(Key::character("x"))),
            KeydownResult::NotHandled
        );
    }
}
