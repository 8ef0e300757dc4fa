use mde_core::commands;
use mde_core::{
    EditorAction, EditorConfig, EditorState, EditorView, Key, KeyCombo, KeydownResult, Keymap,
    Platform, Selection, SelectionRange, execute_action, handle_keydown,
};

fn view(text: &str, anchor: usize, head: usize) -> EditorView {
    EditorView::new(EditorState::new(text, Selection::single(anchor, head)))
}

#[test]
fn editing_session() {
    let mut view = view("Title\n\nSome text here\n\nfirst\nsecond", 0, 0);

    assert!(view.run(commands::heading));
    assert_eq!(view.selection().main(), SelectionRange::cursor(2));

    view.set_selection(Selection::single(14, 18));
    assert!(view.run(commands::bold));
    assert_eq!(view.selection().main(), SelectionRange::new(16, 20));

    view.set_selection(Selection::single(29, 41));
    assert!(view.run(commands::unordered_list));
    assert_eq!(view.selection().main(), SelectionRange::new(29, 45));

    insta::assert_snapshot!(view.text(), @r"
    # Title

    Some **text** here

    * first
    * second
    ");
}

#[test]
fn fence_around_paragraph() {
    let mut view = view("alpha beta\ngamma", 0, 16);
    assert!(view.run(commands::code));
    insta::assert_snapshot!(view.text(), @r"
    ```
    alpha beta
    gamma
    ```
    ");

    // Toggling again restores the paragraph.
    assert!(view.run(commands::code));
    assert_eq!(view.text(), "alpha beta\ngamma");
}

#[test]
fn table_after_paragraph() {
    let mut view = view("intro", 5, 5);
    assert!(view.run(commands::table));
    insta::assert_snapshot!(view.text().trim_end(), @r"
    intro

    | Column 1 | Column 2 | Column 3 |
    | -------- | -------- | -------- |
    | Text     | Text     | Text     |
    ");
}

#[test]
fn heading_levels_across_lines() {
    let mut view = view("one\ntwo\n\n    code", 0, 7);
    assert!(view.run(|s| execute_action(s, &EditorAction::HeadingLevel(3))));
    assert_eq!(view.text(), "### one\n### two\n\n    code");
    assert_eq!(view.selection().main(), SelectionRange::new(4, 15));
}

#[test]
fn multiple_cursors_italic() {
    let state = EditorState::new(
        "red green blue",
        Selection::new(
            vec![
                SelectionRange::new(0, 3),
                SelectionRange::new(4, 9),
                SelectionRange::new(10, 14),
            ],
            2,
        ),
    );
    let mut view = EditorView::new(state);
    assert!(view.run(commands::italic));
    assert_eq!(view.text(), "_red_ _green_ _blue_");
    assert_eq!(
        view.selection().ranges(),
        &[
            SelectionRange::new(1, 4),
            SelectionRange::new(7, 12),
            SelectionRange::new(15, 19),
        ]
    );
    assert_eq!(view.selection().main(), SelectionRange::new(15, 19));
}

#[test]
fn partial_application_reports_false() {
    // The second range sits inside a code block and is left alone.
    let text = "plain\n\n```\ncode\n```";
    let state = EditorState::new(
        text,
        Selection::new(vec![SelectionRange::new(0, 5), SelectionRange::new(11, 15)], 0),
    );
    let mut view = EditorView::new(state);
    assert!(!view.run(commands::bold));
    assert_eq!(view.text(), "**plain**\n\n```\ncode\n```");
    assert_eq!(view.selection().ranges()[1], SelectionRange::new(15, 19));
}

#[test]
fn read_only_config_blocks_every_action() {
    let config = EditorConfig::from_toml("read_only = true").unwrap();
    let state = EditorState::new("some text", Selection::single(0, 4)).with_config(&config);
    for action in EditorAction::ALL {
        assert!(execute_action(&state, &action).is_none(), "{action}");
    }
}

#[test]
fn shortcuts_drive_commands() {
    let keymap = Keymap::default_bindings(Platform::Mac);
    let mut view = view("let x = 1;", 4, 5);

    let code = KeyCombo::parse("Mod-Alt-c", Platform::Mac).unwrap();
    assert_eq!(handle_keydown(&mut view, &keymap, &code), KeydownResult::Handled);
    assert_eq!(view.text(), "let `x` = 1;");

    assert_eq!(handle_keydown(&mut view, &keymap, &code), KeydownResult::Handled);
    assert_eq!(view.text(), "let x = 1;");

    view.set_selection(Selection::cursor(0));
    assert_eq!(
        handle_keydown(&mut view, &keymap, &KeyCombo::new(Key::Tab)),
        KeydownResult::Handled
    );
    assert_eq!(view.text(), "  let x = 1;");
}

#[test]
fn link_template_round() {
    let mut view = view("see  now", 4, 4);
    assert!(view.run(commands::link));
    assert_eq!(view.text(), "see [link](url)  now");
    assert_eq!(view.selection().main(), SelectionRange::new(5, 9));
    assert!(view.next_field());
    assert_eq!(view.selection().main(), SelectionRange::new(11, 14));
}
