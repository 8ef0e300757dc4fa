//! Editor actions, key combinations, and the default keymap.
//!
//! `EditorAction` names every toolbar command. Key bindings are written the
//! CodeMirror way (`Mod-b`, `Shift-Tab`, `Mod-Alt-c`), where `Mod` is Cmd on
//! macOS and Ctrl everywhere else.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

use crate::config::Platform;
use crate::error::ParseError;

static MOD: LazyLock<Regex> = LazyLock::new(|| Regex::new("(?i)mod").unwrap());

/// All toolbar commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Bold,
    Italic,
    Strikethrough,
    /// Cycle through heading levels.
    Heading,
    /// Set a fixed heading level, 1 to 6.
    HeadingLevel(u8),
    Quote,
    Code,
    Table,
    /// Horizontal rule.
    Line,
    UnorderedList,
    OrderedList,
    Link,
    Image,
    Indent,
    IndentLess,
}

impl EditorAction {
    pub const ALL: [EditorAction; 20] = [
        Self::Bold,
        Self::Italic,
        Self::Strikethrough,
        Self::Heading,
        Self::HeadingLevel(1),
        Self::HeadingLevel(2),
        Self::HeadingLevel(3),
        Self::HeadingLevel(4),
        Self::HeadingLevel(5),
        Self::HeadingLevel(6),
        Self::Quote,
        Self::Code,
        Self::Table,
        Self::Line,
        Self::UnorderedList,
        Self::OrderedList,
        Self::Link,
        Self::Image,
        Self::Indent,
        Self::IndentLess,
    ];

    /// Toolbar name, e.g. `unorderedList`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strikethrough => "strikethrough",
            Self::Heading => "heading",
            Self::HeadingLevel(1) => "heading1",
            Self::HeadingLevel(2) => "heading2",
            Self::HeadingLevel(3) => "heading3",
            Self::HeadingLevel(4) => "heading4",
            Self::HeadingLevel(5) => "heading5",
            Self::HeadingLevel(_) => "heading6",
            Self::Quote => "quote",
            Self::Code => "code",
            Self::Table => "table",
            Self::Line => "line",
            Self::UnorderedList => "unorderedList",
            Self::OrderedList => "orderedList",
            Self::Link => "link",
            Self::Image => "image",
            Self::Indent => "indent",
            Self::IndentLess => "indentLess",
        }
    }

    /// Human-readable tooltip title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Strikethrough => "Strikethrough",
            Self::Heading => "Heading",
            Self::HeadingLevel(1) => "Heading 1",
            Self::HeadingLevel(2) => "Heading 2",
            Self::HeadingLevel(3) => "Heading 3",
            Self::HeadingLevel(4) => "Heading 4",
            Self::HeadingLevel(5) => "Heading 5",
            Self::HeadingLevel(_) => "Heading 6",
            Self::Quote => "Quote",
            Self::Code => "Code",
            Self::Table => "Insert table",
            Self::Line => "Insert horizontal rule",
            Self::UnorderedList => "Unordered list",
            Self::OrderedList => "Ordered list",
            Self::Link => "Insert link",
            Self::Image => "Insert image",
            Self::Indent => "Indent",
            Self::IndentLess => "Outdent",
        }
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| ParseError::UnknownAction(s.to_string()))
    }
}

/// Key values for keyboard input.
///
/// Hosts convert their native key events to this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Alt,
    Control,
    Meta,
    Shift,
    Unidentified,
}

impl Key {
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a key name as it appears in a binding (`Tab`, `ArrowUp`, `b`).
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Space" | " " => Self::Space,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c.to_lowercase().collect::<String>().into()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Alt | Self::Control | Self::Meta | Self::Shift)
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// The primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(platform: Platform) -> Self {
        if platform.is_mac() {
            Self::META
        } else {
            Self::CTRL
        }
    }

    fn union(self, other: Self) -> Self {
        Self {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }
}

/// A key combination for triggering an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn primary(key: Key, platform: Platform) -> Self {
        Self::with_modifiers(key, Modifiers::primary(platform))
    }

    /// Parse a binding such as `Mod-Alt-c` or `Shift-Tab`, resolving `Mod`
    /// for `platform`.
    pub fn parse(binding: &str, platform: Platform) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidKey(binding.to_string());
        let (mods, key) = if binding == "-" {
            ("", "-")
        } else if let Some(mods) = binding.strip_suffix("--") {
            (mods, "-")
        } else {
            binding.rsplit_once('-').unwrap_or(("", binding))
        };

        let key = Key::from_name(key).ok_or_else(invalid)?;
        let mut modifiers = Modifiers::NONE;
        for name in mods.split('-').filter(|name| !name.is_empty()) {
            let modifier = match name.to_ascii_lowercase().as_str() {
                "mod" => Modifiers::primary(platform),
                "ctrl" | "control" | "c" => Modifiers::CTRL,
                "alt" | "a" => Modifiers::ALT,
                "shift" | "s" => Modifiers::SHIFT,
                "meta" | "cmd" | "m" => Modifiers::META,
                _ => return Err(invalid()),
            };
            modifiers = modifiers.union(modifier);
        }
        Ok(Self { key, modifiers })
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// A binding matched and its command applied.
    Handled,
    /// A binding matched but its command declined.
    Declined,
    /// Not a binding; let the host handle it.
    NotHandled,
    /// Navigation or a bare modifier.
    PassThrough,
}

/// Tooltip form of a binding: `Mod` becomes Cmd or Ctrl and every segment
/// is capitalised, so `Mod-Alt-c` reads `Ctrl-Alt-C`.
pub fn shortcut_label(binding: &str, platform: Platform) -> String {
    let primary = if platform.is_mac() { "Cmd" } else { "Ctrl" };
    MOD.replace(binding, primary)
        .to_lowercase()
        .split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// A binding as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub key: SmolStr,
    pub action: EditorAction,
}

const DEFAULT_BINDINGS: &[(&str, EditorAction)] = &[
    ("Tab", EditorAction::Indent),
    ("Shift-Tab", EditorAction::IndentLess),
    ("Mod-b", EditorAction::Bold),
    ("Mod-i", EditorAction::Italic),
    ("Mod-h", EditorAction::Heading),
    ("Mod-Alt-i", EditorAction::Image),
    ("Mod-'", EditorAction::Quote),
    ("Mod-Alt-c", EditorAction::Code),
    ("Mod-l", EditorAction::UnorderedList),
    ("Mod-Alt-l", EditorAction::OrderedList),
];

/// Key bindings resolved for one platform.
#[derive(Debug, Clone)]
pub struct Keymap {
    platform: Platform,
    bindings: Vec<Binding>,
    combos: HashMap<KeyCombo, EditorAction>,
}

impl Keymap {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            bindings: Vec::new(),
            combos: HashMap::new(),
        }
    }

    /// The editor's standard shortcuts.
    pub fn default_bindings(platform: Platform) -> Self {
        let mut keymap = Self::new(platform);
        for &(key, action) in DEFAULT_BINDINGS {
            if let Err(err) = keymap.bind(key, action) {
                tracing::warn!(error = %err, "skipping default binding");
            }
        }
        keymap
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Add a binding. A later binding for the same combination wins.
    pub fn bind(&mut self, key: &str, action: EditorAction) -> Result<(), ParseError> {
        let combo = KeyCombo::parse(key, self.platform)?;
        if let Some(previous) = self.combos.insert(combo.clone(), action) {
            tracing::debug!(key, %previous, %action, "rebinding key");
            let platform = self.platform;
            self.bindings
                .retain(|b| KeyCombo::parse(&b.key, platform).ok().as_ref() != Some(&combo));
        }
        self.bindings.push(Binding {
            key: SmolStr::new(key),
            action,
        });
        Ok(())
    }

    pub fn lookup(&self, combo: &KeyCombo) -> Option<EditorAction> {
        self.combos.get(combo).copied()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Label of the first binding for `action`, e.g. `Cmd-B`.
    pub fn shortcut(&self, action: EditorAction) -> Option<String> {
        self.bindings
            .iter()
            .find(|b| b.action == action)
            .map(|b| shortcut_label(&b.key, self.platform))
    }

    /// Toolbar tooltip: the title plus the shortcut when there is one.
    pub fn tooltip(&self, action: EditorAction) -> String {
        match self.shortcut(action) {
            Some(label) => format!("{} ({label})", action.title()),
            None => action.title().to_string(),
        }
    }
}
