use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use mde_core::{
    EditorAction, EditorConfig, EditorState, EditorView, Keymap, Platform, Selection,
    SelectionRange, execute_action,
};

#[derive(Parser)]
#[command(version, about = "mde - markdown editing commands from the shell", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an editor command on a file and print the result
    Apply {
        /// Markdown file to edit
        file: PathBuf,

        /// Toolbar command name, e.g. bold, heading2, orderedList
        action: EditorAction,

        /// Selection range as `anchor..head` or a bare cursor offset
        /// (character offsets). Repeat for multiple ranges.
        #[arg(long = "select", short = 's', value_parser = parse_range)]
        ranges: Vec<SelectionRange>,

        /// Editor config (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the result back to the file instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// List the keyboard shortcuts
    Keys {
        /// Show macOS labels
        #[arg(long)]
        mac: bool,
    },
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    match Cli::parse().command {
        Commands::Apply {
            file,
            action,
            ranges,
            config,
            write,
        } => apply(&file, action, ranges, config.as_deref(), write),
        Commands::Keys { mac } => {
            let platform = if mac { Platform::Mac } else { Platform::Other };
            print_keys(&Keymap::default_bindings(platform));
            Ok(())
        }
    }
}

fn apply(
    file: &Path,
    action: EditorAction,
    ranges: Vec<SelectionRange>,
    config: Option<&Path>,
    write: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let text = std::fs::read_to_string(file).into_diagnostic()?;

    let selection = if ranges.is_empty() {
        Selection::cursor(0)
    } else {
        Selection::new(ranges, 0)
    };
    let state = EditorState::new(text.as_str(), selection).with_config(&config);
    let mut view = EditorView::new(state);

    let applied = view.run(|state| execute_action(state, &action));
    if !applied && view.text() == text {
        return Err(miette::miette!(
            help = "check the selection; commands decline inside code blocks and across lines",
            "`{action}` does not apply here"
        ));
    }
    if !applied {
        tracing::warn!(%action, "applied to some selection ranges only");
    }

    let ranges: Vec<String> = view
        .selection()
        .ranges()
        .iter()
        .map(|r| format!("{}..{}", r.anchor, r.head))
        .collect();
    tracing::info!(%action, selection = %ranges.join(","), "done");

    if write {
        std::fs::write(file, view.text()).into_diagnostic()?;
    } else {
        print!("{}", view.text());
    }
    Ok(())
}

fn print_keys(keymap: &Keymap) {
    for action in EditorAction::ALL {
        let shortcut = keymap.shortcut(action).unwrap_or_default();
        println!("{:<16} {:<24} {shortcut}", action.name(), action.title());
    }
}

fn parse_range(s: &str) -> std::result::Result<SelectionRange, String> {
    let offset = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid offset `{part}`: {err}"))
    };
    match s.split_once("..") {
        Some((anchor, head)) => Ok(SelectionRange::new(offset(anchor)?, offset(head)?)),
        None => Ok(SelectionRange::cursor(offset(s)?)),
    }
}

fn init_tracing() {
    let default = if cfg!(debug_assertions) { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
