//! CLI entry point for Converse.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::presets::Preset;
use crate::timeline::{PresentationRole, TimelineView};

/// Converse CLI
#[derive(Parser, Debug)]
#[command(name = "converse", version, about = "Streaming conversation controller CLI")]
pub struct Cli {
    /// Settings file (defaults to ~/.converse/settings.toml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one turn against a recorded event script
    Replay(ReplayArgs),
    /// Print the resolved settings
    Settings,
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// JSON Lines file with one stream event per line
    pub events: PathBuf,

    /// User input for the turn
    #[arg(short, long)]
    pub input: String,

    /// Assistant preset (general, blog)
    #[arg(short, long, default_value_t = Preset::General)]
    pub preset: Preset,

    /// Markdown file loaded as the open post (blog preset)
    #[arg(long)]
    pub post: Option<PathBuf>,

    /// Delay between events in milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,

    /// Print the final view as JSON
    #[arg(long)]
    pub json: bool,
}

/// Plain-text rendering of a view, one entry per line.
pub fn render_text(view: &TimelineView) -> String {
    let mut out = String::new();
    for item in &view.items {
        let label = match item.role {
            PresentationRole::User => "you",
            PresentationRole::Ai => "assistant",
            PresentationRole::System => item.tool_name.as_deref().unwrap_or("tool"),
        };
        let _ = writeln!(out, "[{label}] {}", item.content);
    }
    let costs = view.costs;
    let _ = writeln!(
        out,
        "cost: input ${:.4} output ${:.4} total ${:.4}",
        costs.input, costs.output, costs.total
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Timeline;
    use crate::types::{CostTotals, Message};

    #[test]
    fn parses_replay_args() {
        let cli = Cli::parse_from([
            "converse", "replay", "turn.jsonl", "--input", "find X", "--preset", "blog", "--json",
        ]);
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.preset, Preset::Blog);
        assert_eq!(args.input, "find X");
        assert!(args.json);
        assert_eq!(args.delay_ms, 0);
    }

    #[test]
    fn renders_one_line_per_entry() {
        let mut timeline = Timeline::new();
        timeline.push(Message::user("find X"));
        timeline.push(Message::tool("Searching: \"X\" - Done", "search_web", false));
        timeline.push(Message::assistant("Found it"));
        let mut costs = CostTotals::default();
        costs.record(None, None, Some(0.002));

        let text = render_text(&TimelineView::project(&timeline, costs, false));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "[you] find X");
        assert_eq!(lines[1], "[search_web] Searching: \"X\" - Done");
        assert_eq!(lines[2], "[assistant] Found it");
        assert_eq!(lines[3], "cost: input $0.0000 output $0.0000 total $0.0020");
    }
}
