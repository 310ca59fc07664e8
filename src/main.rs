//! Converse CLI binary entry point.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use converse::cli::{self, Cli, Commands, ReplayArgs};
use converse::config::{settings, ControllerConfig, ConverseSettings};
use converse::controller::ChatController;
use converse::presets::blog::{MemoryPostEditor, PostEditor, PostSnapshot};
use converse::presets::{self, Preset};
use converse::transport::ReplayTransport;
use converse::types::BackendTarget;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CONVERSE_LOG";
const REPLAY_BACKEND: &str = "replay://local";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Replay(args) => handle_replay(cli.settings.as_deref(), args).await,
        Commands::Settings => handle_settings(cli.settings.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_replay(
    settings_path: Option<&Path>,
    args: ReplayArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = ConverseSettings::resolve(settings_path)?;
    let transport =
        ReplayTransport::load(&args.events)?.with_delay(Duration::from_millis(args.delay_ms));

    let editor = match args.preset {
        Preset::Blog => {
            let content = match &args.post {
                Some(path) => std::fs::read_to_string(path)?,
                None => String::new(),
            };
            Some(Arc::new(MemoryPostEditor::new(PostSnapshot {
                content,
                ..Default::default()
            })))
        }
        Preset::General => None,
    };
    let mut config: ControllerConfig = match &editor {
        Some(editor) => presets::blog::config(&settings, editor.clone()),
        None => presets::general::config(&settings),
    };
    if config.backend.is_none() {
        config.backend = Some(BackendTarget::new(REPLAY_BACKEND));
    }

    let controller = ChatController::new(config, Arc::new(transport));
    controller.set_input(args.input);
    let Some(result) = controller.send().await else {
        return Err("input is empty".into());
    };

    let view = controller.view();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", cli::render_text(&view));
        if let Some(editor) = &editor {
            let post = editor.snapshot();
            println!("--- post ---");
            println!("{}", post.content);
        }
    }

    match result.error {
        Some(error) if !result.is_completed() => Err(error.into()),
        _ => Ok(()),
    }
}

fn handle_settings(settings_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = settings_path
        .map(Path::to_path_buf)
        .unwrap_or_else(settings::default_path);
    let settings = ConverseSettings::resolve(Some(&path))?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&settings)?);
    Ok(())
}
