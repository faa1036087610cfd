mod aggregate;
mod app;
mod classifier;
mod cli;
mod config;
mod dataset;
mod embedding;
mod event;
mod llm;
mod model;
mod nlq;
mod ops;
mod providers;
mod repl;
mod report;
mod session;
mod teams;
mod ui;
mod util;

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{Action, App};
use cli::Command;
use session::Session;

const LOG_FILE: &str = "devsense.log";

/// Log to a file under the data dir; stdout belongs to the TUI and the prompt.
fn init_logging() -> Result<()> {
    let dir = config::data_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .context("Failed to open log file")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = cli::parse(&args)?;
    if command == Command::Help {
        cli::print_help();
        return Ok(());
    }

    let config = config::load_config()?;
    tracing::info!(?command, "starting");

    cli::run(command, &config).await
}

async fn run_dashboard(config: &config::AppConfig) -> Result<()> {
    println!("🔄 Loading Jira data...");
    let session = Session::connect(config).await?;

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(session);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Spawn event reader
    tokio::spawn(async move {
        event::run_event_loop(action_tx).await;
    });

    // Main loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(action) = action_rx.recv().await {
            app.update(action).await;
            if app.should_quit {
                break;
            }
        } else {
            break;
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
