mod display;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mini_dash_core::models::settings::{Theme, MAX_HOT_RELOAD_SECS, MIN_HOT_RELOAD_SECS};
use mini_dash_core::MiniDash;

#[derive(Parser)]
#[command(name = "mini-dash")]
#[command(about = "Mini Dash - CoinMarketCap category quotes on a refresh loop")]
struct Cli {
    /// Path to the settings file (created with defaults if missing)
    #[arg(short, long, env = "MINI_DASH_CONFIG", default_value = "config/config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the quote table every refresh cycle until Ctrl-C (default)
    Watch,
    /// Print the stored settings
    Show,
    /// Edit settings; fields left out keep their stored value
    Configure {
        /// Color theme
        #[arg(long, value_parser = parse_theme)]
        theme: Option<String>,

        /// CoinMarketCap API key (pass "" to clear)
        #[arg(long)]
        api_key: Option<String>,

        /// Category / portfolio id
        #[arg(long)]
        portfolio: Option<String>,

        /// Seconds between refreshes
        #[arg(long, value_parser = clap::value_parser!(u64).range(MIN_HOT_RELOAD_SECS..=MAX_HOT_RELOAD_SECS))]
        interval: Option<u64>,
    },
}

fn parse_theme(s: &str) -> Result<String, String> {
    s.parse::<Theme>()
        .map(|t| t.to_string())
        .map_err(|_| {
            let names: Vec<&str> = Theme::ALL.iter().map(Theme::as_str).collect();
            format!("expected one of: {}", names.join(", "))
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Level is overridden by `RUST_LOG`. Logs go to stderr; stdout carries the table.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let dash = MiniDash::open(&cli.config)
        .with_context(|| format!("Failed to open settings at {}", cli.config.display()))?;

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(&dash).await,
        Command::Show => {
            let settings = dash.settings().context("Failed to read settings")?;
            print!("{}", display::render_settings(&settings));
            Ok(())
        }
        Command::Configure {
            theme,
            api_key,
            portfolio,
            interval,
        } => configure(dash, theme, api_key, portfolio, interval).await,
    }
}

async fn watch(dash: &MiniDash) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                ctrl_c.cancel();
            }
            Err(e) => warn!(error = %e, "could not listen for Ctrl-C"),
        }
    });

    let handle = dash.spawn_refresh(tx, cancel.clone());

    // The sender lives in the refresh task, so this ends once the loop stops.
    while let Some(update) = rx.recv().await {
        print!("{}", display::render_table(&update));
        println!();
    }

    handle.await.context("Refresh loop panicked")?;
    Ok(())
}

async fn configure(
    dash: MiniDash,
    theme: Option<String>,
    api_key: Option<String>,
    portfolio: Option<String>,
    interval: Option<u64>,
) -> Result<()> {
    let dash = dash.map_controller(|c| c.with_feedback_pause(Duration::ZERO));
    let controller = dash.settings_controller();

    let mut form = controller.load_form().context("Failed to read settings")?;
    if let Some(theme) = theme {
        form.theme = theme;
    }
    if let Some(key) = api_key {
        form.api_key = key;
    }
    if let Some(portfolio) = portfolio {
        form.portfolio_id = portfolio;
    }
    if let Some(secs) = interval {
        form.hot_reload = secs;
    }

    controller
        .apply_edits(form)
        .await
        .context("Failed to save settings")?;

    let settings = dash.settings().context("Failed to read settings")?;
    print!("{}", display::render_settings(&settings));
    Ok(())
}
