use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use recent_notes::config::{parse_relay_list, Config};
use recent_notes::notes::Aggregator;
use recent_notes::output::terminal;
use recent_notes::relay::{Transport, WebSocketTransport};

/// recent-notes: show the most recent map notes from Nostr relays.
///
/// Queries every configured relay in parallel, waits until each one has
/// finished or timed out, and prints the newest notes oldest-first.
#[derive(Parser)]
#[command(name = "recent-notes", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the most recent notes
    Fetch {
        /// Relay address to query (repeatable; replaces RECENT_NOTES_RELAYS)
        #[arg(long = "relay")]
        relays: Vec<String>,

        /// How many notes to show
        #[arg(long)]
        show: Option<usize>,

        /// Per-relay `limit` sent in the subscription
        #[arg(long)]
        limit: Option<u32>,

        /// Per-relay timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,

        /// Also print how each relay's session ended
        #[arg(long)]
        verbose: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("recent_notes=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            relays,
            show,
            limit,
            timeout_ms,
            json,
            verbose,
        } => {
            let mut config = Config::load()?;
            if !relays.is_empty() {
                config.relays = relays.iter().flat_map(|r| parse_relay_list(r)).collect();
            }
            if let Some(show) = show {
                config.tunables.show_count = show;
            }
            if let Some(limit) = limit {
                config.tunables.fetch_limit = limit;
            }
            if let Some(ms) = timeout_ms {
                config.tunables.per_source_timeout = Duration::from_millis(ms);
            }
            if let Err(e) = config.require_sources() {
                warn!(error = %e, "Fetching with an empty relay list");
            }

            let transport: Arc<dyn Transport> = Arc::new(WebSocketTransport::new());
            let aggregator = Aggregator::new(transport, config.tunables.clone());

            info!(relays = config.relays.len(), "Fetching recent notes");

            let spinner = if json {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Loading recent notes…");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = aggregator
                .run(&config.sources(), &config.tunables.filter())
                .await;

            spinner.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                let now = chrono::Utc::now().timestamp();
                terminal::display_notes(&outcome, now);
                if verbose {
                    terminal::display_source_summary(&outcome.sources);
                }
            }
        }

        Commands::Config => {
            let config = Config::load()?;
            let tunables = &config.tunables;

            println!("{}", "Relays:".bold());
            if config.relays.is_empty() {
                println!("  (none)");
            }
            for relay in &config.relays {
                println!("  {relay}");
            }
            println!("{}", "Tunables:".bold());
            println!("  content kind:        {}", tunables.content_kind);
            println!("  identity label kind: {}", tunables.identity_label_kind);
            println!("  username namespace:  {}", tunables.username_namespace);
            println!("  fetch limit:         {}", tunables.fetch_limit);
            println!("  show count:          {}", tunables.show_count);
            println!(
                "  per-relay timeout:   {} ms",
                tunables.per_source_timeout.as_millis()
            );
        }
    }

    Ok(())
}
