//! Tabula CLI: a personal start page for the terminal.
//!
//! Runs the dashboard TUI by default; a query on the command line resolves
//! and opens it directly without entering the TUI.

mod nav;
mod tui;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use tabula_core::{CommandRegistry, DuckDuckGoSource, Resolver, SuggestionEngine, TabulaConfig};

/// Tabula: start-page dashboard and command bar
#[derive(Parser, Debug)]
#[command(name = "tabula", version, about, long_about = None)]
struct Cli {
    /// Query to resolve and open (starts the dashboard if omitted)
    query: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved URL instead of opening it
    #[arg(short, long)]
    print: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve a query and print where it would navigate
    Resolve {
        /// The query text, exactly as it would be typed in the search bar
        input: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration (defaults, file, and env merged)
    Show,
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The dashboard owns the terminal, so interactive runs log to file only.
    let interactive = cli.command.is_none() && cli.query.is_none();
    let filter = match cli.verbose {
        _ if cli.quiet || interactive => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Human-readable layer for stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "tabula", "tabula")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tabula.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Load configuration and validate the command table up front; a broken
    // registry should fail loudly here, not halfway into the dashboard.
    let config = TabulaConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    let config = Arc::new(config);
    let registry = CommandRegistry::new(config.commands.clone())
        .map_err(|e| anyhow::anyhow!("invalid command table: {e}"))?;
    let registry = Arc::new(registry);

    if let Some(command) = cli.command {
        return handle_command(command, &config, &registry, cli.config.as_deref());
    }

    if let Some(query) = &cli.query {
        let resolver = Resolver::new(Arc::clone(&config), Arc::clone(&registry));
        let descriptor = resolver.resolve(query);
        let url = match descriptor.url() {
            Some(url) => url,
            None => {
                tracing::info!("empty query, nothing to open");
                return Ok(());
            }
        };
        if cli.print {
            println!("{url}");
        } else {
            nav::Navigator::new(config.open_links_in_new_tab).open(url);
        }
        return Ok(());
    }

    let engine = Arc::new(SuggestionEngine::new(
        Arc::new(DuckDuckGoSource::new()),
        Arc::clone(&registry),
    ));
    tui::run(config, registry, engine).await
}

fn handle_command(
    command: Commands,
    config: &Arc<TabulaConfig>,
    registry: &Arc<CommandRegistry>,
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { input } => {
            let resolver = Resolver::new(Arc::clone(config), Arc::clone(registry));
            let descriptor = resolver.resolve(&input);
            match descriptor.url() {
                Some(url) => println!("{url}"),
                None => println!(),
            }
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let rendered = toml::to_string_pretty(config.as_ref())?;
                println!("{rendered}");
                Ok(())
            }
            ConfigAction::Path => {
                let path = match config_path {
                    Some(path) => path.to_path_buf(),
                    None => TabulaConfig::default_path()
                        .ok_or_else(|| anyhow::anyhow!("no home directory available"))?,
                };
                println!("{}", path.display());
                Ok(())
            }
        },
    }
}
