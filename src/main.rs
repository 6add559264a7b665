//! fsx CLI application entry point
//!
//! This is the main executable for the fsx file explorer. It provides an
//! interactive shell over a live file tree plus one-shot commands for printing,
//! searching and exporting trees.
//!
//! # Usage
//!
//! ```bash
//! # Interactive explorer (default command)
//! fsx
//! fsx shell ~/projects
//!
//! # Print a tree
//! fsx tree ~/projects --json
//!
//! # Search by name (default), extension or content
//! fsx search report.pdf ~/documents --ext
//! fsx search "TODO" src --content
//!
//! # Copy paths into a folder
//! fsx export ~/backup notes.txt docs
//!
//! # Diagnostics on stderr
//! RUST_LOG=fsx=trace fsx -v tree .
//! ```
//!
//! # Configuration
//!
//! Settings live in the user's config directory (`~/.config/fsx/config.toml` on
//! Linux); a default file is written on first run. `--config <file>` reads
//! another one.

use fsx::{
    ExplorerError,
    cli::{Cli, Commands},
    commands::{self, CommandContext, search::SearchParams},
    config::ExplorerConfig,
    gateway::{FileSystemGateway, LocalGateway},
    output::TreeStyle,
    ui::{PromptDialog, StdoutWriter},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ExplorerError>;

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fsx={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Token cancelled by the first Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.log_level());

    let config = match &cli.config {
        Some(path) => ExplorerConfig::load_from(path)?,
        None => ExplorerConfig::load()?,
    };

    if cli.no_color || !config.display.colors {
        colored::control::set_override(false);
    }

    let quiet = cli.quiet || config.quiet;
    let writer = StdoutWriter::quiet(quiet);
    let gateway: Arc<dyn FileSystemGateway> = Arc::new(LocalGateway::new());
    let mut style = TreeStyle::from(&config.display);
    style.path_format = cli.path_format(config.display.path_format);

    let ctx = CommandContext {
        gateway: &gateway,
        config: &config,
        style,
        output: &writer,
    };

    match cli.get_command() {
        Commands::Shell { paths } => {
            commands::shell(&ctx, Arc::new(PromptDialog::new()), paths).await?;
        }
        Commands::Tree { paths, json } => {
            commands::tree(&ctx, &paths, json, cancel_on_interrupt()).await?;
        }
        Commands::Search {
            query,
            paths,
            criteria,
            json,
        } => {
            let params = SearchParams {
                query,
                paths,
                criteria: criteria.resolve(config.search),
                json,
            };
            commands::search(&ctx, params, cancel_on_interrupt()).await?;
        }
        Commands::Export { dest, paths } => {
            commands::export(&ctx, &dest, &paths).await?;
        }
    }

    Ok(())
}
