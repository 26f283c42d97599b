//! Clipbeam CLI - client for QR-paired clipboard sync.

mod commands;
mod ui;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clipbeam")]
#[command(about = "Pair with a desktop host and sync clipboards", long_about = None)]
struct Cli {
    /// Device name to report
    #[arg(short, long, default_value_t = default_device_name())]
    name: String,

    #[command(subcommand)]
    command: Commands,
}

fn default_device_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "clipbeam-device".to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Connect with a scanned pairing URL and run the sync loop
    Run {
        /// Pairing URL from the host's QR code,
        /// e.g. ws://192.168.1.5:8000/ws/dev123?code=ABC123
        url: String,
    },
    /// Decode a pairing URL and show what it contains
    Info {
        /// Pairing URL to inspect
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("clipbeam=info".parse()?)
                .add_directive("clipbeam_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { url } => commands::run_sync(cli.name, url).await?,
        Commands::Info { url } => commands::show_info(&url)?,
    }

    Ok(())
}
