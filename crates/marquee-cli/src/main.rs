//! Marquee CLI - Playback controller inspection tool
//!
//! Features:
//! - Device classification from user-agent signals
//! - Embed URL building per device class
//! - Autoplay negotiation replay against a scripted player
//! - Trailer lookup through the catalog API

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod simulate;

/// Marquee CLI - Playback controller toolkit
#[derive(Parser)]
#[command(name = "marquee-cli")]
#[command(version)]
#[command(about = "Inspect device classification, embed URLs and autoplay negotiation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Controller configuration (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a device from environment signals
    Classify {
        /// User-agent string
        #[arg(short, long, default_value = "")]
        user_agent: String,

        /// Maximum simultaneous touch points
        #[arg(short, long, default_value = "0")]
        touch_points: u32,

        /// Platform identifier (e.g. MacIntel, Win32, iPhone)
        #[arg(short, long, default_value = "")]
        platform: String,
    },

    /// Build the embed URL for a device class
    Embed {
        /// Media id (or file path for local files)
        media: String,

        /// Embed provider (vimeo, youtube, file)
        #[arg(short, long, default_value = "vimeo")]
        provider: String,

        /// Device class (desktop, mobile, tablet); all three when omitted
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Replay a script of embed signals and inputs through the negotiator
    Simulate {
        /// Device class (desktop, mobile, tablet)
        #[arg(short, long, default_value = "desktop")]
        device: String,

        /// Comma separated `event@ms` steps, e.g. "loaded@100,rejected@150,playing@400"
        #[arg(short, long, default_value = "")]
        script: String,

        /// Keep the clock running until this offset (ms)
        #[arg(short, long, default_value = "5000")]
        until: u64,
    },

    /// Look up a title's trailer and print its embed URL
    Trailer {
        /// Title id
        id: u64,

        /// Media type (movie, tv)
        #[arg(short, long, default_value = "movie")]
        media_type: String,

        /// Device class to build the embed for
        #[arg(short, long, default_value = "desktop")]
        device: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify { user_agent, touch_points, platform } => {
            commands::classify(&user_agent, touch_points, &platform, &config, &cli.format)?;
        }
        Commands::Embed { media, provider, device } => {
            commands::embed(&media, &provider, device.as_deref(), &config, &cli.format)?;
        }
        Commands::Simulate { device, script, until } => {
            simulate::run(&device, &script, until, &config, &cli.format)?;
        }
        Commands::Trailer { id, media_type, device } => {
            commands::trailer(id, &media_type, &device, &config, &cli.format).await?;
        }
    }

    Ok(())
}
