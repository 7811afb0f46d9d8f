// SPDX-FileCopyrightText: 2026 Classline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classline - client-side reliability tooling for school rooms.
//!
//! Inspects the locally stored latency metrics and sends messages through
//! the optimistic send path.

mod stats;
mod send;

use clap::{Parser, Subcommand};
use classline_config::model::ClasslineConfig;
use classline_core::{ClasslineError, MetricType};
use tracing::debug;

/// Classline - realtime client reliability tooling.
#[derive(Parser, Debug)]
#[command(name = "classline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show latency statistics per operation type.
    Stats {
        /// Only show this operation type (e.g. message_send).
        #[arg(long = "type", value_name = "TYPE")]
        metric_type: Option<MetricType>,
        /// Output JSON for scripting.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Show the most recent measurements, newest first.
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Delete all stored measurements.
    Clear,
    /// Print the resolved configuration as TOML.
    Config,
    /// Send a message to a room.
    Send {
        #[arg(long)]
        room: String,
        #[arg(long, required_unless_present = "image", conflicts_with = "image")]
        body: Option<String>,
        /// URL of an already uploaded image.
        #[arg(long)]
        image: Option<String>,
        /// Server id of the message being replied to.
        #[arg(long)]
        reply_to: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match classline_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            classline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.client.log_level);
    debug!(log_level = %config.client.log_level, "configuration loaded");

    let result = match cli.command {
        Commands::Stats {
            metric_type,
            json,
            plain,
        } => stats::run_stats(&config.telemetry, metric_type, json, plain),
        Commands::Recent { limit, json } => stats::run_recent(&config.telemetry, limit, json),
        Commands::Clear => stats::run_clear(&config.telemetry),
        Commands::Config => print_config(&config),
        Commands::Send {
            room,
            body,
            image,
            reply_to,
        } => {
            let args = send::SendArgs {
                room,
                body,
                image,
                reply_to,
            };
            match send::run_send(&config, args).await {
                Ok(true) => Ok(()),
                Ok(false) => std::process::exit(2),
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("classline: {e}");
        std::process::exit(1);
    }
}

/// Prints `config` as TOML with the access token redacted.
fn print_config(config: &ClasslineConfig) -> Result<(), ClasslineError> {
    println!("{}", render_config(config)?);
    Ok(())
}

fn render_config(config: &ClasslineConfig) -> Result<String, ClasslineError> {
    let mut shown = config.clone();
    if shown.endpoint.access_token.is_some() {
        shown.endpoint.access_token = Some("<redacted>".to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| ClasslineError::Internal(format!("failed to render config: {e}")))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("classline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
