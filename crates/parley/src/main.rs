// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a peer-to-peer chat engine in the terminal.
//!
//! This is the binary entry point.

mod demo;
mod render;
mod shell;

use clap::{Parser, Subcommand};
use parley_config::ParleyConfig;
use parley_core::ParleyError;

/// Parley - chat with a simulated counterpart from the terminal.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session (default).
    Shell,
    /// Play a scripted conversation and print every change.
    Demo {
        /// Shorten the delivery and reply delays tenfold.
        #[arg(long)]
        fast: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match parley_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.session.log_level);

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run_shell(config).await,
        Commands::Demo { fast } => demo::run_demo(config, fast).await,
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("parley: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &ParleyConfig) -> Result<(), ParleyError> {
    let rendered = parley_config::to_toml_string(config)
        .map_err(|e| ParleyError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the config level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = parley_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.session.name, "me");
        assert_eq!(config.delivery.delivery_delay_ms, 1000);
    }

    #[test]
    fn cli_parses_demo_flags() {
        let cli = Cli::try_parse_from(["parley", "demo", "--fast"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Demo { fast: true })));

        let cli = Cli::try_parse_from(["parley", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config)));

        let cli = Cli::try_parse_from(["parley"]).unwrap();
        assert!(cli.command.is_none());
    }
}
