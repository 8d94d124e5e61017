//! agent-indicator: CLI hook handler for the agent activity indicator.
//!
//! Spawned by the host's plugin for the lifetime of a session. The plugin
//! pipes events and hook calls into `watch`, which reports indicator state
//! changes to the indicator script.
//!
//! ## Subcommands
//!
//! - `watch`: Reconcile the host stream on stdin (one JSON object per line)
//! - `config`: Read and edit `~/.config/agent-indicator/config.json`

mod config_cmd;
mod logging;
mod watch;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_AGENT: &str = "opencode";

#[derive(Parser)]
#[command(name = "agent-indicator")]
#[command(about = "Agent activity indicator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile host events from stdin until EOF
    Watch {
        /// Agent name passed to the indicator script
        #[arg(long, default_value = DEFAULT_AGENT)]
        agent: String,

        /// Indicator script (defaults to $AGENT_INDICATOR_DIR/agent-state.sh)
        #[arg(long, value_name = "PATH")]
        script: Option<PathBuf>,
    },

    /// Read or edit the indicator config
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommand,
    },
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init(matches!(cli.command, Commands::Watch { .. }));

    match cli.command {
        Commands::Watch { agent, script } => {
            // Indicator problems must never disrupt the host; only setup errors exit non-zero.
            if let Err(e) = watch::run(&agent, script) {
                tracing::error!(error = %e, "agent-indicator watch failed");
                eprintln!("agent-indicator: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Config { command } => match config_cmd::run(command) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                tracing::error!(error = %e, "agent-indicator config failed");
                eprintln!("agent-indicator: {}", e);
                std::process::exit(1);
            }
        },
    }
}
