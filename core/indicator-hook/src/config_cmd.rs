//! `agent-indicator config ...`: read and edit the indicator config file.

use clap::Subcommand;
use indicator_core::config::{get_by_path, render_value, shell_exports, ConfigStore};
use indicator_core::Result;
use std::env;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print one merged value (exits 1 if unset)
    Get {
        /// Dot-separated key, e.g. backends.sound.volume
        #[arg(value_name = "DOTPATH")]
        dotpath: String,
    },

    /// Store a value in the user config file
    Set {
        #[arg(value_name = "DOTPATH")]
        dotpath: String,

        /// true/false, a number, or any string
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,
    },

    /// Print AGENT_INDICATOR_* exports for `eval` in the indicator script
    ShellExports,

    /// Print the merged config as JSON
    Dump,

    /// Print the config file path
    Path,

    /// Create an empty config file if missing
    Ensure,
}

/// Returns false when a `get` found nothing.
pub fn run(command: ConfigCommand) -> Result<bool> {
    let store = ConfigStore::from_env()?;

    match command {
        ConfigCommand::Get { dotpath } => {
            let merged = store.load_merged()?;
            match get_by_path(&merged, &dotpath).filter(|value| !value.is_null()) {
                Some(value) => println!("{}", render_value(value)),
                None => return Ok(false),
            }
        }
        ConfigCommand::Set { dotpath, value } => {
            store.set(&dotpath, &value)?;
            tracing::debug!(dotpath = %dotpath, path = %store.path().display(), "Config value set");
        }
        ConfigCommand::ShellExports => {
            let merged = store.load_merged()?;
            println!("{}", shell_exports(&merged, |key| env::var_os(key).is_some()));
        }
        ConfigCommand::Dump => {
            let merged = store.load_merged()?;
            println!("{}", render_value(&merged));
        }
        ConfigCommand::Path => println!("{}", store.path().display()),
        ConfigCommand::Ensure => {
            if store.ensure()? {
                println!("Created {}", store.path().display());
            } else {
                println!("Already exists: {}", store.path().display());
            }
        }
    }

    Ok(true)
}
