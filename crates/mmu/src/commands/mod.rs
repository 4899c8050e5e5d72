//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};
use mm_user_mgmt_core::config::load_dotenv;
use mm_user_mgmt_core::logging;
use std::path::PathBuf;
use tracing::{debug, warn};

mod channel;
mod disable;
mod import;
mod prepare;
mod run;

/// mmu - Idempotent Mattermost user management
#[derive(Parser, Debug)]
#[command(
    name = "mmu",
    version,
    about = "Idempotent Mattermost user management",
    long_about = "Import users from CSV, disable accounts and manage channel membership \
                  on a Mattermost server. Runs are dry unless --execute is given or the \
                  configuration enables wet runs."
)]
pub struct Cli {
    /// Configuration file (default: MMU_CONFIG, ./config.yaml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update users from a CSV file
    Import(import::ImportArgs),

    /// Deactivate users by email
    Disable(disable::DisableArgs),

    /// Add a user to, or remove a user from, a channel
    Channel(channel::ChannelArgs),

    /// Convert a membership export into an import CSV
    Prepare(prepare::PrepareArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let dotenv = std::env::current_dir().ok().map(|dir| load_dotenv(&dir));
        logging::init(self.debug);
        match dotenv {
            Some(Ok(Some(path))) => debug!("Loaded environment from {}", path.display()),
            Some(Err(e)) => warn!("{e}"),
            _ => {}
        }

        let config = self.config.as_deref();
        match self.command {
            Commands::Import(args) => import::execute(args, config),
            Commands::Disable(args) => disable::execute(args, config),
            Commands::Channel(args) => channel::execute(args, config),
            Commands::Prepare(args) => prepare::execute(args, config),
        }
    }
}
