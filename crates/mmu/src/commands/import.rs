//! Import command implementation

use super::run::{RunArgs, run};
use anyhow::Result;
use clap::Args;
use mm_user_mgmt_core::config::{ConfigError, discover_settings};
use mm_user_mgmt_core::input::read_users_csv;
use std::path::{Path, PathBuf};
use tracing::info;

/// Create or update users from a CSV file
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV with columns firstname,lastname,email,team,tags
    #[arg(long)]
    csv: PathBuf,

    #[command(flatten)]
    run: RunArgs,
}

/// Execute the import command
pub fn execute(args: ImportArgs, config: Option<&Path>) -> Result<()> {
    let settings = discover_settings(config, true)?;
    if settings.default_team.is_none() {
        return Err(ConfigError::MissingSetting("default_team").into());
    }

    // The whole file is validated before connecting
    let records = read_users_csv(&args.csv)?;
    info!("Read {} user(s) from {}", records.len(), args.csv.display());

    run(
        "import",
        &args.run,
        &settings,
        &records,
        |record| record.email.as_str(),
        |reconciler, record| reconciler.import_user(record),
    )
}
