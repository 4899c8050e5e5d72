//! Disable command implementation

use super::run::{RunArgs, run};
use anyhow::Result;
use clap::Args;
use mm_user_mgmt_core::config::discover_settings;
use mm_user_mgmt_core::input::{merge_emails, read_email_file};
use std::path::{Path, PathBuf};

/// Deactivate users by email
#[derive(Args, Debug)]
pub struct DisableArgs {
    /// Emails to disable
    #[arg(required_unless_present = "file")]
    emails: Vec<String>,

    /// File with emails: CSV with an `email` column, or one address per line
    #[arg(long)]
    file: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,
}

/// Execute the disable command
pub fn execute(args: DisableArgs, config: Option<&Path>) -> Result<()> {
    let settings = discover_settings(config, false)?;

    let from_file = match args.file {
        Some(ref path) => read_email_file(path)?,
        None => Vec::new(),
    };
    let emails = merge_emails(&args.emails, from_file)?;

    run(
        "disable",
        &args.run,
        &settings,
        &emails,
        |email| email.as_str(),
        |reconciler, email| reconciler.disable_user(email),
    )
}
