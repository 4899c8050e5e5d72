//! Prepare command implementation

use anyhow::{Context, Result};
use clap::Args;
use mm_user_mgmt_core::config::discover_settings;
use mm_user_mgmt_core::input::transform_export;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output target that writes to standard out
const STDOUT: &str = "stdout";

/// Convert a semicolon-separated membership export into an import CSV
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Membership export (semicolon separated)
    #[arg(default_value = "members.csv")]
    input: PathBuf,

    /// Output CSV, or `stdout`
    #[arg(long, default_value = "users.csv")]
    output: PathBuf,
}

/// Execute the prepare command
pub fn execute(args: PrepareArgs, config: Option<&Path>) -> Result<()> {
    let settings = discover_settings(config, false)?;
    let allowed = &settings.prepare.allowed_tags;

    let data = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let written = if args.output.as_os_str() == STDOUT {
        let stdout = std::io::stdout();
        transform_export(&data, stdout.lock(), allowed)?
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create {}", args.output.display()))?;
        let mut writer = BufWriter::new(file);
        let written = transform_export(&data, &mut writer, allowed)?;
        writer.flush()?;
        println!("Wrote {written} user(s) to {}", args.output.display());
        written
    };

    info!("Prepared {written} user(s) from {}", args.input.display());
    Ok(())
}
