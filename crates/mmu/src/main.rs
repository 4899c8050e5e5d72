//! mmu - Idempotent Mattermost user management
//!
//! Imports users from CSV, deactivates accounts and manages channel
//! membership. Every command can be previewed with `--dry-run`.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
