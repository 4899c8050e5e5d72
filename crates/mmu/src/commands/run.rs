//! Execution mode, connection and reporting shared by the remote commands

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Args;
use mm_user_mgmt_core::api::{DryRunClient, MattermostClient};
use mm_user_mgmt_core::config::{Credentials, Settings};
use mm_user_mgmt_core::{
    ApiError, BatchAborted, BatchReport, Outcome, PlatformApi, Reconciler, run_batch,
};
use std::time::Duration;
use tracing::{debug, info};

/// Mode and output flags common to import, disable and channel
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Preview changes without applying them (wins over --execute)
    #[arg(long)]
    dry_run: bool,

    /// Apply changes (needed unless the configuration sets enable_wet_run)
    #[arg(long)]
    execute: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    pub fn is_dry_run(&self, settings: &Settings) -> bool {
        self.dry_run || !(self.execute || settings.enable_wet_run)
    }
}

/// Read credentials from the environment and open a verified session
fn connect(settings: &Settings) -> Result<MattermostClient> {
    let credentials = Credentials::from_env()?;
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let client = MattermostClient::connect(&credentials, timeout)?;
    info!("Connected to {}", client.api_url());
    Ok(client)
}

/// Reconcile `items` against the server and print the report.
///
/// Fails when the batch aborts or any item ends in an error outcome.
pub fn run<T, S, F>(
    command: &str,
    args: &RunArgs,
    settings: &Settings,
    items: &[T],
    subject: S,
    reconcile: F,
) -> Result<()>
where
    S: Fn(&T) -> &str,
    F: Fn(&Reconciler<'_>, &T) -> Result<Outcome, ApiError>,
{
    let dry_run = args.is_dry_run(settings);
    if dry_run {
        info!("Dry run: no changes will be made (use --execute to apply)");
    }

    let client = connect(settings)?;
    let recorder = DryRunClient::new(&client);
    let api: &dyn PlatformApi = if dry_run { &recorder } else { &client };
    let reconciler = Reconciler::new(api, settings);

    let delay = Duration::from_millis(settings.request_delay_ms);
    let result = run_batch(items, delay, subject, |item| reconcile(&reconciler, item));
    if dry_run {
        debug!("{} mutating call(s) planned", recorder.planned().len());
    }

    finish(command, dry_run, result, args.json)
}

/// Print the report, partial when the batch aborted, then turn failures into an error
fn finish(
    command: &str,
    dry_run: bool,
    result: Result<BatchReport, BatchAborted>,
    json: bool,
) -> Result<()> {
    let report = match result {
        Ok(report) => report,
        Err(aborted) => {
            print_report(command, dry_run, &aborted.report, json)?;
            return Err(aborted.into());
        }
    };

    print_report(command, dry_run, &report, json)?;

    let failed = report.errors().count();
    if failed > 0 {
        bail!("{failed} of {} record(s) failed", report.outcomes.len());
    }
    Ok(())
}

fn print_report(
    command: &str,
    dry_run: bool,
    report: &BatchReport,
    json: bool,
) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "command": command,
            "dry_run": dry_run,
            "timestamp": Utc::now().to_rfc3339(),
            "summary": report.summary(),
            "outcomes": report.outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if dry_run {
        println!("Dry run - no changes were made:");
    }
    for outcome in &report.outcomes {
        println!(
            "  {:<8} {}  {}",
            outcome.action, outcome.subject, outcome.detail
        );
    }
    println!("{}", report.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_user_mgmt_core::Action;

    fn args(dry_run: bool, execute: bool) -> RunArgs {
        RunArgs {
            dry_run,
            execute,
            json: false,
        }
    }

    #[test]
    fn test_dry_by_default() {
        assert!(args(false, false).is_dry_run(&Settings::default()));
    }

    #[test]
    fn test_execute_or_wet_run_setting() {
        let wet = Settings {
            enable_wet_run: true,
            ..Settings::default()
        };
        assert!(!args(false, true).is_dry_run(&Settings::default()));
        assert!(!args(false, false).is_dry_run(&wet));
    }

    #[test]
    fn test_finish_fails_on_error_outcomes() {
        let report = BatchReport {
            outcomes: vec![
                Outcome::new(Action::Disabled, "a@x.com", "deactivated account"),
                Outcome::error("b@x.com", "user not found: b@x.com"),
            ],
        };
        let err = finish("disable", false, Ok(report), false).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 record(s) failed");
    }

    #[test]
    fn test_finish_reports_aborted_batch() {
        let aborted = BatchAborted {
            report: BatchReport {
                outcomes: vec![Outcome::new(Action::Disabled, "a@x.com", "deactivated account")],
            },
            source: ApiError::Auth {
                message: "Invalid or expired session".to_string(),
            },
        };
        let err = finish("disable", false, Err(aborted), true).unwrap_err();
        let aborted = err.downcast_ref::<BatchAborted>().unwrap();
        assert_eq!(aborted.report.outcomes.len(), 1);
        assert!(aborted.source.is_fatal());
    }

    #[test]
    fn test_dry_run_flag_wins() {
        let wet = Settings {
            enable_wet_run: true,
            ..Settings::default()
        };
        assert!(args(true, true).is_dry_run(&wet));
    }
}
