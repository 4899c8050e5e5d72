//! Sequential batch driver
//!
//! Runs one reconciliation per item, turning record-level failures into
//! `error` outcomes. An authentication failure stops the batch; the outcomes
//! gathered up to that point travel with the error.

use crate::api::ApiError;
use crate::reconcile::{Action, Outcome};
use serde::Serialize;
use std::fmt;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Outcomes of one batch, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
}

/// Count of outcomes per action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub disabled: usize,
    pub error: usize,
}

impl BatchReport {
    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(Outcome::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_error())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.outcomes.len(),
            created: self.count(Action::Created),
            updated: self.count(Action::Updated),
            skipped: self.count(Action::Skipped),
            disabled: self.count(Action::Disabled),
            error: self.count(Action::Error),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed: {} created, {} updated, {} skipped, {} disabled, {} error",
            self.total, self.created, self.updated, self.skipped, self.disabled, self.error
        )
    }
}

/// A fatal error stopped the batch after `report` was gathered
#[derive(Debug, Error)]
#[error("batch aborted after {} record(s): {source}", .report.outcomes.len())]
pub struct BatchAborted {
    pub report: BatchReport,
    #[source]
    pub source: ApiError,
}

/// Reconcile every item in order.
///
/// `subject` names an item in error outcomes. `delay` is slept between
/// items. Returns `Err` only for fatal errors, which abort the remaining items.
pub fn run_batch<T, S, F>(
    items: &[T],
    delay: Duration,
    subject: S,
    mut reconcile: F,
) -> Result<BatchReport, BatchAborted>
where
    S: Fn(&T) -> &str,
    F: FnMut(&T) -> Result<Outcome, ApiError>,
{
    let mut report = BatchReport::default();

    for (i, item) in items.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        match reconcile(item) {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(e) if e.is_fatal() => {
                error!("Aborting batch at {}: {e}", subject(item));
                return Err(BatchAborted { report, source: e });
            }
            Err(e) => {
                warn!("{}: {e}", subject(item));
                report.outcomes.push(Outcome::error(subject(item), e.to_string()));
            }
        }
    }

    Ok(report)
}
