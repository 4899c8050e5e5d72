//! Per-record results

use serde::Serialize;
use std::fmt;

/// What reconciliation did (or would do, in dry-run) for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Skipped,
    Disabled,
    Error,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Skipped => "skipped",
            Action::Disabled => "disabled",
            Action::Error => "error",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub action: Action,
    /// Email of the record
    pub subject: String,
    pub detail: String,
}

impl Outcome {
    pub fn new(action: Action, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            action,
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    pub fn error(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Action::Error, subject, detail)
    }

    pub fn is_error(&self) -> bool {
        self.action == Action::Error
    }
}

/// Changes made while converging one record, in the order they happened
#[derive(Debug, Default)]
pub(crate) struct Changes(Vec<String>);

impl Changes {
    pub(crate) fn push(&mut self, change: impl Into<String>) {
        self.0.push(change.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Detail text; `fallback` when nothing changed
    pub(crate) fn describe(&self, fallback: &str) -> String {
        if self.0.is_empty() {
            fallback.to_string()
        } else {
            self.0.join("; ")
        }
    }
}
