//! Error taxonomy for remote operations

use thiserror::Error;

/// Errors returned by [`super::PlatformApi`] operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials or token (HTTP 401, failed login). Fatal for a batch.
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Lookup miss
    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    /// Team cannot take more members
    #[error("team '{team}' has reached its member limit")]
    TeamMemberLimit { team: String },

    /// Any other non-2xx response
    #[error("remote error (HTTP {status}): {message}")]
    Remote {
        status: u16,
        /// Server error id (e.g. `app.channel.create_member.user_already_in_channel.app_error`)
        id: String,
        message: String,
    },

    /// Connection failure, timeout or undecodable body
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    /// Whether this error must abort the whole batch instead of failing one record
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
