//! Operation contract against the collaboration platform
//!
//! [`PlatformApi`] is implemented by:
//! - [`http::MattermostClient`]: the real REST client
//! - [`dry_run::DryRunClient`]: passes reads through, records mutations
//! - `mock::MockPlatform`: in-memory platform for unit tests

pub mod dry_run;
mod error;
pub mod http;
#[cfg(test)]
pub mod mock;

pub use dry_run::{DryRunClient, PlannedCall};
pub use error::ApiError;
pub use http::MattermostClient;

use crate::naming::slug;
use crate::schema::{Channel, NewUser, RemoteUser, Team, UserPatch};
use tracing::info;

/// An entity that was either found or created by a get-or-create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ensured<T> {
    pub entity: T,
    pub created: bool,
}

impl<T> Ensured<T> {
    pub fn existing(entity: T) -> Self {
        Self { entity, created: false }
    }

    pub fn created(entity: T) -> Self {
        Self { entity, created: true }
    }
}

/// Remote operations used by the reconciler.
///
/// Lookups fail with [`ApiError::NotFound`] on a miss; the caller decides
/// whether that is expected. Team and channel `name` arguments are platform
/// handles (see [`crate::naming::slug`]).
pub trait PlatformApi {
    fn get_user_by_email(&self, email: &str) -> Result<RemoteUser, ApiError>;

    fn create_user(&self, user: &NewUser) -> Result<RemoteUser, ApiError>;

    fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<(), ApiError>;

    fn activate_user(&self, user_id: &str) -> Result<(), ApiError>;

    fn disable_user(&self, user_id: &str) -> Result<(), ApiError>;

    fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError>;

    fn create_team(&self, name: &str, display_name: &str) -> Result<Team, ApiError>;

    fn is_team_member(&self, team_id: &str, user_id: &str) -> Result<bool, ApiError>;

    fn add_user_to_team(&self, team_id: &str, user_id: &str) -> Result<(), ApiError>;

    fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError>;

    fn create_channel(
        &self,
        team_id: &str,
        name: &str,
        display_name: &str,
    ) -> Result<Channel, ApiError>;

    fn is_channel_member(&self, channel_id: &str, user_id: &str) -> Result<bool, ApiError>;

    fn add_user_to_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError>;

    fn remove_user_from_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError>;

    /// Channel roles of a member (`channel_user`, `channel_admin`); empty when not a member
    fn channel_member_roles(&self, channel_id: &str, user_id: &str)
    -> Result<Vec<String>, ApiError>;

    /// Replace a member's channel roles with the space-separated `roles`
    fn update_channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
        roles: &str,
    ) -> Result<(), ApiError>;

    /// Look up a team by display name, creating it as an open team on a miss
    fn get_or_create_team(&self, display_name: &str) -> Result<Ensured<Team>, ApiError> {
        let name = slug(display_name);
        match self.get_team_by_name(&name) {
            Ok(team) => Ok(Ensured::existing(team)),
            Err(ApiError::NotFound { .. }) => {
                info!("Team '{display_name}' ({name}) not found, creating");
                self.create_team(&name, display_name).map(Ensured::created)
            }
            Err(e) => Err(e),
        }
    }

    /// Look up a channel by display name within a team, creating it as an open channel on a miss
    fn get_or_create_channel(
        &self,
        team_id: &str,
        display_name: &str,
    ) -> Result<Ensured<Channel>, ApiError> {
        let name = slug(display_name);
        match self.get_channel_by_name(team_id, &name) {
            Ok(channel) => Ok(Ensured::existing(channel)),
            Err(ApiError::NotFound { .. }) => {
                info!("Channel '{display_name}' ({name}) not found, creating");
                self.create_channel(team_id, &name, display_name)
                    .map(Ensured::created)
            }
            Err(e) => Err(e),
        }
    }
}
