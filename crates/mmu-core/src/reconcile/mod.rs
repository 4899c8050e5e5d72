//! Reconciliation of desired state onto the platform
//!
//! A [`Reconciler`] converges one record at a time and reports an
//! [`Outcome`]. It only talks to a [`PlatformApi`], so the same code path runs
//! against the real server and against the dry-run recorder.

mod channel;
mod disable;
mod import;
mod outcome;

pub use channel::MembershipAction;
pub use outcome::{Action, Outcome};

use crate::api::{ApiError, PlatformApi};
use crate::config::Settings;
use crate::schema::{Channel, Team};
use outcome::Changes;
use tracing::debug;

/// Converges records using one client and one set of settings
pub struct Reconciler<'a> {
    api: &'a dyn PlatformApi,
    settings: &'a Settings,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn PlatformApi, settings: &'a Settings) -> Self {
        Self { api, settings }
    }

    fn ensure_team_member(
        &self,
        team: &Team,
        user_id: &str,
        changes: &mut Changes,
    ) -> Result<(), ApiError> {
        if self.api.is_team_member(&team.id, user_id)? {
            debug!("Already a member of team '{}'", team.name);
            return Ok(());
        }
        self.api
            .add_user_to_team(&team.id, user_id)
            .map_err(|e| match e {
                ApiError::TeamMemberLimit { .. } => ApiError::TeamMemberLimit {
                    team: team.display_name.clone(),
                },
                other => other,
            })?;
        changes.push(format!("joined team '{}'", team.display_name));
        Ok(())
    }

    fn ensure_channel_member(
        &self,
        channel: &Channel,
        user_id: &str,
        changes: &mut Changes,
    ) -> Result<(), ApiError> {
        if self.api.is_channel_member(&channel.id, user_id)? {
            debug!("Already a member of channel '{}'", channel.name);
            return Ok(());
        }
        self.api.add_user_to_channel(&channel.id, user_id)?;
        changes.push(format!("joined channel '{}'", channel.display_name));
        Ok(())
    }
}
