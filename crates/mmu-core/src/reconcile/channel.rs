//! Single channel membership changes, with admin rights in squad channels

use super::outcome::Changes;
use super::{Action, Outcome, Reconciler};
use crate::api::ApiError;
use crate::naming::{is_squad_name, slug};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

const CHANNEL_ADMIN: &str = "channel_admin";
const SQUAD_MEMBER_ROLES: &str = "channel_user channel_admin";

/// Requested end state of a channel membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipAction {
    Add,
    Remove,
}

impl fmt::Display for MembershipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipAction::Add => f.write_str("add"),
            MembershipAction::Remove => f.write_str("remove"),
        }
    }
}

impl Reconciler<'_> {
    /// Add a user to, or remove a user from, an existing channel.
    ///
    /// Team and channel are looked up by handle derived from the given names
    /// and are never created; a miss is returned as [`ApiError::NotFound`].
    /// Members added to a squad channel (`H1`, `D`) are also made channel admin.
    pub fn set_channel_membership(
        &self,
        email: &str,
        team_name: &str,
        channel_name: &str,
        action: MembershipAction,
    ) -> Result<Outcome, ApiError> {
        let team = self.api.get_team_by_name(&slug(team_name))?;
        let channel = self.api.get_channel_by_name(&team.id, &slug(channel_name))?;
        let user = self.api.get_user_by_email(email)?;

        let member = self.api.is_channel_member(&channel.id, &user.id)?;
        let target = format!("{team_name}/{channel_name}");

        let outcome = match (action, member) {
            (MembershipAction::Add, _) => {
                let mut changes = Changes::default();
                if !member {
                    self.api.add_user_to_channel(&channel.id, &user.id)?;
                    changes.push(format!("added to {target}"));
                }
                if is_squad_name(channel_name) {
                    self.ensure_channel_admin(&channel.id, &user.id, &mut changes)?;
                }
                if changes.is_empty() {
                    Outcome::new(Action::Skipped, email, format!("already in {target}"))
                } else {
                    Outcome::new(Action::Updated, email, changes.describe(""))
                }
            }
            (MembershipAction::Remove, true) => {
                self.api.remove_user_from_channel(&channel.id, &user.id)?;
                Outcome::new(Action::Updated, email, format!("removed from {target}"))
            }
            (MembershipAction::Remove, false) => {
                Outcome::new(Action::Skipped, email, format!("not in {target}"))
            }
        };
        info!("{email}: {} ({})", outcome.action, outcome.detail);
        Ok(outcome)
    }

    fn ensure_channel_admin(
        &self,
        channel_id: &str,
        user_id: &str,
        changes: &mut Changes,
    ) -> Result<(), ApiError> {
        let roles = self.api.channel_member_roles(channel_id, user_id)?;
        if roles.iter().any(|r| r == CHANNEL_ADMIN) {
            debug!("Already channel admin of {channel_id}");
            return Ok(());
        }
        self.api
            .update_channel_member_roles(channel_id, user_id, SQUAD_MEMBER_ROLES)?;
        changes.push("granted channel admin");
        Ok(())
    }
}
