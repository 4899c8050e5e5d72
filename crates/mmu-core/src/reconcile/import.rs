//! User import: profile, default team, label channel, default and tag channels

use super::outcome::Changes;
use super::{Action, Outcome, Reconciler};
use crate::api::ApiError;
use crate::naming::{generate_password, slug, username_from_email};
use crate::schema::{NewUser, RemoteUser, Team, UserPatch, UserRecord};
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl Reconciler<'_> {
    /// Converge one import record.
    ///
    /// Outcome is `created` when the account was created, `updated` when any
    /// other mutating call was issued and `skipped` otherwise.
    pub fn import_user(&self, record: &UserRecord) -> Result<Outcome, ApiError> {
        let Some(team_name) = self.settings.default_team.as_deref() else {
            return Ok(Outcome::error(
                &record.email,
                "default_team is not configured",
            ));
        };

        let mut changes = Changes::default();
        let (user, created) = self.ensure_user(record, &mut changes)?;

        let team = self.api.get_or_create_team(team_name)?;
        if team.created {
            changes.push(format!("created team '{team_name}'"));
        }
        let team = team.entity;
        self.ensure_team_member(&team, &user.id, &mut changes)?;

        let mut joined = HashSet::new();

        if !record.team_label.is_empty() {
            let channel_name = self.settings.channel_for_label(&record.team_label);
            self.join_channel(&team, &user.id, channel_name, &mut joined, &mut changes)?;
        }

        for channel_name in &self.settings.default_channels {
            match self.api.get_channel_by_name(&team.id, &slug(channel_name)) {
                Ok(channel) => {
                    if joined.insert(channel.id.clone()) {
                        self.ensure_channel_member(&channel, &user.id, &mut changes)?;
                    }
                }
                Err(ApiError::NotFound { .. }) => {
                    warn!("Default channel '{channel_name}' does not exist in team '{team_name}'");
                }
                Err(e) => return Err(e),
            }
        }

        for tag in &record.tags {
            for channel_name in self.settings.channels_for_tag(tag) {
                self.join_channel(&team, &user.id, channel_name, &mut joined, &mut changes)?;
            }
        }

        let outcome = if created {
            Outcome::new(Action::Created, &record.email, changes.describe("created user"))
        } else if changes.is_empty() {
            Outcome::new(Action::Skipped, &record.email, "up to date")
        } else {
            Outcome::new(Action::Updated, &record.email, changes.describe(""))
        };
        info!("{}: {} ({})", outcome.subject, outcome.action, outcome.detail);
        Ok(outcome)
    }

    /// Find or create the account and bring its profile in line with the
    /// record. Returns the user and whether it was created.
    fn ensure_user(
        &self,
        record: &UserRecord,
        changes: &mut Changes,
    ) -> Result<(RemoteUser, bool), ApiError> {
        let position = record.position();

        let user = match self.api.get_user_by_email(&record.email) {
            Ok(user) => user,
            Err(ApiError::NotFound { .. }) => {
                let password = self
                    .settings
                    .default_password
                    .clone()
                    .unwrap_or_else(generate_password);
                let user = self.api.create_user(&NewUser {
                    email: record.email.clone(),
                    username: username_from_email(&record.email),
                    first_name: record.first_name.clone(),
                    last_name: record.last_name.clone(),
                    position,
                    password,
                })?;
                changes.push("created user");
                return Ok((user, true));
            }
            Err(e) => return Err(e),
        };

        if user.is_disabled() {
            self.api.activate_user(&user.id)?;
            changes.push("reactivated user");
        }

        match UserPatch::diff(&user, &record.first_name, &record.last_name, &position) {
            Some(patch) => {
                self.api.update_user(&user.id, &patch)?;
                changes.push(format!("updated {}", patch.changed_fields().join(", ")));
            }
            None => debug!("Profile of {} is up to date", record.email),
        }

        Ok((user, false))
    }

    fn join_channel(
        &self,
        team: &Team,
        user_id: &str,
        display_name: &str,
        joined: &mut HashSet<String>,
        changes: &mut Changes,
    ) -> Result<(), ApiError> {
        let channel = self.api.get_or_create_channel(&team.id, display_name)?;
        if channel.created {
            changes.push(format!("created channel '{display_name}'"));
        }
        if joined.insert(channel.entity.id.clone()) {
            self.ensure_channel_member(&channel.entity, user_id, changes)?;
        }
        Ok(())
    }
}
