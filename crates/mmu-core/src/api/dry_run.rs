//! Dry-run recorder
//!
//! Wraps a real [`PlatformApi`] and turns it into a read-only preview: lookups
//! go to the wrapped client, mutations are recorded and answered with
//! synthetic entities. Later lookups in the same run see the recorded
//! mutations, so a team planned for creation by the first record is found by
//! the second one instead of being planned again.

use super::{ApiError, PlatformApi};
use crate::schema::{Channel, NewUser, RemoteUser, Team, UserPatch};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::info;

/// Prefix of ids handed out for entities that only exist in the preview
pub const SYNTHETIC_PREFIX: &str = "dry-run:";

/// A mutating call that would have been sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedCall {
    CreateUser { email: String },
    UpdateUser { user_id: String, fields: Vec<&'static str> },
    ActivateUser { user_id: String },
    DisableUser { user_id: String },
    CreateTeam { name: String },
    AddUserToTeam { team_id: String, user_id: String },
    CreateChannel { team_id: String, name: String },
    AddUserToChannel { channel_id: String, user_id: String },
    RemoveUserFromChannel { channel_id: String, user_id: String },
    UpdateChannelMemberRoles { channel_id: String, user_id: String, roles: String },
}

/// State the recorded mutations would have produced
#[derive(Debug, Default)]
struct Preview {
    created_users: HashMap<String, RemoteUser>,
    profiles: HashMap<String, UserPatch>,
    delete_at: HashMap<String, i64>,
    teams: HashMap<String, Team>,
    channels: HashMap<(String, String), Channel>,
    memberships: HashMap<(String, String), bool>,
    channel_roles: HashMap<(String, String), Vec<String>>,
}

fn is_synthetic(id: &str) -> bool {
    id.starts_with(SYNTHETIC_PREFIX)
}

fn merge_patch(into: &mut UserPatch, patch: &UserPatch) {
    if patch.first_name.is_some() {
        into.first_name = patch.first_name.clone();
    }
    if patch.last_name.is_some() {
        into.last_name = patch.last_name.clone();
    }
    if patch.position.is_some() {
        into.position = patch.position.clone();
    }
}

/// Read-only preview over another client
pub struct DryRunClient<'a> {
    inner: &'a dyn PlatformApi,
    preview: RefCell<Preview>,
    planned: RefCell<Vec<PlannedCall>>,
}

impl<'a> DryRunClient<'a> {
    pub fn new(inner: &'a dyn PlatformApi) -> Self {
        Self {
            inner,
            preview: RefCell::new(Preview::default()),
            planned: RefCell::new(Vec::new()),
        }
    }

    /// Every mutating call recorded so far, in order
    pub fn planned(&self) -> Vec<PlannedCall> {
        self.planned.borrow().clone()
    }

    fn plan(&self, call: PlannedCall) {
        info!("[dry-run] would {call:?}");
        self.planned.borrow_mut().push(call);
    }

    fn membership(
        &self,
        container_id: &str,
        user_id: &str,
        remote: impl FnOnce() -> Result<bool, ApiError>,
    ) -> Result<bool, ApiError> {
        let key = (container_id.to_string(), user_id.to_string());
        if let Some(member) = self.preview.borrow().memberships.get(&key) {
            return Ok(*member);
        }
        if is_synthetic(container_id) || is_synthetic(user_id) {
            return Ok(false);
        }
        remote()
    }

    fn set_membership(&self, container_id: &str, user_id: &str, member: bool) {
        self.preview
            .borrow_mut()
            .memberships
            .insert((container_id.to_string(), user_id.to_string()), member);
    }
}

impl PlatformApi for DryRunClient<'_> {
    fn get_user_by_email(&self, email: &str) -> Result<RemoteUser, ApiError> {
        if let Some(user) = self.preview.borrow().created_users.get(email) {
            return Ok(user.clone());
        }

        let mut user = self.inner.get_user_by_email(email)?;
        let preview = self.preview.borrow();
        if let Some(patch) = preview.profiles.get(&user.id) {
            patch.apply_to(&mut user);
        }
        if let Some(delete_at) = preview.delete_at.get(&user.id) {
            user.delete_at = *delete_at;
        }
        Ok(user)
    }

    fn create_user(&self, user: &NewUser) -> Result<RemoteUser, ApiError> {
        self.plan(PlannedCall::CreateUser {
            email: user.email.clone(),
        });
        let created = RemoteUser {
            id: format!("{SYNTHETIC_PREFIX}user:{}", user.email),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            position: user.position.clone(),
            delete_at: 0,
        };
        self.preview
            .borrow_mut()
            .created_users
            .insert(user.email.clone(), created.clone());
        Ok(created)
    }

    fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<(), ApiError> {
        self.plan(PlannedCall::UpdateUser {
            user_id: user_id.to_string(),
            fields: patch.changed_fields(),
        });
        let mut preview = self.preview.borrow_mut();
        if let Some(user) = preview
            .created_users
            .values_mut()
            .find(|u| u.id == user_id)
        {
            patch.apply_to(user);
            return Ok(());
        }
        merge_patch(preview.profiles.entry(user_id.to_string()).or_default(), patch);
        Ok(())
    }

    fn activate_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.plan(PlannedCall::ActivateUser {
            user_id: user_id.to_string(),
        });
        self.preview
            .borrow_mut()
            .delete_at
            .insert(user_id.to_string(), 0);
        Ok(())
    }

    fn disable_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.plan(PlannedCall::DisableUser {
            user_id: user_id.to_string(),
        });
        // Any positive timestamp marks the account disabled
        self.preview
            .borrow_mut()
            .delete_at
            .insert(user_id.to_string(), 1);
        Ok(())
    }

    fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError> {
        if let Some(team) = self.preview.borrow().teams.get(name) {
            return Ok(team.clone());
        }
        self.inner.get_team_by_name(name)
    }

    fn create_team(&self, name: &str, display_name: &str) -> Result<Team, ApiError> {
        self.plan(PlannedCall::CreateTeam {
            name: name.to_string(),
        });
        let team = Team {
            id: format!("{SYNTHETIC_PREFIX}team:{name}"),
            name: name.to_string(),
            display_name: display_name.to_string(),
        };
        self.preview
            .borrow_mut()
            .teams
            .insert(name.to_string(), team.clone());
        Ok(team)
    }

    fn is_team_member(&self, team_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.membership(team_id, user_id, || {
            self.inner.is_team_member(team_id, user_id)
        })
    }

    fn add_user_to_team(&self, team_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.plan(PlannedCall::AddUserToTeam {
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
        });
        self.set_membership(team_id, user_id, true);
        Ok(())
    }

    fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError> {
        let key = (team_id.to_string(), name.to_string());
        if let Some(channel) = self.preview.borrow().channels.get(&key) {
            return Ok(channel.clone());
        }
        if is_synthetic(team_id) {
            return Err(ApiError::not_found("channel", name));
        }
        self.inner.get_channel_by_name(team_id, name)
    }

    fn create_channel(
        &self,
        team_id: &str,
        name: &str,
        display_name: &str,
    ) -> Result<Channel, ApiError> {
        self.plan(PlannedCall::CreateChannel {
            team_id: team_id.to_string(),
            name: name.to_string(),
        });
        let channel = Channel {
            id: format!("{SYNTHETIC_PREFIX}channel:{team_id}/{name}"),
            team_id: team_id.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
        };
        self.preview
            .borrow_mut()
            .channels
            .insert((team_id.to_string(), name.to_string()), channel.clone());
        Ok(channel)
    }

    fn is_channel_member(&self, channel_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.membership(channel_id, user_id, || {
            self.inner.is_channel_member(channel_id, user_id)
        })
    }

    fn add_user_to_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.plan(PlannedCall::AddUserToChannel {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        });
        self.set_membership(channel_id, user_id, true);
        Ok(())
    }

    fn remove_user_from_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.plan(PlannedCall::RemoveUserFromChannel {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        });
        self.set_membership(channel_id, user_id, false);
        self.preview
            .borrow_mut()
            .channel_roles
            .remove(&(channel_id.to_string(), user_id.to_string()));
        Ok(())
    }

    fn channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        let key = (channel_id.to_string(), user_id.to_string());
        let member = {
            let preview = self.preview.borrow();
            if let Some(roles) = preview.channel_roles.get(&key) {
                return Ok(roles.clone());
            }
            preview.memberships.get(&key).copied()
        };
        match member {
            // Joined during this run with the default role
            Some(true) => Ok(vec!["channel_user".to_string()]),
            Some(false) => Ok(Vec::new()),
            None if is_synthetic(channel_id) || is_synthetic(user_id) => Ok(Vec::new()),
            None => self.inner.channel_member_roles(channel_id, user_id),
        }
    }

    fn update_channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
        roles: &str,
    ) -> Result<(), ApiError> {
        self.plan(PlannedCall::UpdateChannelMemberRoles {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
            roles: roles.to_string(),
        });
        self.preview.borrow_mut().channel_roles.insert(
            (channel_id.to_string(), user_id.to_string()),
            roles.split_whitespace().map(str::to_string).collect(),
        );
        Ok(())
    }
}
