//! In-memory platform for testing. Behaves like a small Mattermost server.

use super::{ApiError, PlatformApi};
use crate::schema::{Channel, NewUser, RemoteUser, Team, UserPatch};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Record of method calls for test assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetUserByEmail(String),
    CreateUser(String),
    UpdateUser(String),
    ActivateUser(String),
    DisableUser(String),
    GetTeamByName(String),
    CreateTeam(String),
    IsTeamMember { team_id: String, user_id: String },
    AddUserToTeam { team_id: String, user_id: String },
    GetChannelByName { team_id: String, name: String },
    CreateChannel { team_id: String, name: String },
    IsChannelMember { channel_id: String, user_id: String },
    AddUserToChannel { channel_id: String, user_id: String },
    RemoveUserFromChannel { channel_id: String, user_id: String },
    ChannelMemberRoles { channel_id: String, user_id: String },
    UpdateChannelMemberRoles { channel_id: String, user_id: String, roles: String },
}

impl MockCall {
    /// Whether the call changes remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            MockCall::GetUserByEmail(_)
                | MockCall::GetTeamByName(_)
                | MockCall::IsTeamMember { .. }
                | MockCall::GetChannelByName { .. }
                | MockCall::IsChannelMember { .. }
                | MockCall::ChannelMemberRoles { .. }
        )
    }
}

/// Failure injected for lookups of one email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// HTTP 500
    Remote,
    /// HTTP 401
    Auth,
    /// HTTP 403: the session lacks permission for this one operation
    Forbidden,
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<RemoteUser>,
    teams: Vec<Team>,
    channels: Vec<Channel>,
    team_members: HashSet<(String, String)>,
    channel_members: HashSet<(String, String)>,
    channel_roles: HashMap<(String, String), String>,
    full_teams: HashSet<String>,
    failures: HashMap<String, MockFailure>,
    next_id: u64,
}

impl MockState {
    fn new_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}{}", self.next_id)
    }
}

/// Mock platform. Clones share state, so a test can keep a handle while the
/// reconciler borrows another.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
    /// Track calls for verification
    pub call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockPlatform {
    /// Create an empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active user; returns its id
    pub fn seed_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        position: &str,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.new_id("user");
        state.users.push(RemoteUser {
            id: id.clone(),
            username: crate::naming::username_from_email(email),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            position: position.to_string(),
            delete_at: 0,
        });
        id
    }

    /// Add a deactivated user; returns its id
    pub fn seed_disabled_user(&self, email: &str) -> String {
        let id = self.seed_user(email, "", "", "");
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.delete_at = 1_700_000_000_000;
        }
        id
    }

    /// Add a team with the given handle
    pub fn seed_team(&self, name: &str, display_name: &str) -> Team {
        let mut state = self.state.lock().unwrap();
        let team = Team {
            id: state.new_id("team"),
            name: name.to_string(),
            display_name: display_name.to_string(),
        };
        state.teams.push(team.clone());
        team
    }

    /// Add a channel with the given handle to a team
    pub fn seed_channel(&self, team_id: &str, name: &str, display_name: &str) -> Channel {
        let mut state = self.state.lock().unwrap();
        let channel = Channel {
            id: state.new_id("channel"),
            team_id: team_id.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
        };
        state.channels.push(channel.clone());
        channel
    }

    pub fn seed_team_member(&self, team_id: &str, user_id: &str) {
        self.state
            .lock()
            .unwrap()
            .team_members
            .insert((team_id.to_string(), user_id.to_string()));
    }

    pub fn seed_channel_member(&self, channel_id: &str, user_id: &str) {
        self.state
            .lock()
            .unwrap()
            .channel_members
            .insert((channel_id.to_string(), user_id.to_string()));
    }

    /// Make every later join of this team fail with the member limit
    pub fn fill_team(&self, team_id: &str) {
        self.state
            .lock()
            .unwrap()
            .full_teams
            .insert(team_id.to_string());
    }

    /// Set the channel roles of an existing member
    pub fn seed_channel_roles(&self, channel_id: &str, user_id: &str, roles: &str) {
        self.state
            .lock()
            .unwrap()
            .channel_roles
            .insert((channel_id.to_string(), user_id.to_string()), roles.to_string());
    }

    /// Make lookups of `email` fail
    pub fn fail_email(&self, email: &str, failure: MockFailure) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(email.to_string(), failure);
    }

    pub fn user(&self, email: &str) -> Option<RemoteUser> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn team(&self, name: &str) -> Option<Team> {
        self.state
            .lock()
            .unwrap()
            .teams
            .iter()
            .find(|t| t.name == name)
            .cloned()
    }

    pub fn channel(&self, team_id: &str, name: &str) -> Option<Channel> {
        self.state
            .lock()
            .unwrap()
            .channels
            .iter()
            .find(|c| c.team_id == team_id && c.name == name)
            .cloned()
    }

    pub fn in_team(&self, team_id: &str, user_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .team_members
            .contains(&(team_id.to_string(), user_id.to_string()))
    }

    pub fn in_channel(&self, channel_id: &str, user_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .channel_members
            .contains(&(channel_id.to_string(), user_id.to_string()))
    }

    /// Get a copy of the call log for assertions
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Calls that changed state
    pub fn mutating_calls(&self) -> Vec<MockCall> {
        self.calls().into_iter().filter(MockCall::is_mutating).collect()
    }

    /// Clear the call log
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear();
    }

    fn log_call(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn with_user<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut RemoteUser) -> T,
    ) -> Result<T, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .map(f)
            .ok_or_else(|| ApiError::not_found("user", user_id))
    }
}

impl PlatformApi for MockPlatform {
    fn get_user_by_email(&self, email: &str) -> Result<RemoteUser, ApiError> {
        self.log_call(MockCall::GetUserByEmail(email.to_string()));
        let failure = self.state.lock().unwrap().failures.get(email).copied();
        match failure {
            Some(MockFailure::Remote) => Err(ApiError::Remote {
                status: 500,
                id: "app.mock.internal".to_string(),
                message: "injected failure".to_string(),
            }),
            Some(MockFailure::Auth) => Err(ApiError::Auth {
                message: "Invalid or expired session".to_string(),
            }),
            Some(MockFailure::Forbidden) => Err(ApiError::Remote {
                status: 403,
                id: "api.context.permissions.app_error".to_string(),
                message: "You do not have the appropriate permissions.".to_string(),
            }),
            None => self
                .user(email)
                .ok_or_else(|| ApiError::not_found("user", email)),
        }
    }

    fn create_user(&self, user: &NewUser) -> Result<RemoteUser, ApiError> {
        self.log_call(MockCall::CreateUser(user.email.clone()));
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::Remote {
                status: 400,
                id: "app.user.save.email_exists.app_error".to_string(),
                message: "An account with that email already exists.".to_string(),
            });
        }
        let created = RemoteUser {
            id: state.new_id("user"),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            position: user.position.clone(),
            delete_at: 0,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<(), ApiError> {
        self.log_call(MockCall::UpdateUser(user_id.to_string()));
        self.with_user(user_id, |u| patch.apply_to(u))
    }

    fn activate_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.log_call(MockCall::ActivateUser(user_id.to_string()));
        self.with_user(user_id, |u| u.delete_at = 0)
    }

    fn disable_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.log_call(MockCall::DisableUser(user_id.to_string()));
        self.with_user(user_id, |u| u.delete_at = 1_700_000_000_000)
    }

    fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError> {
        self.log_call(MockCall::GetTeamByName(name.to_string()));
        self.team(name).ok_or_else(|| ApiError::not_found("team", name))
    }

    fn create_team(&self, name: &str, display_name: &str) -> Result<Team, ApiError> {
        self.log_call(MockCall::CreateTeam(name.to_string()));
        let mut state = self.state.lock().unwrap();
        let team = Team {
            id: state.new_id("team"),
            name: name.to_string(),
            display_name: display_name.to_string(),
        };
        state.teams.push(team.clone());
        Ok(team)
    }

    fn is_team_member(&self, team_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.log_call(MockCall::IsTeamMember {
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(self.in_team(team_id, user_id))
    }

    fn add_user_to_team(&self, team_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.log_call(MockCall::AddUserToTeam {
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
        });
        if self.state.lock().unwrap().full_teams.contains(team_id) {
            return Err(ApiError::TeamMemberLimit {
                team: team_id.to_string(),
            });
        }
        self.seed_team_member(team_id, user_id);
        Ok(())
    }

    fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError> {
        self.log_call(MockCall::GetChannelByName {
            team_id: team_id.to_string(),
            name: name.to_string(),
        });
        self.channel(team_id, name)
            .ok_or_else(|| ApiError::not_found("channel", name))
    }

    fn create_channel(
        &self,
        team_id: &str,
        name: &str,
        display_name: &str,
    ) -> Result<Channel, ApiError> {
        self.log_call(MockCall::CreateChannel {
            team_id: team_id.to_string(),
            name: name.to_string(),
        });
        Ok(self.seed_channel(team_id, name, display_name))
    }

    fn is_channel_member(&self, channel_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.log_call(MockCall::IsChannelMember {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(self.in_channel(channel_id, user_id))
    }

    fn add_user_to_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.log_call(MockCall::AddUserToChannel {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        });
        self.seed_channel_member(channel_id, user_id);
        Ok(())
    }

    fn remove_user_from_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.log_call(MockCall::RemoveUserFromChannel {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        });
        let key = (channel_id.to_string(), user_id.to_string());
        let mut state = self.state.lock().unwrap();
        state.channel_members.remove(&key);
        state.channel_roles.remove(&key);
        Ok(())
    }

    fn channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        self.log_call(MockCall::ChannelMemberRoles {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
        });
        if !self.in_channel(channel_id, user_id) {
            return Ok(Vec::new());
        }
        let key = (channel_id.to_string(), user_id.to_string());
        let roles = self
            .state
            .lock()
            .unwrap()
            .channel_roles
            .get(&key)
            .cloned()
            .unwrap_or_else(|| "channel_user".to_string());
        Ok(roles.split_whitespace().map(str::to_string).collect())
    }

    fn update_channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
        roles: &str,
    ) -> Result<(), ApiError> {
        self.log_call(MockCall::UpdateChannelMemberRoles {
            channel_id: channel_id.to_string(),
            user_id: user_id.to_string(),
            roles: roles.to_string(),
        });
        if !self.in_channel(channel_id, user_id) {
            return Err(ApiError::not_found(
                "channel member",
                format!("{channel_id}/{user_id}"),
            ));
        }
        self.seed_channel_roles(channel_id, user_id, roles);
        Ok(())
    }
}
