//! Mattermost REST client (blocking reqwest)
//!
//! Talks to `<url>/api/v4`. The token is obtained once in [`MattermostClient::connect`]
//! and reused read-only for every subsequent request.

use super::{ApiError, PlatformApi};
use crate::config::{AuthMethod, Credentials};
use crate::schema::{Channel, NewUser, RemoteUser, Team, UserPatch};
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use urlencoding::encode;

const NO_BODY: Option<&()> = None;

const ALREADY_IN_CHANNEL: &str = "app.channel.create_member.user_already_in_channel.app_error";
const ALREADY_IN_TEAM: &str = "app.team.join_user_to_team.save_member.exception";

/// What a request is about, for turning a 404 into a meaningful `NotFound`
#[derive(Debug, Clone)]
struct Target {
    resource: &'static str,
    key: String,
}

impl Target {
    fn new(resource: &'static str, key: impl Into<String>) -> Self {
        Self {
            resource,
            key: key.into(),
        }
    }
}

/// Error body returned by the server on non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct ServerError {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
}

/// Team membership record; a member who left keeps a row with `delete_at` set
#[derive(Debug, Deserialize)]
struct TeamMember {
    #[serde(default)]
    delete_at: i64,
}

/// Channel membership record; `roles` is space separated
#[derive(Debug, Deserialize)]
struct ChannelMember {
    #[serde(default)]
    roles: String,
}

/// Map a non-2xx status and body onto the error taxonomy
fn classify_error(status: u16, body: &str, target: &Target) -> ApiError {
    let parsed: ServerError = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        body.trim().to_string()
    } else {
        parsed.message
    };

    match status {
        401 => ApiError::Auth { message },
        404 => ApiError::not_found(target.resource, target.key.clone()),
        400 if parsed.id.contains("max_accounts") => ApiError::TeamMemberLimit {
            team: target.key.clone(),
        },
        _ => ApiError::Remote {
            status,
            id: parsed.id,
            message,
        },
    }
}

fn build_http(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mm-user-mgmt/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Exchange admin credentials for a session token (returned in the `Token` header)
fn login(
    http: &Client,
    api_url: &str,
    login_id: &str,
    password: &str,
) -> Result<String, ApiError> {
    let response = http
        .post(format!("{api_url}/users/login"))
        .json(&json!({ "login_id": login_id, "password": password }))
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let status = status.as_u16();
        let target = Target::new("user", login_id);
        let message = match classify_error(status, &body, &target) {
            ApiError::Auth { message } | ApiError::Remote { message, .. } => message,
            other => other.to_string(),
        };
        return Err(ApiError::Auth {
            message: format!("login as '{login_id}' failed (HTTP {status}): {message}"),
        });
    }

    response
        .headers()
        .get("Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Auth {
            message: "login succeeded but no token was returned".to_string(),
        })
}

/// Authenticated client for one Mattermost server
#[derive(Clone)]
pub struct MattermostClient {
    api_url: String,
    token: String,
    http: Client,
}

impl std::fmt::Debug for MattermostClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MattermostClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl MattermostClient {
    /// Authenticate (token or login) and verify the session with `GET /users/me`
    pub fn connect(credentials: &Credentials, timeout: Duration) -> Result<Self, ApiError> {
        let http = build_http(timeout)?;
        let api_url = format!("{}/api/v4", credentials.url.trim_end_matches('/'));

        let token = match &credentials.auth {
            AuthMethod::Token(token) => token.clone(),
            AuthMethod::Login { login_id, password } => {
                info!("Authenticating as '{login_id}' via username/password");
                login(&http, &api_url, login_id, password)?
            }
        };

        let client = Self {
            api_url,
            token,
            http,
        };
        let me: RemoteUser = client.get_json("/users/me", &Target::new("user", "me"))?;
        debug!("Authenticated as '{}'", me.username);
        Ok(client)
    }

    /// Base API URL (`<url>/api/v4`)
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        target: &Target,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.api_url, path);
        debug!("{method} {url}");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.token)
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().unwrap_or_default();
        let err = classify_error(status.as_u16(), &text, target);
        if err.is_not_found() {
            debug!("{method} {url} - {err}");
        } else {
            warn!("API request failed: {method} {url} - {err}");
        }
        Err(err)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, target: &Target) -> Result<T, ApiError> {
        Ok(self.execute(Method::GET, path, NO_BODY, target)?.json()?)
    }

    fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        target: &Target,
    ) -> Result<T, ApiError> {
        Ok(self.execute(method, path, Some(body), target)?.json()?)
    }

    fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        target: &Target,
    ) -> Result<(), ApiError> {
        self.execute(method, path, body, target)?;
        Ok(())
    }

    fn membership_exists<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &Target,
    ) -> Result<Option<T>, ApiError> {
        match self.get_json::<T>(path, target) {
            Ok(member) => Ok(Some(member)),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn channel_member(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Option<ChannelMember>, ApiError> {
        self.membership_exists(
            &format!("/channels/{}/members/{}", encode(channel_id), encode(user_id)),
            &Target::new("channel member", format!("{channel_id}/{user_id}")),
        )
    }
}

impl PlatformApi for MattermostClient {
    fn get_user_by_email(&self, email: &str) -> Result<RemoteUser, ApiError> {
        self.get_json(
            &format!("/users/email/{}", encode(email)),
            &Target::new("user", email),
        )
    }

    fn create_user(&self, user: &NewUser) -> Result<RemoteUser, ApiError> {
        info!("Creating user: {} ({})", user.username, user.email);
        self.send_json(
            Method::POST,
            "/users",
            user,
            &Target::new("user", user.email.clone()),
        )
    }

    fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<(), ApiError> {
        info!("Updating user {user_id}: {}", patch.changed_fields().join(", "));
        self.send_unit(
            Method::PUT,
            &format!("/users/{}/patch", encode(user_id)),
            Some(patch),
            &Target::new("user", user_id),
        )
    }

    fn activate_user(&self, user_id: &str) -> Result<(), ApiError> {
        info!("Activating user {user_id}");
        self.send_unit(
            Method::PUT,
            &format!("/users/{}/active", encode(user_id)),
            Some(&json!({ "active": true })),
            &Target::new("user", user_id),
        )
    }

    fn disable_user(&self, user_id: &str) -> Result<(), ApiError> {
        info!("Disabling user {user_id}");
        self.send_unit(
            Method::DELETE,
            &format!("/users/{}", encode(user_id)),
            NO_BODY,
            &Target::new("user", user_id),
        )
    }

    fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError> {
        self.get_json(
            &format!("/teams/name/{}", encode(name)),
            &Target::new("team", name),
        )
    }

    fn create_team(&self, name: &str, display_name: &str) -> Result<Team, ApiError> {
        info!("Creating team: {name}");
        self.send_json(
            Method::POST,
            "/teams",
            &json!({ "name": name, "display_name": display_name, "type": "O" }),
            &Target::new("team", name),
        )
    }

    fn is_team_member(&self, team_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let member: Option<TeamMember> = self.membership_exists(
            &format!("/teams/{}/members/{}", encode(team_id), encode(user_id)),
            &Target::new("team member", format!("{team_id}/{user_id}")),
        )?;
        Ok(member.is_some_and(|m| m.delete_at == 0))
    }

    fn add_user_to_team(&self, team_id: &str, user_id: &str) -> Result<(), ApiError> {
        info!("Adding user {user_id} to team {team_id}");
        let result = self.send_unit(
            Method::POST,
            &format!("/teams/{}/members", encode(team_id)),
            Some(&json!({ "team_id": team_id, "user_id": user_id })),
            &Target::new("team", team_id),
        );
        match result {
            Err(ApiError::Remote { status: 400, id, .. }) if id == ALREADY_IN_TEAM => {
                debug!("User {user_id} already in team {team_id}");
                Ok(())
            }
            other => other,
        }
    }

    fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError> {
        self.get_json(
            &format!("/teams/{}/channels/name/{}", encode(team_id), encode(name)),
            &Target::new("channel", name),
        )
    }

    fn create_channel(
        &self,
        team_id: &str,
        name: &str,
        display_name: &str,
    ) -> Result<Channel, ApiError> {
        info!("Creating channel: {name}");
        self.send_json(
            Method::POST,
            "/channels",
            &json!({
                "team_id": team_id,
                "name": name,
                "display_name": display_name,
                "type": "O",
            }),
            &Target::new("channel", name),
        )
    }

    fn is_channel_member(&self, channel_id: &str, user_id: &str) -> Result<bool, ApiError> {
        Ok(self.channel_member(channel_id, user_id)?.is_some())
    }

    fn add_user_to_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError> {
        info!("Adding user {user_id} to channel {channel_id}");
        let result = self.send_unit(
            Method::POST,
            &format!("/channels/{}/members", encode(channel_id)),
            Some(&json!({ "user_id": user_id })),
            &Target::new("channel", channel_id),
        );
        match result {
            Err(ApiError::Remote { status: 400, id, .. }) if id == ALREADY_IN_CHANNEL => {
                debug!("User {user_id} already in channel {channel_id}");
                Ok(())
            }
            other => other,
        }
    }

    fn remove_user_from_channel(&self, channel_id: &str, user_id: &str) -> Result<(), ApiError> {
        info!("Removing user {user_id} from channel {channel_id}");
        let result = self.send_unit(
            Method::DELETE,
            &format!("/channels/{}/members/{}", encode(channel_id), encode(user_id)),
            NO_BODY,
            &Target::new("channel member", format!("{channel_id}/{user_id}")),
        );
        match result {
            Err(ApiError::NotFound { .. }) => Ok(()),
            other => other,
        }
    }

    fn channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        Ok(self
            .channel_member(channel_id, user_id)?
            .map(|m| m.roles.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default())
    }

    fn update_channel_member_roles(
        &self,
        channel_id: &str,
        user_id: &str,
        roles: &str,
    ) -> Result<(), ApiError> {
        info!("Setting roles of user {user_id} in channel {channel_id} to '{roles}'");
        self.send_unit(
            Method::PUT,
            &format!(
                "/channels/{}/members/{}/roles",
                encode(channel_id),
                encode(user_id)
            ),
            Some(&json!({ "roles": roles })),
            &Target::new("channel member", format!("{channel_id}/{user_id}")),
        )
    }
}
