//! Platform-side entities as returned by the Mattermost REST API
//!
//! Only the fields the reconciler reads are modelled; everything else in the
//! server payload is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// A user account on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Free-form profile field; carries the imported tags
    #[serde(default)]
    pub position: String,
    /// Deactivation timestamp in epoch millis; 0 while the account is active
    #[serde(default)]
    pub delete_at: i64,
}

impl RemoteUser {
    /// Whether the account has been deactivated
    pub fn is_disabled(&self) -> bool {
        self.delete_at > 0
    }
}

/// A top-level team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    /// URL handle (slug)
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// A channel inside a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    /// URL handle (slug)
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// Payload for `POST /users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub password: String,
}

/// Payload for `PUT /users/{id}/patch`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl UserPatch {
    /// Patch that would bring `user` to the given profile, or `None` if it already matches
    pub fn diff(
        user: &RemoteUser,
        first_name: &str,
        last_name: &str,
        position: &str,
    ) -> Option<Self> {
        let patch = Self {
            first_name: (user.first_name != first_name).then(|| first_name.to_string()),
            last_name: (user.last_name != last_name).then(|| last_name.to_string()),
            position: (user.position != position).then(|| position.to_string()),
        };
        if patch.is_empty() { None } else { Some(patch) }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.position.is_none()
    }

    /// Names of the fields this patch changes, for reporting
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.first_name.is_some() {
            fields.push("first_name");
        }
        if self.last_name.is_some() {
            fields.push("last_name");
        }
        if self.position.is_some() {
            fields.push("position");
        }
        fields
    }

    /// Apply the patch to a local copy of a user
    pub fn apply_to(&self, user: &mut RemoteUser) {
        if let Some(ref v) = self.first_name {
            user.first_name = v.clone();
        }
        if let Some(ref v) = self.last_name {
            user.last_name = v.clone();
        }
        if let Some(ref v) = self.position {
            user.position = v.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> RemoteUser {
        RemoteUser {
            id: "u1".to_string(),
            username: "jane".to_string(),
            email: "jane@x.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            position: "lead".to_string(),
            delete_at: 0,
        }
    }

    #[test]
    fn test_user_deserializes_from_server_payload() {
        let json = r#"{
            "id": "abc",
            "create_at": 1700000000000,
            "username": "jane",
            "email": "jane@x.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "position": "lead",
            "roles": "system_user",
            "delete_at": 0
        }"#;
        let user: RemoteUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "abc");
        assert_eq!(user.position, "lead");
        assert!(!user.is_disabled());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"id": "abc", "username": "jane", "email": "jane@x.com", "delete_at": 1700000000000}"#;
        let user: RemoteUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.first_name, "");
        assert!(user.is_disabled());
    }

    #[test]
    fn test_diff_matching_profile_is_none() {
        assert!(UserPatch::diff(&jane(), "Jane", "Doe", "lead").is_none());
    }

    #[test]
    fn test_diff_only_carries_changed_fields() {
        let patch = UserPatch::diff(&jane(), "Jane", "Doe", "lead,captain").unwrap();
        assert_eq!(patch.changed_fields(), vec!["position"]);

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({"position": "lead,captain"}));
    }

    #[test]
    fn test_apply_to_updates_local_copy() {
        let mut user = jane();
        let patch = UserPatch::diff(&user, "Janet", "Doe", "").unwrap();
        patch.apply_to(&mut user);
        assert_eq!(user.first_name, "Janet");
        assert_eq!(user.position, "");
        assert!(UserPatch::diff(&user, "Janet", "Doe", "").is_none());
    }
}
