//! Desired-state record parsed from an import row

use serde::Serialize;

/// One desired user, as read from `users.csv`
///
/// `team_label` names a *channel* inside the default team, not a platform
/// team; the column is called "team" in the input for historical reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub team_label: String,
    pub tags: Vec<String>,
}

impl UserRecord {
    /// Value stored in the remote position field
    pub fn position(&self) -> String {
        self.tags.join(",")
    }

    /// Split a raw tags cell (`"trainer, captain"`) into trimmed, non-empty tags
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_and_drops_empty() {
        assert_eq!(
            UserRecord::parse_tags(" trainer, ,captain,"),
            vec!["trainer".to_string(), "captain".to_string()]
        );
        assert!(UserRecord::parse_tags("").is_empty());
    }

    #[test]
    fn test_position_joins_tags() {
        let record = UserRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            team_label: "Engineering".to_string(),
            tags: vec!["lead".to_string(), "tc".to_string()],
        };
        assert_eq!(record.position(), "lead,tc");
    }
}
