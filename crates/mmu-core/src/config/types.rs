//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete configuration, read from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Team every imported user joins (display name). Required for import.
    #[serde(default)]
    pub default_team: Option<String>,
    /// Channels every imported user joins when they exist in the default team
    #[serde(default)]
    pub default_channels: Vec<String>,
    /// CSV team label -> channel display name (exact match)
    #[serde(default)]
    pub channel_mapping: HashMap<String, String>,
    /// Tag -> channel display names to get-or-create and join
    #[serde(default)]
    pub tag_channel_mapping: HashMap<String, Vec<String>>,
    /// Execute without `--execute` when true
    #[serde(default)]
    pub enable_wet_run: bool,
    /// Password for new accounts; a random one is generated when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_password: Option<String>,
    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Pause between records, for rate-limited servers
    #[serde(default)]
    pub request_delay_ms: u64,
    /// Export transform settings
    #[serde(default)]
    pub prepare: PrepareConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_team: None,
            default_channels: Vec::new(),
            channel_mapping: HashMap::new(),
            tag_channel_mapping: HashMap::new(),
            enable_wet_run: false,
            default_password: None,
            request_timeout_secs: default_timeout_secs(),
            request_delay_ms: 0,
            prepare: PrepareConfig::default(),
        }
    }
}

impl Settings {
    /// Channel display name for a CSV team label; unmapped labels are used as-is
    pub fn channel_for_label<'a>(&'a self, label: &'a str) -> &'a str {
        self.channel_mapping
            .get(label)
            .map(String::as_str)
            .unwrap_or(label)
    }

    /// Channels mapped from one tag (exact match)
    pub fn channels_for_tag(&self, tag: &str) -> &[String] {
        self.tag_channel_mapping
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Settings for `mmu prepare`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Labels kept as tags (compared case-insensitively)
    #[serde(default = "default_allowed_tags")]
    pub allowed_tags: Vec<String>,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            allowed_tags: default_allowed_tags(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_allowed_tags() -> Vec<String> {
    ["trainer", "tientjeslid", "trainingmember", "captain", "tc", "bestuur"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
