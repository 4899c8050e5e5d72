//! Server URL and credentials from the environment

use super::discovery::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};

/// How the client authenticates
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Personal access or bot token (`MM_TOKEN`)
    Token(String),
    /// Admin login (`MM_ADMIN_USER` / `MM_ADMIN_PASS`)
    Login { login_id: String, password: String },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Token(_) => f.write_str("Token(<redacted>)"),
            AuthMethod::Login { login_id, .. } => f
                .debug_struct("Login")
                .field("login_id", login_id)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Server base URL (`MM_URL`), without `/api/v4`
    pub url: String,
    pub auth: AuthMethod,
}

impl Credentials {
    /// Read `MM_URL` plus `MM_TOKEN`, falling back to `MM_ADMIN_USER`/`MM_ADMIN_PASS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url = get("MM_URL").ok_or(ConfigError::MissingEnv("MM_URL"))?;

        let auth = if let Some(token) = get("MM_TOKEN") {
            AuthMethod::Token(token)
        } else {
            let login_id = get("MM_ADMIN_USER")
                .ok_or(ConfigError::MissingEnv("MM_TOKEN or MM_ADMIN_USER"))?;
            let password = get("MM_ADMIN_PASS").ok_or(ConfigError::MissingEnv("MM_ADMIN_PASS"))?;
            AuthMethod::Login { login_id, password }
        };

        Ok(Self { url, auth })
    }
}

/// Load `.env` from `dir` into the process environment, if present.
///
/// Variables already set in the environment win over the file. Returns the
/// loaded path, or `None` when there is no file. Runs before logging is set
/// up, so the caller reports the result.
pub fn load_dotenv(dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(None);
    }
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(Some(path)),
        Err(source) => Err(ConfigError::Dotenv { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_token_preferred() {
        let creds = Credentials::from_lookup(lookup(&[
            ("MM_URL", "http://localhost:8065"),
            ("MM_TOKEN", "tok"),
            ("MM_ADMIN_USER", "admin"),
            ("MM_ADMIN_PASS", "pw"),
        ]))
        .unwrap();
        assert_eq!(creds.auth, AuthMethod::Token("tok".to_string()));
    }

    #[test]
    fn test_login_fallback() {
        let creds = Credentials::from_lookup(lookup(&[
            ("MM_URL", "http://localhost:8065"),
            ("MM_TOKEN", ""),
            ("MM_ADMIN_USER", "admin"),
            ("MM_ADMIN_PASS", "pw"),
        ]))
        .unwrap();
        assert_eq!(
            creds.auth,
            AuthMethod::Login {
                login_id: "admin".to_string(),
                password: "pw".to_string()
            }
        );
    }

    #[test]
    fn test_missing_url() {
        let err = Credentials::from_lookup(lookup(&[("MM_TOKEN", "tok")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("MM_URL")));
    }

    #[test]
    fn test_missing_credentials() {
        let err = Credentials::from_lookup(lookup(&[
            ("MM_URL", "http://localhost:8065"),
            ("MM_ADMIN_USER", "admin"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("MM_ADMIN_PASS")));
    }

    #[test]
    fn test_load_dotenv_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dotenv(dir.path()).unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_load_dotenv_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "MMU_DOTENV_CHECK=loaded\n").unwrap();

        let path = load_dotenv(dir.path()).unwrap();
        assert_eq!(path, Some(dir.path().join(".env")));
        assert_eq!(std::env::var("MMU_DOTENV_CHECK").as_deref(), Ok("loaded"));
    }

    #[test]
    fn test_load_dotenv_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "not a valid line\n").unwrap();
        assert!(matches!(
            load_dotenv(dir.path()),
            Err(ConfigError::Dotenv { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = format!("{:?}", AuthMethod::Token("secret".to_string()));
        assert!(!token.contains("secret"));
        let login = format!(
            "{:?}",
            AuthMethod::Login {
                login_id: "admin".to_string(),
                password: "hunter2".to_string()
            }
        );
        assert!(login.contains("admin"));
        assert!(!login.contains("hunter2"));
    }
}
