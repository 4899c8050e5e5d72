//! Configuration resolution
//!
//! Settings come from a YAML file resolved in this order:
//! 1. `--config` flag (passed as parameter)
//! 2. `MMU_CONFIG` environment variable
//! 3. `./config.yaml`
//! 4. `<config dir>/mm-user-mgmt/config.yaml`
//!
//! Server URL and credentials come from the environment (optionally seeded
//! from `.env`), never from the YAML file.

mod credentials;
mod discovery;
mod types;

pub use credentials::{AuthMethod, Credentials, load_dotenv};
pub use discovery::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, ConfigError, discover_settings, find_config, load_settings,
    resolve_settings,
};
pub use types::{PrepareConfig, Settings};
