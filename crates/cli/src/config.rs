//! CLI configuration utilities

use anyhow::{Context, Result};
use fundraiser_http::client::config::ClientConfig;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const SESSION_FILE_NAME: &str = "session.json";

/// Data directory from the flag/environment, else the platform data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fundraiser")
    })
}

pub fn config_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

pub fn session_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Load client configuration.
///
/// Precedence, lowest first: built-in defaults, `config.toml` in the data
/// directory, `FUNDRAISER_*` environment variables, the `--base-url` flag.
pub fn load_client_config(data_dir: &Path, base_url: Option<String>) -> Result<ClientConfig> {
    let defaults = ClientConfig::default();
    let refresh_mode = serde_json::to_value(defaults.refresh_mode)?
        .as_str()
        .unwrap_or("per_request")
        .to_string();

    let settings = config::Config::builder()
        .set_default("base_url", defaults.base_url)?
        .set_default("timeout_secs", defaults.timeout_secs)?
        .set_default("user_agent", defaults.user_agent)?
        .set_default("refresh_path", defaults.refresh_path)?
        .set_default("login_path", defaults.login_path)?
        .set_default("exempt_paths", defaults.exempt_paths)?
        .set_default("refresh_mode", refresh_mode)?
        .add_source(config::File::from(config_file_path(data_dir)).required(false))
        .add_source(
            config::Environment::with_prefix("FUNDRAISER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("exempt_paths"),
        )
        .set_override_option("base_url", base_url)?
        .build()
        .context("Failed to load configuration")?;

    Ok(settings.try_deserialize()?)
}

/// Write a configuration file holding the defaults
pub fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&ClientConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
