//! Configuration file management for waymark.
//!
//! Provides a TOML-based config file at `~/.config/waymark/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use waymark_core::ProvidersConfig;
use waymark_core::provider::ProviderSettings;
use waymark_store::StoreConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub providers: ProvidersSection,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProvidersSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistral_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistral_model: Option<String>,
    /// Whole-request timeout for provider calls, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClientSection {
    /// Base URL of a running `waymark serve`. When set, project commands
    /// generate through it instead of in-process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Starter config written by `waymark init`. Provider keys are the
    /// placeholders, which count as unconfigured.
    pub fn template() -> Self {
        Self {
            server: ServerSection {
                bind: Some(ServerConfig::DEFAULT_BIND.to_owned()),
                port: Some(ServerConfig::DEFAULT_PORT),
                allowed_origins: Some(default_origins()),
                environment: Some(ServerConfig::DEFAULT_ENVIRONMENT.to_owned()),
            },
            providers: ProvidersSection {
                gemini_api_key: Some("your-gemini-api-key-here".to_owned()),
                mistral_api_key: Some("your_mistral_api_key_here".to_owned()),
                gemini_model: None,
                mistral_model: None,
                timeout_secs: Some(ProvidersConfig::DEFAULT_TIMEOUT.as_secs()),
            },
            client: ClientSection::default(),
            storage: StorageSection::default(),
        }
    }
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_owned(),
        "http://127.0.0.1:5173".to_owned(),
    ]
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the waymark config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/waymark` or `~/.config/waymark`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("waymark");
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("waymark")
}

/// Return the path to the waymark config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Load the config file if present. A file that exists but does not parse
/// is an error.
fn load_config_if_present() -> Result<Option<ConfigFile>> {
    if config_path().exists() {
        load_config().map(Some)
    } else {
        Ok(None)
    }
}

/// Write raw config contents, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn write_config_contents(contents: &str) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Serialize and write the config file.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    write_config_contents(&contents)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub state_path: Option<PathBuf>,
    pub server_url: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub environment: String,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 3001;
    pub const DEFAULT_ENVIRONMENT: &str = "development";
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::DEFAULT_BIND.to_owned(),
            port: Self::DEFAULT_PORT,
            allowed_origins: default_origins(),
            environment: Self::DEFAULT_ENVIRONMENT.to_owned(),
        }
    }
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct WaymarkConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub store: StoreConfig,
    /// Remote server for project commands, if any.
    pub server_url: Option<String>,
}

/// Read an env var, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

impl WaymarkConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Port: `--port` > `PORT` > `server.port` > 3001
    /// - Origins: `ALLOWED_ORIGINS` (comma-separated) > `server.allowed_origins` > Vite dev origins
    /// - Keys: `GEMINI_API_KEY` / `MISTRAL_API_KEY` > `providers.*_api_key` > none
    /// - Timeout: `WAYMARK_TIMEOUT_SECS` > `providers.timeout_secs` > 30
    /// - State file: `--state-path` > `WAYMARK_STATE_PATH` > `storage.state_path` > XDG data dir
    /// - Server URL: `--server-url` > `WAYMARK_SERVER_URL` > `client.server_url` > none
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file = load_config_if_present()?.unwrap_or_default();

        let port = match (overrides.port, env_var("PORT")) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT env var is not a valid port: {raw:?}"))?,
            (None, None) => file.server.port.unwrap_or(ServerConfig::DEFAULT_PORT),
        };

        let server = ServerConfig {
            bind: overrides
                .bind
                .clone()
                .or(file.server.bind)
                .unwrap_or_else(|| ServerConfig::DEFAULT_BIND.to_owned()),
            port,
            allowed_origins: env_var("ALLOWED_ORIGINS")
                .map(|raw| split_origins(&raw))
                .or(file.server.allowed_origins)
                .unwrap_or_else(default_origins),
            environment: env_var("WAYMARK_ENV")
                .or(file.server.environment)
                .unwrap_or_else(|| ServerConfig::DEFAULT_ENVIRONMENT.to_owned()),
        };

        let timeout = match env_var("WAYMARK_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().with_context(|| {
                format!("WAYMARK_TIMEOUT_SECS env var is not a number of seconds: {raw:?}")
            })?),
            None => file
                .providers
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(ProvidersConfig::DEFAULT_TIMEOUT),
        };

        let mut gemini = ProviderSettings::gemini(
            env_var("GEMINI_API_KEY").or(file.providers.gemini_api_key),
        );
        if let Some(model) = file.providers.gemini_model {
            gemini = gemini.with_model(model);
        }
        let mut mistral = ProviderSettings::mistral(
            env_var("MISTRAL_API_KEY").or(file.providers.mistral_api_key),
        );
        if let Some(model) = file.providers.mistral_model {
            mistral = mistral.with_model(model);
        }
        let providers = ProvidersConfig {
            gemini,
            mistral,
            timeout,
        };

        let store = match overrides.state_path.clone() {
            Some(path) => StoreConfig::new(path),
            None => StoreConfig::resolve(file.storage.state_path),
        };

        let server_url = overrides
            .server_url
            .clone()
            .or_else(|| env_var("WAYMARK_SERVER_URL"))
            .or(file.client.server_url)
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            server,
            providers,
            store,
            server_url,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
