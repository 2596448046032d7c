//! Local configuration: backend URL, credentials, default signature.
//!
//! Sources are layered, later ones winning:
//! 1. built-in defaults
//! 2. `mailpilot-config.json` next to the executable (distribution defaults)
//! 3. `mailpilot-config.json` in the user config directory, non-empty fields only
//! 4. the `MAILPILOT_GAS_URL` environment variable

use crate::error::Result;
use crate::matching::SafetyRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs.
pub const APP_NAME: &str = "mailpilot";

/// Configuration file name.
pub const CONFIG_FILE: &str = "mailpilot-config.json";

/// Environment variable overriding the backend URL.
pub const GAS_URL_ENV: &str = "MAILPILOT_GAS_URL";

/// Persisted application configuration.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend web-app URL; empty means unconfigured.
    pub gas_url: String,
    /// Default signature.
    pub signature: String,
    /// Basic authentication id.
    pub basic_auth_id: String,
    /// Basic authentication password.
    pub basic_auth_pw: String,
    /// Legal-entity suffixes ignored by the send-safety check; empty selects
    /// the built-in Japanese list.
    pub corporate_suffixes: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("gas_url", &self.gas_url)
            .field("signature", &self.signature)
            .field("basic_auth_id", &self.basic_auth_id)
            .field("basic_auth_pw", &"<redacted>")
            .field("corporate_suffixes", &self.corporate_suffixes)
            .finish()
    }
}

impl Config {
    /// Returns true when a backend URL is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.gas_url.trim().is_empty()
    }

    /// Send-safety rules for the configured suffix list.
    #[must_use]
    pub fn safety_rules(&self) -> SafetyRules {
        if self.corporate_suffixes.is_empty() {
            SafetyRules::default()
        } else {
            SafetyRules::with_suffixes(&self.corporate_suffixes)
        }
    }

    /// Overwrites fields with the non-empty values of `other`.
    fn merge_non_empty(&mut self, other: Self) {
        if !other.gas_url.is_empty() {
            self.gas_url = other.gas_url;
        }
        if !other.signature.is_empty() {
            self.signature = other.signature;
        }
        if !other.basic_auth_id.is_empty() {
            self.basic_auth_id = other.basic_auth_id;
        }
        if !other.basic_auth_pw.is_empty() {
            self.basic_auth_pw = other.basic_auth_pw;
        }
        if !other.corporate_suffixes.is_empty() {
            self.corporate_suffixes = other.corporate_suffixes;
        }
    }

    /// Loads configuration from `paths`, applying `env_url` last.
    ///
    /// Missing or unreadable files are skipped; loading never fails.
    pub async fn load(paths: &ConfigPaths, env_url: Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = paths.exe_file() {
            if let Some(exe_config) = read_config(&path).await {
                config = exe_config;
            }
        }

        if let Some(path) = paths.user_file() {
            if let Some(user_config) = read_config(&path).await {
                config.merge_non_empty(user_config);
            }
        }

        if let Some(url) = env_url.filter(|url| !url.is_empty()) {
            tracing::info!("Using GAS URL from {GAS_URL_ENV}");
            config.gas_url = url;
        }

        config
    }

    /// Loads configuration from the platform locations and environment.
    pub async fn load_default() -> Self {
        Self::load(&ConfigPaths::discover(), std::env::var(GAS_URL_ENV).ok()).await
    }

    /// Writes the configuration to the user config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no user directory is known, or if the directory or
    /// file cannot be written.
    pub async fn save(&self, paths: &ConfigPaths) -> Result<PathBuf> {
        let dir = paths.user_dir.as_deref().ok_or_else(|| {
            crate::Error::Config("user configuration directory is unknown".to_string())
        })?;

        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents).await?;

        tracing::info!("Settings saved to {:?}", path);
        Ok(path)
    }
}

async fn read_config(path: &Path) -> Option<Config> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Skipping unreadable config {:?}: {e}", path);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", path);
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Skipping invalid config {:?}: {e}", path);
            None
        }
    }
}

/// Directories searched for the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Directory of the running executable.
    pub exe_dir: Option<PathBuf>,
    /// Per-user configuration directory.
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Uses the executable's directory and `<config_dir>/mailpilot`.
    #[must_use]
    pub fn discover() -> Self {
        Self {
            exe_dir: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
            user_dir: dirs::config_dir().map(|dir| dir.join(APP_NAME)),
        }
    }

    /// Uses a single directory for both layers.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            exe_dir: Some(dir.clone()),
            user_dir: Some(dir),
        }
    }

    /// Path of the distribution config file, if the directory is known.
    #[must_use]
    pub fn exe_file(&self) -> Option<PathBuf> {
        self.exe_dir.as_ref().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Path of the user config file, if the directory is known.
    #[must_use]
    pub fn user_file(&self) -> Option<PathBuf> {
        self.user_dir.as_ref().map(|dir| dir.join(CONFIG_FILE))
    }
}
