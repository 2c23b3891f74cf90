//! Application configuration.
//!
//! The configuration selects the storage backend and holds its connection
//! settings. It lives as pretty-printed JSON in the application data
//! directory, and a few environment variables (also read from a `.env` file)
//! take precedence over the file:
//!
//! | Variable             | Overrides                |
//! |----------------------|--------------------------|
//! | `TASKBOARD_BACKEND`  | `backend` (`remote`/`local`) |
//! | `TASKBOARD_API_URL`  | `remote.api_url`         |
//! | `TASKBOARD_API_KEY`  | `remote.api_key`         |
//! | `TASKBOARD_DB_FILE`  | `local.db_file`          |
//!
//! ```rust,no_run
//! use taskboard::libs::config::Config;
//!
//! let config = Config::init()?;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DB_FILE_NAME: &str = "taskboard.db";

pub const ENV_BACKEND: &str = "TASKBOARD_BACKEND";
pub const ENV_API_URL: &str = "TASKBOARD_API_URL";
pub const ENV_API_KEY: &str = "TASKBOARD_API_KEY";
pub const ENV_DB_FILE: &str = "TASKBOARD_DB_FILE";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Remote,
    #[default]
    Local,
}

impl Backend {
    const ALL: [Backend; 2] = [Backend::Local, Backend::Remote];

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Some(Backend::Remote),
            "local" => Some(Backend::Local),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Backend::Remote => "Remote (PostgREST / Supabase)",
            Backend::Local => "Local (SQLite file)",
        }
    }
}

/// Connection settings for a PostgREST-compatible endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct RemoteConfig {
    /// Project URL without the `/rest/v1` suffix, e.g. `https://xyz.supabase.co`.
    pub api_url: String,
    /// Anonymous or service key sent with every request.
    pub api_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct LocalConfig {
    /// Database file. Defaults to `taskboard.db` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_file: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalConfig>,
}

impl Config {
    /// Reads the saved file, or the default configuration when none exists.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(config_file_path)?;
        Ok(serde_json::from_str(&config_str)?)
    }

    /// The saved configuration with environment overrides applied.
    pub fn load() -> Result<Config> {
        let mut config = Self::read()?;
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        if let Some(backend) = env::var(ENV_BACKEND).ok().as_deref().and_then(Backend::parse) {
            self.backend = backend;
        }

        let api_url = env::var(ENV_API_URL).ok().filter(|v| !v.is_empty());
        let api_key = env::var(ENV_API_KEY).ok().filter(|v| !v.is_empty());
        if api_url.is_some() || api_key.is_some() {
            let remote = self.remote.get_or_insert_with(RemoteConfig::default);
            if let Some(api_url) = api_url {
                remote.api_url = api_url;
            }
            if let Some(api_key) = api_key {
                remote.api_key = api_key;
            }
        }

        if let Some(db_file) = env::var(ENV_DB_FILE).ok().filter(|v| !v.is_empty()) {
            self.local = Some(LocalConfig {
                db_file: Some(PathBuf::from(db_file)),
            });
        }
    }

    /// Path of the SQLite file used by the local backend.
    pub fn local_db_path(&self) -> io::Result<PathBuf> {
        match self.local.as_ref().and_then(|local| local.db_file.clone()) {
            Some(path) => Ok(path),
            None => DataStorage::new().get_path(DB_FILE_NAME),
        }
    }

    /// Interactive setup wizard, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let labels: Vec<&str> = Backend::ALL.iter().map(Backend::label).collect();
        let current = Backend::ALL.iter().position(|b| *b == config.backend).unwrap_or(0);
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectBackend.to_string())
            .items(&labels)
            .default(current)
            .interact()?;
        config.backend = Backend::ALL[selection];

        match config.backend {
            Backend::Remote => {
                let default = config.remote.clone().unwrap_or_default();
                msg_print!(Message::ConfigModuleRemote);
                config.remote = Some(RemoteConfig {
                    api_url: Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptApiUrl.to_string())
                        .default(default.api_url)
                        .interact_text()?,
                    api_key: Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptApiKey.to_string())
                        .default(default.api_key)
                        .interact_text()?,
                });
            }
            Backend::Local => {
                msg_print!(Message::ConfigModuleLocal);
                let default = config.local_db_path()?.display().to_string();
                let db_file: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::PromptDbFile.to_string())
                    .default(default)
                    .interact_text()?;
                config.local = Some(LocalConfig {
                    db_file: Some(PathBuf::from(db_file)),
                });
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_defaults_to_local() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.backend, Backend::Local);
        assert!(config.remote.is_none());
    }

    #[test]
    fn remote_config_serializes_lowercase_backend() {
        let config = Config {
            backend: Backend::Remote,
            remote: Some(RemoteConfig {
                api_url: "https://demo.supabase.co".to_string(),
                api_key: "anon".to_string(),
            }),
            local: None,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["backend"], "remote");
        assert!(json.get("local").is_none());
    }

    #[test]
    fn explicit_db_file_wins() {
        let config = Config {
            local: Some(LocalConfig {
                db_file: Some(PathBuf::from("/tmp/board.db")),
            }),
            ..Default::default()
        };
        assert_eq!(config.local_db_path().unwrap(), PathBuf::from("/tmp/board.db"));
    }
}
