use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

const CONFIG_ENV_VAR: &str = "PLAYLIST_CURATOR_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root holding the `data/`, `log/` and `tokens/` directories.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_channel_page_base_url")]
    pub channel_page_base_url: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default = "default_min_duration")]
    pub min_duration_seconds: u64,

    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,

    #[serde(default = "default_scrape_timeout")]
    pub scrape_timeout_secs: u64,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_channel_page_base_url() -> String {
    "https://www.youtube.com/channel".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_min_duration() -> u64 {
    600
}

fn default_retention_days() -> i64 {
    7
}

fn default_api_timeout() -> u64 {
    30
}

fn default_scrape_timeout() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            api_base_url: default_api_base_url(),
            channel_page_base_url: default_channel_page_base_url(),
            token_uri: default_token_uri(),
            min_duration_seconds: default_min_duration(),
            retention_days: default_retention_days(),
            api_timeout_secs: default_api_timeout(),
            scrape_timeout_secs: default_scrape_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("playlist-curator")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.retention_days < 0 {
            return Err(AppError::Config(format!(
                "retention_days must not be negative (got {})",
                self.retention_days
            )));
        }
        for (key, value) in [
            ("api_base_url", &self.api_base_url),
            ("channel_page_base_url", &self.channel_page_base_url),
            ("token_uri", &self.token_uri),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::Config(format!("{key} is not a valid URL ({value}): {e}")))?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join("log")
    }

    pub fn tokens_dir(&self) -> PathBuf {
        self.base_dir.join("tokens")
    }

    pub fn channels_path(&self) -> PathBuf {
        self.data_dir().join("channels.json")
    }

    pub fn playlists_path(&self) -> PathBuf {
        self.data_dir().join("playlists.json")
    }

    pub fn ignore_path(&self) -> PathBuf {
        self.data_dir().join("ignore.json")
    }

    pub fn mix_history_path(&self) -> PathBuf {
        self.data_dir().join("mix_history.csv")
    }

    pub fn history_log_path(&self) -> PathBuf {
        self.log_dir().join("history.log")
    }

    pub fn last_exe_log_path(&self) -> PathBuf {
        self.log_dir().join("last_exe.log")
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.tokens_dir().join("credentials.json")
    }

    pub fn encoded_credentials_path(&self) -> PathBuf {
        self.tokens_dir().join("credentials_b64.txt")
    }

    pub fn refreshed_credentials_path(&self) -> PathBuf {
        self.tokens_dir().join("creds_b64.txt")
    }
}
