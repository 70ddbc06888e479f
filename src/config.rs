use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `telegram_bot_token`.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable that overrides `daily_chat_id`.
pub const DAILY_CHAT_ENV: &str = "DAILY_CHAT_ID";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    telegram_bot_token: String,
    /// Chat that receives the morning and evening posts. 0 or absent disables them.
    daily_chat_id: Option<i64>,
    /// Directory for state files (logs, quotes). Defaults to current directory.
    data_dir: Option<String>,
    /// Quotes file. Defaults to `<data_dir>/quotes.json`.
    quotes_file: Option<String>,
}

/// Values read from the environment, kept separate so tests need not touch
/// the real process environment.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub telegram_bot_token: Option<String>,
    pub daily_chat_id: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            telegram_bot_token: std::env::var(TOKEN_ENV).ok(),
            daily_chat_id: std::env::var(DAILY_CHAT_ENV).ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    /// Chat for the daily posts, if enabled.
    pub daily_chat_id: Option<i64>,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
    pub quotes_path: PathBuf,
}

impl Config {
    /// Load from `path` with environment overrides applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with(path, EnvOverrides::from_env())
    }

    /// Load from `path`, a missing file counts as empty.
    pub fn load_with<P: AsRef<Path>>(path: P, env: EnvOverrides) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let file = match std::fs::read_to_string(&config_path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFile::default(),
            Err(e) => return Err(ConfigError::ReadFile { path: config_path, source: e }),
        };

        let telegram_bot_token = env
            .telegram_bot_token
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(file.telegram_bot_token)
            .trim()
            .to_string();
        if telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation(format!(
                "telegram_bot_token is required (config file or {TOKEN_ENV})"
            )));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        let daily_chat_id = match env.daily_chat_id.filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::Validation(format!("{DAILY_CHAT_ENV} must be a numeric chat id, got '{raw}'"))
            })?),
            None => file.daily_chat_id,
        }
        .filter(|&id| id != 0);

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let quotes_path = file
            .quotes_file
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("quotes.json"));

        Ok(Self {
            telegram_bot_token,
            daily_chat_id,
            data_dir,
            quotes_path,
        })
    }
}
