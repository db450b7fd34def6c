//! TOML configuration loaded from `~/.rockbot/config.toml` (or `$ROCKBOT_CONFIG`).

use serde::Deserialize;
use std::time::Duration;
use std::{env, path::PathBuf};

use rockbot_providers::{GameApiConfig, SuggestConfig, retry::RetryConfig};
use rockbot_types::{ApiKey, StartPolicy, SuggestionTiming};
use thiserror::Error;

use crate::cooldown::{CooldownPolicy, Jitter};
use crate::executor::RoundPolicy;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ROCKBOT_CONFIG";
/// Environment variable that overrides `[api_keys].openai`.
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_COMMAND_PREFIX: &str = "!";

#[derive(Debug, Default, Deserialize)]
pub struct RockbotConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub game: Option<GameConfig>,
    pub model: Option<ModelConfig>,
    pub cooldown: Option<CooldownConfig>,
    pub session: Option<SessionConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Prefix that marks a chat line as a command. Default: `!`.
    pub command_prefix: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub openai: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let openai = if self.openai.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("ApiKeys").field("openai", &openai).finish()
    }
}

/// Game server connection.
///
/// ```toml
/// [game]
/// base_url = "https://www.whatbeatsrock.com"
/// user_agent = "rockbot/0.1"
/// timeout_secs = 15
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct GameConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Suggestion model request defaults.
///
/// ```toml
/// [model]
/// model = "gpt-4"
/// temperature = 1.1
/// max_tokens = 16
/// timeout_secs = 30
/// max_retries = 2
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ModelConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

/// Rate limits around the game server. Fractional seconds are allowed.
#[derive(Debug, Default, Deserialize)]
pub struct CooldownConfig {
    pub per_caller_secs: Option<f64>,
    pub global_secs: Option<f64>,
    pub jitter_min_secs: Option<f64>,
    pub jitter_max_secs: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub start_policy: StartPolicy,
    #[serde(default)]
    pub suggestion_timing: SuggestionTiming,
    pub block_limit: Option<u32>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if var.is_empty() {
            out.push_str("${}");
        } else {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn expanded(value: Option<&String>) -> Option<String> {
    value
        .map(|raw| expand_env_vars(raw))
        .filter(|v| !v.trim().is_empty())
}

/// Seconds as a `Duration`. Negative, NaN, and out-of-range values are ignored.
fn seconds(value: Option<f64>) -> Option<Duration> {
    value.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

impl RockbotConfig {
    /// Load the config file. A missing file is not an error and yields `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Option<Self>, ConfigError> {
        let path = path.into();
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn command_prefix(&self) -> String {
        self.app
            .as_ref()
            .and_then(|app| app.command_prefix.as_deref())
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or(DEFAULT_COMMAND_PREFIX)
            .to_string()
    }

    /// OpenAI key: the environment wins over the file. `None` when neither is set.
    #[must_use]
    pub fn openai_key(&self) -> Option<ApiKey> {
        self.openai_key_with(env::var(OPENAI_KEY_ENV).ok())
    }

    fn openai_key_with(&self, from_env: Option<String>) -> Option<ApiKey> {
        from_env.and_then(ApiKey::new).or_else(|| {
            let keys = self.api_keys.as_ref()?;
            expanded(keys.openai.as_ref()).and_then(ApiKey::new)
        })
    }

    #[must_use]
    pub fn game_api(&self) -> GameApiConfig {
        let mut config = GameApiConfig::default();
        if let Some(game) = &self.game {
            if let Some(base_url) = expanded(game.base_url.as_ref()) {
                config.base_url = base_url;
            }
            if let Some(user_agent) = expanded(game.user_agent.as_ref()) {
                config.user_agent = user_agent;
            }
            if let Some(secs) = game.timeout_secs.filter(|secs| *secs > 0) {
                config.timeout = Duration::from_secs(secs);
            }
        }
        config
    }

    #[must_use]
    pub fn suggest(&self) -> SuggestConfig {
        let mut config = SuggestConfig::default();
        if let Some(model) = &self.model {
            if let Some(name) = expanded(model.model.as_ref()) {
                config.model = name;
            }
            if let Some(base_url) = expanded(model.base_url.as_ref()) {
                config.base_url = base_url;
            }
            if let Some(temperature) = model.temperature.filter(|t| (0.0..=2.0).contains(t)) {
                config.temperature = temperature;
            }
            if let Some(max_tokens) = model.max_tokens.filter(|n| *n > 0) {
                config.max_tokens = max_tokens;
            }
            if let Some(secs) = model.timeout_secs.filter(|secs| *secs > 0) {
                config.timeout = Duration::from_secs(secs);
            }
            if let Some(max_retries) = model.max_retries {
                config.retry = RetryConfig {
                    max_retries,
                    ..config.retry
                };
            }
        }
        config
    }

    #[must_use]
    pub fn cooldown(&self) -> CooldownPolicy {
        let mut policy = CooldownPolicy::default();
        if let Some(cooldown) = &self.cooldown {
            if let Some(per_caller) = seconds(cooldown.per_caller_secs) {
                policy.per_caller = per_caller;
            }
            if let Some(global) = seconds(cooldown.global_secs) {
                policy.global = global;
            }
        }
        policy
    }

    #[must_use]
    pub fn jitter(&self) -> Jitter {
        let (default_min, default_max) = Jitter::default().bounds();
        let Some(cooldown) = &self.cooldown else {
            return Jitter::default();
        };
        Jitter::new(
            seconds(cooldown.jitter_min_secs).unwrap_or(default_min),
            seconds(cooldown.jitter_max_secs).unwrap_or(default_max),
        )
    }

    #[must_use]
    pub fn start_policy(&self) -> StartPolicy {
        self.session
            .as_ref()
            .map(|session| session.start_policy)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn round_policy(&self) -> RoundPolicy {
        let mut policy = RoundPolicy {
            jitter: self.jitter(),
            ..RoundPolicy::default()
        };
        if let Some(session) = &self.session {
            policy.timing = session.suggestion_timing;
            if let Some(limit) = session.block_limit.filter(|limit| *limit > 0) {
                policy.block_limit = limit;
            }
        }
        policy
    }
}

/// `$ROCKBOT_CONFIG` when set, else `~/.rockbot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".rockbot").join("config.toml"))
}
