use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::family::Language;
use crate::language::MatchMode;
use crate::pipeline::RankingPolicy;

/// Main configuration structure loaded from coach_engine.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub normalizer: NormalizerConfig,
    pub family: FamilyConfig,
    pub knowledge: KnowledgeConfig,
    pub remote: RemoteConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Template ranking behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub ranking: RankingPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub match_mode: MatchMode,
}

/// Family letter defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FamilyConfig {
    pub default_language: Language,
    /// Sign-off line; locale default when unset
    pub educator_signature: Option<String>,
    /// Parent display name used by the child pipeline's family section
    pub default_parent_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// JSON export imported over the seed knowledge base at startup
    pub seed_path: Option<PathBuf>,
}

pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 20_000;

/// Limits for the optional remote generator
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_filter: "coach_engine=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        let mut config = Self::default();
        if let Ok(filter) = std::env::var("COACH_LOG")
            && !filter.trim().is_empty()
        {
            config.log_filter = filter;
        }
        config
    }
}

/// Parse an env var with `FromStr`, warning (not failing) on bad values.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(v) => {
            tracing::debug!("{} env override applied", key);
            Some(v)
        }
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses COACH_ENGINE_CONFIG environment variable or defaults to "coach_engine.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("COACH_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = std::env::var("COACH_ENGINE_CONFIG")
            .unwrap_or_else(|_| "coach_engine.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(ranking) = env_parse::<RankingPolicy>("COACH_RANKING") {
            self.matching.ranking = ranking;
        }
        if let Some(mode) = env_parse::<MatchMode>("COACH_MATCH_MODE") {
            self.normalizer.match_mode = mode;
        }
        if let Some(language) = env_parse::<Language>("COACH_DEFAULT_LANGUAGE") {
            self.family.default_language = language;
        }
        if let Ok(path) = std::env::var("COACH_KB_PATH") {
            self.knowledge.seed_path = Some(PathBuf::from(path));
        }
        if let Some(timeout) = env_parse::<u64>("COACH_REMOTE_TIMEOUT_MS") {
            self.remote.timeout_ms = timeout;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.remote.timeout_ms == 0 {
            anyhow::bail!("remote.timeout_ms must be greater than 0");
        }
        if self
            .family
            .educator_signature
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            anyhow::bail!("family.educator_signature must not be blank when set");
        }
        if let Some(path) = &self.knowledge.seed_path
            && !path.exists()
        {
            anyhow::bail!("knowledge.seed_path {} does not exist", path.display());
        }
        Ok(())
    }
}
