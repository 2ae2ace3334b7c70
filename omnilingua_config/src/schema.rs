use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use omnilingua_core::util::{DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_WELCOME_MESSAGE};

/// Environment variables consulted for the API key when the config does not
/// name one.
const DEFAULT_API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    #[serde(default = "AgentConfig::default_model")]
    pub model: String,
    #[serde(default = "AgentConfig::default_system_instruction")]
    pub system_instruction: String,
    #[serde(default = "AgentConfig::default_welcome_message")]
    pub welcome_message: String,
    /// Number of history messages replayed per request; all when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            system_instruction: Self::default_system_instruction(),
            welcome_message: Self::default_welcome_message(),
            history_limit: None,
        }
    }
}

impl AgentConfig {
    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    fn default_system_instruction() -> String {
        DEFAULT_SYSTEM_INSTRUCTION.to_string()
    }

    fn default_welcome_message() -> String {
        DEFAULT_WELCOME_MESSAGE.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "ProviderConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key_env: None,
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    const fn default_request_timeout_secs() -> u64 {
        120
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the API key through `lookup` (normally `std::env::var`).
    ///
    /// A configured `api_key_env` is the only variable consulted; otherwise
    /// `GEMINI_API_KEY` then `API_KEY`. Blank values count as missing.
    pub fn resolve_api_key<F>(&self, lookup: F) -> anyhow::Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let candidates: Vec<&str> = self
            .api_key_env
            .as_deref()
            .map_or_else(|| DEFAULT_API_KEY_VARS.to_vec(), |name| vec![name]);

        for name in &candidates {
            if let Some(key) = lookup(name).filter(|k| !k.trim().is_empty()) {
                debug!("Using API key from ${name}");
                return Ok(key);
            }
        }

        anyhow::bail!(
            "No API key found. Set {} in the environment.",
            candidates
                .iter()
                .map(|n| format!("${n}"))
                .collect::<Vec<_>>()
                .join(" or ")
        )
    }

    /// Resolve the API key from the process environment.
    pub fn api_key(&self) -> anyhow::Result<String> {
        self.resolve_api_key(|name| std::env::var(name).ok())
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("omnilingua"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/omnilingua/config.json`, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::from_json(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", config_path.display())
        })?;

        info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        if config.provider.request_timeout_secs == 0 {
            anyhow::bail!("provider.request_timeout_secs must be at least 1");
        }
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(&config_path, template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Export your Gemini API key: export GEMINI_API_KEY=...");
        println!("   2. Run 'omnilingua chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - agent.model: model to use (gemini-2.5-flash, gemini-2.5-pro, etc.)");
        println!("   - agent.history_limit: number of messages replayed per request");
        println!("   - provider.api_key_env: environment variable holding the API key");
        println!();
        Ok(())
    }
}
