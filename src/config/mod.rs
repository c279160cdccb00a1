//! Configuration system (layered: defaults < config file < env < code).

pub mod secret;

pub use secret::ApiKey;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;

use crate::error::{LookoutError, Result};

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_GREETING: &str =
    "Hi, I'm a chatbot who can search the web. How can I help you?";
pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

const CONFIG_FILE_NAME: &str = "config.toml";

/// Result bounds for the encyclopedia and paper lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct LookupLimits {
    /// How many top results to fetch and include.
    #[builder(default = 1)]
    pub top_k_results: usize,
    /// Maximum characters of the combined result text.
    #[builder(default = 200)]
    pub max_chars: usize,
}

impl Default for LookupLimits {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Layered configuration for Lookout.
///
/// Resolution order (later wins):
/// 1. Built-in defaults
/// 2. `~/.lookout/config.toml` (or the file named by `LOOKOUT_CONFIG`)
/// 3. Environment variables, after loading `.env` if present
/// 4. Explicit setters (CLI flags)
#[derive(Debug, Clone)]
pub struct LookoutConfig {
    api_keys: HashMap<String, ApiKey>,
    base_urls: HashMap<String, String>,
    pub model: String,
    pub greeting: String,
    pub system_prompt: Option<String>,
    pub max_iterations: usize,
    pub tool_timeout: Duration,
    pub expand_thoughts: bool,
    pub lookup: LookupLimits,
}

impl Default for LookoutConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk TOML shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub model: Option<String>,
    pub greeting: Option<String>,
    pub system_prompt: Option<String>,
    pub max_iterations: Option<usize>,
    pub tool_timeout_secs: Option<u64>,
    pub expand_thoughts: Option<bool>,
    pub lookup: Option<LookupSection>,
    pub base_urls: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupSection {
    pub top_k_results: Option<usize>,
    pub max_chars: Option<usize>,
}

impl LookoutConfig {
    /// Built-in defaults, no credentials.
    pub fn new() -> Self {
        Self {
            api_keys: HashMap::new(),
            base_urls: HashMap::new(),
            model: DEFAULT_MODEL.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            expand_thoughts: false,
            lookup: LookupLimits::default(),
        }
    }

    /// Full layered load: defaults, then the config file (if any), then env.
    ///
    /// A missing file is fine; an unreadable or malformed one is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();

        let path = std::env::var_os("LOOKOUT_CONFIG")
            .map(PathBuf::from)
            .or_else(default_config_path);
        if let Some(path) = path {
            if path.exists() {
                let file = Self::read_file(&path)?;
                config.apply_file(file);
                tracing::debug!(path = %path.display(), "loaded config file");
            }
        }

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn read_file(path: &Path) -> Result<ConfigFile> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            LookoutError::Configuration(format!("{}: {e}", path.display()))
        })
    }

    /// Overlay values from a parsed config file.
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(greeting) = file.greeting {
            self.greeting = greeting;
        }
        if file.system_prompt.is_some() {
            self.system_prompt = file.system_prompt;
        }
        if let Some(n) = file.max_iterations {
            self.max_iterations = n;
        }
        if let Some(secs) = file.tool_timeout_secs {
            self.tool_timeout = Duration::from_secs(secs);
        }
        if let Some(expand) = file.expand_thoughts {
            self.expand_thoughts = expand;
        }
        if let Some(lookup) = file.lookup {
            if let Some(k) = lookup.top_k_results {
                self.lookup.top_k_results = k;
            }
            if let Some(max) = lookup.max_chars {
                self.lookup.max_chars = max;
            }
        }
        for (service, url) in file.base_urls {
            self.set_base_url(&service, url);
        }
    }

    /// Overlay values from an environment-like lookup.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("GROQ_API_KEY") {
            self.set_api_key("groq", key);
        }
        if let Some(model) = var("LOOKOUT_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }

        let url_mappings = [
            ("GROQ_BASE_URL", "groq"),
            ("WIKIPEDIA_BASE_URL", "wikipedia"),
            ("ARXIV_BASE_URL", "arxiv"),
            ("DUCKDUCKGO_BASE_URL", "duckduckgo"),
        ];
        for (env_var, service) in &url_mappings {
            if let Some(url) = var(env_var) {
                self.set_base_url(service, url);
            }
        }
    }

    pub fn set_api_key(&mut self, provider: &str, key: impl Into<ApiKey>) {
        self.api_keys.insert(provider.to_string(), key.into());
    }

    /// Resolve the API key for a provider. Absent keys resolve to an empty
    /// key so the failure surfaces when the provider is actually called.
    pub fn api_key(&self, provider: &str) -> ApiKey {
        self.api_keys.get(provider).cloned().unwrap_or_default()
    }

    pub fn set_base_url(&mut self, service: &str, url: String) {
        self.base_urls
            .insert(service.to_string(), url.trim_end_matches('/').to_string());
    }

    pub fn base_url(&self, service: &str) -> Option<String> {
        self.base_urls.get(service).cloned()
    }

    /// Check if a provider has a non-empty key configured.
    pub fn has_credentials(&self, provider: &str) -> bool {
        self.api_key(provider).is_present()
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".lookout").join(CONFIG_FILE_NAME))
}
