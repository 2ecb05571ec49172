//! Configuration loading and the provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use aceprep_core::model::ExamLevel;
use aceprep_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = "aceprep.toml";

/// One prompt-substring route of a mock provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockRoute {
    pub contains: String,
    pub response: String,
}

/// Configuration for a single provider.
///
/// API keys are masked in `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Mock {
        #[serde(default)]
        response: String,
        #[serde(default)]
        routes: Vec<MockRoute>,
        /// When set, every call fails with this message.
        #[serde(default)]
        fail: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock {
                response,
                routes,
                fail,
            } => f
                .debug_struct("Mock")
                .field("response_len", &response.len())
                .field("routes", &routes.len())
                .field("fail", fail)
                .finish(),
        }
    }
}

/// Top-level aceprep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AceprepConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Where templates and the personal best are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub default_exam: ExamLevel,
    /// Optional TOML file replacing the built-in standard catalog.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    8192
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./.aceprep")
}

impl Default for AceprepConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            data_dir: default_data_dir(),
            default_exam: ExamLevel::default(),
            catalog: None,
        }
    }
}

impl AceprepConfig {
    /// Look up a configured provider by name.
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig> {
        self.providers.get(name).with_context(|| {
            let mut known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
            known.sort_unstable();
            format!(
                "provider '{name}' is not configured (configured: {}); add [providers.{name}] to {LOCAL_CONFIG_FILE} or set ACEPREP_{}_KEY",
                if known.is_empty() { "none".to_string() } else { known.join(", ") },
                name.to_uppercase()
            )
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let resolve_opt = |v: &Option<String>| v.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: resolve_opt(base_url),
            org_id: resolve_opt(org_id),
        },
        ProviderConfig::Mock { .. } => config.clone(),
    }
}

/// Set `name`'s API key from `env_var`, creating the entry if needed.
fn apply_key_override(
    providers: &mut HashMap<String, ProviderConfig>,
    name: &str,
    env_var: &str,
    empty: fn() -> ProviderConfig,
) {
    let Ok(key) = std::env::var(env_var) else {
        return;
    };
    let entry = providers.entry(name.to_string()).or_insert_with(empty);
    match entry {
        ProviderConfig::Gemini { api_key, .. }
        | ProviderConfig::Anthropic { api_key, .. }
        | ProviderConfig::OpenAI { api_key, .. } => *api_key = key,
        ProviderConfig::Mock { .. } => {
            tracing::warn!(provider = name, "{env_var} ignored for a mock provider");
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `aceprep.toml` in the current directory
/// 2. `~/.config/aceprep/config.toml`
///
/// Environment variable overrides: `ACEPREP_GEMINI_KEY`,
/// `ACEPREP_ANTHROPIC_KEY`, `ACEPREP_OPENAI_KEY`.
pub fn load_config() -> Result<AceprepConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AceprepConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AceprepConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AceprepConfig::default(),
    };

    apply_key_override(&mut config.providers, "gemini", "ACEPREP_GEMINI_KEY", || {
        ProviderConfig::Gemini {
            api_key: String::new(),
            base_url: None,
        }
    });
    apply_key_override(
        &mut config.providers,
        "anthropic",
        "ACEPREP_ANTHROPIC_KEY",
        || ProviderConfig::Anthropic {
            api_key: String::new(),
            base_url: None,
        },
    );
    apply_key_override(&mut config.providers, "openai", "ACEPREP_OPENAI_KEY", || {
        ProviderConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            org_id: None,
        }
    });

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("aceprep"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    let key_missing = |api_key: &str| -> Result<()> {
        if api_key.trim().is_empty() {
            anyhow::bail!("provider '{name}' has an empty api_key");
        }
        Ok(())
    };
    let provider: Arc<dyn LlmProvider> = match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            key_missing(api_key)?;
            Arc::new(GeminiProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::Anthropic { api_key, base_url } => {
            key_missing(api_key)?;
            Arc::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            key_missing(api_key)?;
            Arc::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )?)
        }
        ProviderConfig::Mock {
            response,
            routes,
            fail,
        } => match fail {
            Some(message) => Arc::new(MockProvider::failing(message)),
            None => Arc::new(MockProvider::new(
                routes
                    .iter()
                    .map(|r| (r.contains.clone(), r.response.clone()))
                    .collect(),
                response,
            )),
        },
    };
    tracing::debug!(provider = name, "created provider");
    Ok(provider)
}
