//! Topic catalogue files and provider settings.
//!
//! Two sources feed a run:
//!
//! - [`AppConfig`]: the YAML document holding the topic catalogue, tone options and
//!   `ai_config` defaults. Loaded with [`load_config`] or resolved with [`resolve_config`].
//! - [`ProviderSettings`]: API key, model, temperature, max tokens and base URL for the
//!   selected provider, read from the process environment (after `.env` is loaded).
//!
//! Precedence for provider settings is CLI flag > environment > `ai_config` > built-in default.
//!
//! # Examples
//!
//! ```no_run
//! use trendmine::config::load_config;
//!
//! let config = load_config("config.yaml").unwrap();
//! println!("{} topics", config.topics.len());
//! ```

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{
    api::Provider,
    error::{Error, Result},
    topics::Topic,
};

/// The built-in configuration shipped with the crate.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../config.yaml");

/// Generation defaults from the `ai_config` section.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AiConfig {
    pub default_provider: Option<Provider>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub default_tone: Option<String>,
}

/// A parsed `config.yaml`: topics, tones and generation defaults.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub ai_config: AiConfig,

    #[serde(default)]
    pub tone_options: Vec<String>,

    pub topics: Vec<Topic>,
}

impl AppConfig {
    /// Parses the configuration embedded in the binary.
    pub fn builtin() -> Result<AppConfig> {
        Ok(serde_yaml::from_str(DEFAULT_CONFIG_YAML)?)
    }

    /// The tone used when none is given on the command line.
    pub fn default_tone(&self) -> String {
        self.ai_config
            .default_tone
            .clone()
            .unwrap_or_else(|| crate::prompt::DEFAULT_TONE.to_string())
    }
}

/// Reads and validates a topic configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or lists no topics.
pub fn load_config(file: impl AsRef<Path>) -> Result<AppConfig> {
    let file = file.as_ref();
    debug!("Loading config from: {}", file.display());
    let content = fs::read_to_string(file)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    if config.topics.is_empty() {
        return Err(Error::Config(format!(
            "{} does not define any topics",
            file.display()
        )));
    }
    Ok(config)
}

/// Finds the configuration to use for this run.
///
/// An explicit path must exist. Otherwise `./config.yaml`, then
/// `<config_dir>/config.yaml`, then the built-in defaults are tried in order.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }
        return load_config(path);
    }

    for candidate in candidate_paths() {
        if candidate.is_file() {
            info!("Using configuration: {}", candidate.display());
            return load_config(&candidate);
        }
    }

    debug!("No configuration file found, using built-in topics");
    AppConfig::builtin()
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        paths.push(cwd.join("config.yaml"));
    }
    if let Ok(dir) = crate::config_dir() {
        paths.push(dir.join("config.yaml"));
    }
    paths
}

/// Loads `.env` from the current directory or its parents, if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
    }
}

/// Everything an adapter needs to talk to one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_base: String,
}

pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

impl ProviderSettings {
    /// Reads settings for `provider` from the process environment.
    pub fn from_env(provider: Provider, ai_config: &AiConfig) -> Result<Self> {
        Self::from_lookup(provider, ai_config, |name| env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    ///
    /// The key is taken from the first non-empty variable in
    /// [`Provider::key_vars`]; overrides come from `<PREFIX>_MODEL`,
    /// `<PREFIX>_TEMPERATURE`, `<PREFIX>_MAX_TOKENS` and `<PREFIX>_API_BASE`.
    pub fn from_lookup<F>(provider: Provider, ai_config: &AiConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            lookup(&format!("{}_{suffix}", provider.env_prefix()))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = provider
            .key_vars()
            .iter()
            .filter_map(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());

        let temperature = match var("TEMPERATURE") {
            Some(raw) => raw.parse::<f32>().map_err(|_| {
                Error::Config(format!(
                    "{}_TEMPERATURE is not a number: {raw}",
                    provider.env_prefix()
                ))
            })?,
            None => ai_config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let max_tokens = match var("MAX_TOKENS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                Error::Config(format!(
                    "{}_MAX_TOKENS is not a positive integer: {raw}",
                    provider.env_prefix()
                ))
            })?,
            None => ai_config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        Ok(ProviderSettings {
            provider,
            api_key,
            model: var("MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            temperature,
            max_tokens,
            api_base: var("API_BASE").unwrap_or_else(|| provider.default_api_base().to_string()),
        })
    }

    /// Applies a `--model` flag over whatever the environment chose.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        self
    }
}

/// Picks the provider: CLI flag, then `DEFAULT_AI_PROVIDER`, then `ai_config`, then Mistral.
pub fn select_provider<F>(flag: Option<Provider>, ai_config: &AiConfig, lookup: F) -> Result<Provider>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(provider) = flag {
        return Ok(provider);
    }
    if let Some(raw) = lookup("DEFAULT_AI_PROVIDER").filter(|v| !v.trim().is_empty()) {
        return raw.parse();
    }
    Ok(ai_config.default_provider.unwrap_or(Provider::Mistral))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_builtin_config_has_eight_topics() {
        let config = AppConfig::builtin().unwrap();
        assert_eq!(config.topics.len(), 8);
        assert_eq!(config.topics[0].name, "Tech Trends 2025");
        assert_eq!(config.ai_config.default_provider, Some(Provider::Mistral));
        assert!(!config.tone_options.is_empty());
    }

    #[test]
    fn test_load_config_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
ai_config:
  default_provider: gemini
  temperature: 0.5
topics:
  - name: "Coffee"
    description: "Brewing at home"
    target_audience: "Coffee lovers"
    keywords: ["espresso", "latte"]
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.topics.len(), 1);
        assert_eq!(config.topics[0].keywords, vec!["espresso", "latte"]);
        assert_eq!(config.ai_config.default_provider, Some(Provider::Gemini));
        assert_eq!(config.ai_config.temperature, Some(0.5));
        assert!(config.tone_options.is_empty());
    }

    #[test]
    fn test_load_config_invalid_file() {
        let config = load_config("non/existent/path");
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"invalid: config: format"#).unwrap();
        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_config_rejects_empty_topics() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "topics: []").unwrap();
        assert!(matches!(
            load_config(temp_file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_resolve_config_missing_explicit_path() {
        let result = resolve_config(Some(Path::new("definitely/not/here.yaml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_settings_defaults() {
        let settings =
            ProviderSettings::from_lookup(Provider::OpenAi, &AiConfig::default(), lookup_from(&[]))
                .unwrap();
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(settings.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_provider_settings_env_overrides() {
        let ai_config = AiConfig {
            temperature: Some(0.3),
            max_tokens: Some(500),
            ..AiConfig::default()
        };
        let settings = ProviderSettings::from_lookup(
            Provider::Mistral,
            &ai_config,
            lookup_from(&[
                ("MISTRAL_API_KEY", " secret "),
                ("MISTRAL_MODEL", "mistral-large-latest"),
                ("MISTRAL_MAX_TOKENS", "4096"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.model, "mistral-large-latest");
        assert_eq!(settings.temperature, 0.3);
        assert_eq!(settings.max_tokens, 4096);

        let flagged = settings.with_model(Some("open-mistral-nemo".to_string()));
        assert_eq!(flagged.model, "open-mistral-nemo");
    }

    #[test]
    fn test_gemini_falls_back_to_google_key() {
        let settings = ProviderSettings::from_lookup(
            Provider::Gemini,
            &AiConfig::default(),
            lookup_from(&[("GEMINI_API_KEY", ""), ("GOOGLE_API_KEY", "g-123")]),
        )
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("g-123"));
    }

    #[test]
    fn test_bad_numeric_override_is_config_error() {
        let result = ProviderSettings::from_lookup(
            Provider::OpenAi,
            &AiConfig::default(),
            lookup_from(&[("OPENAI_TEMPERATURE", "warm")]),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_select_provider_precedence() {
        let ai_config = AiConfig {
            default_provider: Some(Provider::Gemini),
            ..AiConfig::default()
        };
        let env = lookup_from(&[("DEFAULT_AI_PROVIDER", "openai")]);
        assert_eq!(
            select_provider(Some(Provider::Mistral), &ai_config, &env).unwrap(),
            Provider::Mistral
        );
        assert_eq!(
            select_provider(None, &ai_config, &env).unwrap(),
            Provider::OpenAi
        );
        assert_eq!(
            select_provider(None, &ai_config, lookup_from(&[])).unwrap(),
            Provider::Gemini
        );
        assert_eq!(
            select_provider(None, &AiConfig::default(), lookup_from(&[])).unwrap(),
            Provider::Mistral
        );
    }
}
