//! # Provider adapters
//!
//! One capability, [`TextGenerator::generate`], implemented by a closed set of
//! adapters:
//!
//! - [`MistralAdapter`]: Mistral's OpenAI-compatible chat-completions endpoint.
//! - [`OpenAiAdapter`]: OpenAI chat completions.
//! - [`GeminiAdapter`]: Google Gemini `generateContent`.
//!
//! [`AiClient`] picks one of them once at startup from [`ProviderSettings`].
//! A missing key fails with [`Error::Authentication`] while the client is
//! being built, so no request is ever sent without credentials. Nothing here
//! retries: every failure goes straight back to the caller.
//!
//! # Example
//!
//! ```no_run
//! use trendmine::api::{AiClient, Provider, TextGenerator};
//! use trendmine::config::{AiConfig, ProviderSettings};
//!
//! # async fn run() -> trendmine::error::Result<()> {
//! let settings = ProviderSettings::from_env(Provider::Mistral, &AiConfig::default())?;
//! let client = AiClient::new(&settings)?;
//! let text = client.generate("You are terse.", "Say hi").await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{fmt, str::FromStr};
use tracing::{debug, error, instrument};

use crate::{
    config::ProviderSettings,
    error::{Error, Result},
};

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Mistral,
    Gemini,
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Mistral, Provider::Gemini, Provider::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Mistral => "mistral",
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    /// Prefix of the per-provider override variables (`<PREFIX>_MODEL`, ...).
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Provider::Mistral => "MISTRAL",
            Provider::Gemini => "GEMINI",
            Provider::OpenAi => "OPENAI",
        }
    }

    /// Environment variables holding the API key, in lookup order.
    pub fn key_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Mistral => &["MISTRAL_API_KEY"],
            Provider::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Provider::OpenAi => &["OPENAI_API_KEY"],
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Mistral => "mistral-small-latest",
            Provider::Gemini => "gemini-1.5-flash",
            Provider::OpenAi => "gpt-4",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::Mistral => "https://api.mistral.ai/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| Error::Config(format!("unsupported provider: {s}")))
    }
}

/// "Send a structured prompt, receive generated text."
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    fn provider(&self) -> Provider;

    fn model_name(&self) -> &str;
}

/// Returns the key or an authentication error naming the variables to set.
fn require_key(settings: &ProviderSettings) -> Result<String> {
    match settings.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(Error::authentication(
            settings.provider.as_str(),
            format!(
                "API key must be provided or set as environment variable: {}",
                settings.provider.key_vars().join(" or ")
            ),
        )),
    }
}

/// Maps a non-success HTTP status onto the crate taxonomy.
///
/// 401 and 403 are credential failures whatever the body says. Gemini also
/// reports a bad key as a 400 carrying `API_KEY_INVALID`. Also used for the
/// speech endpoint in [`crate::audio`].
pub(crate) fn classify_status(service: &str, status: StatusCode, body: &str) -> Error {
    let auth_failure = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID"));
    let message = format!("HTTP {status}: {body}");
    if auth_failure {
        Error::authentication(service, message)
    } else {
        Error::provider(service, message)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the OpenAI chat-completions protocol, shared by Mistral and OpenAI.
///
/// Requests are typed with async-openai and sent with a plain reqwest client
/// so the HTTP status reaches [`classify_status`] and nothing is retried.
#[derive(Debug, Clone)]
struct ChatCompletions {
    http: reqwest::Client,
    api_key: String,
    settings: ProviderSettings,
}

impl ChatCompletions {
    fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_key = require_key(settings)?;
        debug!(api_base = %settings.api_base, "OpenAI-compatible client created");
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            settings: settings.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    #[allow(deprecated)]
    fn request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<CreateChatCompletionRequest> {
        let provider = self.settings.provider;
        let to_error = |e: async_openai::error::OpenAIError| {
            Error::provider(provider.as_str(), e.to_string())
        };

        CreateChatCompletionRequestArgs::default()
            .model(self.settings.model.clone())
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(to_error)?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(to_error)?
                    .into(),
            ])
            .build()
            .map_err(to_error)
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let provider = self.settings.provider;
        let request = self.request(system_prompt, user_prompt)?;

        debug!(model = %self.settings.model, "Sending chat completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %provider, error = ?e, "Failed to send chat completion");
                Error::provider(provider.as_str(), format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = %provider, status = %status, body = %body, "Chat completion failed");
            return Err(classify_status(provider.as_str(), status, &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Error::provider(provider.as_str(), format!("failed to decode response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::provider(provider.as_str(), "response contained no text"))
    }
}

/// Mistral AI through its OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct MistralAdapter {
    chat: ChatCompletions,
}

impl MistralAdapter {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            chat: ChatCompletions::new(settings)?,
        })
    }
}

#[async_trait]
impl TextGenerator for MistralAdapter {
    #[instrument(skip_all, fields(provider = "mistral", model = %self.chat.settings.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.chat.complete(system_prompt, user_prompt).await
    }

    fn provider(&self) -> Provider {
        Provider::Mistral
    }

    fn model_name(&self) -> &str {
        &self.chat.settings.model
    }
}

/// OpenAI chat completions.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    chat: ChatCompletions,
}

impl OpenAiAdapter {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            chat: ChatCompletions::new(settings)?,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiAdapter {
    #[instrument(skip_all, fields(provider = "openai", model = %self.chat.settings.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.chat.complete(system_prompt, user_prompt).await
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.chat.settings.model
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Google Gemini `generateContent`.
///
/// Gemini gets a single prompt: the system prompt, a blank line, then the
/// user prompt.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    http: reqwest::Client,
    api_key: String,
    settings: ProviderSettings,
}

impl GeminiAdapter {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_key = require_key(settings)?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            settings: settings.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }

}

#[async_trait]
impl TextGenerator for GeminiAdapter {
    #[instrument(skip_all, fields(provider = "gemini", model = %self.settings.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": format!("{system_prompt}\n\n{user_prompt}") }]
            }],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens,
            }
        });

        debug!(endpoint = %self.endpoint(), "Sending Gemini request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to Gemini");
                Error::provider("gemini", format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Gemini returned an error");
            return Err(classify_status("gemini", status, &body));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::provider("gemini", format!("failed to decode response: {e}")))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(Error::provider("gemini", "response contained no text"));
        }
        Ok(text)
    }

    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

/// The adapter selected for this run.
#[derive(Debug, Clone)]
pub enum AiClient {
    Mistral(MistralAdapter),
    Gemini(GeminiAdapter),
    OpenAi(OpenAiAdapter),
}

impl AiClient {
    /// Builds the adapter for `settings.provider`.
    ///
    /// # Errors
    /// [`Error::Authentication`] when no usable key is configured.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = match settings.provider {
            Provider::Mistral => AiClient::Mistral(MistralAdapter::new(settings)?),
            Provider::Gemini => AiClient::Gemini(GeminiAdapter::new(settings)?),
            Provider::OpenAi => AiClient::OpenAi(OpenAiAdapter::new(settings)?),
        };
        tracing::info!(
            provider = %settings.provider,
            model = %settings.model,
            "Initialized provider"
        );
        Ok(client)
    }

    fn inner(&self) -> &dyn TextGenerator {
        match self {
            AiClient::Mistral(adapter) => adapter,
            AiClient::Gemini(adapter) => adapter,
            AiClient::OpenAi(adapter) => adapter,
        }
    }
}

#[async_trait]
impl TextGenerator for AiClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.inner().generate(system_prompt, user_prompt).await
    }

    fn provider(&self) -> Provider {
        self.inner().provider()
    }

    fn model_name(&self) -> &str {
        self.inner().model_name()
    }
}
