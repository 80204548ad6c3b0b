use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::credentials::{Credential, CredentialChain};
use crate::config::settings::{AppConfig, OracleSettings, FALLBACK_MODEL};
use crate::error::OracleError;
use crate::model::progress_state::StatKey;

/// Anything that turns a prompt into raw model text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    /// Google Generative Language `generateContent`.
    Gemini,
    /// `/chat/completions` servers (LM Studio, OpenAI, ...).
    OpenAi,
}

/// One entry of a provider's model listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Bare id, without the `models/` prefix Gemini puts on it.
    pub name: String,
    pub generates_content: bool,
}

/// Blocking client; a classification holds the caller for one round trip.
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    api_format: ApiFormat,
}

impl LlmClient {
    pub fn new(api_key: String, settings: &OracleSettings) -> Result<Self, OracleError> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_format: Self::detect_api_format(&settings.api_url),
        })
    }

    /// `None` when the credential chain comes up empty.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let credential = CredentialChain::standard(config).resolve();
        let Credential::Configured { api_key, source } = credential else {
            warn!("no oracle credential configured, oracle disabled");
            return None;
        };

        match Self::new(api_key, &config.oracle) {
            Ok(mut client) => {
                if config.oracle.discover_model {
                    client.discover_model();
                }
                debug!(%source, model = %client.model, format = ?client.api_format, "oracle client ready");
                Some(client)
            }
            Err(e) => {
                warn!(error = %e, "failed to build oracle http client");
                None
            }
        }
    }

    pub fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else {
            ApiFormat::OpenAi
        }
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gemini lists under the base URL; OpenAI-compatible servers list next
    /// to `/chat/completions`.
    fn models_url(&self) -> String {
        match self.api_format {
            ApiFormat::Gemini => format!("{}/models", self.api_url),
            ApiFormat::OpenAi => match self.api_url.strip_suffix("/chat/completions") {
                Some(base) => format!("{}/models", base),
                None => format!("{}/models", self.api_url),
            },
        }
    }

    /// Ask the provider which models this key can use.
    pub fn list_models(&self) -> Result<Vec<ModelInfo>, OracleError> {
        let request = self.client.get(self.models_url());
        let request = match self.api_format {
            ApiFormat::Gemini => request.header("x-goog-api-key", &self.api_key),
            ApiFormat::OpenAi => request.bearer_auth(&self.api_key),
        };
        let response = request.send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(OracleError::transport(format!(
                "model listing failed {}: {}",
                status, body
            )));
        }

        let listing: Value = response.json()?;
        Ok(parse_model_listing(self.api_format, &listing))
    }

    /// Swap in a listed model when the configured one is missing. Failures
    /// are logged and the configured model is kept; the oracle call itself
    /// reports any real problem.
    pub fn discover_model(&mut self) {
        match self.list_models() {
            Ok(models) => match pick_model(&self.model, &models) {
                Some(chosen) if chosen != self.model => {
                    warn!(configured = %self.model, %chosen, "configured model not listed, using another");
                    self.model = chosen;
                }
                Some(_) => debug!(model = %self.model, "configured model is available"),
                None => debug!(count = models.len(), "no usable model in listing, keeping configured"),
            },
            Err(e) => warn!(error = %e, model = %self.model, "model listing unavailable"),
        }
    }

    fn generate_gemini(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".into(),
                response_schema: reward_schema(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(OracleError::transport(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let completion: GeminiResponse = response.json()?;
        let text: String = completion
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(OracleError::malformed("empty response", ""));
        }
        Ok(text)
    }

    fn generate_openai(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt.to_string(),
            }],
            response_format: json!({ "type": "json_object" }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(OracleError::transport(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::malformed("empty response", ""))
    }
}

impl TextGenerator for LlmClient {
    fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        debug!(format = ?self.api_format, prompt_len = prompt.len(), "oracle request");
        let text = match self.api_format {
            ApiFormat::Gemini => self.generate_gemini(prompt),
            ApiFormat::OpenAi => self.generate_openai(prompt),
        }?;
        debug!(response_len = text.len(), "oracle response");
        Ok(text)
    }
}

/// Read a `/models` listing. Gemini returns `{"models": [{"name",
/// "supportedGenerationMethods"}]}`, OpenAI-compatible servers return
/// `{"data": [{"id"}]}` with no capability info.
pub fn parse_model_listing(format: ApiFormat, listing: &Value) -> Vec<ModelInfo> {
    match format {
        ApiFormat::Gemini => listing["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| {
                        let name = m["name"].as_str()?;
                        let generates_content = m["supportedGenerationMethods"]
                            .as_array()
                            .is_some_and(|methods| {
                                methods.iter().any(|x| x.as_str() == Some("generateContent"))
                            });
                        Some(ModelInfo {
                            name: name.trim_start_matches("models/").to_string(),
                            generates_content,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default(),
        ApiFormat::OpenAi => listing["data"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["id"].as_str())
                    .map(|id| ModelInfo {
                        name: id.to_string(),
                        generates_content: true,
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Choose a model from a listing: the configured one (exact, then a
/// versioned variant such as `gemini-1.5-flash-001`), then
/// `FALLBACK_MODEL`, then the first model that can generate content.
/// `None` when nothing in the listing can generate content.
pub fn pick_model(configured: &str, models: &[ModelInfo]) -> Option<String> {
    let usable: Vec<&ModelInfo> = models.iter().filter(|m| m.generates_content).collect();

    usable
        .iter()
        .find(|m| m.name == configured)
        .or_else(|| usable.iter().find(|m| m.name.contains(configured)))
        .or_else(|| usable.iter().find(|m| m.name == FALLBACK_MODEL))
        .or_else(|| usable.first())
        .map(|m| m.name.clone())
}

/// Schema-constrained output for providers that support it.
fn reward_schema() -> Value {
    let stats: Vec<&str> = StatKey::ALL.iter().map(|k| k.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "xp": { "type": "INTEGER" },
            "stat": { "type": "STRING", "enum": stats },
            "msg": { "type": "STRING" }
        },
        "required": ["xp", "stat", "msg"]
    })
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}
