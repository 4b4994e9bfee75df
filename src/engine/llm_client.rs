use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ui::settings::{AppSettings, Provider};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API 키가 설정되지 않았습니다. GEMINI_API_KEY 환경 변수나 설정 파일을 확인해주세요.")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("the model returned no text")]
    EmptyResponse,
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Text generation backend: one system instruction, one user text, one reply.
pub trait GenerationClient: Send {
    fn generate(&self, system_instruction: &str, user_text: &str) -> Result<String, GenerationError>;

    fn describe(&self) -> String;
}

/// Picks the backend named in the settings.
pub fn build_client(settings: &AppSettings) -> Result<Box<dyn GenerationClient>, GenerationError> {
    match settings.provider {
        Provider::Gemini => {
            let api_key = resolve_api_key(settings).ok_or(GenerationError::MissingCredential)?;
            Ok(Box::new(GeminiClient::new(
                settings.endpoint_or_default(),
                settings.model_or_default(),
                api_key,
            )?))
        }
        Provider::LmStudio => Ok(Box::new(LmStudioClient::new(
            settings.endpoint_or_default(),
            settings.model_or_default(),
        )?)),
    }
}

/// Environment first (including `.env`), then the settings file.
pub fn resolve_api_key(settings: &AppSettings) -> Option<String> {
    let usable = |k: &str| Some(k.trim().to_string()).filter(|k| !k.is_empty());

    std::env::var(API_KEY_ENV)
        .ok()
        .and_then(|k| usable(&k))
        .or_else(|| settings.api_key.as_deref().and_then(usable))
}

fn http_client() -> Result<Client, GenerationError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

fn check_status(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, GenerationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    Err(GenerationError::Api {
        status: status.as_u16(),
        body,
    })
}

/* =========================
   Gemini
   ========================= */

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(endpoint: String, model: String, api_key: String) -> Result<Self, GenerationError> {
        Ok(Self {
            http: http_client()?,
            endpoint,
            model,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl GenerationClient for GeminiClient {
    fn generate(&self, system_instruction: &str, user_text: &str) -> Result<String, GenerationError> {
        let req = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system_instruction }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user_text }],
            }],
        };

        tracing::debug!(model = %self.model, "sending generateContent request");

        let resp = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()?;

        let body: GenerateContentResponse = check_status(resp)?.json()?;
        first_candidate_text(body)
    }

    fn describe(&self) -> String {
        format!("Gemini ({})", self.model)
    }
}

fn first_candidate_text(body: GenerateContentResponse) -> Result<String, GenerationError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    let content = candidate
        .content
        .ok_or_else(|| GenerationError::Decode("candidate has no content".into()))?;

    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

/* =========================
   LM Studio (OpenAI-compatible)
   ========================= */

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: Option<String>,
}

pub struct LmStudioClient {
    http: Client,
    endpoint: String,
    model: String,
}

impl LmStudioClient {
    pub fn new(endpoint: String, model: String) -> Result<Self, GenerationError> {
        Ok(Self {
            http: http_client()?,
            endpoint,
            model,
        })
    }
}

impl GenerationClient for LmStudioClient {
    fn generate(&self, system_instruction: &str, user_text: &str) -> Result<String, GenerationError> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: 0.7,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system_instruction.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user_text.into(),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        tracing::debug!(%url, "sending chat completion request");

        let resp = self.http.post(url).json(&req).send()?;
        let body: ChatCompletionResponse = check_status(resp)?.json()?;
        first_choice_text(body)
    }

    fn describe(&self) -> String {
        format!("LM Studio ({})", self.model)
    }
}

fn first_choice_text(body: ChatCompletionResponse) -> Result<String, GenerationError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

/// Lists the models visible to the configured backend.
pub fn test_connection(settings: &AppSettings) -> Result<String, GenerationError> {
    let client = http_client()?;
    let endpoint = settings.endpoint_or_default();
    let endpoint = endpoint.trim_end_matches('/');

    let (resp, field) = match settings.provider {
        Provider::Gemini => {
            let api_key = resolve_api_key(settings).ok_or(GenerationError::MissingCredential)?;
            let resp = client
                .get(format!("{endpoint}/v1beta/models"))
                .header("x-goog-api-key", api_key)
                .send()?;
            (resp, "models")
        }
        Provider::LmStudio => (client.get(format!("{endpoint}/models")).send()?, "data"),
    };

    let value: serde_json::Value = check_status(resp)?.json()?;

    Ok(format!(
        "Connected ({} models available)",
        value[field].as_array().map(|a| a.len()).unwrap_or(0)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_request_uses_snake_case_system_instruction() {
        let req = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hi" }],
            }],
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "sys");
        assert!(json["system_instruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn gemini_parts_are_concatenated() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"제목: A\n"},{"text":"|||x"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();

        assert_eq!(first_candidate_text(body).unwrap(), "제목: A\n|||x");
    }

    #[test]
    fn gemini_without_candidates_is_empty() {
        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(first_candidate_text(body), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn gemini_candidate_without_content_is_a_decode_error() {
        let body: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(matches!(first_candidate_text(body), Err(GenerationError::Decode(_))));
    }

    #[test]
    fn chat_completion_takes_first_choice() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}},{"message":{"content":"other"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_text(body).unwrap(), "hello");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice_text(empty), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn settings_key_is_used_when_present() {
        let settings = AppSettings {
            api_key: Some("  from-settings  ".into()),
            ..AppSettings::default()
        };

        // the environment wins when set; either way the result is trimmed and non-empty
        let key = resolve_api_key(&settings).unwrap();
        assert_eq!(key, key.trim());
        assert!(!key.is_empty());
    }

    #[test]
    fn lm_studio_needs_no_credential() {
        let settings = AppSettings {
            provider: Provider::LmStudio,
            api_key: None,
            ..AppSettings::default()
        };
        let client = build_client(&settings).unwrap();
        assert!(client.describe().starts_with("LM Studio"));
    }
}
