use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Gemini,
    LmStudio,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::LmStudio => "LM Studio",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::LmStudio => "http://localhost:1234/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::LmStudio => "local-model",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub ui_scale: f32,

    pub provider: Provider,
    /// Empty means the provider default.
    pub model: String,
    pub endpoint: String,

    /// Only read when GEMINI_API_KEY is not set.
    pub api_key: Option<String>,

    /// `None` uses the per-user data directory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            provider: Provider::Gemini,
            model: String::new(),
            endpoint: String::new(),
            api_key: None,
            storage_dir: None,
        }
    }
}

impl AppSettings {
    pub fn model_or_default(&self) -> String {
        non_empty_or(&self.model, self.provider.default_model())
    }

    pub fn endpoint_or_default(&self) -> String {
        non_empty_or(&self.endpoint, self.provider.default_endpoint())
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_model_and_endpoint_fall_back_to_provider_defaults() {
        let mut settings = AppSettings::default();
        assert_eq!(settings.model_or_default(), "gemini-2.5-flash");

        settings.provider = Provider::LmStudio;
        settings.endpoint = "  ".into();
        assert_eq!(settings.endpoint_or_default(), "http://localhost:1234/v1");

        settings.model = " qwen ".into();
        assert_eq!(settings.model_or_default(), "qwen");
    }

    #[test]
    fn partial_settings_file_fills_in_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"provider":"lm_studio","ui_scale":1.5}"#).unwrap();

        assert_eq!(settings.provider, Provider::LmStudio);
        assert_eq!(settings.ui_scale, 1.5);
        assert!(settings.storage_dir.is_none());
    }
}
