//! Provider credentials and endpoints.
//!
//! These structs are deserialised from the `[providers.*]` tables of the
//! gateway configuration file. Nothing in this crate reads the process
//! environment; the composition root decides where values come from.

use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Largest outfit photo the Gemini adapter will download and inline.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Settings for the Gemini `generateContent` API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Cap on downloaded image size; larger images fail the attempt.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    /// Permit `http` image URLs and loopback/private IP hosts. Off in
    /// production; images must then be public `https` URLs.
    #[serde(default)]
    pub allow_insecure_image_urls: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allow_insecure_image_urls: false,
        }
    }
}

/// Settings for the OpenAI chat completions API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Both provider sections. A section with an empty API key is inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl ProvidersConfig {
    /// The Gemini section, if it carries a credential.
    pub fn active_gemini(&self) -> Option<&GeminiConfig> {
        Some(&self.gemini).filter(|c| !c.api_key.trim().is_empty())
    }

    /// The OpenAI section, if it carries a credential.
    pub fn active_openai(&self) -> Option<&OpenAiConfig> {
        Some(&self.openai).filter(|c| !c.api_key.trim().is_empty())
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

// Credentials never appear in Debug output.

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("allow_insecure_image_urls", &self.allow_insecure_image_urls)
            .finish()
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
