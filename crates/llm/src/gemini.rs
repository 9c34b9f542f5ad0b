//! Google Gemini `generateContent` adapter (primary provider).
//!
//! Images cannot be passed by URL; they are downloaded and sent inline as
//! base64 with the MIME type reported by the image host. Downloads are
//! limited to public `https` URLs, `image/*` responses, and
//! [`GeminiConfig::max_image_bytes`].
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL.

use std::net::IpAddr;

use async_trait::async_trait;
use base64::Engine;
use interview::{ImageReference, LlmProvider, ProviderFailure, ProviderKind, ProviderRequest};
use serde::{Deserialize, Serialize};

use crate::http::{ErrorDetail, HttpTransport};
use crate::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

// ---------------------------------------------------------------------------
// Wire types: request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// ---------------------------------------------------------------------------
// Wire types: response
// ---------------------------------------------------------------------------

/// A `generateContent` response body, validated against one of the two
/// shapes the API documents.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiEnvelope {
    Failure { error: ErrorDetail },
    Success { candidates: Vec<Candidate> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    /// Absent when the candidate was blocked.
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Extracts the text of the first candidate from a response body.
fn parse_response(body: &str) -> Result<String, ProviderFailure> {
    let envelope: GeminiEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderFailure::MalformedEnvelope {
            reason: format!("unrecognised Gemini response: {e}"),
        })?;

    let candidates = match envelope {
        GeminiEnvelope::Failure { error } => {
            return Err(ProviderFailure::Reported {
                message: error.message,
            })
        }
        GeminiEnvelope::Success { candidates } => candidates,
    };

    let candidate = candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderFailure::MalformedEnvelope {
            reason: "response has no candidates".into(),
        })?;

    let content = candidate
        .content
        .ok_or_else(|| ProviderFailure::MalformedEnvelope {
            reason: format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        })?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(ProviderFailure::MalformedEnvelope {
            reason: "candidate contains no text".into(),
        });
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Gemini client implementing [`LlmProvider`].
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    transport: HttpTransport,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, transport: HttpTransport) -> Self {
        Self { transport, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Downloads the image and encodes it as an inline part.
    async fn fetch_inline_image(
        &self,
        image: &ImageReference,
    ) -> Result<InlineData, ProviderFailure> {
        let url = checked_image_url(&image.url, self.config.allow_insecure_image_urls)?;
        let max_bytes = self.config.max_image_bytes;

        let mut response = self
            .transport
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport.failure(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderFailure::HttpStatus {
                status: status.as_u16(),
                message: "image download failed".into(),
            });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase())
            .filter(|v| v.starts_with("image/"))
            .ok_or_else(|| rejected("image host did not return an image/* content type"))?;

        if response.content_length().is_some_and(|len| len > max_bytes as u64) {
            return Err(rejected(format!("image is larger than {max_bytes} bytes")));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.transport.failure(e))? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(rejected(format!("image is larger than {max_bytes} bytes")));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(InlineData {
            mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        })
    }
}

fn rejected(reason: impl Into<String>) -> ProviderFailure {
    ProviderFailure::ImageRejected {
        reason: reason.into(),
    }
}

/// Parses an image URL and applies the download policy: `https` only and
/// no loopback, private, link-local, or unspecified IP hosts, unless
/// `allow_insecure` is set.
fn checked_image_url(raw: &str, allow_insecure: bool) -> Result<reqwest::Url, ProviderFailure> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| rejected(format!("invalid image URL: {e}")))?;

    match url.scheme() {
        "https" => {}
        "http" if allow_insecure => {}
        other => return Err(rejected(format!("image URL scheme {other:?} is not allowed"))),
    }

    let host = url
        .host_str()
        .ok_or_else(|| rejected("image URL has no host"))?;
    if !allow_insecure {
        let literal = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = literal.parse::<IpAddr>() {
            if !is_public(ip) {
                return Err(rejected("image URL points at a non-public address"));
            }
        }
        if host.eq_ignore_ascii_case("localhost") {
            return Err(rejected("image URL points at a non-public address"));
        }
    }
    Ok(url)
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            let unique_local = segments[0] & 0xfe00 == 0xfc00;
            let link_local = segments[0] & 0xffc0 == 0xfe80;
            match v6.to_ipv4_mapped() {
                Some(v4) => is_public(IpAddr::V4(v4)),
                None => !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    #[tracing::instrument(name = "gemini.generate", skip_all, fields(model = %self.config.model))]
    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderFailure> {
        let mut parts = vec![Part::Text {
            text: &request.prompt,
        }];
        if let Some(image) = &request.image {
            let inline_data = self.fetch_inline_image(image).await?;
            tracing::debug!(mime_type = %inline_data.mime_type, "attached inline image");
            parts.push(Part::InlineData { inline_data });
        }

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: request.params.temperature,
                max_output_tokens: request.params.max_output_tokens,
            },
        };

        let http_request = self
            .transport
            .client()
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body);

        let raw = self.transport.send(http_request).await?;
        parse_response(&raw)
    }
}
