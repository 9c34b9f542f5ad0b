//! OpenAI chat completions adapter (secondary provider).

use async_trait::async_trait;
use interview::{LlmProvider, ProviderFailure, ProviderKind, ProviderRequest};
use serde::{Deserialize, Serialize};

use crate::http::{ErrorDetail, HttpTransport};
use crate::OpenAiConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

/// Plain text for text-only prompts; a parts array when an image is attached.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

/// A chat completions response body, validated against one of the two
/// shapes the API documents.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OpenAiEnvelope {
    Failure { error: ErrorDetail },
    Success { choices: Vec<Choice> },
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    refusal: Option<String>,
}

fn parse_response(body: &str) -> Result<String, ProviderFailure> {
    let envelope: OpenAiEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderFailure::MalformedEnvelope {
            reason: format!("unrecognised OpenAI response: {e}"),
        })?;

    let choices = match envelope {
        OpenAiEnvelope::Failure { error } => {
            return Err(ProviderFailure::Reported {
                message: error.message,
            })
        }
        OpenAiEnvelope::Success { choices } => choices,
    };

    let message = choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ProviderFailure::MalformedEnvelope {
            reason: "response has no choices".into(),
        })?;

    if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
        return Err(ProviderFailure::Reported { message: refusal });
    }

    message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ProviderFailure::MalformedEnvelope {
            reason: "choice contains no text".into(),
        })
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// OpenAI client implementing [`LlmProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    transport: HttpTransport,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig, transport: HttpTransport) -> Self {
        Self { transport, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    #[tracing::instrument(name = "openai.generate", skip_all, fields(model = %self.config.model))]
    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderFailure> {
        let content = match &request.image {
            None => MessageContent::Text(&request.prompt),
            Some(image) => MessageContent::Parts(vec![
                ContentPart::Text {
                    text: &request.prompt,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: &image.url },
                },
            ]),
        };

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content,
            }],
            temperature: request.params.temperature,
            max_tokens: request.params.max_output_tokens,
        };

        let http_request = self
            .transport
            .client()
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body);

        let raw = self.transport.send(http_request).await?;
        parse_response(&raw)
    }
}
