//! Port traits implemented by infrastructure crates.
//!
//! The domain defines *what* a text-generation provider must do; the `llm`
//! crate supplies concrete HTTP clients and tests supply mocks.

use async_trait::async_trait;

use crate::{ProviderFailure, ProviderKind};

/// Sampling parameters forwarded to the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// A reference to an image the provider must look at.
///
/// Providers that accept URLs pass it through; providers that require inline
/// bytes fetch it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub url: String,
}

/// One instruction for a provider: prompt text, an optional image, and
/// sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub prompt: String,
    pub image: Option<ImageReference>,
    pub params: GenerationParams,
}

/// A live text/vision-generation service.
///
/// Implementations issue exactly one logical call per invocation and never
/// retry; sequencing and fallback belong to the orchestrator. Every failure
/// mode is reported as a [`ProviderFailure`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Which provider this is, used as the result source on success.
    fn kind(&self) -> ProviderKind;

    /// Sends `request` and returns the raw text portion of the response.
    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderFailure>;
}
