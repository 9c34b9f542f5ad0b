//! Provider fallback state machine.
//!
//! ```text
//! TryPrimary ──fail──▶ TrySecondary ──fail──▶ UseStaticFallback
//!     │                     │                        │
//!     └──ok──▶ Done         └──ok──▶ Done            └──▶ Done (always)
//! ```
//!
//! A stage whose provider is not configured fails immediately. Each live
//! provider is attempted at most once per request and attempts are strictly
//! sequential. Every stage failure is absorbed here; the only error that can
//! leave [`FallbackOrchestrator::run`] is
//! [`GatewayError::AllProvidersUnavailable`] for a task without a static
//! fallback.

use std::sync::Arc;
use std::time::Duration;

use interview::{
    Action, GatewayError, LlmProvider, NormalizationFailure, ProviderFailure, ProviderKind,
    ProviderRequest, Source, Sourced, StageFailure,
};
use tracing::{debug, info, warn};

/// Default deadline for one live provider attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// One unit of work the orchestrator can run against the provider chain.
///
/// A task knows how to phrase itself for a provider, how to read the answer,
/// and what to return when no provider can help.
pub trait Task: Send + Sync {
    /// The structured result of the task.
    type Output: Send;

    /// The action this task serves (used for logging and errors).
    fn action(&self) -> Action;

    /// The instruction sent to every provider stage.
    fn provider_request(&self) -> ProviderRequest;

    /// Converts raw provider text into the task output.
    fn normalize(&self, text: &str) -> Result<Self::Output, NormalizationFailure>;

    /// Deterministic result used when every live stage failed.
    ///
    /// `None` means the task has no fallback and
    /// [`GatewayError::AllProvidersUnavailable`] is reported instead.
    fn static_fallback(&self) -> Option<Self::Output>;
}

// ---------------------------------------------------------------------------
// Provider chain
// ---------------------------------------------------------------------------

/// The ordered live providers available to the orchestrator.
///
/// Either slot may be empty when no credential is configured for it.
#[derive(Clone, Default)]
pub struct ProviderChain {
    primary: Option<Arc<dyn LlmProvider>>,
    secondary: Option<Arc<dyn LlmProvider>>,
}

impl ProviderChain {
    pub fn new(
        primary: Option<Arc<dyn LlmProvider>>,
        secondary: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Kinds of the configured providers, in attempt order.
    pub fn configured(&self) -> Vec<ProviderKind> {
        [&self.primary, &self.secondary]
            .into_iter()
            .flatten()
            .map(|p| p.kind())
            .collect()
    }

    fn slot(&self, stage: Stage) -> Option<&Arc<dyn LlmProvider>> {
        match stage {
            Stage::TryPrimary => self.primary.as_ref(),
            Stage::TrySecondary => self.secondary.as_ref(),
            Stage::UseStaticFallback => None,
        }
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("configured", &self.configured())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// A non-terminal orchestration stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TryPrimary,
    TrySecondary,
    UseStaticFallback,
}

impl Stage {
    /// Entry stage. `skip_primary` starts directly at the secondary provider.
    pub fn entry(skip_primary: bool) -> Self {
        if skip_primary {
            Stage::TrySecondary
        } else {
            Stage::TryPrimary
        }
    }

    fn on_failure(self) -> Self {
        match self {
            Stage::TryPrimary => Stage::TrySecondary,
            Stage::TrySecondary | Stage::UseStaticFallback => Stage::UseStaticFallback,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Stage::TryPrimary => "try_primary",
            Stage::TrySecondary => "try_secondary",
            Stage::UseStaticFallback => "use_static_fallback",
        }
    }
}

/// Sequences provider attempts and the static fallback for a [`Task`].
#[derive(Debug, Clone)]
pub struct FallbackOrchestrator {
    providers: ProviderChain,
    attempt_timeout: Duration,
}

impl FallbackOrchestrator {
    pub fn new(providers: ProviderChain, attempt_timeout: Duration) -> Self {
        Self {
            providers,
            attempt_timeout,
        }
    }

    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    /// Runs `task` from `entry` until a stage produces a result.
    pub async fn run<T: Task>(
        &self,
        task: &T,
        entry: Stage,
    ) -> Result<Sourced<T::Output>, GatewayError> {
        let request = task.provider_request();
        let mut stage = entry;

        loop {
            if stage == Stage::UseStaticFallback {
                return match task.static_fallback() {
                    Some(value) => {
                        info!(stage = stage.name(), "serving static fallback");
                        Ok(Sourced::new(value, Source::Fallback))
                    }
                    None => {
                        warn!(stage = stage.name(), "no provider succeeded and task has no fallback");
                        Err(GatewayError::AllProvidersUnavailable {
                            action: task.action(),
                        })
                    }
                };
            }

            let Some(provider) = self.providers.slot(stage) else {
                debug!(stage = stage.name(), "provider not configured, skipping");
                stage = stage.on_failure();
                continue;
            };

            let kind = provider.kind();
            match self.attempt(provider.as_ref(), task, &request).await {
                Ok(value) => {
                    info!(stage = stage.name(), provider = %kind, "provider succeeded");
                    return Ok(Sourced::new(value, kind));
                }
                Err(failure) => {
                    warn!(stage = stage.name(), provider = %kind, error = %failure, "provider stage failed");
                    stage = stage.on_failure();
                }
            }
        }
    }

    /// One bounded provider call followed by normalisation.
    async fn attempt<T: Task>(
        &self,
        provider: &dyn LlmProvider,
        task: &T,
        request: &ProviderRequest,
    ) -> Result<T::Output, StageFailure> {
        let text = tokio::time::timeout(self.attempt_timeout, provider.generate(request))
            .await
            .map_err(|_| ProviderFailure::Timeout {
                after: self.attempt_timeout,
            })??;
        debug!(provider = %provider.kind(), chars = text.len(), "provider returned text");
        Ok(task.normalize(&text)?)
    }
}
