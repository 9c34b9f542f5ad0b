//! Gateway entry point: validates a request, picks the task, runs it.

use std::time::Duration;

use interview::{
    Action, GatewayError, GatewayRequest, InterviewProfile, ProviderKind, RequestId, TaskOutput,
};
use tracing::Instrument;

use crate::envelope::Envelope;
use crate::orchestrator::{FallbackOrchestrator, ProviderChain, Stage, DEFAULT_ATTEMPT_TIMEOUT};
use crate::tasks::{EvaluateAnswers, EvaluateOutfit, GenerateQuestions};

/// Tunables that are not provider credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Deadline for one live provider attempt.
    pub attempt_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

/// The AI-provider gateway.
///
/// Stateless between calls; one instance can serve any number of concurrent
/// requests. Which stages are attempted depends only on the providers and
/// settings passed to [`Gateway::new`].
#[derive(Debug, Clone)]
pub struct Gateway {
    orchestrator: FallbackOrchestrator,
}

impl Gateway {
    pub fn new(providers: ProviderChain, settings: GatewaySettings) -> Self {
        Self {
            orchestrator: FallbackOrchestrator::new(providers, settings.attempt_timeout),
        }
    }

    /// Providers that will be attempted, in order.
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        self.orchestrator.providers().configured()
    }

    /// Serves one request. Never fails: errors become error envelopes.
    pub async fn handle(&self, request: GatewayRequest) -> Envelope {
        let request_id = RequestId::new_random();
        let span = tracing::info_span!(
            "gateway.handle",
            %request_id,
            action = %request.action,
            force_open_ai = request.force_open_ai,
        );

        async move {
            match self.dispatch(request).await {
                Ok(output) => {
                    tracing::info!(source = %output.source(), "request served");
                    Envelope::success(output)
                }
                Err(error) => {
                    tracing::warn!(%error, "request rejected");
                    Envelope::failure(&error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Validates `request` and runs the matching task.
    pub async fn dispatch(&self, request: GatewayRequest) -> Result<TaskOutput, GatewayError> {
        let action: Action = request.action.parse()?;
        let profile = require_profile(request.profile)?;
        let entry = Stage::entry(request.force_open_ai);

        match action {
            Action::GenerateQuestions => {
                let task = GenerateQuestions { profile };
                self.orchestrator
                    .run(&task, entry)
                    .await
                    .map(TaskOutput::Questions)
            }
            Action::EvaluateAnswers => {
                if request.questions.is_empty() {
                    return Err(GatewayError::InvalidRequest {
                        message: "evaluate-answers requires at least one question".into(),
                    });
                }
                let task = EvaluateAnswers {
                    profile,
                    questions: request.questions,
                    answers: request.answers,
                };
                self.orchestrator
                    .run(&task, entry)
                    .await
                    .map(TaskOutput::Evaluation)
            }
            Action::EvaluateOutfit => {
                let image_url = request
                    .image_url
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| GatewayError::InvalidRequest {
                        message: "evaluate-outfit requires imageUrl".into(),
                    })?;
                let task = EvaluateOutfit { profile, image_url };
                self.orchestrator
                    .run(&task, entry)
                    .await
                    .map(TaskOutput::Outfit)
            }
        }
    }
}

fn require_profile(profile: Option<InterviewProfile>) -> Result<InterviewProfile, GatewayError> {
    profile.ok_or_else(|| GatewayError::InvalidRequest {
        message: "profile is required".into(),
    })
}
