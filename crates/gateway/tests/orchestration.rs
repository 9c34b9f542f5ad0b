//! End-to-end orchestration tests against scripted providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gateway::{
    EnvelopeBody, FallbackOrchestrator, Gateway, GatewaySettings, ProviderChain, Stage, Task,
};
use interview::{
    fallback, Action, GatewayError, GatewayRequest, InterviewProfile, LlmProvider,
    NormalizationFailure, ProviderFailure, ProviderKind, ProviderRequest, Source, TaskOutput,
};

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

type CallLog = Arc<Mutex<Vec<ProviderKind>>>;

struct ScriptedProvider {
    kind: ProviderKind,
    reply: Result<String, ProviderFailure>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    log: CallLog,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(kind: ProviderKind, reply: Result<&str, ProviderFailure>, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            kind,
            reply: reply.map(str::to_string),
            delay: None,
            calls: AtomicUsize::new(0),
            log: Arc::clone(log),
            last_request: Mutex::new(None),
        })
    }

    fn slow(kind: ProviderKind, delay: Duration, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            kind,
            reply: Ok(r#"["never seen"]"#.to_string()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            log: Arc::clone(log),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(self.kind);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

fn http_error() -> ProviderFailure {
    ProviderFailure::HttpStatus {
        status: 503,
        message: "overloaded".into(),
    }
}

fn gateway(primary: &Arc<ScriptedProvider>, secondary: &Arc<ScriptedProvider>) -> Gateway {
    Gateway::new(
        ProviderChain::new(
            Some(Arc::clone(primary) as Arc<dyn LlmProvider>),
            Some(Arc::clone(secondary) as Arc<dyn LlmProvider>),
        ),
        GatewaySettings::default(),
    )
}

fn profile(interview_type: &str) -> InterviewProfile {
    InterviewProfile {
        name: "Alex".into(),
        job_role: "software_engineer".into(),
        experience_level: "mid_level".into(),
        interview_type: interview_type.into(),
    }
}

fn questions_request(interview_type: &str) -> GatewayRequest {
    GatewayRequest {
        action: "generate-questions".into(),
        profile: Some(profile(interview_type)),
        ..GatewayRequest::default()
    }
}

fn answers_request() -> GatewayRequest {
    GatewayRequest {
        action: "evaluate-answers".into(),
        profile: Some(profile("Technical")),
        questions: vec!["Q1".into(), "Q2".into(), "Q3".into(), "Q4".into()],
        answers: vec![
            "I have led a team of five engineers for two years.".into(),
            "".into(),
            "Short".into(),
            "I refactored the billing system to cut latency by 40%.".into(),
        ],
        ..GatewayRequest::default()
    }
}

fn outfit_request() -> GatewayRequest {
    GatewayRequest {
        action: "evaluate-outfit".into(),
        profile: Some(profile("Mixed")),
        image_url: Some("https://storage.example/outfits/alex.jpg".into()),
        ..GatewayRequest::default()
    }
}

fn questions_of(body: &EnvelopeBody) -> (&[String], Source) {
    match body {
        EnvelopeBody::Success(TaskOutput::Questions(q)) => (&q.value.questions, q.source),
        other => panic!("expected questions, got {other:?}"),
    }
}

const QUESTIONS_JSON: &str = r#"["What is ownership?", "Explain lifetimes."]"#;

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn primary_success_skips_secondary() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Ok(QUESTIONS_JSON), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);

    let envelope = gateway(&primary, &secondary).handle(questions_request("Technical")).await;

    assert_eq!(envelope.status, 200);
    let (questions, source) = questions_of(&envelope.body);
    assert_eq!(questions, ["What is ownership?", "Explain lifetimes."]);
    assert_eq!(source, Source::Provider(ProviderKind::Gemini));
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn primary_failure_falls_through_to_secondary_in_order() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Err(http_error()), &log);
    let secondary = ScriptedProvider::new(
        ProviderKind::OpenAi,
        Ok("```json\n[\"From the backup?\"]\n```"),
        &log,
    );

    let envelope = gateway(&primary, &secondary).handle(questions_request("Technical")).await;

    let (questions, source) = questions_of(&envelope.body);
    assert_eq!(questions, ["From the backup?"]);
    assert_eq!(source, Source::Provider(ProviderKind::OpenAi));
    assert_eq!(*log.lock().unwrap(), [ProviderKind::Gemini, ProviderKind::OpenAi]);
}

#[tokio::test]
async fn unparseable_primary_output_counts_as_failure() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Ok(""), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);

    let envelope = gateway(&primary, &secondary).handle(questions_request("Technical")).await;

    assert_eq!(questions_of(&envelope.body).1, Source::Provider(ProviderKind::OpenAi));
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn both_failing_serves_fallback_questions_for_type() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Err(http_error()), &log);
    let secondary = ScriptedProvider::new(
        ProviderKind::OpenAi,
        Err(ProviderFailure::Reported {
            message: "quota exceeded".into(),
        }),
        &log,
    );

    let envelope = gateway(&primary, &secondary).handle(questions_request("Behavioral")).await;

    assert_eq!(envelope.status, 200);
    let (questions, source) = questions_of(&envelope.body);
    assert_eq!(questions, fallback::questions_for("Behavioral").as_slice());
    assert_eq!(source, Source::Fallback);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn unconfigured_providers_go_straight_to_fallback() {
    let gateway = Gateway::new(ProviderChain::default(), GatewaySettings::default());
    assert!(gateway.configured_providers().is_empty());

    let envelope = gateway.handle(questions_request("Technical")).await;

    let (questions, source) = questions_of(&envelope.body);
    assert_eq!(source, Source::Fallback);
    assert_eq!(questions, fallback::questions_for("technical").as_slice());
}

#[tokio::test]
async fn missing_primary_slot_uses_secondary() {
    let log = CallLog::default();
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);
    let gateway = Gateway::new(
        ProviderChain::new(None, Some(Arc::clone(&secondary) as Arc<dyn LlmProvider>)),
        GatewaySettings::default(),
    );

    let envelope = gateway.handle(questions_request("Technical")).await;

    assert_eq!(questions_of(&envelope.body).1, Source::Provider(ProviderKind::OpenAi));
    assert_eq!(gateway.configured_providers(), [ProviderKind::OpenAi]);
}

#[tokio::test]
async fn slow_primary_times_out_and_secondary_answers() {
    let log = CallLog::default();
    let primary = ScriptedProvider::slow(ProviderKind::Gemini, Duration::from_secs(5), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);
    let gateway = Gateway::new(
        ProviderChain::new(
            Some(Arc::clone(&primary) as Arc<dyn LlmProvider>),
            Some(Arc::clone(&secondary) as Arc<dyn LlmProvider>),
        ),
        GatewaySettings {
            attempt_timeout: Duration::from_millis(50),
        },
    );

    let envelope = gateway.handle(questions_request("Technical")).await;

    assert_eq!(questions_of(&envelope.body).1, Source::Provider(ProviderKind::OpenAi));
    assert_eq!(primary.calls(), 1);
}

// ---------------------------------------------------------------------------
// forceOpenAI
// ---------------------------------------------------------------------------

#[tokio::test]
async fn force_open_ai_never_calls_primary() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Ok(QUESTIONS_JSON), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);
    let request = GatewayRequest {
        force_open_ai: true,
        ..questions_request("Technical")
    };

    let envelope = gateway(&primary, &secondary).handle(request).await;

    assert_eq!(questions_of(&envelope.body).1, Source::Provider(ProviderKind::OpenAi));
    assert_eq!(primary.calls(), 0);
}

#[tokio::test]
async fn force_open_ai_failure_goes_to_fallback_not_primary() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Ok(QUESTIONS_JSON), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Err(http_error()), &log);
    let request = GatewayRequest {
        force_open_ai: true,
        ..questions_request("Technical")
    };

    let envelope = gateway(&primary, &secondary).handle(request).await;

    assert_eq!(questions_of(&envelope.body).1, Source::Fallback);
    assert_eq!(primary.calls(), 0);
    assert_eq!(*log.lock().unwrap(), [ProviderKind::OpenAi]);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_action_is_rejected_before_any_provider() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Ok(QUESTIONS_JSON), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);
    let request = GatewayRequest {
        action: "summarize-resume".into(),
        ..questions_request("Technical")
    };

    let envelope = gateway(&primary, &secondary).handle(request).await;

    assert_eq!(envelope.status, 400);
    assert_eq!(
        envelope.body,
        EnvelopeBody::Failure {
            error: "Invalid action specified: summarize-resume".into()
        }
    );
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_fields_are_client_errors() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Ok(QUESTIONS_JSON), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok(QUESTIONS_JSON), &log);
    let gateway = gateway(&primary, &secondary);

    let no_profile = GatewayRequest {
        profile: None,
        ..questions_request("Technical")
    };
    let no_image = GatewayRequest {
        image_url: Some("  ".into()),
        ..outfit_request()
    };
    let no_questions = GatewayRequest {
        questions: Vec::new(),
        ..answers_request()
    };

    for request in [no_profile, no_image, no_questions] {
        let error = gateway.dispatch(request.clone()).await.unwrap_err();
        assert!(
            matches!(error, GatewayError::InvalidRequest { .. }),
            "{request:?} gave {error:?}"
        );
        assert_eq!(gateway.handle(request).await.status, 400);
    }
    assert!(log.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Answer and outfit tasks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn answer_fallback_uses_heuristic_score() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Err(http_error()), &log);
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Ok("I cannot grade this."), &log);

    let envelope = gateway(&primary, &secondary).handle(answers_request()).await;

    let Some(TaskOutput::Evaluation(evaluation)) = envelope.output() else {
        panic!("expected evaluation, got {:?}", envelope.body);
    };
    assert_eq!(evaluation.source, Source::Fallback);
    assert_eq!(evaluation.value.score.as_f64(), 75.0);
    assert!(!evaluation.value.strengths.is_empty());
    assert!(!evaluation.value.weaknesses.is_empty());
    assert!(!evaluation.value.suggestions.is_empty());
}

#[tokio::test]
async fn answer_evaluation_from_provider_is_passed_through() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(
        ProviderKind::Gemini,
        Ok(r#"Here you go: {"score": 82, "strengths": ["clear"], "weaknesses": ["brief"], "suggestions": ["use STAR"], "feedback": "Solid."}"#),
        &log,
    );
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Err(http_error()), &log);

    let envelope = gateway(&primary, &secondary).handle(answers_request()).await;

    let json = serde_json::to_value(&envelope.body).unwrap();
    assert_eq!(json["score"], 82.0);
    assert_eq!(json["strengths"], serde_json::json!(["clear"]));
    assert_eq!(json["source"], "Gemini AI");
    let prompt = primary.last_request().unwrap().prompt;
    assert!(prompt.contains("Question 4: Q4"));
}

#[tokio::test]
async fn outfit_request_reaches_provider_with_image() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(
        ProviderKind::Gemini,
        Ok(r#"{"score": 9, "feedback": "Sharp and professional."}"#),
        &log,
    );
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Err(http_error()), &log);

    let envelope = gateway(&primary, &secondary).handle(outfit_request()).await;

    let Some(TaskOutput::Outfit(outfit)) = envelope.output() else {
        panic!("expected outfit, got {:?}", envelope.body);
    };
    assert_eq!(outfit.value.score.as_f64(), 9.0);
    assert_eq!(outfit.source, Source::Provider(ProviderKind::Gemini));
    let image = primary.last_request().unwrap().image.unwrap();
    assert_eq!(image.url, "https://storage.example/outfits/alex.jpg");
}

#[tokio::test]
async fn out_of_range_outfit_score_falls_back() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(
        ProviderKind::Gemini,
        Ok(r#"{"score": 42, "feedback": "?"}"#),
        &log,
    );
    let secondary = ScriptedProvider::new(ProviderKind::OpenAi, Err(http_error()), &log);

    let envelope = gateway(&primary, &secondary).handle(outfit_request()).await;

    let Some(TaskOutput::Outfit(outfit)) = envelope.output() else {
        panic!("expected outfit, got {:?}", envelope.body);
    };
    assert_eq!(outfit.source, Source::Fallback);
    assert_eq!(outfit.value, fallback::outfit());
}

// ---------------------------------------------------------------------------
// Tasks without a fallback
// ---------------------------------------------------------------------------

struct NoFallbackTask;

impl Task for NoFallbackTask {
    type Output = String;

    fn action(&self) -> Action {
        Action::GenerateQuestions
    }

    fn provider_request(&self) -> ProviderRequest {
        ProviderRequest {
            prompt: "anything".into(),
            image: None,
            params: interview::generation_params(Action::GenerateQuestions),
        }
    }

    fn normalize(&self, text: &str) -> Result<String, NormalizationFailure> {
        Ok(text.to_string())
    }

    fn static_fallback(&self) -> Option<String> {
        None
    }
}

#[tokio::test]
async fn exhausted_chain_without_fallback_is_unavailable() {
    let log = CallLog::default();
    let primary = ScriptedProvider::new(ProviderKind::Gemini, Err(http_error()), &log);
    let orchestrator = FallbackOrchestrator::new(
        ProviderChain::new(Some(Arc::clone(&primary) as Arc<dyn LlmProvider>), None),
        Duration::from_secs(1),
    );

    let error = orchestrator
        .run(&NoFallbackTask, Stage::TryPrimary)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        GatewayError::AllProvidersUnavailable {
            action: Action::GenerateQuestions
        }
    );
    assert_eq!(gateway::Envelope::failure(&error).status, 500);
    assert_eq!(primary.calls(), 1);
}
