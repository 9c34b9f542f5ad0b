//! Shared value types for the interview gateway domain.
//!
//! Every record here is created once per request and never mutated. Types that
//! carry invariants (scores, actions) validate on construction so that an
//! invalid value can never reach a caller: a provider answer that does not
//! satisfy them is rejected during normalisation and triggers fallback.

use serde::{Deserialize, Serialize};

use crate::errors::GatewayError;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The mock-interview profile configured by the candidate.
///
/// Read-only to the gateway; used to fill prompt templates and to select the
/// static fallback question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewProfile {
    /// Candidate display name. Not used in prompts.
    #[serde(default)]
    pub name: String,

    /// Job role identifier, e.g. `"software_engineer"`.
    pub job_role: String,

    /// Experience level identifier, e.g. `"mid_level"`.
    pub experience_level: String,

    /// Interview type, e.g. `"Technical"`, `"Behavioral"`, `"Mixed"`.
    pub interview_type: String,
}

impl InterviewProfile {
    /// Job role with underscores replaced by spaces (`"software engineer"`).
    pub fn job_role_label(&self) -> String {
        humanise(&self.job_role)
    }

    /// Experience level with underscores replaced by spaces (`"mid level"`).
    pub fn experience_label(&self) -> String {
        humanise(&self.experience_level)
    }
}

fn humanise(identifier: &str) -> String {
    identifier.replace('_', " ")
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The operations the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Produce a list of interview questions for a profile.
    GenerateQuestions,
    /// Score a set of answers against their questions.
    EvaluateAnswers,
    /// Score the candidate's attire from an uploaded photo.
    EvaluateOutfit,
}

impl Action {
    /// Returns the wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::GenerateQuestions => "generate-questions",
            Action::EvaluateAnswers => "evaluate-answers",
            Action::EvaluateOutfit => "evaluate-outfit",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate-questions" => Ok(Action::GenerateQuestions),
            "evaluate-answers" => Ok(Action::EvaluateAnswers),
            "evaluate-outfit" => Ok(Action::EvaluateOutfit),
            other => Err(GatewayError::InvalidAction {
                action: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// A live text-generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Gemini (primary).
    Gemini,
    /// OpenAI chat completions (secondary).
    OpenAi,
}

impl ProviderKind {
    /// Human-readable label shown to callers as the result source.
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini AI",
            ProviderKind::OpenAi => "OpenAI",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which stage produced a result.
///
/// Serialised as its label so the UI can display it verbatim. Callers should
/// treat [`Source::Fallback`] as a soft notice, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// A live provider answered and its output normalised successfully.
    Provider(ProviderKind),
    /// Deterministic built-in content.
    Fallback,
}

impl Source {
    /// Label used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Source::Provider(kind) => kind.label(),
            Source::Fallback => "Fallback System",
        }
    }

    /// Returns `true` if the static fallback produced the result.
    pub fn is_fallback(self) -> bool {
        matches!(self, Source::Fallback)
    }
}

impl From<ProviderKind> for Source {
    fn from(kind: ProviderKind) -> Self {
        Source::Provider(kind)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Score types
// ---------------------------------------------------------------------------

/// Overall interview performance score in the range `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct InterviewScore(pub(crate) f64);

impl InterviewScore {
    /// Creates an [`InterviewScore`], returning `None` if `value` is outside
    /// `[0, 100]` or not finite.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the score as an `f64`.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for InterviewScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("interview score {value} outside [0, 100]"))
    }
}

impl From<InterviewScore> for f64 {
    fn from(score: InterviewScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for InterviewScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Outfit presentation score in the range `[1, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct OutfitScore(pub(crate) f64);

impl OutfitScore {
    /// Creates an [`OutfitScore`], returning `None` if `value` is outside
    /// `[1, 10]` or not finite.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (1.0..=10.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the score as an `f64`.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for OutfitScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("outfit score {value} outside [1, 10]"))
    }
}

impl From<OutfitScore> for f64 {
    fn from(score: OutfitScore) -> Self {
        score.0
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// An ordered list of generated interview questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<String>,
}

/// Evaluation of a full set of answers.
///
/// `score` and the three list fields are mandatory when parsing provider
/// output; a missing field rejects the whole result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: InterviewScore,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub feedback: String,
}

/// Evaluation of the candidate's interview attire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitEvaluation {
    pub score: OutfitScore,
    pub feedback: String,
}

/// A result paired with the stage that produced it.
///
/// Serialises as the result's own fields plus a `source` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    #[serde(flatten)]
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: impl Into<Source>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}

/// The successful output of any gateway action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskOutput {
    Questions(Sourced<QuestionSet>),
    Evaluation(Sourced<EvaluationResult>),
    Outfit(Sourced<OutfitEvaluation>),
}

impl TaskOutput {
    /// The stage that produced this output.
    pub fn source(&self) -> Source {
        match self {
            TaskOutput::Questions(s) => s.source,
            TaskOutput::Evaluation(s) => s.source,
            TaskOutput::Outfit(s) => s.source,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire request
// ---------------------------------------------------------------------------

/// A gateway invocation as received from the browser client.
///
/// All fields are optional on the wire; which ones are required depends on
/// the action and is checked by the gateway before any provider is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub profile: Option<InterviewProfile>,

    #[serde(default)]
    pub questions: Vec<String>,

    #[serde(default)]
    pub answers: Vec<String>,

    /// Public URL of the uploaded outfit photo.
    #[serde(default)]
    pub image_url: Option<String>,

    /// Skip the primary provider and start with the secondary.
    #[serde(default, rename = "forceOpenAI")]
    pub force_open_ai: bool,
}
