//! The three built-in gateway tasks.

use interview::normalize::{parse_evaluation, parse_outfit, parse_question_list};
use interview::{
    build_prompt, fallback, generation_params, Action, EvaluationResult, ImageReference,
    InterviewProfile, NormalizationFailure, OutfitEvaluation, PromptTask, ProviderRequest,
    QuestionSet,
};

use crate::orchestrator::Task;

fn provider_request(
    profile: &InterviewProfile,
    task: PromptTask<'_>,
    image: Option<ImageReference>,
) -> ProviderRequest {
    ProviderRequest {
        prompt: build_prompt(profile, task),
        image,
        params: generation_params(task.action()),
    }
}

/// `generate-questions`.
#[derive(Debug, Clone)]
pub struct GenerateQuestions {
    pub profile: InterviewProfile,
}

impl Task for GenerateQuestions {
    type Output = QuestionSet;

    fn action(&self) -> Action {
        Action::GenerateQuestions
    }

    fn provider_request(&self) -> ProviderRequest {
        provider_request(&self.profile, PromptTask::Questions, None)
    }

    fn normalize(&self, text: &str) -> Result<QuestionSet, NormalizationFailure> {
        parse_question_list(text).map(|questions| QuestionSet { questions })
    }

    fn static_fallback(&self) -> Option<QuestionSet> {
        Some(QuestionSet {
            questions: fallback::questions_for(&self.profile.interview_type),
        })
    }
}

/// `evaluate-answers`.
#[derive(Debug, Clone)]
pub struct EvaluateAnswers {
    pub profile: InterviewProfile,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

impl Task for EvaluateAnswers {
    type Output = EvaluationResult;

    fn action(&self) -> Action {
        Action::EvaluateAnswers
    }

    fn provider_request(&self) -> ProviderRequest {
        provider_request(
            &self.profile,
            PromptTask::Answers {
                questions: &self.questions,
                answers: &self.answers,
            },
            None,
        )
    }

    fn normalize(&self, text: &str) -> Result<EvaluationResult, NormalizationFailure> {
        parse_evaluation(text)
    }

    fn static_fallback(&self) -> Option<EvaluationResult> {
        Some(fallback::evaluation_for(self.questions.len(), &self.answers))
    }
}

/// `evaluate-outfit`.
#[derive(Debug, Clone)]
pub struct EvaluateOutfit {
    pub profile: InterviewProfile,
    pub image_url: String,
}

impl Task for EvaluateOutfit {
    type Output = OutfitEvaluation;

    fn action(&self) -> Action {
        Action::EvaluateOutfit
    }

    fn provider_request(&self) -> ProviderRequest {
        provider_request(
            &self.profile,
            PromptTask::Outfit,
            Some(ImageReference {
                url: self.image_url.clone(),
            }),
        )
    }

    fn normalize(&self, text: &str) -> Result<OutfitEvaluation, NormalizationFailure> {
        parse_outfit(text)
    }

    fn static_fallback(&self) -> Option<OutfitEvaluation> {
        Some(fallback::outfit())
    }
}
