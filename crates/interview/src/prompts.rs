//! Prompt templates keyed by action.
//!
//! All three actions share the same profile preamble; only the persona, the
//! task body, and the requested output shape differ. Keeping them in one
//! place stops the wording of the preamble drifting between actions.

use crate::{Action, GenerationParams, InterviewProfile};

/// Number of questions requested from a provider.
pub const QUESTION_COUNT: usize = 5;

/// Placeholder used in prompts for a question without an answer.
pub const MISSING_ANSWER: &str = "No answer provided";

/// Action-specific inputs to the prompt template.
#[derive(Debug, Clone, Copy)]
pub enum PromptTask<'a> {
    Questions,
    Answers {
        questions: &'a [String],
        answers: &'a [String],
    },
    Outfit,
}

impl PromptTask<'_> {
    pub fn action(&self) -> Action {
        match self {
            PromptTask::Questions => Action::GenerateQuestions,
            PromptTask::Answers { .. } => Action::EvaluateAnswers,
            PromptTask::Outfit => Action::EvaluateOutfit,
        }
    }
}

/// Sampling parameters used for each action.
pub fn generation_params(action: Action) -> GenerationParams {
    match action {
        Action::GenerateQuestions => GenerationParams {
            temperature: 0.7,
            max_output_tokens: 1024,
        },
        Action::EvaluateAnswers => GenerationParams {
            temperature: 0.3,
            max_output_tokens: 2048,
        },
        Action::EvaluateOutfit => GenerationParams {
            temperature: 0.4,
            max_output_tokens: 512,
        },
    }
}

/// Builds the instruction prompt for `task` from the candidate's profile.
pub fn build_prompt(profile: &InterviewProfile, task: PromptTask<'_>) -> String {
    let persona = match task {
        PromptTask::Questions => "an expert interviewer",
        PromptTask::Answers { .. } => "an expert evaluator",
        PromptTask::Outfit => "an expert career coach",
    };
    let mut prompt = format!(
        "You are {persona} specialized in {} interviews for {} positions.\n\
         The candidate has {} experience.\n\n",
        profile.interview_type,
        profile.job_role_label(),
        profile.experience_label(),
    );

    match task {
        PromptTask::Questions => {
            prompt.push_str(&format!(
                "Generate {QUESTION_COUNT} thoughtful and challenging interview questions that would \
                 help assess this candidate's suitability.\n\
                 The questions should be appropriate for their experience level.\n\
                 Return only the questions in a valid JSON format as an array of strings, without \
                 any additional text or explanation.\n\
                 Example: [\"Question 1\", \"Question 2\", \"Question 3\", \"Question 4\", \"Question 5\"]"
            ));
        }
        PromptTask::Answers { questions, answers } => {
            prompt.push_str(
                "Below are the interview questions and the candidate's answers. \
                 Please evaluate their performance:\n\n",
            );
            let transcript: Vec<String> = questions
                .iter()
                .enumerate()
                .map(|(i, question)| {
                    let answer = answers
                        .get(i)
                        .map(String::as_str)
                        .filter(|a| !a.trim().is_empty())
                        .unwrap_or(MISSING_ANSWER);
                    format!("Question {}: {question}\nAnswer: {answer}", i + 1)
                })
                .collect();
            prompt.push_str(&transcript.join("\n\n"));
            prompt.push_str(
                "\n\nProvide your evaluation in a valid JSON format with the following structure:\n\
                 {\n\
                 \x20 \"score\": [a number between 0 and 100 representing overall performance],\n\
                 \x20 \"strengths\": [an array of 3-5 strings describing what the candidate did well],\n\
                 \x20 \"weaknesses\": [an array of 2-4 strings describing areas for improvement],\n\
                 \x20 \"suggestions\": [an array of 3-5 strings with specific advice for improving],\n\
                 \x20 \"feedback\": [a brief paragraph summarizing the overall assessment]\n\
                 }",
            );
        }
        PromptTask::Outfit => {
            prompt.push_str(
                "Evaluate the professional appearance of the candidate in the attached photo for \
                 this interview.\n\
                 Consider attire, grooming, and overall presentation.\n\
                 Respond only with valid JSON in the following structure:\n\
                 {\"score\": [a number from 1 to 10], \"feedback\": [two or three sentences of \
                 constructive feedback]}",
            );
        }
    }

    prompt
}
