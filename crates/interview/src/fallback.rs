//! Static fallback content.
//!
//! Used only when no live provider produced a usable result. Everything here
//! is deterministic: the same inputs always yield the same output, so a
//! caller that sees `source = "Fallback System"` can rely on stable content.

use crate::{EvaluationResult, InterviewScore, OutfitEvaluation, OutfitScore};

/// Answers at or below this many characters (after trimming) count as empty
/// for the heuristic score.
pub const SUBSTANTIVE_ANSWER_MIN_CHARS: usize = 10;

const BASE_SCORE: f64 = 65.0;
const COMPLETION_WEIGHT: f64 = 20.0;

const TECHNICAL_QUESTIONS: [&str; 5] = [
    "Walk me through how you would design a URL shortening service.",
    "Explain the concept of RESTful APIs and their key principles.",
    "How do you approach debugging a complex issue in your code?",
    "Describe a situation where you had to optimize a piece of code for performance.",
    "What strategies do you use for testing your code?",
];

const BEHAVIORAL_QUESTIONS: [&str; 5] = [
    "Tell me about a time you faced a significant challenge at work. How did you handle it?",
    "Describe a situation where you had to work with a difficult team member.",
    "Give an example of a goal you set for yourself and how you achieved it.",
    "Tell me about a time when you had to make an important decision with limited information.",
    "Describe how you handle working under pressure and tight deadlines.",
];

const MIXED_QUESTIONS: [&str; 5] = [
    "Tell me about yourself and your technical background.",
    "Describe a challenging project you worked on and the technologies you used.",
    "How do you stay updated with the latest trends in your field?",
    "Tell me about a time when you had to learn a new technology quickly. How did you approach it?",
    "What's your approach to balancing code quality with meeting deadlines?",
];

/// Canned questions for an interview type.
///
/// Matching is case-insensitive; unknown types get the mixed set.
pub fn questions_for(interview_type: &str) -> Vec<String> {
    let set = match interview_type.trim().to_ascii_lowercase().as_str() {
        "technical" => &TECHNICAL_QUESTIONS,
        "behavioral" | "behavioural" => &BEHAVIORAL_QUESTIONS,
        _ => &MIXED_QUESTIONS,
    };
    set.iter().map(|q| q.to_string()).collect()
}

/// Heuristic score for a set of answers.
///
/// `65 + 20 × (substantive answers / questions)`, rounded to the nearest
/// integer, so the result always lies in `[65, 85]`. With no questions the
/// completion ratio is zero.
pub fn heuristic_score(question_count: usize, answers: &[String]) -> InterviewScore {
    let substantive = answers
        .iter()
        .take(question_count)
        .filter(|a| a.trim().chars().count() > SUBSTANTIVE_ANSWER_MIN_CHARS)
        .count();
    let completion = if question_count == 0 {
        0.0
    } else {
        substantive as f64 / question_count as f64
    };
    let score = (BASE_SCORE + COMPLETION_WEIGHT * completion).round();
    // Completion is in [0, 1], so the score cannot leave [65, 85].
    InterviewScore::new(score).unwrap_or(InterviewScore(BASE_SCORE))
}

/// Canned evaluation scored by [`heuristic_score`].
///
/// Strengths, weaknesses, suggestions, and feedback do not depend on the
/// answers.
pub fn evaluation_for(question_count: usize, answers: &[String]) -> EvaluationResult {
    EvaluationResult {
        score: heuristic_score(question_count, answers),
        strengths: to_owned(&[
            "Clear and concise communication style",
            "Strong examples of past achievements",
            "Good understanding of technical concepts",
            "Structured approach to problem-solving",
        ]),
        weaknesses: to_owned(&[
            "Could provide more quantifiable results",
            "Some responses lack specific details",
            "Occasional use of filler words",
        ]),
        suggestions: to_owned(&[
            "Use the STAR method (Situation, Task, Action, Result) more consistently for behavioral questions",
            "Include more metrics and specific outcomes when describing past experiences",
            "Practice speaking more confidently about technical concepts",
            "Consider adding brief examples of how you've overcome similar challenges",
        ]),
        feedback: "Overall, a solid interview performance with room for improvement. Focus on \
                   providing more specific examples and quantifiable results in your answers."
            .to_string(),
    }
}

/// Canned outfit evaluation.
pub fn outfit() -> OutfitEvaluation {
    OutfitEvaluation {
        score: OutfitScore(8.0),
        feedback: "You look professional and ready for the interview! Your attire appears \
                   appropriate for a formal interview setting."
            .to_string(),
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
