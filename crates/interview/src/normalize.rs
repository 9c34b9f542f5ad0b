//! Conversion of free-form provider text into typed results.
//!
//! Providers are asked for strict JSON but do not always comply: answers
//! arrive wrapped in Markdown code fences, preceded by prose, or as a plain
//! numbered list. Each parser runs a chain of strategies from strictest to
//! loosest and only reports a [`NormalizationFailure`] when none yields a
//! structurally valid value.
//!
//! | Target | Strategies, in order |
//! |--------|----------------------|
//! | question list | strict JSON (authoritative when the text is JSON) → first balanced `[...]` → quoted substrings → numbered lines |
//! | evaluation / outfit object | strict JSON → first balanced `{...}` |

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{EvaluationResult, NormalizationFailure, OutfitEvaluation};

const QUESTION_LIST: &str = "question list";
const EVALUATION: &str = "evaluation";
const OUTFIT_EVALUATION: &str = "outfit evaluation";

/// Removes Markdown code-fence markers (```` ``` ```` and ```` ```json ````)
/// wherever they occur and trims surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Question lists
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionPayload {
    List(Vec<String>),
    Wrapped { questions: Vec<String> },
}

impl QuestionPayload {
    fn into_questions(self) -> Vec<String> {
        match self {
            QuestionPayload::List(list) => list,
            QuestionPayload::Wrapped { questions } => questions,
        }
    }
}

/// Extracts an ordered list of questions from provider text.
///
/// Text that is already valid JSON is taken at its word: it must be a string
/// array or `{"questions": [...]}` with at least one non-blank entry. The
/// lenient strategies only run on text that is not JSON.
pub fn parse_question_list(text: &str) -> Result<Vec<String>, NormalizationFailure> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(NormalizationFailure::new(QUESTION_LIST, "provider returned no text"));
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) {
        return questions_from_json(value);
    }

    let strategies: [fn(&str) -> Option<Vec<String>>; 3] = [
        |s: &str| {
            balanced_candidates(s, '[', ']')
                .filter_map(|candidate| serde_json::from_str::<Vec<String>>(candidate).ok())
                .map(tidy)
                .find(|questions| !questions.is_empty())
        },
        |s: &str| Some(quoted_substrings(s)),
        |s: &str| Some(enumerated_lines(s)),
    ];

    strategies
        .iter()
        .filter_map(|strategy| strategy(&cleaned))
        .map(tidy)
        .find(|questions| !questions.is_empty())
        .ok_or_else(|| NormalizationFailure::new(QUESTION_LIST, "no questions found in text"))
}

fn questions_from_json(value: serde_json::Value) -> Result<Vec<String>, NormalizationFailure> {
    let payload = serde_json::from_value::<QuestionPayload>(value).map_err(|_| {
        NormalizationFailure::new(
            QUESTION_LIST,
            "JSON is neither a string array nor an object with a questions array",
        )
    })?;
    let questions = tidy(payload.into_questions());
    if questions.is_empty() {
        return Err(NormalizationFailure::new(QUESTION_LIST, "JSON question list is empty"));
    }
    Ok(questions)
}

fn tidy(questions: Vec<String>) -> Vec<String> {
    questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

/// Every non-empty substring enclosed in a pair of double quotes.
fn quoted_substrings(text: &str) -> Vec<String> {
    let segments: Vec<&str> = text.split('"').collect();
    // Odd segments sit between an opening and a closing quote; the last
    // segment is never closed.
    segments
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 1 && *i + 1 < segments.len())
        .map(|(_, s)| s.to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Non-empty lines with enumeration markers (`1.`, `2)`, `-`, `*`) removed.
fn enumerated_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_enumeration)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_enumeration(line: &str) -> &str {
    let line = line.trim();
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
        return line;
    }
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }
    line
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// Extracts an answer evaluation from provider text.
///
/// The score must be a number in `[0, 100]` and `strengths`, `weaknesses`,
/// and `suggestions` must all be present as string arrays.
pub fn parse_evaluation(text: &str) -> Result<EvaluationResult, NormalizationFailure> {
    parse_object(text, EVALUATION)
}

/// Extracts an outfit evaluation from provider text.
///
/// The score must be a number in `[1, 10]` and `feedback` must be present.
pub fn parse_outfit(text: &str) -> Result<OutfitEvaluation, NormalizationFailure> {
    parse_object(text, OUTFIT_EVALUATION)
}

fn parse_object<T: DeserializeOwned>(
    text: &str,
    expected: &'static str,
) -> Result<T, NormalizationFailure> {
    let cleaned = strip_code_fences(text);
    let strict_error = match serde_json::from_str::<T>(&cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let mut last_error = strict_error.to_string();
    for candidate in balanced_candidates(&cleaned, '{', '}') {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => {
                tracing::debug!(expected, "recovered object embedded in provider text");
                return Ok(value);
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(NormalizationFailure::new(expected, last_error))
}

// ---------------------------------------------------------------------------
// Balanced delimiter scanning
// ---------------------------------------------------------------------------

/// Iterates over every balanced `open ... close` substring, in order of its
/// opening delimiter. Delimiters inside JSON string literals are ignored.
fn balanced_candidates(text: &str, open: char, close: char) -> impl Iterator<Item = &str> {
    text.char_indices()
        .filter(move |(_, c)| *c == open)
        .filter_map(move |(start, _)| balanced_from(text, start, open, close))
}

fn balanced_from(text: &str, start: usize, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_anywhere() {
        assert_eq!(strip_code_fences("```json\n[\"a\"]\n```"), "[\"a\"]");
        assert_eq!(strip_code_fences("  plain  "), "plain");
    }

    #[test]
    fn strict_array_is_parsed() {
        let questions = parse_question_list(r#"["What is ownership?", "Explain lifetimes."]"#).unwrap();
        assert_eq!(questions, vec!["What is ownership?", "Explain lifetimes."]);
    }

    #[test]
    fn wrapped_object_is_accepted() {
        let questions = parse_question_list(r#"{"questions": ["Q1", "Q2"]}"#).unwrap();
        assert_eq!(questions, vec!["Q1", "Q2"]);
    }

    #[test]
    fn array_embedded_in_prose_is_recovered() {
        let text = "Sure! Here are five questions [tailored] for you:\n\
                    [\"Describe a \\\"hard\\\" bug you fixed.\", \"How do you test async code?\"]\n\
                    Good luck with the interview.";
        let questions = parse_question_list(text).unwrap();
        assert_eq!(
            questions,
            vec!["Describe a \"hard\" bug you fixed.", "How do you test async code?"]
        );
    }

    #[test]
    fn quoted_substrings_are_used_when_json_is_broken() {
        let text = r#"["Why this company?", "Where do you see yourself in five years?",]"#;
        let questions = parse_question_list(text).unwrap();
        assert_eq!(
            questions,
            vec!["Why this company?", "Where do you see yourself in five years?"]
        );
    }

    #[test]
    fn numbered_lines_are_the_last_resort() {
        let text = "1. Tell me about yourself.\n\n2) Why are you leaving?\n- What motivates you?";
        let questions = parse_question_list(text).unwrap();
        assert_eq!(
            questions,
            vec!["Tell me about yourself.", "Why are you leaving?", "What motivates you?"]
        );
    }

    #[test]
    fn empty_json_lists_fail() {
        for text in ["[]", r#"{"questions": []}"#, r#"["  ", ""]"#, "```json\n[]\n```"] {
            let err = parse_question_list(text).unwrap_err();
            assert_eq!(err.expected, "question list", "{text}");
        }
    }

    #[test]
    fn json_of_the_wrong_shape_fails() {
        for text in [r#"[{"question": "Q1"}]"#, r#"{"items": ["Q1"]}"#, "42", "null"] {
            assert!(parse_question_list(text).is_err(), "{text} was accepted");
        }
    }

    #[test]
    fn empty_text_fails() {
        let err = parse_question_list("```\n```").unwrap_err();
        assert_eq!(err.expected, "question list");
    }

    #[test]
    fn evaluation_in_code_fence_is_parsed() {
        let text = "```json\n{\"score\": 82, \"strengths\": [\"Clear\"], \"weaknesses\": [], \
                    \"suggestions\": [\"Quantify results\"], \"feedback\": \"Solid.\"}\n```";
        let evaluation = parse_evaluation(text).unwrap();
        assert_eq!(evaluation.score.as_f64(), 82.0);
        assert_eq!(evaluation.strengths, vec!["Clear"]);
        assert!(evaluation.weaknesses.is_empty());
        assert_eq!(evaluation.feedback, "Solid.");
    }

    #[test]
    fn evaluation_behind_prose_is_recovered() {
        let text = "Here is my assessment {of sorts}: {\"score\": 64.5, \"strengths\": [\"a {b}\"], \
                    \"weaknesses\": [\"c\"], \"suggestions\": [\"d\"], \"feedback\": \"e\"} Thanks!";
        let evaluation = parse_evaluation(text).unwrap();
        assert_eq!(evaluation.score.as_f64(), 64.5);
        assert_eq!(evaluation.strengths, vec!["a {b}"]);
    }

    #[test]
    fn evaluation_missing_a_list_is_rejected() {
        let text = r#"{"score": 70, "strengths": ["x"], "weaknesses": ["y"], "feedback": "z"}"#;
        let err = parse_evaluation(text).unwrap_err();
        assert!(err.reason.contains("suggestions"), "{}", err.reason);
    }

    #[test]
    fn evaluation_with_non_numeric_score_is_rejected() {
        let text = r#"{"score": "high", "strengths": [], "weaknesses": [], "suggestions": []}"#;
        assert!(parse_evaluation(text).is_err());
    }

    #[test]
    fn evaluation_score_out_of_range_is_rejected() {
        let text = r#"{"score": 140, "strengths": [], "weaknesses": [], "suggestions": []}"#;
        assert!(parse_evaluation(text).is_err());
    }

    #[test]
    fn outfit_is_parsed_and_validated() {
        let outfit = parse_outfit(r#"Result: {"score": 9, "feedback": "Sharp suit."}"#).unwrap();
        assert_eq!(outfit.score.as_f64(), 9.0);
        assert!(parse_outfit(r#"{"score": 11, "feedback": "?"}"#).is_err());
        assert!(parse_outfit(r#"{"score": 5}"#).is_err());
    }
}
