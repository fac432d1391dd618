//! Question-set generation.
//!
//! `QuestionGenerator` is the seam the service depends on; `LlmQuestionGenerator`
//! is the default backend. Whatever the backend returns goes through
//! [`normalize_question_set`], which fills optional fields and rejects the
//! whole set if any item is malformed.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{LlmClient, Purpose};
use crate::models::question::{Difficulty, Question, OPTION_COUNT};
use crate::quiz::prompts;

/// Carried in `AppState` (via the service) as `Arc<dyn QuestionGenerator>`.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        domain: &str,
        domain_label: &str,
        count: usize,
    ) -> Result<Vec<Question>, AppError>;
}

/// Wire shape of the generator output (camelCase JSON).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestionSet {
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: i64,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionSetError {
    #[error("question set is empty")]
    Empty,

    #[error("question {position} has {count} options (expected 4)")]
    WrongOptionCount { position: usize, count: usize },

    #[error("question {position} has correctAnswer {value} (expected 0-3)")]
    CorrectAnswerOutOfRange { position: usize, value: i64 },

    #[error("question {position} has no text")]
    BlankQuestion { position: usize },

    #[error("duplicate question id '{0}'")]
    DuplicateId(String),
}

/// Validates and normalizes a raw set. Positions in errors are 1-based.
pub fn normalize_question_set(raw: RawQuestionSet) -> Result<Vec<Question>, QuestionSetError> {
    if raw.questions.is_empty() {
        return Err(QuestionSetError::Empty);
    }

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(raw.questions.len());

    for (i, item) in raw.questions.into_iter().enumerate() {
        let position = i + 1;

        if item.question.trim().is_empty() {
            return Err(QuestionSetError::BlankQuestion { position });
        }
        let options: [String; OPTION_COUNT] =
            item.options
                .try_into()
                .map_err(|opts: Vec<String>| QuestionSetError::WrongOptionCount {
                    position,
                    count: opts.len(),
                })?;
        if !(0..OPTION_COUNT as i64).contains(&item.correct_answer) {
            return Err(QuestionSetError::CorrectAnswerOutOfRange {
                position,
                value: item.correct_answer,
            });
        }

        let id = match item.id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => format!("q{position}"),
        };
        if !seen.insert(id.clone()) {
            return Err(QuestionSetError::DuplicateId(id));
        }

        let difficulty = match item.difficulty.as_deref() {
            None => Difficulty::default(),
            Some(label) => Difficulty::from_label(label).unwrap_or_else(|| {
                warn!(question_id = %id, difficulty = label, "Unknown difficulty, using medium");
                Difficulty::default()
            }),
        };

        questions.push(Question {
            id,
            question: item.question.trim().to_string(),
            options,
            correct_answer: item.correct_answer as u8,
            keywords: item.keywords.unwrap_or_default(),
            difficulty,
        });
    }

    Ok(questions)
}

// ────────────────────────────────────────────────────────────────────────────
// LlmQuestionGenerator, the default backend
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionGenerator {
    llm: LlmClient,
}

impl LlmQuestionGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(
        &self,
        domain: &str,
        domain_label: &str,
        count: usize,
    ) -> Result<Vec<Question>, AppError> {
        let system = prompts::question_set_system(domain_label, count);
        let prompt = prompts::question_set_prompt(domain_label, count);

        let raw = self
            .llm
            .call_json::<RawQuestionSet>(Purpose::QuestionSet, &prompt, &system)
            .await
            .map_err(|e| AppError::Generation(format!("Question generation failed: {e}")))?;

        let questions = normalize_question_set(raw)
            .map_err(|e| AppError::Generation(format!("Malformed question set: {e}")))?;

        info!(domain, count = questions.len(), "Question set generated");
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawQuestionSet {
        serde_json::from_str(json).unwrap()
    }

    fn item(id: Option<&str>, correct: i64) -> RawQuestion {
        RawQuestion {
            id: id.map(str::to_string),
            question: "What does DNS resolve?".to_string(),
            options: vec!["Names".into(), "Ports".into(), "Routes".into(), "Files".into()],
            correct_answer: correct,
            keywords: Some(vec!["names".to_string()]),
            difficulty: Some("easy".to_string()),
        }
    }

    #[test]
    fn test_parses_camel_case_wire_shape() {
        let set = raw(
            r#"{"questions":[{"id":"a","question":"Q?","options":["1","2","3","4"],
                "correctAnswer":2,"keywords":["k"],"difficulty":"HARD"}]}"#,
        );
        let questions = normalize_question_set(set).unwrap();
        assert_eq!(questions[0].id, "a");
        assert_eq!(questions[0].correct_answer, 2);
        assert_eq!(questions[0].difficulty, Difficulty::Hard);
        assert_eq!(questions[0].keywords, vec!["k"]);
    }

    #[test]
    fn test_missing_optional_fields_get_defaults() {
        let set = raw(
            r#"{"questions":[
                {"question":"Q1?","options":["1","2","3","4"],"correctAnswer":0},
                {"id":"  ","question":"Q2?","options":["1","2","3","4"],"correctAnswer":1,"difficulty":"brutal"}
            ]}"#,
        );
        let questions = normalize_question_set(set).unwrap();
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[1].id, "q2");
        assert_eq!(questions[0].difficulty, Difficulty::Medium);
        assert_eq!(questions[1].difficulty, Difficulty::Medium);
        assert!(questions[0].keywords.is_empty());
    }

    #[test]
    fn test_empty_set_is_rejected() {
        assert_eq!(
            normalize_question_set(raw(r#"{"questions":[]}"#)),
            Err(QuestionSetError::Empty)
        );
        assert_eq!(normalize_question_set(raw("{}")), Err(QuestionSetError::Empty));
    }

    #[test]
    fn test_wrong_option_count_rejects_whole_set() {
        let mut bad = item(Some("b"), 0);
        bad.options.pop();
        let set = RawQuestionSet {
            questions: vec![item(Some("a"), 0), bad],
        };
        assert_eq!(
            normalize_question_set(set),
            Err(QuestionSetError::WrongOptionCount { position: 2, count: 3 })
        );
    }

    #[test]
    fn test_out_of_range_correct_answer_is_rejected() {
        for value in [-1, 4] {
            let set = RawQuestionSet {
                questions: vec![item(None, value)],
            };
            assert_eq!(
                normalize_question_set(set),
                Err(QuestionSetError::CorrectAnswerOutOfRange { position: 1, value })
            );
        }
    }

    #[test]
    fn test_blank_question_text_is_rejected() {
        let mut blank = item(None, 0);
        blank.question = "   ".to_string();
        let set = RawQuestionSet { questions: vec![blank] };
        assert_eq!(
            normalize_question_set(set),
            Err(QuestionSetError::BlankQuestion { position: 1 })
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        // A generated default id can collide with an explicit one.
        let set = RawQuestionSet {
            questions: vec![item(Some("q2"), 0), item(None, 1)],
        };
        assert_eq!(
            normalize_question_set(set),
            Err(QuestionSetError::DuplicateId("q2".to_string()))
        );
    }
}
