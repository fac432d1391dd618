use serde::Serialize;
use uuid::Uuid;

use crate::models::question::Difficulty;
use crate::models::result::{TestResult, TestSummary};
use crate::quiz::notice::Notice;
use crate::quiz::session::Phase;

/// Client-facing snapshot of a session. `correct_answer` stays hidden until
/// the current question is answered.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub phase: Phase,
    pub domain: Option<String>,
    pub domain_label: Option<String>,
    pub navigation_guard: bool,
    pub question: Option<QuestionView>,
    pub results: Vec<TestResult>,
    pub summary: Option<TestSummary>,
    pub quick_answer_count: u32,
    pub tab_switch_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: String,
    /// 1-based position.
    pub number: usize,
    pub total: usize,
    pub question: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
    pub selected_answer: Option<u8>,
    pub awaiting_confirmation: bool,
    pub warning_open: bool,
    pub is_answered: bool,
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<u8>,
    pub elapsed_ms: u64,
    pub explanation: ExplanationView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplanationView {
    /// `not_requested`, `loading` or `ready`.
    pub status: &'static str,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Response envelope for every session call.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session: SessionView,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<crate::quiz::session::AnswerFeedback>,
    /// Set for environment events the client must block (unload, back).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
}

impl SessionResponse {
    pub fn new(session: SessionView) -> Self {
        Self {
            session,
            notices: Vec::new(),
            feedback: None,
            blocked: false,
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn with_notices(mut self, notices: impl IntoIterator<Item = Notice>) -> Self {
        self.notices.extend(notices);
        self
    }
}
