//! User-facing announcements produced by session operations. Every warning and
//! forced restart is surfaced through one of these.

use serde::Serialize;

use crate::quiz::policy::RestartReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    TestStarted,
    GenerationFailed,
    QuickAnswerWarning,
    TabSwitchWarning,
    TestRestarted,
    NavigationBlocked,
    LeaveConfirmation,
    AnswerFeedback,
    ExplanationError,
    TestSaved,
    SaveFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub variant: NoticeVariant,
}

pub const LEAVE_PROMPT: &str = "You have an ongoing test. Are you sure you want to leave?";

impl Notice {
    fn new(kind: NoticeKind, title: &str, message: String, variant: NoticeVariant) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
            variant,
        }
    }

    pub fn test_started(domain_label: &str, question_count: usize) -> Self {
        Self::new(
            NoticeKind::TestStarted,
            "Test Started",
            format!(
                "Good luck with your {domain_label} interview test! {question_count} questions generated."
            ),
            NoticeVariant::Default,
        )
    }

    pub fn generation_failed() -> Self {
        Self::new(
            NoticeKind::GenerationFailed,
            "Error",
            "Failed to generate questions. Please try again.".to_string(),
            NoticeVariant::Destructive,
        )
    }

    pub fn quick_answer_warning(count: u32, limit: u32) -> Self {
        Self::new(
            NoticeKind::QuickAnswerWarning,
            "Please Read Carefully",
            format!(
                "You're answering too quickly! Take your time to read the question properly. \
                 Warning {count}/{limit}: reaching {limit} restarts the test."
            ),
            NoticeVariant::Destructive,
        )
    }

    pub fn tab_switch_warning(count: u32, limit: u32) -> Self {
        Self::new(
            NoticeKind::TabSwitchWarning,
            "Tab Switch Detected",
            format!(
                "Leaving the test page is not allowed ({count}/{limit}). \
                 Reaching {limit} restarts the test."
            ),
            NoticeVariant::Destructive,
        )
    }

    pub fn test_restarted(reason: RestartReason) -> Self {
        let why = match reason {
            RestartReason::QuickAnswers => "Too many answers were submitted without reading the question.",
            RestartReason::TabSwitches => "The test page was left too many times.",
        };
        Self::new(
            NoticeKind::TestRestarted,
            "Test Restarted",
            format!("{why} Your progress has been discarded; select a domain to start again."),
            NoticeVariant::Destructive,
        )
    }

    pub fn navigation_blocked() -> Self {
        Self::new(
            NoticeKind::NavigationBlocked,
            "Navigation Blocked",
            "Please complete the test before leaving.".to_string(),
            NoticeVariant::Destructive,
        )
    }

    pub fn leave_confirmation() -> Self {
        Self::new(
            NoticeKind::LeaveConfirmation,
            "Leave Test?",
            LEAVE_PROMPT.to_string(),
            NoticeVariant::Destructive,
        )
    }

    pub fn answer_feedback(correct: bool, correct_option: &str) -> Self {
        if correct {
            Self::new(
                NoticeKind::AnswerFeedback,
                "Correct! ✓",
                "Great job! That's the right answer.".to_string(),
                NoticeVariant::Default,
            )
        } else {
            Self::new(
                NoticeKind::AnswerFeedback,
                "Incorrect ✗",
                format!("The correct answer was: {correct_option}"),
                NoticeVariant::Destructive,
            )
        }
    }

    pub fn explanation_error() -> Self {
        Self::new(
            NoticeKind::ExplanationError,
            "Explanation Error",
            "Could not generate AI explanation. Showing default response.".to_string(),
            NoticeVariant::Destructive,
        )
    }

    pub fn test_saved() -> Self {
        Self::new(
            NoticeKind::TestSaved,
            "Test Saved",
            "Your interview test result was saved successfully.".to_string(),
            NoticeVariant::Default,
        )
    }

    pub fn save_failed() -> Self {
        Self::new(
            NoticeKind::SaveFailed,
            "Save Failed",
            "Could not save your test result.".to_string(),
            NoticeVariant::Destructive,
        )
    }
}
