//! Session Controller: the mock-interview test state machine.
//!
//! Lifecycle: `Idle → Loading → Testing → Completed`, plus the restart edge
//! (forced by the anti-gaming policy or requested via retry) back to `Idle`.
//!
//! The controller is synchronous. Async collaborators (question generation,
//! explanations) are driven by the service through tickets: `begin_*` hands
//! out a ticket stamped with the session epoch, the service awaits the
//! collaborator without holding the session, and `finish_*`/`apply_*` only
//! take effect if the epoch still matches. Every reset bumps the epoch, so a
//! response that lands after a retry is dropped.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::question::{Question, OPTION_COUNT};
use crate::models::result::{TestResult, TestSummary};
use crate::quiz::catalog::{domain_label, find_domain};
use crate::quiz::notice::Notice;
use crate::quiz::policy::{AbuseCounters, QuizPolicy, RestartReason, Verdict};
use crate::quiz::timer::{as_millis, ResponseTimer};
use crate::quiz::view::{ExplanationView, QuestionView, SessionView};

/// Number of questions requested from the generator per test.
pub const QUESTION_SET_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Testing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot {operation} while the session is {phase:?}: {reason}")]
    InvalidOperation {
        operation: &'static str,
        phase: Phase,
        reason: &'static str,
    },

    #[error("Unknown interview domain '{0}'")]
    UnknownDomain(String),

    #[error("Answer index {0} is out of range (expected 0-3)")]
    AnswerOutOfRange(i64),
}

/// Signals coming from the hosting page. Only observed while testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentEvent {
    VisibilityHidden,
    NavigateBack,
    Unload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
    pub domain: String,
    pub domain_label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationTicket {
    epoch: u64,
    question_index: usize,
    pub question: String,
    pub correct_option: String,
    pub domain_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started(Notice),
    Failed(Notice),
    /// The session was reset while the fetch was in flight.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerCheck {
    AwaitingConfirmation { selected: u8 },
    Warned(Notice),
    Restarted(Notice),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub selected_answer: u8,
    pub correct_answer: u8,
    pub correct_option: String,
    pub response_time_ms: u64,
}

/// Produced exactly once, on the `Testing → Completed` transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedTest {
    pub session_id: Uuid,
    pub owner: Option<Uuid>,
    pub summary: TestSummary,
    pub results: Vec<TestResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next { index: usize },
    Completed(CompletedTest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExplanationStep {
    Fetch(ExplanationTicket),
    /// Another request is already fetching this explanation.
    InFlight,
    Cached { text: String, visible: bool },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvironmentOutcome {
    /// The hosting page must block the navigation/unload.
    pub blocked: bool,
    pub restarted: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
enum Explanation {
    NotRequested,
    Loading,
    Ready(String),
}

/// Per-question state. Replaced wholesale on advance; dropping it releases the timer.
#[derive(Debug)]
struct ActiveQuestion {
    timer: ResponseTimer,
    selected: Option<u8>,
    answered: bool,
    is_correct: Option<bool>,
    warning_open: bool,
    warned: bool,
    explanation: Explanation,
    explanation_visible: bool,
}

impl ActiveQuestion {
    fn start() -> Self {
        Self {
            timer: ResponseTimer::start(),
            selected: None,
            answered: false,
            is_correct: None,
            warning_open: false,
            warned: false,
            explanation: Explanation::NotRequested,
            explanation_visible: false,
        }
    }
}

#[derive(Debug)]
pub struct SessionController {
    id: Uuid,
    owner: Option<Uuid>,
    policy: QuizPolicy,
    phase: Phase,
    domain: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    results: Vec<TestResult>,
    counters: AbuseCounters,
    active: Option<ActiveQuestion>,
    epoch: u64,
}

impl SessionController {
    pub fn new(id: Uuid, owner: Option<Uuid>, policy: QuizPolicy) -> Self {
        Self {
            id,
            owner,
            policy,
            phase: Phase::Idle,
            domain: None,
            questions: Vec::new(),
            current_index: 0,
            results: Vec::new(),
            counters: AbuseCounters::default(),
            active: None,
            epoch: 0,
        }
    }

    /// The navigation guard is subscribed only while a test is running.
    pub fn navigation_guard_active(&self) -> bool {
        self.phase == Phase::Testing
    }

    pub fn domain_label(&self) -> Option<String> {
        self.domain.as_deref().map(domain_label)
    }

    pub fn summary(&self) -> TestSummary {
        TestSummary::from_results(
            &self.domain_label().unwrap_or_default(),
            &self.results,
        )
    }

    fn invalid(&self, operation: &'static str, reason: &'static str) -> SessionError {
        SessionError::InvalidOperation {
            operation,
            phase: self.phase,
            reason,
        }
    }

    fn require_phase(&self, operation: &'static str, phase: Phase) -> Result<(), SessionError> {
        if self.phase != phase {
            return Err(self.invalid(operation, "wrong phase"));
        }
        Ok(())
    }

    fn active_mut(&mut self, operation: &'static str) -> Result<&mut ActiveQuestion, SessionError> {
        self.require_phase(operation, Phase::Testing)?;
        let phase = self.phase;
        self.active.as_mut().ok_or(SessionError::InvalidOperation {
            operation,
            phase,
            reason: "no active question",
        })
    }

    // ── Domain selection & start ────────────────────────────────────────────

    pub fn select_domain(&mut self, domain: &str) -> Result<(), SessionError> {
        self.require_phase("select a domain", Phase::Idle)?;
        let entry = find_domain(domain).ok_or_else(|| SessionError::UnknownDomain(domain.to_string()))?;
        self.domain = Some(entry.domain.to_string());
        debug!(session_id = %self.id, domain = entry.domain, "Domain selected");
        Ok(())
    }

    pub fn begin_test(&mut self) -> Result<LoadTicket, SessionError> {
        match self.phase {
            Phase::Idle => {}
            Phase::Loading => {
                return Err(self.invalid("start the test", "question generation already in flight"))
            }
            _ => return Err(self.invalid("start the test", "wrong phase")),
        }
        let domain = self
            .domain
            .clone()
            .ok_or_else(|| self.invalid("start the test", "no domain selected"))?;

        self.phase = Phase::Loading;
        info!(session_id = %self.id, %domain, "Requesting question set");

        Ok(LoadTicket {
            epoch: self.epoch,
            domain_label: domain_label(&domain),
            domain,
            count: QUESTION_SET_SIZE,
        })
    }

    fn ticket_is_current(&self, epoch: u64, expected: Phase) -> bool {
        self.epoch == epoch && self.phase == expected
    }

    pub fn finish_test(&mut self, ticket: &LoadTicket, questions: Vec<Question>) -> StartOutcome {
        if !self.ticket_is_current(ticket.epoch, Phase::Loading) {
            debug!(session_id = %self.id, "Dropping stale question set");
            return StartOutcome::Stale;
        }
        if questions.is_empty() {
            return self.fail_test(ticket, "generator returned no questions");
        }

        self.questions = questions;
        self.current_index = 0;
        self.results.clear();
        self.counters.reset();
        self.active = Some(ActiveQuestion::start());
        self.phase = Phase::Testing;

        info!(
            session_id = %self.id,
            domain = %ticket.domain,
            questions = self.questions.len(),
            "Test started"
        );
        StartOutcome::Started(Notice::test_started(&ticket.domain_label, self.questions.len()))
    }

    pub fn fail_test(&mut self, ticket: &LoadTicket, reason: &str) -> StartOutcome {
        if !self.ticket_is_current(ticket.epoch, Phase::Loading) {
            debug!(session_id = %self.id, "Dropping stale generation failure");
            return StartOutcome::Stale;
        }
        self.phase = Phase::Idle;
        warn!(session_id = %self.id, domain = %ticket.domain, %reason, "Question generation failed");
        StartOutcome::Failed(Notice::generation_failed())
    }

    // ── Answering ───────────────────────────────────────────────────────────

    pub fn select_answer(&mut self, index: usize) -> Result<AnswerCheck, SessionError> {
        const OP: &str = "select an answer";
        let session_id = self.id;
        let policy = self.policy;
        let question = self
            .questions
            .get(self.current_index)
            .cloned()
            .ok_or(SessionError::InvalidOperation {
                operation: OP,
                phase: self.phase,
                reason: "no active question",
            })?;

        let active = self.active_mut(OP)?;
        if active.answered {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "question already answered",
            });
        }
        if active.warning_open {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "acknowledge the warning first",
            });
        }
        if index >= OPTION_COUNT {
            return Err(SessionError::AnswerOutOfRange(index as i64));
        }

        let elapsed = active.timer.elapsed();
        if !policy.is_quick_answer(&question, index, elapsed) {
            active.selected = Some(index as u8);
            return Ok(AnswerCheck::AwaitingConfirmation {
                selected: index as u8,
            });
        }

        match self.counters.record_quick_answer(&policy) {
            Verdict::Warn { count, limit } => {
                if let Some(active) = self.active.as_mut() {
                    active.selected = None;
                    active.warning_open = true;
                    active.warned = true;
                }
                warn!(
                    %session_id,
                    question_id = %question.id,
                    elapsed_ms = as_millis(elapsed),
                    count,
                    "Quick answer rejected"
                );
                Ok(AnswerCheck::Warned(Notice::quick_answer_warning(count, limit)))
            }
            Verdict::Restart { reason } => Ok(AnswerCheck::Restarted(self.force_restart(reason))),
        }
    }

    pub fn cancel_confirmation(&mut self) -> Result<(), SessionError> {
        const OP: &str = "cancel the confirmation";
        let active = self.active_mut(OP)?;
        if active.answered || active.selected.is_none() {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "no answer awaiting confirmation",
            });
        }
        active.selected = None;
        Ok(())
    }

    pub fn acknowledge_warning(&mut self) -> Result<(), SessionError> {
        const OP: &str = "acknowledge the warning";
        let active = self.active_mut(OP)?;
        if !active.warning_open {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "no warning is open",
            });
        }
        active.warning_open = false;
        Ok(())
    }

    pub fn confirm_answer(&mut self) -> Result<AnswerFeedback, SessionError> {
        const OP: &str = "confirm the answer";
        let question = self
            .questions
            .get(self.current_index)
            .cloned()
            .ok_or(SessionError::InvalidOperation {
                operation: OP,
                phase: self.phase,
                reason: "no active question",
            })?;
        let active = self.active_mut(OP)?;
        if active.answered {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "answer already confirmed",
            });
        }
        let selected = active.selected.ok_or(SessionError::InvalidOperation {
            operation: OP,
            phase: Phase::Testing,
            reason: "no answer selected",
        })?;

        let correct_answer = question.correct_answer;
        let is_correct = question.is_correct(selected);
        let response_time_ms = as_millis(active.timer.stop());
        let was_warned = active.warned;
        active.answered = true;
        active.is_correct = Some(is_correct);

        self.results.push(TestResult {
            question_id: question.id.clone(),
            selected_answer: selected,
            is_correct,
            response_time_ms,
            was_warned,
        });

        info!(
            session_id = %self.id,
            question_id = %question.id,
            is_correct,
            response_time_ms,
            was_warned,
            "Answer confirmed"
        );

        Ok(AnswerFeedback {
            is_correct,
            selected_answer: selected,
            correct_answer,
            correct_option: question.correct_option().to_string(),
            response_time_ms,
        })
    }

    pub fn next_question(&mut self) -> Result<Advance, SessionError> {
        const OP: &str = "advance";
        let active = self.active_mut(OP)?;
        if !active.answered {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "current answer not confirmed",
            });
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.active = Some(ActiveQuestion::start());
            return Ok(Advance::Next {
                index: self.current_index,
            });
        }

        self.active = None;
        self.phase = Phase::Completed;
        let summary = self.summary();
        info!(
            session_id = %self.id,
            correct = summary.correct_answers,
            total = summary.total_questions,
            level = %summary.performance_level,
            "Test completed"
        );

        Ok(Advance::Completed(CompletedTest {
            session_id: self.id,
            owner: self.owner,
            summary,
            results: self.results.clone(),
        }))
    }

    // ── Explanations ────────────────────────────────────────────────────────

    pub fn begin_explanation(&mut self) -> Result<ExplanationStep, SessionError> {
        const OP: &str = "request an explanation";
        let epoch = self.epoch;
        let question_index = self.current_index;
        let label = self.domain_label().unwrap_or_default();
        let question = self.questions.get(question_index).cloned();

        let active = self.active_mut(OP)?;
        if !active.answered {
            return Err(SessionError::InvalidOperation {
                operation: OP,
                phase: Phase::Testing,
                reason: "question not answered yet",
            });
        }

        match &active.explanation {
            Explanation::Ready(text) => {
                active.explanation_visible = !active.explanation_visible;
                Ok(ExplanationStep::Cached {
                    text: text.clone(),
                    visible: active.explanation_visible,
                })
            }
            Explanation::Loading => Ok(ExplanationStep::InFlight),
            Explanation::NotRequested => {
                let question = question.ok_or(SessionError::InvalidOperation {
                    operation: OP,
                    phase: Phase::Testing,
                    reason: "no active question",
                })?;
                active.explanation = Explanation::Loading;
                active.explanation_visible = true;
                Ok(ExplanationStep::Fetch(ExplanationTicket {
                    epoch,
                    question_index,
                    correct_option: question.correct_option().to_string(),
                    question: question.question,
                    domain_label: label,
                }))
            }
        }
    }

    /// Caches a fetched (or fallback) explanation. Returns false when the
    /// ticket is stale and nothing was applied.
    pub fn apply_explanation(&mut self, ticket: &ExplanationTicket, text: String) -> bool {
        if !self.ticket_is_current(ticket.epoch, Phase::Testing)
            || self.current_index != ticket.question_index
        {
            debug!(session_id = %self.id, "Dropping stale explanation");
            return false;
        }
        match self.active.as_mut() {
            Some(active) if active.explanation == Explanation::Loading => {
                active.explanation = Explanation::Ready(text);
                true
            }
            _ => false,
        }
    }

    // ── Environment & resets ────────────────────────────────────────────────

    pub fn handle_environment(&mut self, event: EnvironmentEvent) -> EnvironmentOutcome {
        if self.phase != Phase::Testing {
            return EnvironmentOutcome::default();
        }

        match event {
            EnvironmentEvent::VisibilityHidden => match self.counters.record_tab_switch(&self.policy) {
                Verdict::Warn { count, limit } => {
                    warn!(session_id = %self.id, count, "Tab switch during test");
                    EnvironmentOutcome {
                        blocked: false,
                        restarted: false,
                        notice: Some(Notice::tab_switch_warning(count, limit)),
                    }
                }
                Verdict::Restart { reason } => EnvironmentOutcome {
                    blocked: false,
                    restarted: true,
                    notice: Some(self.force_restart(reason)),
                },
            },
            EnvironmentEvent::NavigateBack => EnvironmentOutcome {
                blocked: true,
                restarted: false,
                notice: Some(Notice::navigation_blocked()),
            },
            EnvironmentEvent::Unload => EnvironmentOutcome {
                blocked: true,
                restarted: false,
                notice: Some(Notice::leave_confirmation()),
            },
        }
    }

    /// User-initiated reset back to domain selection. Allowed in any phase.
    pub fn retry(&mut self) {
        info!(session_id = %self.id, from = ?self.phase, "Session reset by retry");
        self.reset_to_idle();
    }

    fn force_restart(&mut self, reason: RestartReason) -> Notice {
        warn!(session_id = %self.id, ?reason, "Forced restart");
        self.reset_to_idle();
        Notice::test_restarted(reason)
    }

    fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.domain = None;
        self.questions.clear();
        self.current_index = 0;
        self.results.clear();
        self.counters.reset();
        self.active = None;
        self.epoch += 1;
    }

    // ── View ────────────────────────────────────────────────────────────────

    pub fn view(&self) -> SessionView {
        let question = match (&self.active, self.questions.get(self.current_index)) {
            (Some(active), Some(q)) if self.phase == Phase::Testing => {
                let (status, text) = match &active.explanation {
                    Explanation::NotRequested => ("not_requested", None),
                    Explanation::Loading => ("loading", None),
                    Explanation::Ready(text) => ("ready", Some(text.clone())),
                };
                Some(QuestionView {
                    id: q.id.clone(),
                    number: self.current_index + 1,
                    total: self.questions.len(),
                    question: q.question.clone(),
                    options: q.options.to_vec(),
                    difficulty: q.difficulty,
                    selected_answer: active.selected,
                    awaiting_confirmation: active.selected.is_some() && !active.answered,
                    warning_open: active.warning_open,
                    is_answered: active.answered,
                    is_correct: active.is_correct,
                    correct_answer: active.answered.then_some(q.correct_answer),
                    elapsed_ms: active.timer.displayed_ms(),
                    explanation: ExplanationView {
                        status,
                        visible: active.explanation_visible,
                        text,
                    },
                })
            }
            _ => None,
        };

        SessionView {
            id: self.id,
            phase: self.phase,
            domain: self.domain.clone(),
            domain_label: self.domain_label(),
            navigation_guard: self.navigation_guard_active(),
            question,
            results: self.results.clone(),
            summary: (self.phase == Phase::Completed).then(|| self.summary()),
            quick_answer_count: self.counters.quick_answers,
            tab_switch_count: self.counters.tab_switches,
        }
    }
}

#[cfg(test)]
impl SessionController {
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub(crate) fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub(crate) fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub(crate) fn current_index(&self) -> usize {
        self.current_index
    }

    pub(crate) fn counters(&self) -> AbuseCounters {
        self.counters
    }
}
