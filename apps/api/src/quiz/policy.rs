//! Anti-gaming policy: the quick-answer heuristic and the two session-level
//! abuse counters (quick answers, tab switches) with their restart limits.
//!
//! Counters span the whole attempt, not a single question. They are plain
//! fields of the session record and reset only through start, forced restart
//! and retry.

use std::time::Duration;

use serde::Serialize;

use crate::models::question::{Difficulty, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizPolicy {
    pub easy_min_think: Duration,
    pub medium_min_think: Duration,
    pub hard_min_think: Duration,
    /// Rejected quick answers that force a restart.
    pub quick_answer_limit: u32,
    /// Hidden-page events during a test that force a restart.
    pub tab_switch_limit: u32,
}

impl Default for QuizPolicy {
    fn default() -> Self {
        Self {
            easy_min_think: Duration::from_millis(2000),
            medium_min_think: Duration::from_millis(3000),
            hard_min_think: Duration::from_millis(5000),
            quick_answer_limit: 3,
            tab_switch_limit: 2,
        }
    }
}

impl QuizPolicy {
    pub fn min_think_time(&self, difficulty: Difficulty) -> Duration {
        match difficulty {
            Difficulty::Easy => self.easy_min_think,
            Difficulty::Medium => self.medium_min_think,
            Difficulty::Hard => self.hard_min_think,
        }
    }

    /// An answer is "quick" when it arrives before the difficulty's minimum
    /// think time and the chosen option shows no keyword evidence.
    pub fn is_quick_answer(&self, question: &Question, selected: usize, elapsed: Duration) -> bool {
        elapsed < self.min_think_time(question.difficulty)
            && !question.option_mentions_keyword(selected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartReason {
    QuickAnswers,
    TabSwitches,
}

/// What the session must do after an abuse signal was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Warn { count: u32, limit: u32 },
    Restart { reason: RestartReason },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AbuseCounters {
    pub quick_answers: u32,
    pub tab_switches: u32,
}

impl AbuseCounters {
    pub fn record_quick_answer(&mut self, policy: &QuizPolicy) -> Verdict {
        self.quick_answers += 1;
        if self.quick_answers >= policy.quick_answer_limit {
            Verdict::Restart {
                reason: RestartReason::QuickAnswers,
            }
        } else {
            Verdict::Warn {
                count: self.quick_answers,
                limit: policy.quick_answer_limit,
            }
        }
    }

    pub fn record_tab_switch(&mut self, policy: &QuizPolicy) -> Verdict {
        self.tab_switches += 1;
        if self.tab_switches >= policy.tab_switch_limit {
            Verdict::Restart {
                reason: RestartReason::TabSwitches,
            }
        } else {
            Verdict::Warn {
                count: self.tab_switches,
                limit: policy.tab_switch_limit,
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
