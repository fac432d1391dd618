use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one confirmed answer. Created once per question and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub question_id: String,
    pub selected_answer: u8,
    pub is_correct: bool,
    pub response_time_ms: u64,
    /// The policy flagged a quick answer on this question before it was confirmed.
    pub was_warned: bool,
}

/// Coarse bucket of percent-correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceLevel {
    /// Excellent ≥ 80, Good ≥ 60, Average ≥ 40, otherwise Needs Improvement.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            PerformanceLevel::Excellent
        } else if percentage >= 60.0 {
            PerformanceLevel::Good
        } else if percentage >= 40.0 {
            PerformanceLevel::Average
        } else {
            PerformanceLevel::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Excellent => "Excellent",
            PerformanceLevel::Good => "Good",
            PerformanceLevel::Average => "Average",
            PerformanceLevel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate view of a finished test. Always derived from the result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub domain: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Mean response time in milliseconds.
    pub average_response_time: f64,
    pub performance_level: PerformanceLevel,
}

impl TestSummary {
    pub fn from_results(domain_label: &str, results: &[TestResult]) -> Self {
        let total = results.len() as u32;
        let correct = results.iter().filter(|r| r.is_correct).count() as u32;
        let total_time: u64 = results.iter().map(|r| r.response_time_ms).sum();

        let average_response_time = if total > 0 {
            total_time as f64 / total as f64
        } else {
            0.0
        };

        Self {
            domain: domain_label.to_string(),
            total_questions: total,
            correct_answers: correct,
            wrong_answers: total - correct,
            average_response_time,
            performance_level: PerformanceLevel::from_percentage(percentage(correct, total)),
        }
    }
}

fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}
