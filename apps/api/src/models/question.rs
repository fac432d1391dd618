use serde::{Deserialize, Serialize};

/// Difficulty tier of a generated question. Drives the minimum think time
/// applied by the quick-answer heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse of the generator's difficulty label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// A normalized multiple-choice question. Immutable for the lifetime of the
/// session that fetched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    /// Index into `options`, always < OPTION_COUNT.
    pub correct_answer: u8,
    pub keywords: Vec<String>,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer as usize]
    }

    pub fn is_correct(&self, index: u8) -> bool {
        index == self.correct_answer
    }

    /// True when any keyword appears (case-insensitive substring) in the text
    /// of the option at `index`. Out-of-range indices never match.
    pub fn option_mentions_keyword(&self, index: usize) -> bool {
        let Some(option) = self.option(index) else {
            return false;
        };
        let option_lower = option.to_lowercase();
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .any(|k| option_lower.contains(&k))
    }
}
