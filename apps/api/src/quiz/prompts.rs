// All LLM prompt constants for the Quiz module.

/// Appended to the question-set system prompt.
const JSON_ONLY_RULES: &str = "Respond with the JSON object only. \
    No markdown fences, no commentary before or after it.";

/// System prompt for question-set generation. Replace `{domain_label}` and `{count}`.
pub const QUESTION_SET_SYSTEM_TEMPLATE: &str = r#"You are an expert technical interviewer. Generate exactly {count} interview questions for {domain_label} positions.

Return a JSON object with this EXACT structure:
{
  "questions": [
    {
      "id": "q1",
      "question": "Question text here?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "keywords": ["keyword1", "keyword2", "keyword3"],
      "difficulty": "easy"
    }
  ]
}

Requirements:
- Generate exactly {count} questions
- Mix difficulties: mostly easy, at least one medium and one hard
- Each question must have exactly 4 options
- correctAnswer is 0-3 (index of the correct option)
- Include 3-5 relevant keywords for each question; keywords should appear in the correct option where natural
- Questions should be industry-relevant and interview-focused
- Vary question types (conceptual, practical, best practices)"#;

/// User prompt for question-set generation. Replace `{domain_label}` and `{count}`.
pub const QUESTION_SET_PROMPT_TEMPLATE: &str =
    "Generate {count} interview questions for a {domain_label} position. Return only valid JSON.";

/// System prompt for answer explanations. Replace `{domain_label}`.
pub const EXPLANATION_SYSTEM_TEMPLATE: &str = "You are an expert technical interviewer for {domain_label} positions. \
    Provide clear, concise explanations for interview questions. \
    Keep your response focused and interview-ready: something a candidate could quickly understand and remember. \
    Start with the key concept, then explain why it matters, and optionally mention a real-world use case. \
    Maximum 3-4 sentences. Plain text only.";

/// Explanation prompt. Replace `{question}` and `{correct_option}`.
pub const EXPLANATION_PROMPT_TEMPLATE: &str = "Explain why this is the correct answer for an interview question:

Question: {question}
Correct Answer: {correct_option}

Provide a clear, interview-focused explanation.";

pub fn question_set_system(domain_label: &str, count: usize) -> String {
    format!(
        "{}\n\n{}",
        QUESTION_SET_SYSTEM_TEMPLATE
            .replace("{domain_label}", domain_label)
            .replace("{count}", &count.to_string()),
        JSON_ONLY_RULES
    )
}

pub fn question_set_prompt(domain_label: &str, count: usize) -> String {
    QUESTION_SET_PROMPT_TEMPLATE
        .replace("{domain_label}", domain_label)
        .replace("{count}", &count.to_string())
}

pub fn explanation_system(domain_label: &str) -> String {
    EXPLANATION_SYSTEM_TEMPLATE.replace("{domain_label}", domain_label)
}

pub fn explanation_prompt(question: &str, correct_option: &str) -> String {
    EXPLANATION_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{correct_option}", correct_option)
}
