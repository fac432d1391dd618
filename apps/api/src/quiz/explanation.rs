//! Answer explanations. Failures never reach the session: the service swaps
//! in [`FALLBACK_EXPLANATION`] and raises a non-blocking notice.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::{LlmClient, Purpose};
use crate::quiz::prompts;

pub const FALLBACK_EXPLANATION: &str = "Unable to generate explanation at this time. \
The correct answer is based on industry-standard knowledge and best practices in this domain.";

#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    async fn explain(
        &self,
        question: &str,
        correct_option: &str,
        domain_label: &str,
    ) -> Result<String, AppError>;
}

pub struct LlmExplanationGenerator {
    llm: LlmClient,
}

impl LlmExplanationGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ExplanationGenerator for LlmExplanationGenerator {
    async fn explain(
        &self,
        question: &str,
        correct_option: &str,
        domain_label: &str,
    ) -> Result<String, AppError> {
        let system = prompts::explanation_system(domain_label);
        let prompt = prompts::explanation_prompt(question, correct_option);

        self.llm
            .call(Purpose::Explanation, &prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Explanation failed: {e}")))
    }
}
