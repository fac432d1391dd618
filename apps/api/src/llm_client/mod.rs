//! Claude client for the quiz: question sets and answer explanations.
//!
//! Each call names its [`Purpose`], which picks the token budget and tags the
//! logs. Transient failures (429, 5xx, transport errors) are retried with
//! doubling backoff; everything else fails fast.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const ATTEMPTS: u32 = 3;
const FIRST_BACKOFF: Duration = Duration::from_millis(750);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    QuestionSet,
    Explanation,
}

impl Purpose {
    fn max_tokens(self) -> u32 {
        match self {
            Purpose::QuestionSet => 2048,
            // three or four sentences
            Purpose::Explanation => 400,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Purpose::QuestionSet => "question_set",
            Purpose::Explanation => "explanation",
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response has no text")]
    EmptyContent,

    #[error("gave up after {attempts} attempts: {last}")]
    GaveUp {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl MessagesResponse {
    /// Trimmed text of the first non-empty text block.
    fn into_text(self) -> Result<String, LlmError> {
        self.content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Outcome of a single HTTP round trip.
enum Attempt {
    Done(MessagesResponse),
    Transient(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Sends one user prompt and returns the model's text.
    pub async fn call(
        &self,
        purpose: Purpose,
        prompt: &str,
        system: &str,
    ) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: purpose.max_tokens(),
            system,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request).await? {
                Attempt::Done(response) => {
                    debug!(
                        purpose = purpose.as_str(),
                        attempt,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "LLM call succeeded"
                    );
                    return response.into_text();
                }
                Attempt::Transient(err) if attempt < ATTEMPTS => {
                    let delay = backoff(attempt);
                    warn!(
                        purpose = purpose.as_str(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "LLM call failed, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Attempt::Transient(err) => {
                    return Err(LlmError::GaveUp {
                        attempts: attempt,
                        last: Box::new(err),
                    })
                }
            }
        }
    }

    /// Like [`call`](Self::call), then parses the text as JSON (fences tolerated).
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        purpose: Purpose,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = self.call(purpose, prompt, system).await?;
        Ok(serde_json::from_str(strip_json_fences(&text))?)
    }

    async fn send_once(&self, request: &MessagesRequest<'_>) -> Result<Attempt, LlmError> {
        let response = match self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Attempt::Transient(LlmError::Http(e))),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(Attempt::Done(response.json().await?));
        }

        let body = response.text().await.unwrap_or_default();
        let error = LlmError::Api {
            status: status.as_u16(),
            message: error_message(body),
        };
        if is_transient(status) {
            Ok(Attempt::Transient(error))
        } else {
            Err(error)
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retrying after failed attempt `attempt` (1-based).
fn backoff(attempt: u32) -> Duration {
    FIRST_BACKOFF * 2u32.pow(attempt.saturating_sub(1))
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body)
}

/// Models sometimes wrap JSON in a ```json fence despite the instructions.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
