/// LLM Client — the single point of entry for all remote generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the LLM API directly.
/// All LLM interactions MUST go through this module.
///
/// Two interaction modes are supported, selected per artifact:
/// - stateless: one chat-completions request, one reply text
/// - stateful: thread → message → assistant run → poll → latest reply text
///
/// The client moves text, not meaning — reply parsing lives in `normalize`.
use std::future::Future;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

pub mod normalize;
pub mod prompts;
pub mod retry;

use crate::config::Config;
use self::normalize::NormalizeError;
use self::retry::{PollBudget, RetryPolicy};

const API_BASE_URL: &str = "https://api.openai.com/v1";
const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";
/// The model used for all stateless calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4096;

/// Everything that can go wrong between "generate" and a typed result.
/// Converted to a single user-facing message at the orchestration boundary.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing configuration: {0}")]
    Configuration(String),

    #[error("request failed after {attempts} attempts: {last}")]
    Network { attempts: u32, last: String },

    #[error("run did not reach a terminal state within {polls} polls")]
    Timeout { polls: u32 },

    #[error("run failed upstream: {reason}")]
    RunFailed { reason: String },

    #[error("reply carried no text content")]
    EmptyReply,

    #[error("could not recover JSON from reply: {0}")]
    Malformed(#[from] NormalizeError),

    #[error("reply JSON missing required structure: {}", violations.join("; "))]
    Schema { violations: Vec<String> },
}

impl GenerationError {
    /// The single message shown to the user for this failure class.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::Configuration(_) => {
                "The generation service is not configured. Please contact support."
            }
            GenerationError::Network { .. }
            | GenerationError::Timeout { .. }
            | GenerationError::RunFailed { .. } => {
                "We could not reach the generation service. Please try again."
            }
            GenerationError::EmptyReply
            | GenerationError::Malformed(_)
            | GenerationError::Schema { .. } => {
                "We had trouble processing the generated content. Please try again."
            }
        }
    }

    /// Configuration problems are not worth retrying; everything else is —
    /// a fresh call may produce a clean reply even when the last one did not.
    pub fn is_retry_eligible(&self) -> bool {
        !matches!(self, GenerationError::Configuration(_))
    }
}

/// The seam between the generation pipeline and the remote API.
/// Tests swap in scripted backends; production uses `LlmClient`.
///
/// Carried in `AppState` as `Arc<dyn GenerationBackend>`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Stateless mode: one system + user instruction, one reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerationError>;

    /// Stateful mode: post the instruction into a fresh conversation, run the
    /// configured assistant, poll to a terminal state, return the reply text.
    async fn converse(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[allow(dead_code)]
    id: String,
}

/// Terminal and transient states of a remote assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct RunSnapshot {
    pub id: String,
    pub status: RunStatus,
    pub last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
pub struct RunError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production `GenerationBackend` over the remote HTTP API.
/// Credentials come from server-side configuration only.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    org_id: Option<String>,
    assistant_id: Option<String>,
    retry: RetryPolicy,
    poll: PollBudget,
}

impl LlmClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: config.llm_api_key.clone(),
            org_id: config.llm_org_id.clone(),
            assistant_id: config.assistant_id.clone(),
            retry: RetryPolicy::default(),
            poll: PollBudget::default(),
        }
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Configuration("LLM_API_KEY is not set".to_string())
        })
    }

    fn assistant_id(&self) -> Result<&str, GenerationError> {
        self.assistant_id.as_deref().ok_or_else(|| {
            GenerationError::Configuration("LLM_ASSISTANT_ID is not set".to_string())
        })
    }

    /// One retried HTTP round trip. A transport error or non-success status
    /// counts as a failed attempt; exhaustion becomes `Network`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, GenerationError> {
        let api_key = self.api_key()?;
        let url = format!("{API_BASE_URL}{path}");

        self.retry
            .run(path, || {
                let mut request = self
                    .client
                    .request(method.clone(), &url)
                    .bearer_auth(api_key)
                    .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
                    .header("content-type", "application/json");
                if let Some(org) = &self.org_id {
                    request = request.header("OpenAI-Organization", org);
                }
                if let Some(body) = &body {
                    request = request.json(body);
                }

                async move {
                    let response = request.send().await.map_err(|e| e.to_string())?;
                    let status = response.status();

                    if !status.is_success() {
                        let text = response.text().await.unwrap_or_default();
                        let message = serde_json::from_str::<ApiError>(&text)
                            .map(|e| e.error.message)
                            .unwrap_or(text);
                        return Err(format!("status {status}: {message}"));
                    }

                    response.json::<T>().await.map_err(|e| e.to_string())
                }
            })
            .await
            .map_err(|e| GenerationError::Network {
                attempts: e.attempts,
                last: e.last,
            })
    }
}

#[async_trait]
impl GenerationBackend for LlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        let body = json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
        });

        let response: ChatResponse = self
            .send_json(Method::POST, "/chat/completions", Some(body))
            .await?;

        debug!("stateless completion returned {} choice(s)", response.choices.len());

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyReply)
    }

    async fn converse(&self, prompt: &str) -> Result<String, GenerationError> {
        let assistant_id = self.assistant_id()?.to_string();

        let thread: ThreadResponse = self
            .send_json(Method::POST, "/threads", Some(json!({})))
            .await?;

        let _posted: MessageResponse = self
            .send_json(
                Method::POST,
                &format!("/threads/{}/messages", thread.id),
                Some(json!({"role": "user", "content": prompt})),
            )
            .await?;

        let run: RunSnapshot = self
            .send_json(
                Method::POST,
                &format!("/threads/{}/runs", thread.id),
                Some(json!({"assistant_id": assistant_id})),
            )
            .await?;

        debug!("run {} started on thread {}", run.id, thread.id);

        let status_path = format!("/threads/{}/runs/{}", thread.id, run.id);
        poll_run(self.poll, || {
            self.send_json::<RunSnapshot>(Method::GET, &status_path, None)
        })
        .await?;

        let messages: MessageList = self
            .send_json(
                Method::GET,
                &format!("/threads/{}/messages", thread.id),
                None,
            )
            .await?;

        // Messages arrive most recent first.
        messages
            .data
            .into_iter()
            .find(|m| m.role == "assistant")
            .and_then(|m| m.content.into_iter().find_map(|c| c.text))
            .map(|t| t.value)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyReply)
    }
}

/// Polls `fetch` until the run reaches a terminal state or the budget is
/// spent. A `failed` (or cancelled/expired) run is immediately fatal — no
/// further polling.
async fn poll_run<F, Fut>(budget: PollBudget, mut fetch: F) -> Result<RunSnapshot, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RunSnapshot, GenerationError>>,
{
    for _ in 0..budget.max_polls {
        let run = fetch().await?;

        match run.status {
            RunStatus::Completed => return Ok(run),
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired => {
                let reason = run
                    .last_error
                    .map(|e| e.message)
                    .unwrap_or_else(|| format!("run ended with status {:?}", run.status));
                return Err(GenerationError::RunFailed { reason });
            }
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Unknown => {}
        }

        tokio::time::sleep(budget.interval).await;
    }

    Err(GenerationError::Timeout {
        polls: budget.max_polls,
    })
}
