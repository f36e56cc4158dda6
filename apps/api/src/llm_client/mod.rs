/// LLM client: the single point of entry for all completion-oracle calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All oracle interactions MUST go through `CompletionOracle`.
///
/// Requests are sent once. There is no retry loop and no client-side timeout
/// beyond the HTTP client's defaults; callers that need resilience wrap the
/// pipeline themselves.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod budget;
pub mod prompts;

use budget::{plan_token_budget, TokenBudget};
use prompts::PromptPayload;

/// Credentials and endpoint for the oracle. Owned by the client; there is
/// no process-wide key.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Oracle returned no completion choices")]
    EmptyChoices,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

/// Token usage as reported by the oracle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OracleErrorEnvelope {
    error: OracleErrorBody,
}

#[derive(Debug, Deserialize)]
struct OracleErrorBody {
    message: String,
}

/// Text of the first completion choice plus request metadata.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    /// First choice, surrounding whitespace trimmed.
    pub text: String,
    pub engine: String,
    pub budget: TokenBudget,
    pub usage: Option<Usage>,
}

impl CompletionResult {
    /// True when the requested output budget did not fit the answer window.
    pub fn budget_clamped(&self) -> bool {
        self.budget.clamped
    }
}

/// A text-completion oracle. Implement this to swap backends (or stub the
/// oracle in tests) without touching the pipeline.
///
/// Carried in the pipeline as `Arc<dyn CompletionOracle>`.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, payload: &PromptPayload) -> Result<CompletionResult, CompletionError>;
}

/// OpenAI-compatible client for the legacy `/completions` endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: OracleConfig,
}

impl LlmClient {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionOracle for LlmClient {
    async fn complete(&self, payload: &PromptPayload) -> Result<CompletionResult, CompletionError> {
        let params = payload.params();
        info!("query_completion: using {}", params.engine);

        let budget = plan_token_budget(payload.prompt(), params.max_tokens);
        info!(
            "estimated prompt tokens: {}",
            budget.estimated_prompt_tokens
        );

        let request_body = CompletionRequest {
            model: &params.engine,
            prompt: payload.prompt(),
            temperature: params.temperature,
            max_tokens: budget.effective_max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<OracleErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or(CompletionError::EmptyChoices)?;

        Ok(CompletionResult {
            text,
            engine: params.engine.clone(),
            budget,
            usage: completion.usage,
        })
    }
}
