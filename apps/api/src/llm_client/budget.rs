//! Token budgeting for completion requests.
//!
//! The prompt size is approximated as `word_count × 1.6`. This is a rough
//! stand-in for subword tokenization and can drift from the model's real
//! count in either direction, so the numbers here are advisory: staying
//! inside the budget does not guarantee the completion is not truncated.

use tracing::warn;

/// Hard context limit of the completion model (prompt + answer).
pub const MODEL_CONTEXT_LIMIT: i64 = 4096;
/// Window the answer is expected to fit in once the prompt is accounted for.
pub const ANSWER_TOKEN_WINDOW: i64 = 2049;
/// Estimated tokens per whitespace-separated word.
pub const TOKENS_PER_WORD: f64 = 1.6;

/// Outcome of budgeting a single prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    pub estimated_prompt_tokens: u32,
    /// `ANSWER_TOKEN_WINDOW - estimated_prompt_tokens`; negative for oversized prompts.
    pub estimated_answer_tokens: i64,
    /// The `max_tokens` actually sent to the oracle.
    pub effective_max_tokens: u32,
    /// True when the answer window was smaller than the requested max tokens.
    pub clamped: bool,
}

pub fn estimate_prompt_tokens(prompt: &str) -> u32 {
    let words = prompt.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD) as u32
}

/// Computes the effective `max_tokens` for `prompt`.
///
/// Emits a warning when the answer window cannot hold `requested_max_tokens`.
/// The value sent is always `min(MODEL_CONTEXT_LIMIT - p, requested)`, floored at zero.
pub fn plan_token_budget(prompt: &str, requested_max_tokens: u32) -> TokenBudget {
    let estimated_prompt_tokens = estimate_prompt_tokens(prompt);
    let prompt_tokens = i64::from(estimated_prompt_tokens);
    let estimated_answer_tokens = ANSWER_TOKEN_WINDOW - prompt_tokens;
    let requested = i64::from(requested_max_tokens);

    let effective = (MODEL_CONTEXT_LIMIT - prompt_tokens).min(requested).max(0) as u32;

    let clamped = estimated_answer_tokens < requested;
    if clamped {
        warn!(
            "estimated_answer_tokens ({}) lower than max_tokens ({}), changing max_tokens to {}",
            estimated_answer_tokens, requested_max_tokens, effective
        );
    }

    TokenBudget {
        estimated_prompt_tokens,
        estimated_answer_tokens,
        effective_max_tokens: effective,
        clamped,
    }
}
