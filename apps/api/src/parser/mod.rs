// Resume parsing pipeline: PDF text -> prompt -> completion -> record.
// Each stage finishes before the next starts. All oracle calls go through
// llm_client; nothing here talks to the network directly.

pub mod extract;
pub mod prompts;
pub mod record;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::prompts::GenerationParams;
use crate::llm_client::{CompletionError, CompletionOracle};
use crate::models::resume::ParsedResume;
use extract::{extract_text, DocumentReadError, NormalizedText};
use prompts::build_resume_prompt;
use record::parse_record;

/// Failures that abort parsing of one document. Record decode failures are
/// not here: they degrade to an empty record instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    DocumentRead(#[from] DocumentReadError),

    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Runs resumes through the oracle. Holds no per-document state, so one
/// instance can serve concurrent requests for independent documents.
pub struct ResumeParser {
    oracle: Arc<dyn CompletionOracle>,
    params: GenerationParams,
}

impl ResumeParser {
    pub fn new(oracle: Arc<dyn CompletionOracle>, params: GenerationParams) -> Self {
        Self { oracle, params }
    }

    /// Parses the PDF at `path`.
    ///
    /// Extraction runs on a blocking worker; a panic inside the PDF library
    /// is reported as `DocumentReadError::Aborted` for this document only.
    pub async fn query_resume(&self, path: &Path) -> Result<ParsedResume, PipelineError> {
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || extract_text(&owned))
            .await
            .map_err(|e| {
                warn!("extraction worker failed for {}: {e}", path.display());
                DocumentReadError::Aborted {
                    path: path.to_path_buf(),
                }
            })??;

        self.parse_text(&text).await
    }

    /// Prompt, complete and decode already-normalized text.
    pub async fn parse_text(&self, text: &NormalizedText) -> Result<ParsedResume, PipelineError> {
        let payload = build_resume_prompt(text, self.params.clone());
        let completion = self.oracle.complete(&payload).await?;
        info!(
            "completion received from {} ({} chars)",
            completion.engine,
            completion.text.len()
        );
        if let Some(usage) = &completion.usage {
            debug!(
                "oracle usage: prompt_tokens={}, completion_tokens={}, total_tokens={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        if completion.budget_clamped() {
            warn!(
                "answer window was {} tokens; the record may be truncated",
                completion.budget.estimated_answer_tokens
            );
        }

        Ok(parse_record(&completion.text))
    }
}
