//! Record parser: turns the oracle's raw completion into a `ResumeRecord`.
//!
//! Decode failures never escape this module. They are logged and converted
//! into an empty record tagged `RECORD_PARSE_ERROR`, so a bad completion
//! cannot take down the pipeline, but callers can still tell it apart from
//! a resume that genuinely had no fields.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::resume::{ParseStatus, ParsedResume, ResumeRecord};

#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("Error decoding JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Decodes `raw` into a record. No schema validation: whatever object the
/// oracle produced is returned as-is.
pub fn parse_record(raw: &str) -> ParsedResume {
    match decode_record(raw) {
        Ok(record) => ParsedResume {
            record,
            status: ParseStatus::Parsed,
        },
        Err(e) => {
            warn!("{e}");
            warn!("Received response: {raw}");
            ParsedResume {
                record: ResumeRecord::empty(),
                status: ParseStatus::Unparseable {
                    reason: e.to_string(),
                },
            }
        }
    }
}

fn decode_record(raw: &str) -> Result<ResumeRecord, RecordParseError> {
    match serde_json::from_str::<Value>(strip_json_fences(raw))? {
        Value::Object(map) => Ok(ResumeRecord::from(map)),
        other => Err(RecordParseError::NotAnObject(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
