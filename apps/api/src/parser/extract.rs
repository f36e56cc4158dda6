//! PDF text extraction and normalization.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[,.]").expect("valid regex"));
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?(?:://)?").expect("valid regex"));

#[derive(Debug, Error)]
pub enum DocumentReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a readable PDF: {message}")]
    InvalidPdf { path: PathBuf, message: String },

    #[error("text extraction aborted for {path}")]
    Aborted { path: PathBuf },
}

/// Resume text after whitespace and URL cleanup.
///
/// Only [`normalize`] builds one, so holding a `NormalizedText` means the
/// cleanup has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cleans raw PDF text. Steps run in order, each feeding the next:
///
/// 1. whitespace right before `,` or `.` becomes `,` (repairs line-wrap splits)
/// 2. runs of newlines become one newline
/// 3. any whitespace run becomes a single separator: `"\n "` when it holds a
///    line break, `" "` otherwise
/// 4. `http`/`https` scheme prefixes (with or without `://`) are removed
pub fn normalize(raw: &str) -> NormalizedText {
    let text = SPACE_BEFORE_PUNCT.replace_all(raw, ",");
    let text = NEWLINE_RUN.replace_all(&text, "\n");
    let text = WHITESPACE_RUN.replace_all(&text, |caps: &regex::Captures| {
        if caps[0].contains('\n') {
            "\n "
        } else {
            " "
        }
    });
    let text = URL_SCHEME.replace_all(&text, "");
    NormalizedText(text.into_owned())
}

/// Reads every page of the PDF at `path` in page order and normalizes the text.
///
/// The file handle lives only inside this call and is closed on every exit
/// path. Blocking; run it off the async executor.
pub fn extract_text(path: &Path) -> Result<NormalizedText, DocumentReadError> {
    let bytes = read_document(path)?;

    let raw = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
        DocumentReadError::InvalidPdf {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    debug!("extracted {} chars from {}", raw.len(), path.display());

    Ok(normalize(&raw))
}

fn read_document(path: &Path) -> Result<Vec<u8>, DocumentReadError> {
    let io_err = |source| DocumentReadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;
    Ok(bytes)
}
