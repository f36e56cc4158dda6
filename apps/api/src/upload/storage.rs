//! Transient storage of uploaded files in the upload folder.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Kinds of upload the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    Zip,
}

impl UploadKind {
    /// Classifies by extension, case-insensitively. `None` means rejected.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(UploadKind::Pdf),
            "zip" => Some(UploadKind::Zip),
            _ => None,
        }
    }
}

/// Stem used when nothing of the original stem survives sanitizing.
const FALLBACK_STEM: &str = "upload";

/// Reduces a client-supplied filename to a safe flat name.
///
/// Directory components are dropped, whitespace becomes `_`, and anything
/// other than ASCII letters, digits, `.`, `_` and `-` is removed. Leading
/// dots and underscores are trimmed so the result can never be hidden or
/// `..`. The extension is cleaned on its own and kept; a stem that cleans
/// away entirely becomes `upload`. Returns `None` when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) => (stem, clean_component(ext)),
        None => (base, String::new()),
    };
    let stem = clean_component(stem);
    let stem = stem.trim_start_matches(['.', '_']);

    match (stem.is_empty(), ext.is_empty()) {
        (true, true) => None,
        (true, false) => Some(format!("{FALLBACK_STEM}.{ext}")),
        (false, true) => Some(stem.to_string()),
        (false, false) => Some(format!("{stem}.{ext}")),
    }
}

fn clean_component(part: &str) -> String {
    part.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Writes `data` to `dir/name`, replacing any previous file of that name.
///
/// The bytes land in a temp file in the same directory first and are then
/// renamed into place, so readers never see a partial upload.
pub fn store_upload(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create upload folder {}", dir.display()))?;

    let target = dir.join(name);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(data)
        .with_context(|| format!("Failed to write upload {name}"))?;
    tmp.persist(&target)
        .with_context(|| format!("Failed to store upload at {}", target.display()))?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_kind_by_extension() {
        assert_eq!(UploadKind::from_filename("cv.pdf"), Some(UploadKind::Pdf));
        assert_eq!(UploadKind::from_filename("CV.PDF"), Some(UploadKind::Pdf));
        assert_eq!(UploadKind::from_filename("batch.Zip"), Some(UploadKind::Zip));
        assert_eq!(UploadKind::from_filename("cv.docx"), None);
        assert_eq!(UploadKind::from_filename("pdf"), None);
        assert_eq!(UploadKind::from_filename(""), None);
    }

    #[test]
    fn test_sanitize_keeps_simple_names() {
        assert_eq!(sanitize_filename("resume.pdf").as_deref(), Some("resume.pdf"));
        assert_eq!(
            sanitize_filename("Jane Doe CV-2024.pdf").as_deref(),
            Some("Jane_Doe_CV-2024.pdf")
        );
    }

    #[test]
    fn test_sanitize_drops_directories_and_traversal() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\cv.pdf").as_deref(),
            Some("cv.pdf")
        );
        assert_eq!(sanitize_filename("..").as_deref(), None);
        assert_eq!(sanitize_filename(".hidden.pdf").as_deref(), Some("hidden.pdf"));
    }

    #[test]
    fn test_sanitize_strips_non_ascii_and_rejects_empty() {
        assert_eq!(sanitize_filename("résumé.pdf").as_deref(), Some("rsum.pdf"));
        assert_eq!(sanitize_filename("   ").as_deref(), None);
        assert_eq!(sanitize_filename("日本").as_deref(), None);
    }

    #[test]
    fn test_sanitize_keeps_extension_when_stem_is_lost() {
        assert_eq!(sanitize_filename("履歴書.pdf").as_deref(), Some("upload.pdf"));
        assert_eq!(sanitize_filename("简历 2024.ZIP").as_deref(), Some("2024.ZIP"));
        assert_eq!(sanitize_filename("...pdf").as_deref(), Some("upload.pdf"));
        for name in ["履歴書.pdf", "резюме.pdf", "  .pdf"] {
            let safe = sanitize_filename(name).unwrap();
            assert_eq!(UploadKind::from_filename(&safe), Some(UploadKind::Pdf), "{name}");
        }
    }

    #[test]
    fn test_store_upload_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");

        let path = store_upload(&uploads, "cv.pdf", b"first").unwrap();
        assert_eq!(path, uploads.join("cv.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        store_upload(&uploads, "cv.pdf", b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(&uploads).unwrap().count(), 1);
    }
}
