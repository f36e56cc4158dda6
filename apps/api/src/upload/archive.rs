//! ZIP expansion for batch uploads.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use zip::result::ZipError;

use crate::upload::storage::{sanitize_filename, store_upload, UploadKind};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid zip archive: {0}")]
    Zip(#[from] ZipError),

    #[error("failed to read {name} from archive: {source}")]
    Entry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive expands beyond {limit} bytes")]
    TooLarge { limit: u64 },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Upper bound on the uncompressed PDF bytes taken from one archive.
pub const MAX_EXPANDED_BYTES: u64 = 16 * 1000 * 1000;

/// Writes every PDF in the archive flat into `dest` and returns their paths
/// in archive order.
///
/// Other entries are skipped, as are entries whose names would escape the
/// archive root. Two PDFs with the same file name in different folders are
/// kept apart by prefixing the later one with its entry index.
///
/// Entries are read through a running byte budget of `MAX_EXPANDED_BYTES`
/// and nothing is written until the whole archive fits. Blocking.
pub fn expand_pdfs(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    expand_pdfs_within(archive_path, dest, MAX_EXPANDED_BYTES)
}

fn expand_pdfs_within(
    archive_path: &Path,
    dest: &Path,
    limit: u64,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(archive_path).map_err(|source| ArchiveError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    let mut remaining = limit;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let Some(file_name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from)
        else {
            debug!("skipping unsafe archive entry {}", entry.name());
            continue;
        };

        if UploadKind::from_filename(&file_name) != Some(UploadKind::Pdf) {
            continue;
        }
        let Some(mut name) = sanitize_filename(&file_name) else {
            continue;
        };
        if !seen.insert(name.clone()) {
            name = format!("{index}_{name}");
            seen.insert(name.clone());
        }

        // Declared sizes come from the uploader; only bytes actually read count.
        let mut data = Vec::new();
        entry
            .by_ref()
            .take(remaining + 1)
            .read_to_end(&mut data)
            .map_err(|source| ArchiveError::Entry {
                name: file_name.clone(),
                source,
            })?;
        remaining = remaining
            .checked_sub(data.len() as u64)
            .ok_or(ArchiveError::TooLarge { limit })?;

        pending.push((name, data));
    }

    let extracted = pending
        .into_iter()
        .map(|(name, data)| store_upload(dest, &name, &data))
        .collect::<anyhow::Result<Vec<_>>>()?;

    info!(
        "expanded {} PDF(s) from {}",
        extracted.len(),
        archive_path.display()
    );
    Ok(extracted)
}
