use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::format::Normalizer;
use crate::patch::{PatchError, Progress, ProgressAction};
use crate::utils::diff::create_hunks;
use crate::utils::dir_scan::{FileChange, categorize_files};
use crate::utils::patch_set::{PatchData, PatchRecord, PatchSet};
use crate::utils::paths::resolve;

/// Compute the patch set that turns `baseline` into `modified`.
///
/// Workflow:
/// 1. Scan both trees and skip files with identical content
/// 2. Text files (per the normalizer's extension table) become line hunks
///    from the normalized baseline to the modified file; files whose only
///    differences are line endings are skipped
/// 3. Binary files and files only present in `modified` become snapshots
/// 4. Files only present in `baseline` abort extraction
///
/// Records come back sorted by path with the locale comparator.
pub fn extract_patches<F>(
    baseline: &Path,
    modified: &Path,
    normalizer: &Normalizer,
    mut on_progress: Option<F>,
) -> Result<PatchSet, PatchError>
where
    F: FnMut(Progress),
{
    if !baseline.is_dir() {
        return Err(PatchError::BaselineNotFound(baseline.to_path_buf()));
    }
    if !modified.is_dir() {
        return Err(PatchError::ModifiedNotFound(modified.to_path_buf()));
    }

    let changes = categorize_files(baseline, modified)
        .map_err(|e| PatchError::read(baseline, e))?;

    let removed: Vec<String> = changes
        .iter()
        .filter(|change| matches!(change, FileChange::Removed { .. }))
        .map(|change| change.file().to_string())
        .collect();
    if !removed.is_empty() {
        return Err(PatchError::RemovedFiles(removed));
    }

    let total = changes.len();
    let mut records = Vec::with_capacity(total);

    for (index, change) in changes.iter().enumerate() {
        let file = change.file();
        let data = match change {
            FileChange::Modified { .. } => {
                let orig_data = read_file(baseline, file)?;
                let new_data = read_file(modified, file)?;
                diff_file(file, &orig_data, new_data, normalizer)
            }
            FileChange::Added { .. } => Some(PatchData::Binary(read_file(modified, file)?)),
            FileChange::Removed { .. } => None,
        };

        let action = match &data {
            Some(PatchData::Text(_)) => ProgressAction::Diffing,
            Some(PatchData::Binary(_)) => ProgressAction::Snapshotting,
            None => ProgressAction::Skipping,
        };
        if let Some(ref mut callback) = on_progress {
            callback(Progress {
                file,
                index,
                total,
                action,
            });
        }

        if let Some(data) = data {
            records.push(PatchRecord {
                path: file.to_string(),
                data,
            });
        }
    }

    let patch_set = PatchSet::new(records)?;
    info!(
        "Extracted {} patch records from {} changed files",
        patch_set.len(),
        total
    );
    Ok(patch_set)
}

fn read_file(root: &Path, file: &str) -> Result<Vec<u8>, PatchError> {
    let path = resolve(root, file);
    fs::read(&path).map_err(|e| PatchError::read(path, e))
}

/// Build the record payload for a file present on both sides.
/// Returns `None` when the text diff is empty.
fn diff_file(
    file: &str,
    orig_data: &[u8],
    new_data: Vec<u8>,
    normalizer: &Normalizer,
) -> Option<PatchData> {
    if !normalizer.is_text(file) {
        return Some(PatchData::Binary(new_data));
    }

    match (std::str::from_utf8(orig_data), std::str::from_utf8(&new_data)) {
        (Ok(orig_text), Ok(new_text)) => {
            if create_hunks(orig_text, new_text).is_empty() {
                debug!("Skipping {}: only line endings differ", file);
                return None;
            }
            // Applying starts from the normalized baseline, so diff against it.
            // An empty hunk list still records that the file must be normalized.
            let normalized = normalizer.normalize(orig_text, file);
            Some(PatchData::Text(create_hunks(&normalized, new_text)))
        }
        _ => {
            warn!("{} is not valid UTF-8, storing a snapshot", file);
            Some(PatchData::Binary(new_data))
        }
    }
}
