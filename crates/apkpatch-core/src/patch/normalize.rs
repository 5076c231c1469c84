use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::format::Normalizer;
use crate::patch::apply::read_normalized;
use crate::patch::{PatchError, Progress, ProgressAction};
use crate::utils::patch_set::{PatchKind, PatchSet};
use crate::utils::paths::resolve;

/// Rewrite the baseline's text files, for the text records of `patch_set`,
/// into their normalized form.
///
/// Extracting against a normalized baseline keeps hunks free of pure
/// formatting changes. Files already in normal form are left untouched.
/// Returns the number of files rewritten.
pub fn normalize_baseline<F>(
    baseline: &Path,
    patch_set: &PatchSet,
    normalizer: &Normalizer,
    mut on_progress: Option<F>,
) -> Result<usize, PatchError>
where
    F: FnMut(Progress),
{
    if !baseline.is_dir() {
        return Err(PatchError::BaselineNotFound(baseline.to_path_buf()));
    }

    let text_records: Vec<_> = patch_set
        .iter()
        .filter(|record| record.kind() == PatchKind::Text)
        .collect();
    let total = text_records.len();
    let mut rewritten = 0;

    for (index, record) in text_records.into_iter().enumerate() {
        if let Some(ref mut callback) = on_progress {
            callback(Progress {
                file: &record.path,
                index,
                total,
                action: ProgressAction::Normalizing,
            });
        }

        let path = resolve(baseline, &record.path);
        let normalized = read_normalized(record, baseline, normalizer)?;
        let current = fs::read(&path).map_err(|e| PatchError::read(&path, e))?;
        if current == normalized.as_bytes() {
            continue;
        }

        debug!("Normalizing {}", record.path);
        fs::write(&path, normalized).map_err(|e| PatchError::write(&path, e))?;
        rewritten += 1;
    }

    info!("Normalized {} of {} baseline text files", rewritten, total);
    Ok(rewritten)
}
