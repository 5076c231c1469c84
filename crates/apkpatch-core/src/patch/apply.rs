use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::format::Normalizer;
use crate::patch::{PatchError, Progress, ProgressAction, STAGING_PREFIX};
use crate::utils::diff::apply_hunks;
use crate::utils::patch_set::{PatchData, PatchRecord, PatchSet};
use crate::utils::paths::resolve;

/// Rebuild the modified tree at `output` from `baseline` and a patch set.
///
/// Workflow:
/// 1. Copy the whole baseline into a staging directory next to `output`
/// 2. Apply each record in order: text records patch the normalized baseline
///    file, binary records write their snapshot
/// 3. Rename the staging directory to `output`
///
/// `output` must not exist. On any failure the staging directory is removed
/// and nothing is left at `output`. The baseline is only read.
pub fn apply_patches<F>(
    baseline: &Path,
    patch_set: &PatchSet,
    normalizer: &Normalizer,
    output: &Path,
    mut on_progress: Option<F>,
) -> Result<(), PatchError>
where
    F: FnMut(Progress),
{
    if !baseline.is_dir() {
        return Err(PatchError::BaselineNotFound(baseline.to_path_buf()));
    }
    if output.exists() {
        return Err(PatchError::OutputExists(output.to_path_buf()));
    }

    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PatchError::write(parent, e))?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| PatchError::write(parent, e))?;

    copy_tree(baseline, staging.path())?;
    debug!("Copied baseline into {}", staging.path().display());

    let total = patch_set.len();
    for (index, record) in patch_set.iter().enumerate() {
        let action = match record.data {
            PatchData::Text(_) => ProgressAction::Patching,
            PatchData::Binary(_) => ProgressAction::Writing,
        };
        if let Some(ref mut callback) = on_progress {
            callback(Progress {
                file: &record.path,
                index,
                total,
                action,
            });
        }

        apply_record(record, baseline, staging.path(), normalizer)?;
    }

    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, output) {
        let _ = fs::remove_dir_all(&staged);
        return Err(PatchError::write(output, e));
    }

    info!(
        "Applied {} patch records to {}",
        total,
        output.display()
    );
    Ok(())
}

/// Apply one record, writing into the tree rooted at `destination`.
pub fn apply_record(
    record: &PatchRecord,
    baseline: &Path,
    destination: &Path,
    normalizer: &Normalizer,
) -> Result<(), PatchError> {
    let target_path = resolve(destination, &record.path);

    let content = match &record.data {
        PatchData::Text(hunks) => {
            let normalized = read_normalized(record, baseline, normalizer)?;
            apply_hunks(&normalized, hunks)
                .map_err(|source| PatchError::Conflict {
                    file: record.path.clone(),
                    source,
                })?
                .into_bytes()
        }
        PatchData::Binary(bytes) => bytes.clone(),
    };

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| PatchError::write(parent, e))?;
    }
    fs::write(&target_path, content).map_err(|e| PatchError::write(&target_path, e))
}

/// Read a text record's baseline file and normalize it.
pub(crate) fn read_normalized(
    record: &PatchRecord,
    baseline: &Path,
    normalizer: &Normalizer,
) -> Result<String, PatchError> {
    let source_path = resolve(baseline, &record.path);
    if !source_path.is_file() {
        return Err(PatchError::MissingBaselineFile {
            file: record.path.clone(),
        });
    }

    let bytes = fs::read(&source_path).map_err(|e| PatchError::read(&source_path, e))?;
    let content = String::from_utf8(bytes).map_err(|_| PatchError::NotUtf8 {
        file: record.path.clone(),
    })?;
    Ok(normalizer.normalize(&content, &record.path))
}

/// Copy every file and directory under `source` into `destination`.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<(), PatchError> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| PatchError::read(source, e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| PatchError::write(&target, e))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target).map_err(|e| PatchError::write(&target, e))?;
        } else {
            warn!("Skipping non-regular file {}", entry.path().display());
        }
    }
    Ok(())
}
