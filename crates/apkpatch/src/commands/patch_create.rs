use std::path::Path;

use apkpatch_core::patch::extract_patches;
use apkpatch_core::utils::patch_set::PatchSummary;

use crate::commands::{normalizer, print_progress};
use crate::error::WorkflowError;

/// Diff two trees and write the patch set to `output`.
pub fn run(
    baseline: &Path,
    modified: &Path,
    output: &Path,
    format_config: Option<&Path>,
) -> Result<PatchSummary, WorkflowError> {
    let normalizer = normalizer(format_config)?;
    let patch_set = extract_patches(baseline, modified, &normalizer, Some(print_progress))?;
    patch_set.save(output)?;
    Ok(PatchSummary::from_patch_set(&patch_set))
}
