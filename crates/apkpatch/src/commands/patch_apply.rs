use std::path::Path;

use apkpatch_core::patch::{apply_patches, normalize_baseline};
use apkpatch_core::utils::patch_set::{PatchSet, PatchSummary};

use crate::commands::{normalizer, print_progress};
use crate::error::WorkflowError;

/// Rebuild the modified tree at `output` from `baseline` and a patch file.
///
/// With `rewrite_baseline`, the baseline files the patches touch are then
/// replaced by their normalized form.
pub fn run(
    baseline: &Path,
    patches: &Path,
    output: &Path,
    format_config: Option<&Path>,
    rewrite_baseline: bool,
) -> Result<PatchSummary, WorkflowError> {
    let normalizer = normalizer(format_config)?;
    let patch_set = PatchSet::load(patches)?;

    apply_patches(baseline, &patch_set, &normalizer, output, Some(print_progress))?;
    if rewrite_baseline {
        normalize_baseline(baseline, &patch_set, &normalizer, Some(print_progress))?;
    }

    Ok(PatchSummary::from_patch_set(&patch_set))
}
