use apkpatch_core::format::Normalizer;
use apkpatch_core::patch::extract_patches;
use apkpatch_core::utils::patch_set::PatchSummary;
use tracing::info;

use crate::commands::setup::ensure_setup;
use crate::commands::{Toolchain, print_progress};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;

/// Record the edits made to the patched tree into the project's patch file.
pub fn run(config: &WorkflowConfig, tools: &Toolchain) -> Result<PatchSummary, WorkflowError> {
    ensure_setup(config, tools)?;

    let patched_dir = config.patched_dir();
    if !patched_dir.is_dir() {
        return Err(WorkflowError::NotSetUp(patched_dir));
    }

    let normalizer = Normalizer::new(config.load_format_config()?);

    info!("Creating patches...");
    let patch_set = extract_patches(
        &config.disassembled_dir(),
        &patched_dir,
        &normalizer,
        Some(print_progress),
    )?;

    info!("Saving patches...");
    patch_set.save(&config.patches_path())?;

    Ok(PatchSummary::from_patch_set(&patch_set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fakes::{project, toolchain};
    use apkpatch_core::utils::patch_set::PatchSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn edits_round_trip_through_a_fresh_setup() {
        let root = tempdir().unwrap();
        let fixture = tempdir().unwrap();
        fs::create_dir_all(fixture.path().join("res/values")).unwrap();
        fs::write(
            fixture.path().join("res/values/strings.xml"),
            "<resources>\n    <string name=\"title\">Old</string>\n</resources>\n",
        )
        .unwrap();
        fs::write(fixture.path().join("classes.dex"), [0x64, 0x65, 0x78]).unwrap();
        fs::write(fixture.path().join("config.json"), r#"{"debug":false}"#).unwrap();
        let config = project(root.path());
        let tools = toolchain(fixture.path());

        // First run sets up an unpatched working tree.
        let summary = run(&config, &tools).unwrap();
        assert_eq!(summary.records, 0);

        let patched = config.patched_dir();
        fs::write(
            patched.join("res/values/strings.xml"),
            "<resources>\n    <string name=\"title\">New</string>\n</resources>\n",
        )
        .unwrap();
        fs::write(patched.join("classes.dex"), [0x64, 0x65, 0x78, 0x0a]).unwrap();
        fs::write(patched.join("config.json"), r#"{"debug":true}"#).unwrap();

        let summary = run(&config, &tools).unwrap();
        assert_eq!((summary.records, summary.text, summary.binary), (3, 2, 1));

        let saved = PatchSet::load(&config.patches_path()).unwrap();
        let paths: Vec<_> = saved.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["classes.dex", "config.json", "res/values/strings.xml"]);

        // Starting over from the saved patches rebuilds the same tree.
        fs::remove_dir_all(config.data_dir()).unwrap();
        run(&config, &tools).unwrap();
        assert_eq!(
            fs::read_to_string(config.patched_dir().join("res/values/strings.xml")).unwrap(),
            "<resources>\n    <string name=\"title\">New</string>\n</resources>\n"
        );
        assert_eq!(
            fs::read_to_string(config.patched_dir().join("config.json")).unwrap(),
            r#"{"debug":true}"#
        );
    }
}
