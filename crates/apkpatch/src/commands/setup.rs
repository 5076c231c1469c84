use std::fs;

use apkpatch_core::format::Normalizer;
use apkpatch_core::patch::{apply_patches, normalize_baseline};
use apkpatch_core::utils::patch_set::PatchSet;
use tracing::{info, warn};

use crate::commands::{Toolchain, keystore, print_progress};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;

/// Prepare the data directory unless it already exists.
///
/// Workflow:
/// 1. Create the data directory
/// 2. Disassemble the source app into `disassembled`
/// 3. Apply the saved patches into `patched`
/// 4. Normalize the baseline files the patches touch
/// 5. Generate the signing key
///
/// On any failure the data directory is removed again so the next run starts
/// over. Returns whether setup ran.
pub fn ensure_setup(config: &WorkflowConfig, tools: &Toolchain) -> Result<bool, WorkflowError> {
    let data_dir = config.data_dir();
    if data_dir.exists() {
        return Ok(false);
    }

    match run_setup(config, tools) {
        Ok(()) => Ok(true),
        Err(e) => {
            if data_dir.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&data_dir) {
                    warn!("Failed to remove {}: {}", data_dir.display(), cleanup);
                }
            }
            Err(e)
        }
    }
}

fn run_setup(config: &WorkflowConfig, tools: &Toolchain) -> Result<(), WorkflowError> {
    let source_app = config.source_app_path();
    if !source_app.is_file() {
        return Err(WorkflowError::SourceAppNotFound(source_app));
    }

    let data_dir = config.data_dir();
    info!("Creating data directory...");
    fs::create_dir_all(&data_dir).map_err(|e| WorkflowError::io(&data_dir, e))?;

    info!("Disassembling app...");
    let disassembled = config.disassembled_dir();
    tools.disassembler.disassemble(&source_app, &disassembled)?;

    info!("Loading patches...");
    let patches_path = config.patches_path();
    let patch_set = if patches_path.exists() {
        PatchSet::load(&patches_path)?
    } else {
        info!("No patches at {}, starting from an unmodified tree", patches_path.display());
        PatchSet::default()
    };

    info!("Loading formatter configuration...");
    let normalizer = Normalizer::new(config.load_format_config()?);

    info!("Applying patches...");
    apply_patches(
        &disassembled,
        &patch_set,
        &normalizer,
        &config.patched_dir(),
        Some(print_progress),
    )?;
    normalize_baseline(&disassembled, &patch_set, &normalizer, Some(print_progress))?;

    info!("Generating signing keys...");
    tools.key_generator.generate(&keystore(config))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fakes::{FakeKeyGenerator, project, toolchain};
    use crate::toolchain::ToolError;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn setup_builds_patched_tree_and_keystore() {
        let root = tempdir().unwrap();
        let fixture = tempdir().unwrap();
        fs::write(fixture.path().join("apktool.yml"), "version: 1  \n").unwrap();
        fs::write(fixture.path().join("a.txt"), "line1\nline2\n").unwrap();
        fs::write(
            root.path().join("patches.json"),
            r#"[{"path": "a.txt", "data": [{"oldStart": 1, "oldLines": 2, "newStart": 1, "newLines": 2, "lines": [" line1", "-line2", "+CHANGED"]}]}]"#,
        )
        .unwrap();
        let config = project(root.path());

        let ran = ensure_setup(&config, &toolchain(fixture.path())).unwrap();

        assert!(ran);
        assert_eq!(
            fs::read_to_string(config.patched_dir().join("a.txt")).unwrap(),
            "line1\nCHANGED\n"
        );
        assert_eq!(
            fs::read_to_string(config.disassembled_dir().join("a.txt")).unwrap(),
            "line1\nline2\n"
        );
        assert!(config.keystore_path().is_file());
    }

    #[test]
    fn existing_data_dir_skips_setup() {
        let root = tempdir().unwrap();
        let config = project(root.path());
        fs::create_dir_all(config.data_dir()).unwrap();

        let ran = ensure_setup(&config, &toolchain(Path::new("/nonexistent"))).unwrap();

        assert!(!ran);
    }

    #[test]
    fn failed_setup_removes_data_dir() {
        let root = tempdir().unwrap();
        let fixture = tempdir().unwrap();
        fs::write(fixture.path().join("a.txt"), "a\n").unwrap();
        let config = project(root.path());
        let mut tools = toolchain(fixture.path());
        tools.key_generator = Box::new(FakeKeyGenerator { fail: true });

        let result = ensure_setup(&config, &tools);

        assert!(matches!(result, Err(WorkflowError::Tool(ToolError::Failed { .. }))));
        assert!(!config.data_dir().exists());
    }

    #[test]
    fn conflicting_patches_fail_setup() {
        let root = tempdir().unwrap();
        let fixture = tempdir().unwrap();
        fs::write(fixture.path().join("a.txt"), "something else\n").unwrap();
        fs::write(
            root.path().join("patches.json"),
            r#"[{"path": "a.txt", "data": [{"oldStart": 1, "oldLines": 1, "newStart": 1, "newLines": 1, "lines": ["-line", "+LINE"]}]}]"#,
        )
        .unwrap();
        let config = project(root.path());

        let result = ensure_setup(&config, &toolchain(fixture.path()));

        assert!(matches!(result, Err(WorkflowError::Patch(_))));
        assert!(!config.data_dir().exists());
    }

    #[test]
    fn missing_source_app_errors() {
        let root = tempdir().unwrap();
        let config = WorkflowConfig::discover(None, root.path()).unwrap();

        let result = ensure_setup(&config, &toolchain(Path::new("/nonexistent")));

        assert!(matches!(result, Err(WorkflowError::SourceAppNotFound(_))));
        assert!(!config.data_dir().exists());
    }
}
