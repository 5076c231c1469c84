use std::path::PathBuf;

use tracing::info;

use crate::commands::setup::ensure_setup;
use crate::commands::{Toolchain, keystore};
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;

/// Build and sign the app from the patched tree. Returns the signed
/// artifact's path.
pub fn run(config: &WorkflowConfig, tools: &Toolchain) -> Result<PathBuf, WorkflowError> {
    ensure_setup(config, tools)?;

    let patched_dir = config.patched_dir();
    if !patched_dir.is_dir() {
        return Err(WorkflowError::NotSetUp(patched_dir));
    }

    info!("Assembling app...");
    let patched_app = config.patched_app_path();
    tools.assembler.assemble(&patched_dir, &patched_app)?;

    info!("Signing app...");
    let signed_app = config.signed_app_path();
    tools.signer.sign(&patched_app, &keystore(config), &signed_app)?;

    Ok(signed_app)
}
