use std::io;
use std::path::PathBuf;

use apkpatch_core::format::FormatError;
use apkpatch_core::patch::PatchError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::toolchain::ToolError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("source app not found: {}", .0.display())]
    SourceAppNotFound(PathBuf),
    #[error("setup is incomplete, missing {}", .0.display())]
    NotSetUp(PathBuf),
    #[error("I/O error at '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WorkflowError::Io {
            path: path.into(),
            source,
        }
    }
}
