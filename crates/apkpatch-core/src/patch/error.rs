use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::diff::HunkError;

/// Error type for patch operations.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Baseline tree is missing or not a directory
    #[error("baseline directory not found: {}", .0.display())]
    BaselineNotFound(PathBuf),
    /// Modified tree is missing or not a directory
    #[error("modified directory not found: {}", .0.display())]
    ModifiedNotFound(PathBuf),
    /// Apply refuses to merge into an existing tree
    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),
    /// Failed to read a file or directory
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    /// Failed to write a file or directory
    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    /// Files present in the baseline but missing from the modified tree
    #[error("files removed from the modified tree are not supported: {}", .0.join(", "))]
    RemovedFiles(Vec<String>),
    /// Stored hunks no longer match the normalized baseline
    #[error("failed to patch file '{file}': {source}")]
    Conflict {
        file: String,
        #[source]
        source: HunkError,
    },
    /// A text record targets a baseline file that is not UTF-8
    #[error("cannot patch '{file}': baseline file is not valid UTF-8")]
    NotUtf8 { file: String },
    /// A text record targets a file the baseline does not have
    #[error("cannot patch '{file}': file not found in baseline")]
    MissingBaselineFile { file: String },
    /// Two records share a path
    #[error("duplicate patch record for '{0}'")]
    DuplicatePath(String),
    /// Record path is not a safe relative path
    #[error("invalid patch path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    /// Patch set file could not be parsed or encoded
    #[error("patch set error: {reason}")]
    PatchSetError { reason: String },
}

impl PatchError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PatchError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PatchError::Write {
            path: path.into(),
            source,
        }
    }
}
