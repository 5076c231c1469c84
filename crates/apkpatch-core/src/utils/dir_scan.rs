use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::utils::hash::hash_file;
use crate::utils::paths::{resolve, to_record_path};

/// Represents a detected difference between two directory trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File exists in both trees but content differs
    Modified {
        file: String,
        original_hash: String,
        final_hash: String,
    },
    /// File only exists in the new tree
    Added { file: String, final_hash: String },
    /// File only exists in the original tree
    Removed { file: String, original_hash: String },
}

impl FileChange {
    pub fn file(&self) -> &str {
        match self {
            FileChange::Modified { file, .. } => file,
            FileChange::Added { file, .. } => file,
            FileChange::Removed { file, .. } => file,
        }
    }
}

/// List every regular file below `root` as a forward-slash relative path.
/// Symlinks are not followed.
pub fn list_files(root: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(to_record_path(relative));
        }
    }

    files.sort();
    Ok(files)
}

/// Compare two trees and categorize files into changes.
/// Unchanged files (same hash) are skipped.
pub fn categorize_files(orig_dir: &Path, new_dir: &Path) -> io::Result<Vec<FileChange>> {
    let orig_files: BTreeSet<String> = list_files(orig_dir)?.into_iter().collect();
    let new_files: BTreeSet<String> = list_files(new_dir)?.into_iter().collect();

    let mut changes = Vec::new();

    for file in orig_files.intersection(&new_files) {
        let orig_hash = hash_file(&resolve(orig_dir, file))?;
        let new_hash = hash_file(&resolve(new_dir, file))?;

        if orig_hash != new_hash {
            changes.push(FileChange::Modified {
                file: file.clone(),
                original_hash: orig_hash,
                final_hash: new_hash,
            });
        }
    }

    for file in new_files.difference(&orig_files) {
        changes.push(FileChange::Added {
            file: file.clone(),
            final_hash: hash_file(&resolve(new_dir, file))?,
        });
    }

    for file in orig_files.difference(&new_files) {
        changes.push(FileChange::Removed {
            file: file.clone(),
            original_hash: hash_file(&resolve(orig_dir, file))?,
        });
    }

    changes.sort_by(|a, b| a.file().cmp(b.file()));

    Ok(changes)
}
