use std::path::Path;

use apkpatch_core::utils::dir_scan::{FileChange, categorize_files};

use crate::error::WorkflowError;

/// Hash-compare two trees. An empty result means they hold the same files
/// with the same content.
pub fn run(dir1: &Path, dir2: &Path) -> Result<Vec<FileChange>, WorkflowError> {
    for dir in [dir1, dir2] {
        if !dir.is_dir() {
            return Err(WorkflowError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
    }
    categorize_files(dir1, dir2).map_err(|e| WorkflowError::io(dir1, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn identical_trees_match() {
        let dir1 = tempdir().unwrap();
        let dir2 = tempdir().unwrap();
        fs::write(dir1.path().join("a.bin"), [1]).unwrap();
        fs::write(dir2.path().join("a.bin"), [1]).unwrap();

        assert!(run(dir1.path(), dir2.path()).unwrap().is_empty());
    }

    #[test]
    fn reports_each_difference() {
        let dir1 = tempdir().unwrap();
        let dir2 = tempdir().unwrap();
        fs::write(dir1.path().join("a.bin"), [1]).unwrap();
        fs::write(dir2.path().join("a.bin"), [2]).unwrap();
        fs::write(dir2.path().join("b.bin"), [3]).unwrap();

        let changes = run(dir1.path(), dir2.path()).unwrap();

        let files: Vec<_> = changes.iter().map(FileChange::file).collect();
        assert_eq!(files, vec!["a.bin", "b.bin"]);
        assert!(matches!(
            &changes[0],
            FileChange::Modified { original_hash, final_hash, .. } if original_hash != final_hash
        ));
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), Path::new("/nonexistent")).is_err());
    }
}
