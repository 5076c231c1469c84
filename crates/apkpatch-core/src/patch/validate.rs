use std::collections::HashSet;

use crate::patch::error::PatchError;
use crate::utils::patch_set::PatchRecord;

/// Check that a record path is a forward-slash path inside the tree root.
///
/// Rejects empty paths, absolute paths, backslashes, drive prefixes and
/// `.`/`..` components.
pub fn validate_record_path(path: &str) -> Result<(), PatchError> {
    let invalid = |reason: &str| PatchError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.contains('\\') {
        return Err(invalid("path must use forward slashes"));
    }
    if path.starts_with('/') || has_drive_prefix(path) {
        return Err(invalid("path must be relative"));
    }
    for component in path.split('/') {
        match component {
            "" => return Err(invalid("path contains an empty component")),
            "." | ".." => return Err(invalid("path traversal not allowed")),
            _ => {}
        }
    }

    Ok(())
}

/// Whether `path` would leave the tree when joined on this platform.
///
/// A leading `C:` component is a drive everywhere. On Windows any colon
/// makes a drive-relative path or names an alternate data stream; elsewhere
/// it is an ordinary file name character.
fn has_drive_prefix(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path).as_bytes();
    if first.len() == 2 && first[0].is_ascii_alphabetic() && first[1] == b':' {
        return true;
    }
    cfg!(windows) && path.contains(':')
}

/// Validate every record of a patch set: safe paths, each path at most once.
pub fn validate_patch_set(records: &[PatchRecord]) -> Result<(), PatchError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        validate_record_path(&record.path)?;
        if !seen.insert(record.path.as_str()) {
            return Err(PatchError::DuplicatePath(record.path.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::patch_set::PatchData;

    fn binary(path: &str) -> PatchRecord {
        PatchRecord {
            path: path.to_string(),
            data: PatchData::Binary(vec![1, 2, 3]),
        }
    }

    #[test]
    fn accepts_nested_relative_path() {
        assert!(validate_record_path("res/drawable-hdpi/logo.png").is_ok());
    }

    #[test]
    fn rejects_traversal() {
        assert!(matches!(
            validate_record_path("../outside.txt"),
            Err(PatchError::InvalidPath { .. })
        ));
        assert!(matches!(
            validate_record_path("res/../../outside.txt"),
            Err(PatchError::InvalidPath { .. })
        ));
    }

    #[test]
    fn rejects_absolute_and_drive_paths() {
        assert!(validate_record_path("/etc/passwd").is_err());
        assert!(validate_record_path("C:/Windows/system.ini").is_err());
        assert!(validate_record_path("d:").is_err());
    }

    #[cfg(not(windows))]
    #[test]
    fn accepts_colons_inside_file_names() {
        assert!(validate_record_path("a:b.png").is_ok());
        assert!(validate_record_path("res/raw/12:30.ogg").is_ok());
    }

    #[test]
    fn rejects_backslashes_and_empty_components() {
        assert!(validate_record_path("res\\values\\strings.xml").is_err());
        assert!(validate_record_path("res//strings.xml").is_err());
        assert!(validate_record_path("").is_err());
    }

    #[test]
    fn accepts_dotted_file_names() {
        assert!(validate_record_path("assets/..hidden").is_ok());
        assert!(validate_record_path(".well-known/config.json").is_ok());
    }

    #[test]
    fn rejects_duplicate_paths() {
        let records = vec![binary("a.bin"), binary("b.bin"), binary("a.bin")];

        let result = validate_patch_set(&records);

        assert!(matches!(result, Err(PatchError::DuplicatePath(path)) if path == "a.bin"));
    }

    #[test]
    fn accepts_unique_paths() {
        let records = vec![binary("a.bin"), binary("dir/a.bin")];
        assert!(validate_patch_set(&records).is_ok());
    }
}
