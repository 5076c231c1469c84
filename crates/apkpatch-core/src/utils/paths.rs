use std::path::{Component, Path, PathBuf};

/// Convert a path relative to a tree root into the forward-slash form used in
/// patch records.
pub fn to_record_path(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    joined.replace('\\', "/")
}

/// Resolve a record path against a tree root.
pub fn resolve(root: &Path, record_path: &str) -> PathBuf {
    record_path
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}
