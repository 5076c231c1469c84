use std::fmt;

/// What is being done to the file a progress event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    Diffing,
    Snapshotting,
    Skipping,
    Patching,
    Writing,
    Normalizing,
}

impl fmt::Display for ProgressAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProgressAction::Diffing => "Diffing",
            ProgressAction::Snapshotting => "Snapshotting",
            ProgressAction::Skipping => "Skipping",
            ProgressAction::Patching => "Patching",
            ProgressAction::Writing => "Writing",
            ProgressAction::Normalizing => "Normalizing",
        };
        f.write_str(label)
    }
}

/// Per-file progress event passed to `on_progress` callbacks.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub file: &'a str,
    pub index: usize,
    pub total: usize,
    pub action: ProgressAction,
}

impl fmt::Display for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}/{}]: {}",
            self.action,
            self.index + 1,
            self.total,
            self.file
        )
    }
}
