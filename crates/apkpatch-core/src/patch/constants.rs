/// Lines of unchanged context kept around each hunk
pub const CONTEXT_LINES: usize = 4;
/// Marker following a hunk line that has no terminator
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";
/// Default filename for a serialized patch set
pub const PATCHES_FILENAME: &str = "patches.json";
/// Prefix of the staging directory created next to an apply output
pub const STAGING_PREFIX: &str = ".apkpatch-staging-";
