pub mod apply;
mod constants;
mod error;
pub mod extract;
pub mod normalize;
mod progress;
pub mod validate;

// Re-export public items
pub use apply::apply_patches;
pub use constants::{CONTEXT_LINES, NO_NEWLINE_MARKER, PATCHES_FILENAME, STAGING_PREFIX};
pub use error::PatchError;
pub use extract::extract_patches;
pub use normalize::normalize_baseline;
pub use progress::{Progress, ProgressAction};
pub use validate::{validate_patch_set, validate_record_path};
