//! Patch engine for unpacked application bundles.
//!
//! A patch set records how a modified tree differs from a pristine baseline:
//! line hunks for text assets (diffed after formatter normalization) and full
//! snapshots for binary assets. Applying the set to the baseline rebuilds the
//! modified tree.

pub mod format;
pub mod patch;
pub mod utils;
