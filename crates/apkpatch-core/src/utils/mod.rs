pub mod collate;
pub mod diff;
pub mod dir_scan;
pub mod hash;
pub mod patch_set;
pub mod paths;
