//! Workflow around the patch engine: configuration, the external Java
//! tools that unpack and repack the application, and the CLI commands.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod toolchain;
