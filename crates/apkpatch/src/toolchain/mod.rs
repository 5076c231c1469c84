//! Adapters for the external tools that unpack, repack and sign the
//! application. The workflow only sees the traits, so tests can substitute
//! fakes for the Java tools.

mod apksigner;
mod apktool;
mod keytool;

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

pub use apksigner::ApkSigner;
pub use apktool::Apktool;
pub use keytool::{Keytool, find_java_home};

use crate::config::KeystoreConfig;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to run {tool}: {source}")]
    Spawn { tool: String, source: io::Error },
    #[error("{tool} failed (exit code {exit_code}): {stderr}")]
    Failed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },
    #[error("could not determine java.home from '{java}'")]
    JavaHomeNotFound { java: String },
}

/// A signing keystore on disk together with its key parameters.
#[derive(Debug, Clone)]
pub struct Keystore {
    pub path: PathBuf,
    pub settings: KeystoreConfig,
}

/// Unpacks an application archive into an editable tree.
pub trait Disassembler {
    fn disassemble(&self, artifact: &Path, output_dir: &Path) -> Result<(), ToolError>;
}

/// Packs an edited tree back into an application archive.
pub trait Assembler {
    fn assemble(&self, tree: &Path, artifact: &Path) -> Result<(), ToolError>;
}

/// Signs an archive with a key from a keystore.
pub trait Signer {
    fn sign(&self, artifact: &Path, keystore: &Keystore, output: &Path) -> Result<(), ToolError>;
}

/// Creates a new signing key.
pub trait KeyGenerator {
    fn generate(&self, keystore: &Keystore) -> Result<(), ToolError>;
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `command`, failing on spawn errors and non-zero exit codes.
pub fn run_tool(mut command: Command) -> Result<ToolOutput, ToolError> {
    let tool = command.get_program().to_string_lossy().into_owned();
    debug!("Running {:?}", command);

    let output = command.output().map_err(|source| ToolError::Spawn {
        tool: tool.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if output.status.success() {
        Ok(ToolOutput { stdout, stderr })
    } else {
        Err(ToolError::Failed {
            tool,
            exit_code: output.status.code().unwrap_or(-1),
            stderr: if stderr.is_empty() { stdout } else { stderr },
        })
    }
}

/// `java -jar <jar>` as a starting point for a tool invocation.
pub(crate) fn jar_command(java: &Path, jar: &Path) -> Command {
    let mut command = Command::new(java);
    command.arg("-jar").arg(jar);
    command
}

#[cfg(test)]
pub(crate) fn args_of(command: &Command) -> Vec<String> {
    command
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_spawn_error() {
        let result = run_tool(Command::new("/nonexistent/tool"));

        assert!(matches!(result, Err(ToolError::Spawn { tool, .. }) if tool == "/nonexistent/tool"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_reports_code_and_stderr() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo broken >&2; exit 3"]);

        let result = run_tool(command);

        assert!(matches!(
            result,
            Err(ToolError::Failed { exit_code: 3, ref stderr, .. }) if stderr == "broken"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn captures_output_on_success() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo err >&2"]);

        let output = run_tool(command).unwrap();

        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
    }

    #[test]
    fn jar_command_prefixes_jar() {
        let command = jar_command(Path::new("java"), Path::new("tools/apktool.jar"));

        assert_eq!(command.get_program(), "java");
        assert_eq!(args_of(&command), vec!["-jar", "tools/apktool.jar"]);
    }
}
