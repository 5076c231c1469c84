use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Assembler, Disassembler, ToolError, jar_command, run_tool};

/// apktool, run through `java -jar`.
#[derive(Debug, Clone)]
pub struct Apktool {
    pub java: PathBuf,
    pub jar: PathBuf,
    /// Decode `classes.dex` to smali. When unset (`-s`) dex files are kept
    /// as-is.
    pub decode_sources: bool,
}

impl Apktool {
    pub fn new(java: impl Into<PathBuf>, jar: impl Into<PathBuf>) -> Self {
        Apktool {
            java: java.into(),
            jar: jar.into(),
            decode_sources: false,
        }
    }

    fn decode_command(&self, artifact: &Path, output_dir: &Path) -> Command {
        let mut command = jar_command(&self.java, &self.jar);
        command.arg("d").arg(artifact).arg("-o").arg(output_dir);
        if !self.decode_sources {
            command.arg("-s");
        }
        command
    }

    fn build_command(&self, tree: &Path, artifact: &Path) -> Command {
        let mut command = jar_command(&self.java, &self.jar);
        command.arg("b").arg(tree).arg("-o").arg(artifact);
        command
    }
}

impl Disassembler for Apktool {
    fn disassemble(&self, artifact: &Path, output_dir: &Path) -> Result<(), ToolError> {
        run_tool(self.decode_command(artifact, output_dir)).map(|_| ())
    }
}

impl Assembler for Apktool {
    fn assemble(&self, tree: &Path, artifact: &Path) -> Result<(), ToolError> {
        run_tool(self.build_command(tree, artifact)).map(|_| ())
    }
}
