use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Keystore, Signer, ToolError, jar_command, run_tool};

/// apksigner, run through `java -jar`. v4 signatures are disabled so the
/// output is a single file.
#[derive(Debug, Clone)]
pub struct ApkSigner {
    pub java: PathBuf,
    pub jar: PathBuf,
}

impl ApkSigner {
    pub fn new(java: impl Into<PathBuf>, jar: impl Into<PathBuf>) -> Self {
        ApkSigner {
            java: java.into(),
            jar: jar.into(),
        }
    }

    fn sign_command(&self, artifact: &Path, keystore: &Keystore, output: &Path) -> Command {
        let mut command = jar_command(&self.java, &self.jar);
        command
            .arg("sign")
            .arg("--ks")
            .arg(&keystore.path)
            .arg("--ks-key-alias")
            .arg(&keystore.settings.alias)
            .arg("--ks-pass")
            .arg(format!("pass:{}", keystore.settings.password))
            .arg("--out")
            .arg(output)
            .args(["--v4-signing-enabled", "false"])
            .arg(artifact);
        command
    }
}

impl Signer for ApkSigner {
    fn sign(&self, artifact: &Path, keystore: &Keystore, output: &Path) -> Result<(), ToolError> {
        run_tool(self.sign_command(artifact, keystore, output)).map(|_| ())
    }
}
