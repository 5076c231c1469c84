use std::path::{Path, PathBuf};
use std::process::Command;

use super::{KeyGenerator, Keystore, ToolError, run_tool};

/// The JDK's keytool.
///
/// Unless a program is given explicitly, keytool is looked up under the
/// `java.home` of the configured `java` when a key is generated.
#[derive(Debug, Clone)]
pub struct Keytool {
    pub java: PathBuf,
    pub program: Option<PathBuf>,
}

impl Keytool {
    pub fn new(java: impl Into<PathBuf>) -> Self {
        Keytool {
            java: java.into(),
            program: None,
        }
    }

    pub fn at(program: impl Into<PathBuf>) -> Self {
        Keytool {
            java: PathBuf::from("java"),
            program: Some(program.into()),
        }
    }

    /// Path of the keytool binary.
    pub fn program(&self) -> Result<PathBuf, ToolError> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => Ok(find_java_home(&self.java)?.join("bin").join("keytool")),
        }
    }

    fn generate_command(&self, program: &Path, keystore: &Keystore) -> Command {
        let settings = &keystore.settings;
        let mut command = Command::new(program);
        command
            .arg("-genkeypair")
            .arg("-alias")
            .arg(&settings.alias)
            .arg("-dname")
            .arg(&settings.distinguished_name)
            .arg("-keyalg")
            .arg(&settings.key_algorithm)
            .arg("-keysize")
            .arg(settings.key_size.to_string())
            .arg("-keystore")
            .arg(&keystore.path)
            .arg("-storepass")
            .arg(&settings.password)
            .arg("-validity")
            .arg(settings.validity_days.to_string());
        command
    }
}

impl KeyGenerator for Keytool {
    fn generate(&self, keystore: &Keystore) -> Result<(), ToolError> {
        let program = self.program()?;
        run_tool(self.generate_command(&program, keystore)).map(|_| ())
    }
}

/// Ask `java` for its `java.home` system property.
pub fn find_java_home(java: &Path) -> Result<PathBuf, ToolError> {
    let mut command = Command::new(java);
    command.args(["-XshowSettings:properties", "-version"]);
    let output = run_tool(command)?;

    // The settings dump goes to stderr.
    parse_java_home(&output.stderr)
        .or_else(|| parse_java_home(&output.stdout))
        .ok_or_else(|| ToolError::JavaHomeNotFound {
            java: java.display().to_string(),
        })
}

fn parse_java_home(settings: &str) -> Option<PathBuf> {
    settings.lines().find_map(|line| {
        let value = line.trim_start().strip_prefix("java.home = ")?.trim();
        (!value.is_empty()).then(|| PathBuf::from(value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeystoreConfig;
    use crate::toolchain::args_of;

    #[test]
    fn parses_java_home_from_settings_dump() {
        let dump = "Property settings:\n    file.separator = /\n    java.home = /usr/lib/jvm/java-21\n    java.io.tmpdir = /tmp\n";

        assert_eq!(parse_java_home(dump), Some(PathBuf::from("/usr/lib/jvm/java-21")));
        assert_eq!(parse_java_home("openjdk version \"21\""), None);
    }

    #[test]
    fn generate_arguments() {
        let keytool = Keytool::at("/jdk/bin/keytool");
        let keystore = Keystore {
            path: PathBuf::from("data/keystore.jks"),
            settings: KeystoreConfig::default(),
        };

        let command = keytool.generate_command(&keytool.program().unwrap(), &keystore);

        assert_eq!(command.get_program(), "/jdk/bin/keytool");
        assert_eq!(
            args_of(&command),
            vec![
                "-genkeypair",
                "-alias",
                "key",
                "-dname",
                "CN=Torch Bearer Tools",
                "-keyalg",
                "RSA",
                "-keysize",
                "2048",
                "-keystore",
                "data/keystore.jks",
                "-storepass",
                "hunter2",
                "-validity",
                "3650",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn find_java_home_reads_fake_java() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let java = dir.path().join("java");
        fs::write(
            &java,
            "#!/bin/sh\necho 'Property settings:' >&2\necho '    java.home = /opt/jdk' >&2\n",
        )
        .unwrap();
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(find_java_home(&java).unwrap(), PathBuf::from("/opt/jdk"));
        assert_eq!(
            Keytool::new(&java).program().unwrap(),
            PathBuf::from("/opt/jdk/bin/keytool")
        );
    }
}
