use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use apkpatch_core::format::{FormatConfig, FormatError};
use apkpatch_core::patch::PATCHES_FILENAME;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default name of the workflow configuration file.
pub const CONFIG_FILENAME: &str = "apkpatch.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Signing key parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeystoreConfig {
    pub password: String,
    pub alias: String,
    pub distinguished_name: String,
    pub key_algorithm: String,
    pub key_size: u32,
    pub validity_days: u32,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        KeystoreConfig {
            password: "hunter2".to_string(),
            alias: "key".to_string(),
            distinguished_name: "CN=Torch Bearer Tools".to_string(),
            key_algorithm: "RSA".to_string(),
            key_size: 2048,
            validity_days: 365 * 10,
        }
    }
}

/// Project layout and tool settings, read from `apkpatch.json`.
///
/// Relative paths are resolved against `base_dir`, the directory holding the
/// config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowConfig {
    pub source_app: PathBuf,
    pub patches: PathBuf,
    pub format_config: PathBuf,
    pub data_dir: PathBuf,
    pub tools_dir: PathBuf,
    pub java: PathBuf,
    /// Decode `classes.dex` to smali instead of keeping it as a binary.
    pub decode_sources: bool,
    pub keystore: KeystoreConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            source_app: PathBuf::from("app.apk"),
            patches: PathBuf::from(PATCHES_FILENAME),
            format_config: PathBuf::from(".prettierrc"),
            data_dir: PathBuf::from("data"),
            tools_dir: PathBuf::from("tools"),
            java: PathBuf::from("java"),
            decode_sources: false,
            keystore: KeystoreConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl WorkflowConfig {
    /// Load the config at `path`.
    pub fn load(path: &Path) -> Result<WorkflowConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: WorkflowConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise `apkpatch.json` in `dir` if it
    /// exists, otherwise defaults rooted at `dir`.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<WorkflowConfig, ConfigError> {
        if let Some(path) = path {
            return WorkflowConfig::load(path);
        }

        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return WorkflowConfig::load(&candidate);
        }

        debug!("No {} in {}, using defaults", CONFIG_FILENAME, dir.display());
        Ok(WorkflowConfig {
            base_dir: dir.to_path_buf(),
            ..WorkflowConfig::default()
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name().is_none() {
            return Err(ConfigError::Invalid {
                key: "sourceApp",
                reason: format!("'{}' has no file name", self.source_app.display()),
            });
        }
        if self.keystore.password.len() < 6 {
            return Err(ConfigError::Invalid {
                key: "keystore.password",
                reason: "must be at least 6 characters".to_string(),
            });
        }
        if self.keystore.alias.is_empty() {
            return Err(ConfigError::Invalid {
                key: "keystore.alias",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// File stem of the source application, used to name built artifacts.
    pub fn app_name(&self) -> Option<&str> {
        self.source_app.file_stem().and_then(|stem| stem.to_str())
    }

    pub fn source_app_path(&self) -> PathBuf {
        self.resolve(&self.source_app)
    }

    pub fn patches_path(&self) -> PathBuf {
        self.resolve(&self.patches)
    }

    pub fn format_config_path(&self) -> PathBuf {
        self.resolve(&self.format_config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.resolve(&self.tools_dir)
    }

    /// Pristine tree produced by the disassembler.
    pub fn disassembled_dir(&self) -> PathBuf {
        self.data_dir().join("disassembled")
    }

    /// Working tree with the patches applied.
    pub fn patched_dir(&self) -> PathBuf {
        self.data_dir().join("patched")
    }

    pub fn keystore_path(&self) -> PathBuf {
        self.data_dir().join("keystore.jks")
    }

    pub fn patched_app_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}-patched.apk", self.app_name().unwrap_or("app")))
    }

    pub fn signed_app_path(&self) -> PathBuf {
        self.data_dir()
            .join(format!("{}-signed.apk", self.app_name().unwrap_or("app")))
    }

    pub fn apktool_jar(&self) -> PathBuf {
        self.tools_dir().join("apktool.jar")
    }

    pub fn apksigner_jar(&self) -> PathBuf {
        self.tools_dir().join("apksigner.jar")
    }

    /// Formatter options. A missing file means default options.
    pub fn load_format_config(&self) -> Result<FormatConfig, FormatError> {
        let path = self.format_config_path();
        if !path.exists() {
            debug!("No format config at {}, using defaults", path.display());
            return Ok(FormatConfig::default());
        }
        FormatConfig::load(&path)
    }
}
