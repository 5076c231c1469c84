use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to read format config '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid format config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Line terminator written by the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
    #[default]
    Lf,
    Crlf,
    Cr,
    /// Keep whichever terminator the content uses first.
    Auto,
}

impl EndOfLine {
    /// Terminator to use for `content`.
    pub fn resolve(self, content: &str) -> &'static str {
        match self {
            EndOfLine::Lf => "\n",
            EndOfLine::Crlf => "\r\n",
            EndOfLine::Cr => "\r",
            EndOfLine::Auto => detect_line_ending(content),
        }
    }
}

fn detect_line_ending(content: &str) -> &'static str {
    match content.find(['\r', '\n']) {
        Some(index) if content[index..].starts_with("\r\n") => "\r\n",
        Some(index) if content[index..].starts_with('\r') => "\r",
        _ => "\n",
    }
}

/// Formatter options, read from a prettier-style JSON document.
///
/// Options this crate does not interpret are kept in `extra` so the document
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatConfig {
    pub tab_width: usize,
    pub use_tabs: bool,
    pub end_of_line: EndOfLine,
    pub trim_trailing_whitespace: bool,
    pub insert_final_newline: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            tab_width: 2,
            use_tabs: false,
            end_of_line: EndOfLine::Lf,
            trim_trailing_whitespace: true,
            insert_final_newline: true,
            extra: serde_json::Map::new(),
        }
    }
}

impl FormatConfig {
    pub fn load(path: &Path) -> Result<FormatConfig, FormatError> {
        let content = fs::read_to_string(path).map_err(|source| FormatError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FormatError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// One level of indentation.
    pub fn indent(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_width())
        }
    }

    /// Tab width, never zero.
    pub fn tab_width(&self) -> usize {
        self.tab_width.max(1)
    }
}
