//! Text normalization keyed by file extension.
//!
//! The set of extensions with a rule is also the text/binary classification
//! used when extracting patches: a file is text exactly when a rule exists
//! for it.

mod config;
mod rules;

use std::path::Path;

pub use config::{EndOfLine, FormatConfig, FormatError};
pub use rules::{JsonRule, TextRule, VerbatimRule};

/// A formatting pass for one family of file types.
///
/// `format` must be pure and idempotent: formatting its own output returns
/// that output unchanged.
pub trait FormatRule: Send + Sync {
    fn name(&self) -> &'static str;
    /// Lowercase extensions, without the leading dot.
    fn extensions(&self) -> &[&'static str];
    fn format(&self, content: &str, config: &FormatConfig) -> String;
}

/// Dispatches content to the rule registered for its extension.
pub struct Normalizer {
    config: FormatConfig,
    rules: Vec<Box<dyn FormatRule>>,
}

impl Normalizer {
    /// Normalizer with the built-in JSON, text and verbatim rules.
    pub fn new(config: FormatConfig) -> Self {
        Normalizer {
            config,
            rules: vec![Box::new(JsonRule), Box::new(TextRule), Box::new(VerbatimRule)],
        }
    }

    /// Normalizer with no rules: every file is binary.
    pub fn empty(config: FormatConfig) -> Self {
        Normalizer {
            config,
            rules: Vec::new(),
        }
    }

    /// Register a rule. Its extensions take precedence over earlier rules.
    pub fn with_rule(mut self, rule: impl FormatRule + 'static) -> Self {
        self.rules.insert(0, Box::new(rule));
        self
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn rule_for(&self, path: &str) -> Option<&dyn FormatRule> {
        let extension = Path::new(path)
            .extension()
            .and_then(|extension| extension.to_str())?
            .to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.extensions().contains(&extension.as_str()))
            .map(|rule| rule.as_ref())
    }

    /// Whether files at `path` are diffed as text.
    pub fn is_text(&self, path: &str) -> bool {
        self.rule_for(path).is_some()
    }

    /// Normalize `content`. Files without a rule pass through unchanged.
    pub fn normalize(&self, content: &str, path: &str) -> String {
        match self.rule_for(path) {
            Some(rule) => rule.format(content, &self.config),
            None => content.to_string(),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(FormatConfig::default())
    }
}
