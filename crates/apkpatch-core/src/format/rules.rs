use serde::de::IgnoredAny;
use tracing::warn;

use crate::format::FormatRule;
use crate::format::config::FormatConfig;

/// Split on `\r\n`, `\n` or `\r`, dropping the terminators.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(index) = rest.find(['\r', '\n']) {
        lines.push(&rest[..index]);
        let skip = if rest[index..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[index + skip..];
    }
    lines.push(rest);
    lines
}

/// Join lines with the configured terminator, dropping trailing blank lines
/// and ending with a newline unless the result is empty.
fn finish_lines(lines: Vec<String>, content: &str, config: &FormatConfig) -> String {
    let eol = config.end_of_line.resolve(content);
    let mut lines = lines;
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }

    let mut output = lines.join(eol);
    if config.insert_final_newline {
        output.push_str(eol);
    }
    output
}

/// Rewrite leading whitespace at the configured tab stops.
fn reindent(line: &str, config: &FormatConfig) -> String {
    let tab_width = config.tab_width();
    let body = line.trim_start_matches([' ', '\t']);
    let leading = &line[..line.len() - body.len()];

    let mut column = 0;
    for c in leading.chars() {
        column = match c {
            '\t' => (column / tab_width + 1) * tab_width,
            _ => column + 1,
        };
    }

    let indent = if config.use_tabs {
        "\t".repeat(column / tab_width) + &" ".repeat(column % tab_width)
    } else {
        " ".repeat(column)
    };
    indent + body
}

/// Whitespace normalization for source-like text.
pub struct TextRule;

impl FormatRule for TextRule {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extensions(&self) -> &[&'static str] {
        &[
            "js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx", "css", "scss", "less", "html",
            "htm", "vue", "yaml", "yml", "graphql", "gql", "hbs", "handlebars",
        ]
    }

    fn format(&self, content: &str, config: &FormatConfig) -> String {
        let lines = split_lines(content)
            .into_iter()
            .map(|line| {
                let line = reindent(line, config);
                if config.trim_trailing_whitespace {
                    line.trim_end_matches([' ', '\t']).to_string()
                } else {
                    line
                }
            })
            .collect();
        finish_lines(lines, content, config)
    }
}

/// Re-serializes JSON documents with the configured indentation.
pub struct JsonRule;

impl FormatRule for JsonRule {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json", "webmanifest", "geojson", "har", "mcmeta", "gltf"]
    }

    fn format(&self, content: &str, config: &FormatConfig) -> String {
        if let Err(e) = serde_json::from_str::<IgnoredAny>(content) {
            warn!("Not valid JSON, formatting as plain text: {}", e);
            return TextRule.format(content, config);
        }

        let pretty = pretty_json(content, &config.indent());
        let lines = pretty.split('\n').map(str::to_string).collect();
        finish_lines(lines, content, config)
    }
}

/// Re-layout a valid JSON document one member per line.
///
/// Works on tokens: strings, numbers and literals are copied exactly as
/// written, so number precision and duplicate keys survive.
fn pretty_json(content: &str, indent: &str) -> String {
    let bytes = content.as_bytes();
    let mut output = String::with_capacity(content.len() * 2);
    let mut depth = 0;
    let mut index = 0;

    let newline = |output: &mut String, depth: usize| {
        output.push('\n');
        for _ in 0..depth {
            output.push_str(indent);
        }
    };

    while index < bytes.len() {
        match bytes[index] {
            b' ' | b'\t' | b'\r' | b'\n' => index += 1,
            open @ (b'{' | b'[') => {
                let close = if open == b'{' { b'}' } else { b']' };
                let next = skip_whitespace(bytes, index + 1);
                if bytes.get(next) == Some(&close) {
                    output.push(open as char);
                    output.push(close as char);
                    index = next + 1;
                } else {
                    output.push(open as char);
                    depth += 1;
                    newline(&mut output, depth);
                    index += 1;
                }
            }
            close @ (b'}' | b']') => {
                depth = depth.saturating_sub(1);
                newline(&mut output, depth);
                output.push(close as char);
                index += 1;
            }
            b',' => {
                output.push(',');
                newline(&mut output, depth);
                index += 1;
            }
            b':' => {
                output.push_str(": ");
                index += 1;
            }
            b'"' => {
                let end = string_end(bytes, index);
                output.push_str(&content[index..end]);
                index = end;
            }
            _ => {
                let start = index;
                while index < bytes.len()
                    && !matches!(
                        bytes[index],
                        b' ' | b'\t' | b'\r' | b'\n' | b',' | b':' | b'{' | b'}' | b'[' | b']'
                    )
                {
                    index += 1;
                }
                output.push_str(&content[start..index]);
            }
        }
    }
    output
}

fn skip_whitespace(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && matches!(bytes[index], b' ' | b'\t' | b'\r' | b'\n') {
        index += 1;
    }
    index
}

/// Index just past the closing quote of the string starting at `start`.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut index = start + 1;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'"' => return index + 1,
            _ => index += 1,
        }
    }
    bytes.len()
}

/// Leaves content exactly as it is.
///
/// For text whose whitespace can be significant (markup text nodes, Markdown
/// hard breaks, disassembly listings): these files are still diffed as text,
/// but never reformatted.
pub struct VerbatimRule;

impl FormatRule for VerbatimRule {
    fn name(&self) -> &'static str {
        "verbatim"
    }

    fn extensions(&self) -> &[&'static str] {
        &["xml", "smali", "txt", "md", "markdown"]
    }

    fn format(&self, content: &str, _config: &FormatConfig) -> String {
        content.to_string()
    }
}
