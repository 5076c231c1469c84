//! Line-hunk diff codec.
//!
//! Hunks are stored in the structured form that JavaScript diff tooling
//! emits: 1-based starts, line counts, and prefixed line strings without
//! their terminators.

use diffy::{DiffOptions, Line};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::patch::{CONTEXT_LINES, NO_NEWLINE_MARKER};

/// A contiguous block of line changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    pub lines: Vec<String>,
}

/// Reasons a hunk could not be applied to a base text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HunkError {
    #[error("hunk {hunk} is malformed: {reason}")]
    Malformed { hunk: usize, reason: String },
    #[error("hunk {hunk} starts at line {line}, past the end of the file")]
    OutOfRange { hunk: usize, line: usize },
    #[error("hunk {hunk} does not match line {line}: expected {expected:?}, found {actual:?}")]
    Mismatch {
        hunk: usize,
        line: usize,
        expected: String,
        actual: String,
    },
    #[error("hunk {hunk} expects line {line} to end with a newline")]
    MissingNewline { hunk: usize, line: usize },
    #[error("hunk {hunk} expects line {line} to end without a newline")]
    UnexpectedNewline { hunk: usize, line: usize },
}

fn unify_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Compute the hunks that turn `old` into `new`.
///
/// `\r\n` and lone `\r` terminators are read as `\n` on both sides, so
/// content that differs only in line endings produces no hunks.
pub fn create_hunks(old: &str, new: &str) -> Vec<Hunk> {
    let old = unify_line_endings(old);
    let new = unify_line_endings(new);

    let mut options = DiffOptions::new();
    options.set_context_len(CONTEXT_LINES);
    let patch = options.create_patch(&old, &new);

    patch
        .hunks()
        .iter()
        .map(|hunk| {
            let old_range = hunk.old_range();
            let new_range = hunk.new_range();

            let mut lines = Vec::with_capacity(hunk.lines().len());
            for line in hunk.lines() {
                let (prefix, text) = match line {
                    Line::Context(text) => (' ', *text),
                    Line::Delete(text) => ('-', *text),
                    Line::Insert(text) => ('+', *text),
                };
                match text.strip_suffix('\n') {
                    Some(body) => lines.push(format!("{prefix}{body}")),
                    None => {
                        lines.push(format!("{prefix}{text}"));
                        lines.push(NO_NEWLINE_MARKER.to_string());
                    }
                }
            }

            Hunk {
                old_start: range_start(old_range.start(), old_range.len()),
                old_lines: old_range.len(),
                new_start: range_start(new_range.start(), new_range.len()),
                new_lines: new_range.len(),
                lines,
            }
        })
        .collect()
}

// An empty side only occurs when that whole file is empty; it starts at 1.
fn range_start(start: usize, len: usize) -> usize {
    if len == 0 { 1 } else { start }
}

/// Split text into lines on `\r\n`, `\n` or `\r`, each keeping its
/// terminator.
fn split_keeping_terminators(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(index) = rest.find(['\r', '\n']) {
        let end = if rest[index..].starts_with("\r\n") {
            index + 2
        } else {
            index + 1
        };
        lines.push(&rest[..end]);
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Terminator of the first line, `\n` when there is none.
fn detect_eol(text: &str) -> &'static str {
    match text.find(['\r', '\n']) {
        Some(index) if text[index..].starts_with("\r\n") => "\r\n",
        Some(index) if text[index..].starts_with('\r') => "\r",
        _ => "\n",
    }
}

fn line_body(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn has_terminator(line: &str) -> bool {
    line.ends_with(['\n', '\r'])
}

/// Apply hunks to `base` at exactly the positions they record.
///
/// Context and removed lines must match the base. Lines outside the hunks and
/// context lines keep their original terminators; inserted lines use the
/// terminator of the base's first line.
pub fn apply_hunks(base: &str, hunks: &[Hunk]) -> Result<String, HunkError> {
    let base_lines = split_keeping_terminators(base);
    let eol = detect_eol(base);

    let mut output = String::with_capacity(base.len());
    let mut cursor = 0;

    for (index, hunk) in hunks.iter().enumerate() {
        let number = index + 1;
        check_counts(number, hunk)?;

        let start = hunk.old_start.saturating_sub(1);
        if start < cursor {
            return Err(HunkError::Malformed {
                hunk: number,
                reason: "overlaps the previous hunk".to_string(),
            });
        }
        if start > base_lines.len() {
            return Err(HunkError::OutOfRange {
                hunk: number,
                line: hunk.old_start,
            });
        }

        for line in &base_lines[cursor..start] {
            output.push_str(line);
        }
        cursor = start;

        let mut entries = hunk.lines.iter().peekable();
        while let Some(entry) = entries.next() {
            let no_newline = entries
                .peek()
                .is_some_and(|next| next.as_str() == NO_NEWLINE_MARKER);

            if entry.as_str() == NO_NEWLINE_MARKER {
                continue;
            }

            let mut chars = entry.chars();
            let prefix = chars.next();
            let body = chars.as_str();

            match prefix {
                Some(' ') | Some('-') => {
                    let Some(actual) = base_lines.get(cursor) else {
                        return Err(HunkError::OutOfRange {
                            hunk: number,
                            line: cursor + 1,
                        });
                    };
                    if line_body(actual) != body {
                        return Err(HunkError::Mismatch {
                            hunk: number,
                            line: cursor + 1,
                            expected: body.to_string(),
                            actual: line_body(actual).to_string(),
                        });
                    }
                    match (no_newline, has_terminator(actual)) {
                        (true, true) => {
                            return Err(HunkError::UnexpectedNewline {
                                hunk: number,
                                line: cursor + 1,
                            });
                        }
                        (false, false) => {
                            return Err(HunkError::MissingNewline {
                                hunk: number,
                                line: cursor + 1,
                            });
                        }
                        _ => {}
                    }
                    if prefix == Some(' ') {
                        output.push_str(actual);
                    }
                    cursor += 1;
                }
                Some('+') => {
                    output.push_str(body);
                    if !no_newline {
                        output.push_str(eol);
                    }
                }
                _ => {
                    return Err(HunkError::Malformed {
                        hunk: number,
                        reason: format!("unrecognized line {entry:?}"),
                    });
                }
            }
        }
    }

    for line in &base_lines[cursor..] {
        output.push_str(line);
    }

    Ok(output)
}

fn check_counts(number: usize, hunk: &Hunk) -> Result<(), HunkError> {
    let mut old_lines = 0;
    let mut new_lines = 0;
    for line in &hunk.lines {
        match line.chars().next() {
            Some(' ') => {
                old_lines += 1;
                new_lines += 1;
            }
            Some('-') => old_lines += 1,
            Some('+') => new_lines += 1,
            _ => {}
        }
    }

    if old_lines != hunk.old_lines || new_lines != hunk.new_lines {
        return Err(HunkError::Malformed {
            hunk: number,
            reason: format!(
                "header says -{},{} +{},{} but lines give {} old and {} new",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines, old_lines, new_lines
            ),
        });
    }
    Ok(())
}
