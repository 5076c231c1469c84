//! Locale-style string ordering for patch record paths.
//!
//! Follows the ICU root collation closely enough for file paths: punctuation
//! sorts before digits, digits before letters, and letters compare without
//! regard to case before case is used to break ties.

use std::cmp::Ordering;

/// ASCII punctuation and symbols in root collation order.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Whitespace,
    Punctuation,
    Digit,
    Letter,
}

fn primary_key(c: char) -> (Class, u32) {
    if c.is_whitespace() {
        (Class::Whitespace, c as u32)
    } else if c.is_numeric() {
        (Class::Digit, c.to_digit(10).unwrap_or(c as u32))
    } else if c.is_alphabetic() {
        (Class::Letter, fold_case(c) as u32)
    } else {
        let rank = PUNCTUATION_ORDER
            .chars()
            .position(|p| p == c)
            .map(|index| index as u32)
            .unwrap_or(PUNCTUATION_ORDER.len() as u32 + c as u32);
        (Class::Punctuation, rank)
    }
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Compare two strings the way a locale-aware comparator would.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_key)
        .cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    // Same letters, so only case can differ: lowercase sorts first.
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }
    }

    a.cmp(b)
}
