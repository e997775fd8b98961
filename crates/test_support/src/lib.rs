//! Helpers shared by integration tests: fixture loading, readable line diffs
//! and escaping for one-line snapshots.

mod fixtures;

pub use crate::fixtures::{fixture_path, load_json, load_toml};

use std::fmt::Write;

/// Escape control characters and quotes so text fits on one snapshot line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Describe the first differing line with two lines of context either side.
/// Returns `None` when the inputs are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> Option<String> {
    if expected == actual {
        return None;
    }
    const MISSING: &str = "<missing>";
    fn line(lines: &[String], i: usize) -> &str {
        lines.get(i).map_or(MISSING, String::as_str)
    }
    let max = expected.len().max(actual.len());
    let mut out = String::new();
    match (0..max).find(|&i| line(expected, i) != line(actual, i)) {
        Some(i) => {
            let start = i.saturating_sub(2);
            let end = (i + 3).min(max);
            let _ = writeln!(out, "first mismatch at line {} (showing {}..={}):", i + 1, start + 1, end);
            for idx in start..end {
                let marker = if idx == i { ">" } else { " " };
                let _ = writeln!(out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
                let _ = writeln!(out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
            }
        }
        None => {
            let _ = writeln!(out, "prefix matched but lengths differ");
        }
    }
    let _ = writeln!(out, "expected {} lines, actual {} lines", expected.len(), actual.len());
    Some(out)
}

/// Panic with a [`diff_lines`] report when the line lists differ.
#[track_caller]
pub fn assert_lines_eq(context: &str, expected: &[String], actual: &[String]) {
    if let Some(diff) = diff_lines(expected, actual) {
        panic!("{context}: output mismatch\n{diff}");
    }
}
