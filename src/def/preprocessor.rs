// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! DEF/LEF Preprocessor
//!
//! Turns raw text into logical statements:
//! - Removes comments (`#` at line start or after whitespace)
//! - Merges physical lines until a semicolon closes the statement
//! - Keeps block keywords (`END`, and for LEF `MACRO`, `PIN`, `PORT`, `OBS`, ...)
//!   on a logical line of their own
//! - Records which physical lines each logical line came from

/// Block keywords that stand alone in DEF
pub const DEF_BLOCK_KEYWORDS: &[&str] = &["END"];

/// Block keywords that stand alone in LEF
pub const LEF_BLOCK_KEYWORDS: &[&str] = &[
    "END",
    "MACRO",
    "PIN",
    "PORT",
    "OBS",
    "LAYER",
    "VIA",
    "VIARULE",
    "SITE",
    "UNITS",
    "PROPERTYDEFINITIONS",
    "NONDEFAULTRULE",
    "SPACING",
];

/// Physical line range (0-indexed, inclusive) behind one logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMapping {
    pub original_start: usize,
    pub original_end: usize,
}

/// Logical statements plus their source line mapping
#[derive(Debug, Default)]
pub struct Preprocessed {
    pub lines: Vec<String>,
    pub mappings: Vec<LineMapping>,
}

impl Preprocessed {
    fn push(&mut self, line: String, original_start: usize, original_end: usize) {
        self.lines.push(line);
        self.mappings.push(LineMapping {
            original_start,
            original_end,
        });
    }

    pub fn get_original_range(&self, logical_line: usize) -> Option<(usize, usize)> {
        self.mappings
            .get(logical_line)
            .map(|m| (m.original_start, m.original_end))
    }

    /// 1-based number of the first physical line behind `logical_line`
    pub fn line_number(&self, logical_line: usize) -> usize {
        self.get_original_range(logical_line)
            .map(|(start, _)| start + 1)
            .unwrap_or(logical_line + 1)
    }
}

/// Preprocess DEF content
pub fn preprocess(content: &str) -> Preprocessed {
    preprocess_with(content, DEF_BLOCK_KEYWORDS)
}

/// Preprocess with a caller-supplied set of standalone block keywords. A
/// physical line whose first word is one of `block_keywords` and that carries
/// no semicolon closes any pending statement and becomes a logical line
/// by itself.
pub fn preprocess_with(content: &str, block_keywords: &[&str]) -> Preprocessed {
    let mut result = Preprocessed::default();
    let mut current = String::new();
    let mut start: usize = 0;
    let mut last: usize = 0;

    for (i, raw) in content.lines().enumerate() {
        let trimmed = remove_comment(raw).trim();
        if trimmed.is_empty() {
            continue;
        }

        let first = trimmed.split_whitespace().next().unwrap_or_default();
        if !trimmed.contains(';') && block_keywords.contains(&first) {
            if !current.is_empty() {
                result.push(std::mem::take(&mut current), start, last);
            }
            result.push(trimmed.to_string(), i, i);
            continue;
        }

        if current.is_empty() {
            start = i;
        } else {
            current.push(' ');
        }
        current.push_str(trimmed);
        last = i;

        if trimmed.contains(';') {
            result.push(std::mem::take(&mut current), start, i);
        }
    }

    if !current.is_empty() {
        result.push(current, start, last);
    }
    result
}

fn remove_comment(line: &str) -> &str {
    match find_comment_start(line) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Position of a `#` at line start or after a space or tab
fn find_comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    (0..bytes.len()).find(|&i| {
        bytes[i] == b'#' && (i == 0 || bytes[i - 1] == b' ' || bytes[i - 1] == b'\t')
    })
}
