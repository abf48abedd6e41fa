// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Token helpers shared by the DEF item parsers

/// Routing statement keywords that open a new wire segment
pub const ROUTE_KEYWORDS: &[&str] = &["ROUTED", "NEW", "FIXED", "COVER", "NOSHIELD"];

/// Parse one integer coordinate. `*` repeats `previous`.
pub fn parse_coordinate(token: &str, previous: Option<i32>) -> Option<i32> {
    if token == "*" {
        return previous;
    }
    token
        .parse::<i32>()
        .ok()
        .or_else(|| token.parse::<f64>().ok().map(|v| v.round() as i32))
}

/// Parse `( x y [ext] )` starting at `parts[start]`. Returns the point and
/// the index just past the closing parenthesis.
pub fn parse_point(
    parts: &[&str],
    start: usize,
    previous: Option<(i32, i32)>,
) -> Option<((i32, i32), usize)> {
    if parts.get(start) != Some(&"(") {
        return None;
    }
    let close = start + parts[start..].iter().position(|&p| p == ")")?;
    let values = &parts[start + 1..close];
    if values.len() < 2 || values.len() > 3 {
        return None;
    }
    let x = parse_coordinate(values[0], previous.map(|p| p.0))?;
    let y = parse_coordinate(values[1], previous.map(|p| p.1))?;
    Some(((x, y), close + 1))
}

/// Clean semicolon from the end of a string
pub fn clean_semicolon(s: &str) -> &str {
    s.trim_end_matches(';')
}

/// Check if a line starts a new item (`- name ...`)
pub fn is_item_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('-')
        && trimmed.len() > 1
        && trimmed.chars().nth(1).is_some_and(|c| c.is_whitespace())
}

/// Item name following the leading dash
pub fn item_name(line: &str) -> Option<&str> {
    if !is_item_header(line) {
        return None;
    }
    line.split_whitespace().nth(1).map(clean_semicolon)
}
