// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! COMPONENTS item parser

use log::warn;

use super::common::{clean_semicolon, is_item_header, parse_point};
use super::{ContinuationResult, DefItemParser, ParseResult};
use crate::def::{DefComponent, DefPlacement};

/// Context for parsing a single component
#[derive(Debug, Clone)]
pub struct ComponentContext {
    pub name: String,
    pub macro_name: String,
    pub placement: Option<DefPlacement>,
    pub unplaced: bool,
}

impl ComponentContext {
    pub fn new(name: String, macro_name: String) -> Self {
        Self {
            name,
            macro_name,
            placement: None,
            unplaced: false,
        }
    }
}

/// Parser for `- inst TYPE + PLACED ( x y ) orient ;`
pub struct DefComponentParser;

impl DefItemParser for DefComponentParser {
    type Item = DefComponent;
    type Context = ComponentContext;

    fn parse_header(&self, line: &str) -> Option<Self::Context> {
        let trimmed = line.trim();
        if !is_item_header(trimmed) {
            return None;
        }
        let mut parts = trimmed[2..].split_whitespace();
        let name = parts.next()?;
        let macro_name = clean_semicolon(parts.next()?);
        Some(ComponentContext::new(name.to_string(), macro_name.to_string()))
    }

    fn parse_continuation(&self, context: &mut Self::Context, line: &str) -> ContinuationResult {
        let trimmed = line.trim();
        if let Err(msg) = self.parse_component_line(context, trimmed) {
            return ContinuationResult::Error(msg);
        }
        if trimmed.ends_with(';') {
            ContinuationResult::Complete
        } else {
            ContinuationResult::Continue
        }
    }

    fn finalize(&self, context: Self::Context) -> ParseResult<Self::Item> {
        if context.placement.is_none() {
            warn!(
                "Component {} ({}) has no placement, placing it at the origin",
                context.name, context.macro_name
            );
        }
        Ok(DefComponent {
            name: context.name,
            macro_name: context.macro_name,
            placement: context.placement,
        })
    }

    fn item_name() -> &'static str {
        "COMPONENTS"
    }
}

impl DefComponentParser {
    fn parse_component_line(
        &self,
        context: &mut ComponentContext,
        line: &str,
    ) -> Result<(), String> {
        let body = clean_semicolon(line).trim();
        let parts: Vec<&str> = body.split_whitespace().collect();
        let mut i = 0;

        while i < parts.len() {
            match parts[i] {
                "PLACED" | "FIXED" | "COVER" => {
                    let (point, next) = parse_point(&parts, i + 1, None).ok_or_else(|| {
                        format!(
                            "component {}: malformed {} location",
                            context.name, parts[i]
                        )
                    })?;
                    let orientation = parts
                        .get(next)
                        .filter(|p| **p != "+")
                        .copied()
                        .unwrap_or("N");
                    context.placement = Some(DefPlacement {
                        placement_type: parts[i].to_string(),
                        x: point.0,
                        y: point.1,
                        orientation: orientation.to_string(),
                    });
                    i = next + 1;
                }
                "UNPLACED" => {
                    context.unplaced = true;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        Ok(())
    }
}
