// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! NETS item parser

use super::common::*;
use super::{ContinuationResult, DefItemParser, ParseResult};
use crate::def::{DefConnection, DefNet, DefRoute};

/// Context for parsing a single NET
#[derive(Debug)]
pub struct NetContext {
    pub name: String,
    pub connections: Vec<DefConnection>,
    pub routes: Vec<DefRoute>,
    pub use_type: String,
}

impl NetContext {
    pub fn new(name: String) -> Self {
        Self {
            name,
            connections: Vec::new(),
            routes: Vec::new(),
            use_type: String::new(),
        }
    }
}

/// Parser for `- name ( inst pin ) ... + ROUTED layer ( x y ) ... NEW ... ;`
pub struct DefNetParser;

impl DefNetParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefNetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DefItemParser for DefNetParser {
    type Item = DefNet;
    type Context = NetContext;

    fn parse_header(&self, line: &str) -> Option<Self::Context> {
        item_name(line).map(|name| NetContext::new(name.to_string()))
    }

    fn parse_continuation(&self, context: &mut Self::Context, line: &str) -> ContinuationResult {
        let trimmed = line.trim();
        if let Err(msg) = self.parse_line_attributes(context, trimmed) {
            return ContinuationResult::Error(msg);
        }
        if trimmed.ends_with(';') {
            ContinuationResult::Complete
        } else {
            ContinuationResult::Continue
        }
    }

    fn finalize(&self, context: Self::Context) -> ParseResult<Self::Item> {
        Ok(DefNet {
            name: context.name,
            connections: context.connections,
            routes: context.routes,
            use_type: context.use_type,
        })
    }

    fn item_name() -> &'static str {
        "NETS"
    }
}

impl DefNetParser {
    /// Walk every token of a net statement. Connections come before the
    /// first `+`; each `ROUTED`/`NEW` opens a wire segment.
    fn parse_line_attributes(&self, context: &mut NetContext, line: &str) -> Result<(), String> {
        let body = clean_semicolon(line).trim();
        let parts: Vec<&str> = body.split_whitespace().collect();
        let start = if is_item_header(body) { 2 } else { 0 };

        let mut current: Option<DefRoute> = None;
        let mut last: Option<(i32, i32)> = None;
        let mut after_plus = false;
        let mut i = start;

        while i < parts.len() {
            let part = parts[i];
            let opens_route = (after_plus && ROUTE_KEYWORDS.contains(&part))
                || (part == "NEW" && current.is_some());
            after_plus = false;

            if opens_route {
                if let Some(route) = current.take() {
                    push_route(context, route);
                }
                let layer = parts
                    .get(i + 1)
                    .ok_or_else(|| format!("net {}: {part} without a layer", context.name))?;
                current = Some(DefRoute {
                    layer: layer.to_string(),
                    points: Vec::new(),
                    via: None,
                });
                last = None;
                i += 2;
                continue;
            }

            if part == "+" {
                if let Some(route) = current.take() {
                    push_route(context, route);
                }
                after_plus = true;
                i += 1;
                continue;
            }

            match (part, current.as_mut()) {
                ("(", Some(route)) => {
                    let (point, next) = parse_point(&parts, i, last).ok_or_else(|| {
                        format!("net {}: malformed route point", context.name)
                    })?;
                    route.points.push(point);
                    last = Some(point);
                    i = next;
                }
                ("TAPERRULE" | "STYLE" | "MASK", Some(_)) => i += 2,
                ("TAPER" | "VIRTUAL", Some(_)) => i += 1,
                ("RECT", Some(_)) => {
                    i += parts[i..].iter().position(|&p| p == ")").unwrap_or(0) + 1;
                }
                (via, Some(route)) => {
                    if route.via.is_none() {
                        route.via = Some(via.to_string());
                    }
                    i += 1;
                }
                ("(", None) => {
                    // ( inst pin ) connection, possibly ( PIN name )
                    match (parts.get(i + 1), parts.get(i + 2), parts.get(i + 3)) {
                        (Some(inst), Some(pin), Some(&")")) => {
                            context.connections.push(DefConnection {
                                instance: inst.to_string(),
                                pin: pin.to_string(),
                            });
                            i += 4;
                        }
                        _ => return Err(format!("net {}: malformed connection", context.name)),
                    }
                }
                ("USE", None) => {
                    if let Some(use_type) = parts.get(i + 1) {
                        context.use_type = use_type.to_string();
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }

        if let Some(route) = current.take() {
            push_route(context, route);
        }
        Ok(())
    }
}

fn push_route(context: &mut NetContext, route: DefRoute) {
    if !route.points.is_empty() {
        context.routes.push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> NetContext {
        let parser = DefNetParser::new();
        let mut context = parser.parse_header(line).unwrap();
        let result = parser.parse_continuation(&mut context, line);
        assert_eq!(result, ContinuationResult::Complete);
        context
    }

    #[test]
    fn test_parse_connections() {
        let context = parse("- N1 ( I1 A ) ( I2 B ) ( PIN clk ) + USE SIGNAL ;");
        assert_eq!(context.name, "N1");
        assert_eq!(context.connections.len(), 3);
        assert_eq!(context.connections[0].instance, "I1");
        assert_eq!(context.connections[1].pin, "B");
        assert_eq!(context.connections[2].instance, "PIN");
        assert_eq!(context.use_type, "SIGNAL");
        assert!(context.routes.is_empty());
    }

    #[test]
    fn test_parse_routing_with_wildcards() {
        let context =
            parse("- n ( a Y ) ( b A ) + ROUTED metal2 ( 1000 2000 ) ( * 3000 ) ( 1500 * ) ;");
        assert_eq!(context.routes.len(), 1);
        let route = &context.routes[0];
        assert_eq!(route.layer, "metal2");
        assert_eq!(route.points, vec![(1000, 2000), (1000, 3000), (1500, 3000)]);
        assert_eq!(route.via, None);
    }

    #[test]
    fn test_new_opens_segments() {
        let context = parse(
            "- n ( a Y ) ( b A ) + ROUTED metal1 ( 0 0 ) ( 0 500 ) M2_M1 NEW metal2 ( 0 500 ) ( 800 * ) NEW metal1 ( 800 500 ) ;",
        );
        assert_eq!(context.routes.len(), 3);
        assert_eq!(context.routes[0].via.as_deref(), Some("M2_M1"));
        assert_eq!(context.routes[1].layer, "metal2");
        assert_eq!(context.routes[1].points, vec![(0, 500), (800, 500)]);
        // Single-vertex segments are kept
        assert_eq!(context.routes[2].points, vec![(800, 500)]);
    }

    #[test]
    fn test_attributes_after_routing() {
        let context = parse("- n ( a Y ) + ROUTED metal1 ( 0 0 ) ( 10 0 ) + USE CLOCK ;");
        assert_eq!(context.routes.len(), 1);
        assert_eq!(context.routes[0].points.len(), 2);
    }

    #[test]
    fn test_wildcard_without_previous_point() {
        let parser = DefNetParser::new();
        let line = "- n + ROUTED metal1 ( * 0 ) ;";
        let mut context = parser.parse_header(line).unwrap();
        assert!(matches!(
            parser.parse_continuation(&mut context, line),
            ContinuationResult::Error(_)
        ));
    }
}
