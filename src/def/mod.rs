// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! DEF placement and routing records. All coordinates are integer placement
//! units.

use serde::{Deserialize, Serialize};

pub mod def_parser;
pub mod parser;
pub mod preprocessor;
pub mod reader;

pub use def_parser::parse_def;
pub use reader::DefReader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefPlacement {
    pub placement_type: String, // PLACED, FIXED, COVER
    pub x: i32,
    pub y: i32,
    pub orientation: String, // N, S, E, W, FN, FS, FE, FW
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefComponent {
    pub name: String,
    pub macro_name: String,
    pub placement: Option<DefPlacement>,
}

impl DefComponent {
    /// Placed location; unplaced components sit at the origin
    pub fn location(&self) -> (i32, i32) {
        self.placement
            .as_ref()
            .map(|p| (p.x, p.y))
            .unwrap_or((0, 0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefConnection {
    pub instance: String,
    pub pin: String,
}

/// One `ROUTED`/`NEW` wire segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefRoute {
    pub layer: String,
    pub points: Vec<(i32, i32)>,
    pub via: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefNet {
    pub name: String,
    pub connections: Vec<DefConnection>,
    pub routes: Vec<DefRoute>,
    /// `+ USE` value, empty when absent
    pub use_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Def {
    pub design: String,
    pub dbu_per_micron: Option<u32>,
    pub die_area_points: Vec<(i32, i32)>,
    pub components: Vec<DefComponent>,
    pub nets: Vec<DefNet>,
}

impl Def {
    /// Distinct cell types in first-use order
    pub fn cell_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for comp in &self.components {
            if !seen.contains(&comp.macro_name.as_str()) {
                seen.push(comp.macro_name.as_str());
            }
        }
        seen
    }

    pub fn route_count(&self) -> usize {
        self.nets.iter().map(|n| n.routes.len()).sum()
    }
}
