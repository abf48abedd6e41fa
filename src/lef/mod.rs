// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! LEF cell library records

use serde::{Deserialize, Serialize};

pub mod lef_parser;
pub mod reader;

pub use lef_parser::parse_lef;
pub use reader::LefReader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LefRect {
    pub layer: String,
    pub xl: f64,
    pub yl: f64,
    pub xh: f64,
    pub yh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    In,
    Out,
    InOut,
}

impl PinDirection {
    /// Map a `DIRECTION` keyword. Clock pins count as inputs.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "INPUT" | "IN" | "CLK" => Some(PinDirection::In),
            "OUTPUT" | "OUT" => Some(PinDirection::Out),
            "INOUT" | "FEEDTHRU" => Some(PinDirection::InOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LefPort {
    pub rects: Vec<LefRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LefPin {
    pub name: String,
    pub direction: Option<PinDirection>,
    pub use_type: String,
    pub ports: Vec<LefPort>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LefMacro {
    pub name: String,
    pub class: String,
    pub origin: (f64, f64),
    pub size_x: f64,
    pub size_y: f64,
    pub pins: Vec<LefPin>,
    pub obs: Vec<LefRect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lef {
    pub macros: Vec<LefMacro>,
}

impl Lef {
    pub fn find_macro(&self, name: &str) -> Option<&LefMacro> {
        self.macros.iter().find(|m| m.name == name)
    }

    pub fn pin_count(&self) -> usize {
        self.macros.iter().map(|m| m.pins.len()).sum()
    }

    pub fn rect_count(&self) -> usize {
        self.macros
            .iter()
            .map(|m| {
                m.obs.len()
                    + m.pins
                        .iter()
                        .flat_map(|p| p.ports.iter())
                        .map(|port| port.rects.len())
                        .sum::<usize>()
            })
            .sum()
    }
}
