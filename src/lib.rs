// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! ChipSmith Library
//!
//! Composes a hierarchical GDSII layout from a LEF cell library, a placed
//! and routed DEF design and a TOML run configuration, then covers the
//! remaining area with grid-aligned density fill.

pub mod chip;
pub mod config;
pub mod def;
pub mod error;
pub mod export;
pub mod gds;
pub mod lef;
pub mod units;

// Re-export commonly used types
pub use chip::{ChipSmith, FillLayer, OccupancyGrid};
pub use config::Config;
pub use def::{Def, DefComponent, DefNet, DefRoute};
pub use error::{ChipError, ChipResult};
pub use gds::{BoundBox, GdsStruct, GdsStructRef, StructTree};
pub use lef::{Lef, LefMacro, LefPin};
