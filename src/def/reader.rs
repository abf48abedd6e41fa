// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::path::Path;

use log::{error, info};

use super::{def_parser::parse_def, Def};
use crate::error::{ChipError, ChipResult};

pub struct DefReader;

impl DefReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> ChipResult<Def> {
        let path = path.as_ref();
        info!("Loading DEF file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| ChipError::io(path, e))?;
        match parse_def(&content) {
            Ok(def) => {
                info!(
                    "DEF parsed: design \"{}\", {} components, {} nets, {} route segments",
                    def.design,
                    def.components.len(),
                    def.nets.len(),
                    def.route_count()
                );
                Ok(def)
            }
            Err(e) => {
                error!("Failed to parse DEF file {}: {e}", path.display());
                Err(e)
            }
        }
    }
}

impl Default for DefReader {
    fn default() -> Self {
        Self::new()
    }
}
