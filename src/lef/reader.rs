// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::fs;
use std::path::Path;

use log::{error, info};

use super::Lef;
use crate::error::{ChipError, ChipResult};

pub struct LefReader;

impl LefReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read<P: AsRef<Path>>(&self, path: P) -> ChipResult<Lef> {
        let path = path.as_ref();
        info!("Loading LEF file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| ChipError::io(path, e))?;
        match super::lef_parser::parse_lef(&content) {
            Ok(lef) => {
                info!(
                    "LEF parsed: {} macros, {} pins, {} rects",
                    lef.macros.len(),
                    lef.pin_count(),
                    lef.rect_count()
                );
                Ok(lef)
            }
            Err(e) => {
                error!("Failed to parse LEF file {}: {e}", path.display());
                Err(e)
            }
        }
    }
}

impl Default for LefReader {
    fn default() -> Self {
        Self::new()
    }
}
