// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Cell and fill structure import

use std::path::Path;

use log::{debug, error, info, warn};

use super::{ChipSmith, LAYER_METAL1, LAYER_METAL2, LAYER_OUTLINE};
use crate::error::{ChipError, ChipResult};
use crate::gds::{rect, GdsStruct};
use crate::lef::LefMacro;
use crate::units::{lef_to_db, snap_to_grid};

/// Outline structure for a LEF macro. The pad cell gets its outline on both
/// routing layers instead of the outline layer.
pub fn synthesize_cell(name: &str, mac: &LefMacro, is_pad: bool) -> GdsStruct {
    let (w, h) = (lef_to_db(mac.size_x), lef_to_db(mac.size_y));
    let mut strukt = GdsStruct::new(name);
    if is_pad {
        strukt.elems.push(rect(LAYER_METAL1, 0, 0, w, h));
        strukt.elems.push(rect(LAYER_METAL2, 0, 0, w, h));
    } else {
        strukt.elems.push(rect(LAYER_OUTLINE, 0, 0, w, h));
    }
    strukt
}

impl ChipSmith {
    /// Import a GDS file once; later requests for the same path are no-ops
    fn import_gds(&mut self, path: &Path) -> ChipResult<()> {
        if !self.imported.insert(path.to_path_buf()) {
            debug!("\"{}\" already imported", path.display());
            return Ok(());
        }
        let count = self.lib.import(path)?;
        debug!("Imported {count} structures from \"{}\"", path.display());
        Ok(())
    }

    /// Resolve every cell type used by the design to a structure: a
    /// ready-made GDS file when one is configured, otherwise an outline
    /// synthesized from the LEF macro. Then cache the grid-snapped bounding
    /// box of every resolved structure.
    pub fn import_gates(&mut self) -> ChipResult<()> {
        info!("Defining gate structures.");

        let cells: Vec<(String, String)> = self
            .def
            .cell_types()
            .into_iter()
            .map(|cell| {
                let name = match self.config.struct_name(cell) {
                    Some(name) => name.to_string(),
                    None => {
                        warn!("Cell type \"{cell}\" has no structure name mapping");
                        String::new()
                    }
                };
                (cell.to_string(), name)
            })
            .collect();

        for (cell, name) in &cells {
            if let Some(path) = self.config.cell_gds.get(name).cloned() {
                debug!("Cell \"{cell}\" uses ready-made structure \"{name}\"");
                self.import_gds(&path)?;
            } else if let Some(mac) = self.lef.find_macro(cell) {
                debug!("Cell \"{cell}\" synthesized from its LEF macro");
                let strukt = synthesize_cell(cell, mac, *cell == self.config.params.pad_cell);
                self.lib.append(strukt);
            } else {
                error!("Missing GDS and LEF definition for gate \"{cell}\"");
                return Err(ChipError::MissingDefinition(cell.clone()));
            }
        }

        let factor = self.grid_factor();
        for (cell, name) in &cells {
            if self.cell_boxes.contains_key(name) {
                continue;
            }
            if self.lib.find(name).is_none() {
                warn!("No structure \"{name}\" for cell type \"{cell}\", its box is not cached");
                continue;
            }
            let bbox = self.lib.bounding_box(name)?;
            let snapped = bbox.map(|v| snap_to_grid(v, factor));
            debug!(
                "Cell \"{name}\" box ({}, {}) - ({}, {})",
                snapped.xmin(),
                snapped.ymin(),
                snapped.xmax(),
                snapped.ymax()
            );
            self.cell_boxes.insert(name.clone(), snapped);
        }

        info!("Defining gate structures, done.");
        Ok(())
    }

    /// Import every configured fill cell file, in key order
    pub fn import_fill(&mut self) -> ChipResult<()> {
        info!("Importing fill structures.");
        let paths: Vec<_> = self.config.fill_gds.values().cloned().collect();
        for path in &paths {
            self.import_gds(path)?;
        }
        info!("Importing fill structures, done.");
        Ok(())
    }
}
