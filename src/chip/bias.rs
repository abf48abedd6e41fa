// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Bias network
//!
//! Horizontal rails run one row above each interior placement row, two
//! vertical rails close them at the column extremes, and every non-pad gate
//! gets a short vertical stub through its gate-height line at its tap.

use std::collections::BTreeSet;

use log::{info, warn};

use super::{ChipSmith, BIASES, COMPONENTS, LAYER_BIAS};
use crate::gds::{path, struct_refs, GdsElement, GdsPoint, GdsStruct, GdsStructRef};
use crate::units::{config_to_db, width_to_db, BIAS_ROW_MARGIN};

/// Rail rows: each distinct `y + offset`, without the lowest and highest.
/// `None` when fewer than three distinct rows exist.
pub fn bias_rows(ys: impl IntoIterator<Item = i32>, offset: i32) -> Option<Vec<i32>> {
    let rows: BTreeSet<i32> = ys.into_iter().map(|y| y + offset).collect();
    if rows.len() < 3 {
        return None;
    }
    let inner = rows.len() - 2;
    Some(rows.into_iter().skip(1).take(inner).collect())
}

fn vertical(x: i32, y0: i32, y1: i32, width: i32) -> GdsElement {
    path(
        LAYER_BIAS,
        width,
        vec![GdsPoint::new(x, y0), GdsPoint::new(x, y1)],
    )
}

fn horizontal(y: i32, x0: i32, x1: i32, width: i32) -> GdsElement {
    path(
        LAYER_BIAS,
        width,
        vec![GdsPoint::new(x0, y), GdsPoint::new(x1, y)],
    )
}

impl ChipSmith {
    /// Horizontal extent of the rails: the outermost cell box edges over
    /// non-pad instances, widened by half a grid pitch on each side
    fn bias_columns(&self, gates: &[&GdsStructRef]) -> Option<(i32, i32)> {
        let mut extent: Option<(i32, i32)> = None;
        for sref in gates {
            let Some(bbox) = self.cell_boxes.get(&sref.name) else {
                warn!("No cached box for \"{}\", left out of the bias columns", sref.name);
                continue;
            };
            let (lo, hi) = (bbox.xmin() + sref.xy.x, bbox.xmax() + sref.xy.x);
            extent = Some(match extent {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        let half = self.grid_factor() / 2;
        extent.map(|(min, max)| (min - half, max + half))
    }

    /// Compose the `Biases` structure from the placed `Components`
    pub fn place_bias(&mut self) {
        info!("Routing biases.");
        let params = &self.config.params;
        let width = width_to_db(params.ptl_width);
        let gate_height = config_to_db(params.gate_height);
        let half = self.grid_factor() / 2;

        let mut biases = GdsStruct::new(BIASES);
        let srefs: Vec<&GdsStructRef> = self
            .lib
            .get(COMPONENTS)
            .map(|s| struct_refs(s).collect())
            .unwrap_or_default();
        let gates: Vec<&GdsStructRef> = srefs
            .iter()
            .copied()
            .filter(|s| s.name != params.pad_cell)
            .collect();

        let rows = bias_rows(srefs.iter().map(|s| s.xy.y), BIAS_ROW_MARGIN + gate_height);
        let columns = self.bias_columns(&gates);

        match (rows, columns) {
            (None, _) => warn!("Fewer than three placement rows, no bias network possible"),
            (_, None) => warn!("No non-pad gates to bias"),
            (Some(rows), Some((col_min, col_max))) => {
                for &row in &rows {
                    biases.elems.push(horizontal(row, col_min, col_max, width));
                }
                if let (Some(&first), Some(&last)) = (rows.first(), rows.last()) {
                    biases.elems.push(vertical(col_min, first, last, width));
                    biases.elems.push(vertical(col_max, first, last, width));
                }

                for sref in &gates {
                    let tap = match self.config.bias_taps.get(&sref.name) {
                        Some(&tap) => tap,
                        None => {
                            warn!("No bias coordinate for \"{}\", tapping at its origin", sref.name);
                            0
                        }
                    };
                    let x = sref.xy.x + config_to_db(tap);
                    let y = sref.xy.y + gate_height;
                    biases.elems.push(vertical(x, y + half, y - half, width));
                }
            }
        }

        info!("Routed {} bias paths.", biases.elems.len());
        self.lib.append(biases);
        info!("Routing biases, done.");
    }
}
