// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::error::{ChipError, ChipResult};
use crate::gds::BoundBox;

#[derive(Debug, Serialize)]
pub struct CellBoxRecord {
    #[serde(rename = "Structure")]
    pub name: String,
    #[serde(rename = "Xmin")]
    pub xmin: i32,
    #[serde(rename = "Ymin")]
    pub ymin: i32,
    #[serde(rename = "Xmax")]
    pub xmax: i32,
    #[serde(rename = "Ymax")]
    pub ymax: i32,
}

fn cell_box_record(name: &str, bbox: &BoundBox) -> CellBoxRecord {
    CellBoxRecord {
        name: name.to_string(),
        xmin: bbox.xmin(),
        ymin: bbox.ymin(),
        xmax: bbox.xmax(),
        ymax: bbox.ymax(),
    }
}

/// Export the cached cell bounding boxes (database units) to a CSV file
pub fn export_cell_boxes_to_csv(
    boxes: &BTreeMap<String, BoundBox>,
    path: impl AsRef<Path>,
) -> ChipResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| ChipError::io(path, e))?;
    let mut writer = Writer::from_writer(file);

    for (name, bbox) in boxes {
        writer.serialize(cell_box_record(name, bbox))?;
    }

    writer.flush().map_err(|e| ChipError::io(path, e))?;
    Ok(())
}
