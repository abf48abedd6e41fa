// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Layout composition
//!
//! [ChipSmith] owns one run: the parsed LEF and DEF, the configuration, and
//! the [StructTree] every stage writes into. The stages live in their own
//! modules and are run in a fixed order by [ChipSmith::compose]:
//!
//! 1. [import](self::import): resolve each used cell type to a structure
//! 2. [place](self::place): one instance per component into `Components`
//! 3. [route](self::route): net paths into `Nets`, vias into `Vias`
//! 4. [bias](self::bias): rails and stubs into `Biases`
//! 5. [fill](self::fill): density fill into `Fill` and its sub-structures

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::info;

use crate::config::Config;
use crate::def::{Def, DefReader};
use crate::error::ChipResult;
use crate::gds::{sref, BoundBox, GdsStruct, StructTree};
use crate::lef::{Lef, LefReader};
use crate::units;

pub mod bias;
pub mod fill;
pub mod import;
pub mod place;
pub mod route;

pub use fill::{Clearance, FillLayer, OccupancyGrid};

pub const COMPONENTS: &str = "Components";
pub const NETS: &str = "Nets";
pub const VIAS: &str = "Vias";
pub const BIASES: &str = "Biases";
pub const FILL: &str = "Fill";

/// Output layer of `metal1` routes
pub const LAYER_METAL1: i16 = 10;
/// Output layer of `metal2` routes
pub const LAYER_METAL2: i16 = 30;
/// Output layer of bias rails and stubs
pub const LAYER_BIAS: i16 = 50;
/// Outline layer of cells synthesized from LEF macros
pub const LAYER_OUTLINE: i16 = 200;

pub struct ChipSmith {
    config: Config,
    lef: Lef,
    def: Def,
    lib: StructTree,
    /// Structure name -> grid-snapped bounding box
    cell_boxes: BTreeMap<String, BoundBox>,
    imported: HashSet<PathBuf>,
}

impl ChipSmith {
    pub fn new(config: Config, lef: Lef, def: Def) -> Self {
        Self {
            config,
            lef,
            def,
            lib: StructTree::new(""),
            cell_boxes: BTreeMap::new(),
            imported: HashSet::new(),
        }
    }

    /// Read the configuration, the LEF library and the DEF design. Any parse
    /// failure aborts before composition starts.
    pub fn import_data(
        config_path: impl AsRef<Path>,
        lef_path: impl AsRef<Path>,
        def_path: impl AsRef<Path>,
    ) -> ChipResult<Self> {
        let config = Config::load(config_path)?;
        let lef = LefReader::new().read(lef_path)?;
        let def = DefReader::new().read(def_path)?;
        Ok(Self::new(config, lef, def))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn library(&self) -> &StructTree {
        &self.lib
    }

    pub fn into_library(self) -> StructTree {
        self.lib
    }

    pub fn cell_boxes(&self) -> &BTreeMap<String, BoundBox> {
        &self.cell_boxes
    }

    /// Output structure name for DEF cell type `cell`, empty when unmapped
    pub fn struct_name(&self, cell: &str) -> &str {
        self.config.struct_name(cell).unwrap_or_default()
    }

    /// Grid cell side in database units
    pub fn grid_factor(&self) -> i32 {
        units::grid_factor(self.config.params.grid_size)
    }

    /// Run every stage and add the root structure `top`
    pub fn compose(&mut self, top: &str) -> ChipResult<()> {
        let fill = self.config.params.fill;

        self.import_gates()?;
        if fill {
            self.import_fill()?;
        }
        self.place_gates();
        self.place_nets();
        self.place_bias();
        if fill {
            self.place_fill()?;
        }

        let mut root = GdsStruct::new(top);
        let mut parts = vec![COMPONENTS, NETS, VIAS, BIASES];
        if fill {
            parts.push(FILL);
        }
        root.elems
            .extend(parts.into_iter().map(|name| sref(name, 0, 0)));
        self.lib.name = top.to_string();
        self.lib.append(root);
        Ok(())
    }

    /// Compose the layout and write it to `path`. The root structure and the
    /// library are named after the file stem.
    pub fn to_gds(&mut self, path: impl AsRef<Path>) -> ChipResult<()> {
        let path = path.as_ref();
        let top = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "top".to_string());

        self.compose(&top)?;

        info!("Writing GDS file \"{}\".", path.display());
        self.lib.save(path)?;
        info!("Writing GDS file, done.");
        Ok(())
    }
}
