// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! TOML run configuration

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::error::{ChipError, ChipResult};
use crate::units::MAX_CONFIG_VALUE;

fn default_via_cell() -> String {
    "ViaM1M3".to_string()
}

fn default_pad_cell() -> String {
    "PAD".to_string()
}

/// Default input and output files, used when the command line omits them
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileLocation {
    #[serde(rename = "LEFfile")]
    pub lef: Option<PathBuf>,
    #[serde(rename = "DEFfile")]
    pub def: Option<PathBuf>,
    #[serde(rename = "GDSfile")]
    pub gds: Option<PathBuf>,
}

/// Scalar parameters, all lengths in configuration units (microns)
#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    pub fill: bool,
    /// Fill region as `[x0, y0, x1, y1]`
    #[serde(rename = "fillCor")]
    pub fill_cor: Vec<i32>,
    #[serde(rename = "gateHeights")]
    pub gate_height: i32,
    #[serde(rename = "PTLwidth")]
    pub ptl_width: f64,
    #[serde(rename = "gridSize")]
    pub grid_size: u32,
    #[serde(rename = "viaCell", default = "default_via_cell")]
    pub via_cell: String,
    #[serde(rename = "padCell", default = "default_pad_cell")]
    pub pad_cell: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "File_Location", default)]
    pub files: FileLocation,
    /// Output structure name -> ready-made GDS file
    #[serde(rename = "GDS_CELL_LOCATIONS")]
    pub cell_gds: BTreeMap<String, PathBuf>,
    /// DEF cell type -> output structure name
    #[serde(rename = "GDS_MAIN_STR_NAME")]
    pub struct_names: BTreeMap<String, String>,
    /// Fill cell GDS files, imported in key order
    #[serde(rename = "GDS_LOCATIONS")]
    pub fill_gds: BTreeMap<String, PathBuf>,
    /// Output structure name -> bias tap x offset
    #[serde(rename = "Biasing_Coordinate")]
    pub bias_taps: BTreeMap<String, i32>,
    #[serde(rename = "Parameters")]
    pub params: Parameters,
}

/// Fill region in configuration units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRegion {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl FillRegion {
    /// Grid dimensions `(width, height)` for pitch `pitch`
    pub fn grid_dims(&self, pitch: u32) -> (usize, usize) {
        let pitch = i32::try_from(pitch).unwrap_or(i32::MAX);
        (
            ((self.x1 - self.x0) / pitch) as usize,
            ((self.y1 - self.y0) / pitch) as usize,
        )
    }
}

impl Config {
    /// Read and validate `path`. Relative file paths are resolved against
    /// the directory holding the configuration file.
    pub fn load(path: impl AsRef<Path>) -> ChipResult<Config> {
        let path = path.as_ref();
        info!("Loading configuration \"{}\"", path.display());
        let text = fs::read_to_string(path).map_err(|e| ChipError::io(path, e))?;
        let mut config = Config::parse(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse and validate configuration text. Paths are left as written.
    pub fn parse(text: &str) -> ChipResult<Config> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        debug!(
            "Configuration: {} ready-made cells, {} name mappings, {} fill files, {} bias taps",
            config.cell_gds.len(),
            config.struct_names.len(),
            config.fill_gds.len(),
            config.bias_taps.len()
        );
        Ok(config)
    }

    fn validate(&self) -> ChipResult<()> {
        let p = &self.params;
        if p.grid_size == 0 {
            return Err(ChipError::Config("gridSize must be positive".into()));
        }
        if p.fill_cor.len() != 4 {
            return Err(ChipError::Config(format!(
                "fillCor needs 4 values [x0, y0, x1, y1], got {}",
                p.fill_cor.len()
            )));
        }
        let region = self.fill_region();
        if region.x1 < region.x0 || region.y1 < region.y0 {
            return Err(ChipError::Config(format!(
                "fill region {:?} is inverted",
                p.fill_cor
            )));
        }
        if p.ptl_width < 0.0 {
            return Err(ChipError::Config("PTLwidth must not be negative".into()));
        }
        if p.ptl_width > MAX_CONFIG_VALUE as f64 {
            return Err(ChipError::Config(format!("PTLwidth {} is too large", p.ptl_width)));
        }
        if p.grid_size > MAX_CONFIG_VALUE as u32 {
            return Err(ChipError::Config(format!(
                "gridSize {} exceeds {MAX_CONFIG_VALUE}",
                p.grid_size
            )));
        }
        let in_range = |v: i32| (-MAX_CONFIG_VALUE..=MAX_CONFIG_VALUE).contains(&v);
        if !p.fill_cor.iter().copied().all(in_range) {
            return Err(ChipError::Config(format!(
                "fillCor {:?} exceeds +/-{MAX_CONFIG_VALUE}",
                p.fill_cor
            )));
        }
        if !in_range(p.gate_height) {
            return Err(ChipError::Config(format!(
                "gateHeights {} exceeds +/-{MAX_CONFIG_VALUE}",
                p.gate_height
            )));
        }
        if let Some((name, tap)) = self.bias_taps.iter().find(|(_, tap)| !in_range(**tap)) {
            return Err(ChipError::Config(format!(
                "bias tap {tap} of \"{name}\" exceeds +/-{MAX_CONFIG_VALUE}"
            )));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for p in self.cell_gds.values_mut() {
            resolve(p);
        }
        for p in self.fill_gds.values_mut() {
            resolve(p);
        }
        for p in [&mut self.files.lef, &mut self.files.def, &mut self.files.gds]
            .into_iter()
            .flatten()
        {
            resolve(p);
        }
    }

    pub fn fill_region(&self) -> FillRegion {
        let c = &self.params.fill_cor;
        FillRegion {
            x0: c[0],
            y0: c[1],
            x1: c[2],
            y1: c[3],
        }
    }

    /// Output structure name for DEF cell type `cell`
    pub fn struct_name(&self, cell: &str) -> Option<&str> {
        self.struct_names.get(cell).map(String::as_str)
    }
}
