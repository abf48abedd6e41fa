// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Crate-wide error type

use std::path::PathBuf;

use thiserror::Error;

use crate::gds::GdsError;

pub type ChipResult<T> = Result<T, ChipError>;

#[derive(Debug, Error)]
pub enum ChipError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LEF parse error at line {line}: {msg}")]
    LefParse { line: usize, msg: String },

    #[error("DEF parse error at line {line}: {msg}")]
    DefParse { line: usize, msg: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A cell type used in the design has neither a ready-made GDS nor a LEF macro.
    #[error("missing GDS and LEF definition for gate \"{0}\"")]
    MissingDefinition(String),

    #[error("structure \"{0}\" not found")]
    StructureNotFound(String),

    #[error(transparent)]
    Gds(#[from] GdsError),

    #[error("report export failed: {0}")]
    Csv(#[from] csv::Error),
}

impl ChipError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChipError::Io {
            path: path.into(),
            source,
        }
    }
}
