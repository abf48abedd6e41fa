// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Unit and coordinate model
//!
//! Three nested scales are in play:
//!
//! * configuration units (microns): fill region, pitch, gate height, trace width
//! * placement units: DEF component and route coordinates (100 per micron)
//! * database units (nanometres): every coordinate stored in the GDS tree
//!
//! Conversions always run placement -> database -> offset from the fill
//! origin -> grid index.

/// Placement units to database units.
pub const DEF_TO_DB: i32 = 10;
/// Configuration units to database units.
pub const CONFIG_TO_DB: i32 = 1000;
/// LEF macro dimensions (microns) to database units.
pub const LEF_TO_DB: f64 = 1000.0;

/// Largest magnitude accepted for an integer configuration value. Leaves
/// headroom for the database-unit sums built from it.
pub const MAX_CONFIG_VALUE: i32 = i32::MAX / CONFIG_TO_DB / 2;

/// Vertical margin between a placement row and its bias rail, in database units.
pub const BIAS_ROW_MARGIN: i32 = 5000;

/// GDS `UNITS` record: user unit in database units, database unit in metres.
pub const GDS_USER_UNIT: f64 = 1e-3;
pub const GDS_DB_UNIT: f64 = 1e-9;

/// Scale a placement coordinate into database units, saturating at the
/// `i32` range.
#[inline]
pub fn def_to_db(v: i32) -> i32 {
    v.saturating_mul(DEF_TO_DB)
}

/// Scale a configuration value into database units.
#[inline]
pub fn config_to_db(v: i32) -> i32 {
    v * CONFIG_TO_DB
}

/// Scale a LEF dimension into database units, rounding to the nearest unit.
#[inline]
pub fn lef_to_db(v: f64) -> i32 {
    (v * LEF_TO_DB).round() as i32
}

/// Scale a fractional configuration length (trace width) into database
/// units, truncating toward zero.
#[inline]
pub fn width_to_db(v: f64) -> i32 {
    (v * CONFIG_TO_DB as f64) as i32
}

/// Side length of one occupancy-grid cell in database units.
#[inline]
pub fn grid_factor(pitch: u32) -> i32 {
    pitch as i32 * CONFIG_TO_DB
}

/// Grid index of a region-relative database offset, truncating toward zero.
#[inline]
pub fn to_grid(offset: i32, factor: i32) -> i32 {
    offset / factor
}

/// Grid index of a region-relative database offset, rounding half away from zero.
#[inline]
pub fn to_grid_rounded(offset: i32, factor: i32) -> i32 {
    (offset as f64 / factor as f64).round() as i32
}

/// Round a database coordinate to the nearest multiple of the grid factor.
#[inline]
pub fn snap_to_grid(v: i32, factor: i32) -> i32 {
    to_grid_rounded(v, factor) * factor
}

/// Limit `v` to `[lo, hi]`.
#[inline]
pub fn constrain(v: i32, lo: i32, hi: i32) -> i32 {
    if v > hi {
        hi
    } else if v < lo {
        lo
    } else {
        v
    }
}
