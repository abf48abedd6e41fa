// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{error, info};

use chipsmith::export::export_cell_boxes_to_csv;
use chipsmith::{ChipResult, ChipSmith, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// LEF cell library. Defaults to `File_Location.LEFfile`.
    #[arg(long)]
    lef: Option<PathBuf>,

    /// Placed and routed DEF design. Defaults to `File_Location.DEFfile`.
    #[arg(long)]
    def: Option<PathBuf>,

    /// Output GDS file. Defaults to `File_Location.GDSfile`.
    #[arg(long)]
    gds: Option<PathBuf>,

    /// Write the cell bounding boxes to this CSV file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log per-item detail.
    #[arg(short, long)]
    verbose: bool,
}

fn pick(arg: Option<PathBuf>, fallback: &Option<PathBuf>, what: &str) -> PathBuf {
    match arg.or_else(|| fallback.clone()) {
        Some(path) => path,
        None => Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                format!("no {what} file given on the command line or in [File_Location]"),
            )
            .exit(),
    }
}

fn run(args: Args) -> ChipResult<()> {
    let config = Config::load(&args.config)?;
    let lef_path = pick(args.lef, &config.files.lef, "LEF");
    let def_path = pick(args.def, &config.files.def, "DEF");
    let gds_path = pick(args.gds, &config.files.gds, "GDS");

    let lef = chipsmith::lef::LefReader::new().read(&lef_path)?;
    let def = chipsmith::def::DefReader::new().read(&def_path)?;

    let mut smith = ChipSmith::new(config, lef, def);
    smith.to_gds(&gds_path)?;

    if let Some(report) = &args.report {
        export_cell_boxes_to_csv(smith.cell_boxes(), report)?;
        info!("Cell bounding boxes written to \"{}\"", report.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
