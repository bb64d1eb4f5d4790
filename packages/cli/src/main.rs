#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch tool for depot zone reconciliation.
//!
//! `zip-changes` turns an edited area assignment export into postal-code
//! reassignment reports. `fine-polygons` builds the town-level zone map
//! colored by the current depot assignment.

use clap::{Parser, Subcommand};
use depot_map_cli::fine_polygons::{self, FinePolygonsArgs};
use depot_map_cli::zip_changes::{self, ZipChangesArgs};

#[derive(Parser)]
#[command(name = "depot_map", about = "Depot zone reconciliation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate area-level depot edits to postal codes
    ZipChanges(ZipChangesArgs),
    /// Build the town-level zone map with current depots
    FinePolygons(FinePolygonsArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::ZipChanges(args) => {
            zip_changes::run(&args)?;
            log::info!("Reports written to {}", args.out_dir.display());
        }
        Commands::FinePolygons(args) => {
            fine_polygons::run(&args)?;
        }
    }

    Ok(())
}
