//! Area-level edits to postal-code-level reassignments.

use std::path::PathBuf;

use clap::Args;
use depot_map_resolve::{AssignmentSnapshot, Reconciliation, reconcile};
use depot_map_tabular::{
    AREA_CHANGE_COLUMNS, ZIP_REASSIGNMENT_COLUMNS, load_assignment_records, load_postal_records,
    write_csv,
};
use depot_map_zone_models::MatchStatus;

use crate::PipelineError;

/// Report file listing changed areas.
pub const AREA_CHANGES_FILE: &str = "area_changes.csv";
/// Report file listing every postal row.
pub const ZIP_ALL_FILE: &str = "zip_reassignment_all.csv";
/// Report file listing only postal rows whose depot changed.
pub const ZIP_CHANGES_FILE: &str = "zip_changes_only.csv";

/// Arguments of the `zip-changes` pipeline.
#[derive(Debug, Clone, Args)]
pub struct ZipChangesArgs {
    /// Current postal-code assignment CSV
    #[arg(long, default_value = "asis.csv")]
    pub asis: PathBuf,

    /// Area assignment CSV before the edit
    #[arg(long, default_value = "data/asis_admin_assignments.csv")]
    pub baseline: PathBuf,

    /// Area assignment CSV exported after the edit
    #[arg(long)]
    pub updated: PathBuf,

    /// Directory the three reports are written to
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Treat a blank depot in the updated CSV as an intentional clear
    #[arg(long)]
    pub include_clear: bool,
}

/// Runs the pipeline and writes its reports.
///
/// # Errors
///
/// Returns an error if an input cannot be read or a report cannot be
/// written.
pub fn run(args: &ZipChangesArgs) -> Result<Reconciliation, PipelineError> {
    let baseline = AssignmentSnapshot::from_records(load_assignment_records(&args.baseline)?);
    let updated = AssignmentSnapshot::from_records(load_assignment_records(&args.updated)?);
    let postal = load_postal_records(&args.asis)?;

    let result = reconcile(&baseline, &updated, args.include_clear, &postal);

    write_csv(
        &args.out_dir.join(AREA_CHANGES_FILE),
        AREA_CHANGE_COLUMNS,
        &result.area_changes,
    )?;
    write_csv(
        &args.out_dir.join(ZIP_ALL_FILE),
        ZIP_REASSIGNMENT_COLUMNS,
        &result.propagation.all,
    )?;
    write_csv(
        &args.out_dir.join(ZIP_CHANGES_FILE),
        ZIP_REASSIGNMENT_COLUMNS,
        &result.propagation.changed,
    )?;

    let count = |status: &MatchStatus| {
        result
            .propagation
            .all
            .iter()
            .filter(|row| &row.match_status == status)
            .count()
    };
    log::info!("area changes: {}", result.area_changes.len());
    log::info!(
        "postal rows: {} (OK={}, NO_MATCH={}, AMBIGUOUS={})",
        result.propagation.all.len(),
        count(&MatchStatus::Ok),
        count(&MatchStatus::NoMatch),
        count(&MatchStatus::Ambiguous)
    );
    log::info!("postal rows changed: {}", result.propagation.changed.len());

    Ok(result)
}
