#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Depot resolution engine.
//!
//! Turns normalized snapshots of area assignments into decisions:
//!
//! - [`snapshot`]: loads typed assignment records into a keyed snapshot.
//! - [`index`]: reverse lookup from canonical names to area identifiers,
//!   with ambiguity detection.
//! - [`changes`]: diffs a baseline snapshot against an updated one.
//! - [`tiered`]: assigns a depot to a (municipality, town) pair using
//!   town evidence first and municipality evidence second.
//! - [`propagate`]: pushes area-level changes down to postal rows.
//! - [`reconcile`]: runs change detection and propagation in one step.
//!
//! Nothing in this crate performs I/O or fails. Ambiguity and conflicts
//! are reported through [`MatchStatus`](depot_map_zone_models::MatchStatus)
//! values rather than errors.

pub mod changes;
pub mod index;
pub mod propagate;
pub mod reconcile;
pub mod snapshot;
pub mod tiered;

pub use changes::{area_change_rows, detect_changes};
pub use index::{AreaMatch, NameIndex};
pub use propagate::{Propagation, Reassignment};
pub use reconcile::{Reconciliation, reconcile};
pub use snapshot::AssignmentSnapshot;
pub use tiered::{ResolvedDepot, TieredResolver};
