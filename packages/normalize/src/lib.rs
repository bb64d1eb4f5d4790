#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonicalization of place names, postal codes, and depot labels.
//!
//! Every function here is total: malformed input yields a best-effort
//! canonical value or an empty result, never an error. Every function is
//! also idempotent, so values can be re-normalized freely at index time
//! and query time without drifting.
//!
//! ```rust
//! use depot_map_normalize::{canonical_municipality, canonical_town_name};
//!
//! assert_eq!(canonical_municipality("神奈川県 横浜港北区"), "横浜市港北区");
//! assert_eq!(canonical_town_name("中央１丁目"), "中央");
//! ```

pub mod code;
pub mod place;
pub mod tables;

pub use code::{format_postal_code, normalize_depot_code, normalize_zip};
pub use place::{canonical_municipality, canonical_town_name};
