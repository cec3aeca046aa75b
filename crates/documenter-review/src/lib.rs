//! # documenter-review
//!
//! File-system side of the review lifecycle:
//!
//! - [`staging::ReviewAreas`]: the `review/`, `approved/` and
//!   `licensing_ready/` directories, sidecar metadata and licensing packages
//! - [`headers`]: the metadata blocks the engine writes around document
//!   bodies, and [`headers::strip_metadata_header`] to remove them again
//! - [`matcher`]: resolves a submitted reviewed file back to its ledger
//!   document by filename

#![deny(unsafe_code)]

pub mod errors;
pub mod headers;
pub mod matcher;
pub mod staging;

pub use errors::{MatchError, StagingError};
pub use headers::{Provenance, ReviewHeader, strip_metadata_header};
pub use matcher::{candidate_patterns, canonical_name, resolve_document};
pub use staging::{PackageManifest, ReviewAreas, ReviewSidecar, validate_component};
