//! Input/output helpers.
//!
//! - price-history CSV ingest + validation (`ingest`)
//! - weekly-table / raw-series / metrics exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
