//! Data transformations and external data sources.
//!
//! - daily merge + weekly resampling (`weekly`)
//! - CPI lookup for the inflation adjustment (`cpi`)

pub mod cpi;
pub mod weekly;

pub use cpi::*;
pub use weekly::*;
