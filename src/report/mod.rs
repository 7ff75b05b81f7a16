//! Report text assembly.
//!
//! Formatting lives in one place so the math/simulation code stays clean and
//! output changes are localized (important for future snapshot tests).

pub mod format;

pub use format::*;
