//! The DCA simulation engine.
//!
//! - per-asset weekly accumulation (`dca`)
//! - nominal/real return formulas (`returns`)

pub mod dca;
pub mod returns;

pub use dca::*;
pub use returns::*;
