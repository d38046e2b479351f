//! # System Module
//!
//! Structural summaries of generated data, used for driver progress lines and
//! run reports.

mod summary;

pub use summary::*;
