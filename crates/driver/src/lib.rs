//! valwatch Driver crate root
#![allow(clippy::uninlined_format_args)]

/// Process wiring and lifecycle
pub mod driver;
/// Monitor task spawning
pub mod monitoring;

pub use driver::Driver;
