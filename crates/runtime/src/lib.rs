//! Runtime utilities for valwatch.
#![allow(clippy::uninlined_format_args)]

/// Process signal handling
pub mod shutdown;

#[cfg(test)]
mod shutdown_test;
