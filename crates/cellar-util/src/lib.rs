//! Shared utilities for the deploy ingestion core.
//!
//! Cross-cutting concerns used by every other `cellar-*` crate: the unified
//! error type, filesystem helpers (atomic writes, path subtraction), and
//! checksum computation.

pub mod errors;
pub mod fs;
pub mod hash;
