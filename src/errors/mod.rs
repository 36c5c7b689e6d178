//! Error types and error handling for the compiler.
//!
//! This module defines the error families used throughout the pipeline:
//!
//! - Front-end syntax errors with source position information
//! - Recoverable type-check diagnostics, collected rather than thrown
//! - Fatal module graph errors (cycles, loading, parsing dependencies)
//! - Internal faults for broken invariants, and VM runtime faults

pub mod errors;
