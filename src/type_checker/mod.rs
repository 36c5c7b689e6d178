//! Type checking and semantic analysis module.
//!
//! This module checks a parsed module against a chain of lexical scopes:
//!
//! - Verifying type correctness of expressions and statements
//! - Resolving variable references, `self` and imported names
//! - Checking function signatures, arguments and return values
//! - Recording exports and diagnostics on the module's Global scope
//!
//! Checking never aborts; every problem becomes a diagnostic and the
//! offending expression gets the `Error` type.

pub mod operators;
pub mod scope;
pub mod type_checker;
pub mod types;

#[cfg(test)]
mod tests;
