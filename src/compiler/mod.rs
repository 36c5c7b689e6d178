//! Code generation module for the compiler.
//!
//! This module lowers checked modules into stack machine bytecode. It handles:
//!
//! - Compilation of expressions and statements
//! - Reserving a cell for every local of a function up front
//! - Backpatched jumps for `if`
//! - Function literals as nested closure templates
//! - Imports of other modules' exports

pub mod bytecode;
pub mod compiler;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;
