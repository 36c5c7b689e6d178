#![allow(clippy::module_inception)]

//! A small statically typed scripting language: structural type checking,
//! multi-module linking, bytecode compilation and a closure-capable stack VM.

use std::fmt::Display;

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod linker;
pub mod macros;
pub mod parser;
pub mod pipeline;
pub mod type_checker;
pub mod vm;

extern crate regex;

pub use errors::errors::{Diagnostic, GraphError, InternalFault, PipelineError, RuntimeFault};
pub use pipeline::pipeline::{Pipeline, PipelineConfig};
pub use vm::object::Object;

/// A 1-based line and column in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Position used for synthesized nodes with no source text.
    pub fn null() -> Self {
        Position { line: 0, column: 0 }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// A zero-width span at `position`.
    pub fn at(position: Position) -> Self {
        Span {
            start: position,
            end: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, Span};

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(4, 12).to_string(), "4:12");
    }

    #[test]
    fn test_span_at_is_zero_width() {
        let span = Span::at(Position::new(2, 3));
        assert_eq!(span.start, span.end);
    }
}
