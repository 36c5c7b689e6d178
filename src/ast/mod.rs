/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Statement and expression sums, blocks and node ids
/// - expressions: Definitions for the expression node kinds
/// - statements: Definitions for the statement node kinds
/// - types: Type annotations as written in source
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
