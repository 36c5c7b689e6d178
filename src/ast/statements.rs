use crate::Span;

use super::{
    ast::{BlockStmt, Expr},
    types::TypeNote,
};

/// `if condition { body }`. There is no else branch.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: BlockStmt,
    pub span: Span,
}

/// `let name := value;` or `let name: Type := value;`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationStmt {
    pub identifier: String,
    pub explicit_type: Option<TypeNote>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// `pub let ...;` exports the declared name from the module.
#[derive(Debug, Clone, PartialEq)]
pub struct PubStmt {
    pub declaration: DeclarationStmt,
    pub span: Span,
}

/// `use "path";` or `use "path" (a, b);`
#[derive(Debug, Clone, PartialEq)]
pub struct UseStmt {
    pub path: String,
    pub filter: Option<Vec<String>>,
    pub span: Span,
}
