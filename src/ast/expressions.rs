use crate::Span;

use super::{
    ast::{BlockStmt, Expr, NodeId},
    types::TypeNote,
};

// LITERALS

#[derive(Debug, Clone, PartialEq)]
pub struct NumberExpr {
    pub value: i64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringExpr {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanExpr {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentExpr {
    pub value: String,
    pub span: Span,
}

/// The `self` keyword: the innermost enclosing function.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfExpr {
    pub span: Span,
}

// COMPOUND

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_note: TypeNote,
    pub span: Span,
}

/// `fn(a: Int): Int { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub id: NodeId,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeNote,
    pub body: BlockStmt,
    pub span: Span,
}

/// A call: `callee(arguments...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub assignee: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

/// `left operator right`, with the operator kept as its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: String,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptExpr {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}
