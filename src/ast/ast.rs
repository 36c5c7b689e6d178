use crate::Span;

use super::{
    expressions::{
        AssignExpr, BinaryExpr, BooleanExpr, DispatchExpr, FunctionExpr, IdentExpr, ListExpr,
        NumberExpr, SelfExpr, StringExpr, SubscriptExpr,
    },
    statements::{DeclarationStmt, ExpressionStmt, IfStmt, PubStmt, ReturnStmt, UseStmt},
};

/// Identifies a function literal within one parsed module.
///
/// The checker keys the Local scope it opens for a function literal by this
/// id so the compiler can find the same cells again.
pub type NodeId = u32;

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    If(IfStmt),
    Declaration(DeclarationStmt),
    Return(ReturnStmt),
    Expression(ExpressionStmt),
    Pub(PubStmt),
    Use(UseStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::If(stmt) => &stmt.span,
            Stmt::Declaration(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::Pub(stmt) => &stmt.span,
            Stmt::Use(stmt) => &stmt.span,
        }
    }
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Function(FunctionExpr),
    Dispatch(DispatchExpr),
    Assign(AssignExpr),
    Binary(BinaryExpr),
    Subscript(SubscriptExpr),
    List(ListExpr),
    SelfRef(SelfExpr),
    Ident(IdentExpr),
    Number(NumberExpr),
    String(StringExpr),
    Boolean(BooleanExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Function(expr) => &expr.span,
            Expr::Dispatch(expr) => &expr.span,
            Expr::Assign(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Subscript(expr) => &expr.span,
            Expr::List(expr) => &expr.span,
            Expr::SelfRef(expr) => &expr.span,
            Expr::Ident(expr) => &expr.span,
            Expr::Number(expr) => &expr.span,
            Expr::String(expr) => &expr.span,
            Expr::Boolean(expr) => &expr.span,
        }
    }
}

/// The statements of a module or function body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.body.iter()
    }

    /// Import statements at the top level of this block, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &UseStmt> {
        self.body.iter().filter_map(|stmt| match stmt {
            Stmt::Use(use_stmt) => Some(use_stmt),
            _ => None,
        })
    }
}
