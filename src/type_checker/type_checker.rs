use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    ast::{
        ast::{BlockStmt, Expr, NodeId, Stmt},
        expressions::{
            AssignExpr, BinaryExpr, DispatchExpr, FunctionExpr, ListExpr, SubscriptExpr,
        },
        statements::{DeclarationStmt, IfStmt, ReturnStmt, UseStmt},
    },
    Position,
};

use super::{
    operators::{resolve_operator, OperatorError},
    scope::{ScopeArena, ScopeId},
    types::{FunctionType, Type},
};

/// Global scopes of already checked dependencies, keyed by the path written
/// in the importing `use` statement.
pub type Imports = FxHashMap<String, ScopeId>;

/// What checking one module leaves behind for code generation.
#[derive(Debug, Clone)]
pub struct ModuleScopes {
    pub global: ScopeId,
    /// The Local scope opened for each function literal.
    pub functions: FxHashMap<NodeId, ScopeId>,
}

pub struct TypeChecker<'a> {
    pub arena: &'a mut ScopeArena,
    pub imports: &'a Imports,
    pub functions: FxHashMap<NodeId, ScopeId>,
    pub global: ScopeId,
    pub current: ScopeId,
    /// How many `if` bodies enclose the statement being checked.
    pub depth: usize,
}

impl<'a> TypeChecker<'a> {
    pub fn new(arena: &'a mut ScopeArena, imports: &'a Imports) -> Self {
        let global = arena.new_global();
        TypeChecker {
            arena,
            imports,
            functions: FxHashMap::default(),
            global,
            current: global,
            depth: 0,
        }
    }

    fn error(&mut self, position: Position, message: impl Into<String>) {
        self.arena.new_error(self.current, position, message);
    }

    /// Whether the statement being checked sits directly in the module body.
    fn at_top_level(&self) -> bool {
        self.current == self.global && self.depth == 0
    }
}

/// Checks a module body in a fresh Global scope. Diagnostics are collected on
/// that scope; checking never stops early.
pub fn check_module(arena: &mut ScopeArena, body: &BlockStmt, imports: &Imports) -> ModuleScopes {
    let mut checker = TypeChecker::new(arena, imports);
    check_block(&mut checker, body);

    let global = checker.global;
    debug!(
        diagnostics = checker.arena.get_errors(global).len(),
        functions = checker.functions.len(),
        "checked module"
    );

    ModuleScopes {
        global,
        functions: checker.functions,
    }
}

pub fn check_block(checker: &mut TypeChecker, block: &BlockStmt) {
    for stmt in block.iter() {
        check_stmt(checker, stmt);
    }
}

pub fn check_stmt(checker: &mut TypeChecker, stmt: &Stmt) {
    match stmt {
        Stmt::If(stmt) => check_if_stmt(checker, stmt),
        Stmt::Declaration(stmt) => {
            check_declaration(checker, stmt);
        }
        Stmt::Return(stmt) => check_return_stmt(checker, stmt),
        Stmt::Expression(stmt) => {
            check_expr(checker, &stmt.expression);
        }
        Stmt::Pub(stmt) => {
            if !checker.at_top_level() {
                checker.error(
                    stmt.span.start,
                    "'pub' is only allowed at the top level of a module",
                );
                check_declaration(checker, &stmt.declaration);
                return;
            }

            if let Some(ty) = check_declaration(checker, &stmt.declaration) {
                let current = checker.current;
                checker.arena.add_export(
                    current,
                    &stmt.declaration.identifier,
                    ty,
                    stmt.span.start,
                );
            }
        }
        Stmt::Use(stmt) => check_use_stmt(checker, stmt),
    }
}

/// Declares the variable and returns its type, or `None` when the name was
/// already taken.
fn check_declaration(checker: &mut TypeChecker, stmt: &DeclarationStmt) -> Option<Type> {
    let value = check_value(checker, &stmt.value);

    let ty = match &stmt.explicit_type {
        Some(note) => {
            let annotated = Type::from_note(note);
            if !value.is_error() && !annotated.equals(&value) {
                checker.error(
                    stmt.value.get_span().start,
                    format!(
                        "cannot declare '{}' as '{}' with a value of type '{}'",
                        stmt.identifier, annotated, value
                    ),
                );
            }
            annotated
        }
        None => value,
    };

    let current = checker.current;
    checker
        .arena
        .new_variable(current, &stmt.identifier, ty.clone(), stmt.span.start)
        .map(|_| ty)
}

fn check_if_stmt(checker: &mut TypeChecker, stmt: &IfStmt) {
    let condition = check_value(checker, &stmt.condition);
    if !condition.is_error() && !Type::bool().equals(&condition) {
        checker.error(
            stmt.condition.get_span().start,
            format!("expected condition of type 'Bool', got '{}'", condition),
        );
    }

    checker.depth += 1;
    check_block(checker, &stmt.body);
    checker.depth -= 1;
}

fn check_return_stmt(checker: &mut TypeChecker, stmt: &ReturnStmt) {
    let value = stmt.value.as_ref().map(|value| check_value(checker, value));

    let Some(self_type) = checker.arena.get_self_reference(checker.current) else {
        checker.error(stmt.span.start, "cannot return outside of a function");
        return;
    };
    let expected = self_type.ret.as_ref().clone();

    match (&stmt.value, value) {
        (Some(expr), Some(value)) => {
            if value.is_error() {
                return;
            }
            if expected.is_void() {
                checker.error(
                    expr.get_span().start,
                    format!("expected no return value, got '{}'", value),
                );
            } else if !expected.equals(&value) {
                checker.error(
                    expr.get_span().start,
                    format!("expected to return '{}', got '{}'", expected, value),
                );
            }
        }
        _ => {
            if !expected.is_void() {
                checker.error(
                    stmt.span.start,
                    format!("expected to return '{}', got no value", expected),
                );
            }
        }
    }
}

fn check_use_stmt(checker: &mut TypeChecker, stmt: &UseStmt) {
    if !checker.at_top_level() {
        checker.error(
            stmt.span.start,
            "'use' is only allowed at the top level of a module",
        );
        return;
    }

    let Some(&dependency) = checker.imports.get(&stmt.path) else {
        checker.error(
            stmt.span.start,
            format!("module '{}' was not resolved", stmt.path),
        );
        return;
    };

    let names: Vec<(String, Type)> = match &stmt.filter {
        Some(filter) => {
            let mut names = vec![];
            for name in filter {
                match checker.arena.get_export(dependency, name) {
                    Some(ty) => names.push((name.clone(), ty.clone())),
                    None => checker.error(
                        stmt.span.start,
                        format!("'{}' is not exported by '{}'", name, stmt.path),
                    ),
                }
            }
            names
        }
        None => checker.arena.exports(dependency).to_vec(),
    };

    let global = checker.global;
    for (name, ty) in names {
        checker
            .arena
            .new_variable(global, &name, ty, stmt.span.start);
    }
}

/// Checks an expression whose result is used as a value, which rules out `Void`.
pub fn check_value(checker: &mut TypeChecker, expr: &Expr) -> Type {
    let ty = check_expr(checker, expr);
    if ty.is_void() {
        checker.error(
            expr.get_span().start,
            "expected a value, got 'Void'",
        );
        return Type::Error;
    }
    ty
}

pub fn check_expr(checker: &mut TypeChecker, expr: &Expr) -> Type {
    match expr {
        Expr::Number(_) => Type::int(),
        Expr::String(_) => Type::str(),
        Expr::Boolean(_) => Type::bool(),
        Expr::Ident(ident) => match checker.arena.lookup(checker.current, &ident.value) {
            Some(variable) => variable.ty.clone(),
            None => {
                checker.error(
                    ident.span.start,
                    format!("'{}' is not declared", ident.value),
                );
                Type::Error
            }
        },
        Expr::SelfRef(self_expr) => match checker.arena.get_self_reference(checker.current) {
            Some(function) => Type::Function(function.clone()),
            None => {
                checker.error(
                    self_expr.span.start,
                    "'self' can only be used inside a function",
                );
                Type::Error
            }
        },
        Expr::Function(function) => check_function_expr(checker, function),
        Expr::Dispatch(dispatch) => check_dispatch_expr(checker, dispatch),
        Expr::Assign(assign) => check_assign_expr(checker, assign),
        Expr::Binary(binary) => check_binary_expr(checker, binary),
        Expr::Subscript(subscript) => check_subscript_expr(checker, subscript),
        Expr::List(list) => check_list_expr(checker, list),
    }
}

fn check_function_expr(checker: &mut TypeChecker, function: &FunctionExpr) -> Type {
    // The signature is known before the body is checked so `self` can recurse.
    let signature = FunctionType::new(
        function
            .parameters
            .iter()
            .map(|parameter| Type::from_note(&parameter.type_note))
            .collect(),
        Type::from_note(&function.return_type),
    );

    let parent = checker.current;
    let local = checker.arena.new_local(parent, signature.clone());
    checker.functions.insert(function.id, local);

    for (parameter, ty) in function.parameters.iter().zip(&signature.params) {
        checker
            .arena
            .new_parameter(local, &parameter.name, ty.clone(), parameter.span.start);
    }

    checker.current = local;
    check_block(checker, &function.body);
    checker.current = parent;

    Type::Function(signature)
}

fn check_dispatch_expr(checker: &mut TypeChecker, dispatch: &DispatchExpr) -> Type {
    let arguments: Vec<Type> = dispatch
        .arguments
        .iter()
        .map(|argument| check_value(checker, argument))
        .collect();
    let callee = check_value(checker, &dispatch.callee);

    let function = match callee {
        Type::Error => return Type::Error,
        Type::Any => return Type::Any,
        Type::Function(function) => function,
        other => {
            checker.error(
                dispatch.span.start,
                format!("cannot call function on type '{}'", other),
            );
            return Type::Error;
        }
    };

    if function.params.len() != arguments.len() {
        checker.error(
            dispatch.span.start,
            format!(
                "expected {} arguments, got {}",
                function.params.len(),
                arguments.len()
            ),
        );
        return Type::Error;
    }

    for (index, (expected, received)) in function.params.iter().zip(&arguments).enumerate() {
        if !received.is_error() && !expected.equals(received) {
            checker.error(
                dispatch.arguments[index].get_span().start,
                format!(
                    "expected argument {} to be '{}', got '{}'",
                    index + 1,
                    expected,
                    received
                ),
            );
        }
    }

    *function.ret
}

fn check_assign_expr(checker: &mut TypeChecker, assign: &AssignExpr) -> Type {
    let value = check_value(checker, &assign.value);

    let Expr::Ident(ident) = assign.assignee.as_ref() else {
        checker.error(
            assign.assignee.get_span().start,
            "only variables can be assigned to",
        );
        return Type::Error;
    };

    let Some(variable) = checker.arena.lookup(checker.current, &ident.value) else {
        checker.error(
            ident.span.start,
            format!("'{}' is not declared", ident.value),
        );
        return Type::Error;
    };
    let declared = variable.ty.clone();

    if !value.is_error() && !declared.is_error() && !declared.equals(&value) {
        checker.error(
            assign.value.get_span().start,
            format!(
                "cannot assign '{}' to '{}' of type '{}'",
                value, ident.value, declared
            ),
        );
    }

    Type::Void
}

fn check_binary_expr(checker: &mut TypeChecker, binary: &BinaryExpr) -> Type {
    let left = check_value(checker, &binary.left);
    let right = check_value(checker, &binary.right);

    if left.is_error() || right.is_error() {
        return Type::Error;
    }

    match resolve_operator(&binary.operator, &left, &right) {
        Ok(ty) => ty,
        Err(OperatorError::Unknown) => {
            checker.error(
                binary.span.start,
                format!("unknown operator '{}'", binary.operator),
            );
            Type::Error
        }
        Err(OperatorError::Mismatch) => {
            checker.error(
                binary.span.start,
                format!(
                    "cannot apply '{}' to '{}' and '{}'",
                    binary.operator, left, right
                ),
            );
            Type::Error
        }
    }
}

fn check_subscript_expr(checker: &mut TypeChecker, subscript: &SubscriptExpr) -> Type {
    let target = check_value(checker, &subscript.target);
    let index = check_value(checker, &subscript.index);

    if target.is_error() || index.is_error() {
        return Type::Error;
    }

    if let Type::List(element) = &target {
        if !Type::int().equals(&index) {
            checker.error(
                subscript.index.get_span().start,
                format!("expected list index of type 'Int', got '{}'", index),
            );
            return Type::Error;
        }
        // The index may be out of range.
        return Type::optional(element.as_ref().clone());
    }

    match resolve_operator("[", &target, &index) {
        Ok(ty) => ty,
        Err(_) => {
            checker.error(
                subscript.span.start,
                format!("cannot subscript '{}' with '{}'", target, index),
            );
            Type::Error
        }
    }
}

fn check_list_expr(checker: &mut TypeChecker, list: &ListExpr) -> Type {
    let Some((first, rest)) = list.elements.split_first() else {
        checker.error(
            list.span.start,
            "cannot infer the element type of an empty list",
        );
        return Type::Error;
    };

    let element = check_value(checker, first);
    let mut discordant = false;

    for item in rest {
        let ty = check_value(checker, item);
        if discordant || element.is_error() || ty.is_error() || element.equals(&ty) {
            continue;
        }
        checker.error(
            item.get_span().start,
            format!("expected list element of type '{}', got '{}'", element, ty),
        );
        discordant = true;
    }

    if element.is_error() || discordant {
        return Type::Error;
    }
    Type::list(element)
}
