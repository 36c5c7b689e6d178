//! The semantic type model.
//!
//! Types are immutable values compared structurally with [`Type::equals`].
//! `Any` is a wildcard that matches everything except `Error` and `Void`,
//! and `Error` matches nothing, not even itself, so a failed expression never
//! satisfies a later check by accident.

use std::fmt::Display;

use crate::ast::types::TypeNote;

pub const INT: &str = "Int";
pub const STR: &str = "Str";
pub const BOOL: &str = "Bool";

/// Parameter list and return type of a function value.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
}

impl FunctionType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        FunctionType {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn equals(&self, other: &FunctionType) -> bool {
        all_equal(&self.params, &other.params) && self.ret.equals(&other.ret)
    }
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_list(f, &self.params)?;
        write!(f, " => {}", self.ret)
    }
}

#[derive(Debug, Clone)]
pub enum Type {
    /// The type of an expression that already failed to check.
    Error,
    Any,
    Void,
    Function(FunctionType),
    Tuple(Vec<Type>),
    List(Box<Type>),
    Optional(Box<Type>),
    Ident(String),
}

impl Type {
    pub fn int() -> Self {
        Type::Ident(INT.to_string())
    }

    pub fn str() -> Self {
        Type::Ident(STR.to_string())
    }

    pub fn bool() -> Self {
        Type::Ident(BOOL.to_string())
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function(FunctionType::new(params, ret))
    }

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn optional(child: Type) -> Self {
        Type::Optional(Box::new(child))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Structural equality with `Any` as a wildcard.
    pub fn equals(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Error, _) | (_, Type::Error) => false,
            (Type::Any, Type::Void) | (Type::Void, Type::Any) => false,
            (Type::Any, _) | (_, Type::Any) => true,
            (Type::Void, Type::Void) => true,
            (Type::Function(left), Type::Function(right)) => left.equals(right),
            (Type::Tuple(left), Type::Tuple(right)) => all_equal(left, right),
            (Type::List(left), Type::List(right)) => left.equals(right),
            (Type::Optional(left), Type::Optional(right)) => left.equals(right),
            (Type::Ident(left), Type::Ident(right)) => left == right,
            _ => false,
        }
    }

    /// Converts a source annotation into a type. The mapping is one to one.
    pub fn from_note(note: &TypeNote) -> Type {
        match note {
            TypeNote::Any => Type::Any,
            TypeNote::Void => Type::Void,
            TypeNote::Function {
                parameters,
                return_type,
            } => Type::function(
                parameters.iter().map(Type::from_note).collect(),
                Type::from_note(return_type),
            ),
            TypeNote::Tuple(children) => Type::Tuple(children.iter().map(Type::from_note).collect()),
            TypeNote::List(child) => Type::list(Type::from_note(child)),
            TypeNote::Optional(child) => Type::optional(Type::from_note(child)),
            TypeNote::Ident(name) => Type::Ident(name.clone()),
        }
    }
}

fn all_equal(left: &[Type], right: &[Type]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.equals(r))
}

fn write_list(f: &mut std::fmt::Formatter<'_>, items: &[Type]) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Error => write!(f, "ERROR"),
            Type::Any => write!(f, "Any"),
            Type::Void => write!(f, "Void"),
            Type::Function(function) => write!(f, "{}", function),
            Type::Tuple(children) => write_list(f, children),
            Type::List(child) => write!(f, "[{}]", child),
            Type::Optional(child) => write!(f, "{}?", child),
            Type::Ident(name) => write!(f, "{}", name),
        }
    }
}
