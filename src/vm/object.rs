//! Runtime values.

use std::{fmt::Display, rc::Rc};

use crate::{compiler::bytecode::ClosureTemplate, type_checker::types::FunctionType};

use super::environment::Environment;

/// A host function. Errors are plain messages; the VM wraps them in a
/// [`RuntimeFault::Host`](crate::RuntimeFault::Host) naming the builtin.
pub type HostFn = Rc<dyn Fn(&[Object]) -> Result<Object, String>>;

/// A host function together with its declared signature.
pub struct Builtin {
    pub name: String,
    pub ty: FunctionType,
    pub func: HostFn,
}

impl Builtin {
    pub fn new(
        name: &str,
        ty: FunctionType,
        func: impl Fn(&[Object]) -> Result<Object, String> + 'static,
    ) -> Self {
        Builtin {
            name: name.to_string(),
            ty,
            func: Rc::new(func),
        }
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .finish()
    }
}

/// A closure template bound to the environment it was created in.
pub struct Closure {
    pub template: Rc<ClosureTemplate>,
    pub env: Rc<Environment>,
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("template", &self.template.id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    /// No value: the result of a `Void` function, or an absent optional.
    None,
    Int(i64),
    Str(Rc<str>),
    Bool(bool),
    List(Rc<Vec<Object>>),
    Builtin(Rc<Builtin>),
    Closure(Rc<Closure>),
}

impl Object {
    pub fn str(value: &str) -> Self {
        Object::Str(Rc::from(value))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::None => "None",
            Object::Int(_) => "Int",
            Object::Str(_) => "Str",
            Object::Bool(_) => "Bool",
            Object::List(_) => "List",
            Object::Builtin(_) => "Builtin",
            Object::Closure(_) => "Closure",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// Values compare by content; functions compare by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::None, Object::None) => true,
            (Object::Int(a), Object::Int(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Bool(a), Object::Bool(b)) => a == b,
            (Object::List(a), Object::List(b)) => a == b,
            (Object::Builtin(a), Object::Builtin(b)) => Rc::ptr_eq(a, b),
            (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::None => write!(f, "none"),
            Object::Int(value) => write!(f, "{}", value),
            Object::Str(value) => write!(f, "{}", value),
            Object::Bool(value) => write!(f, "{}", value),
            Object::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Object::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
            Object::Closure(closure) => write!(f, "<closure #{}>", closure.template.id),
        }
    }
}
