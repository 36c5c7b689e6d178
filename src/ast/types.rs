//! Type annotations as written in source.
//!
//! These are purely syntactic; the type checker converts them 1:1 into the
//! semantic `Type` model.

/// A type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNote {
    Any,
    Void,
    /// `(A B) => R`
    Function {
        parameters: Vec<TypeNote>,
        return_type: Box<TypeNote>,
    },
    /// `(A B)`
    Tuple(Vec<TypeNote>),
    /// `[T]`
    List(Box<TypeNote>),
    /// `T?`
    Optional(Box<TypeNote>),
    /// A named type such as `Int` or `Str`.
    Ident(String),
}

impl TypeNote {
    pub fn ident(name: &str) -> Self {
        TypeNote::Ident(name.to_string())
    }
}
