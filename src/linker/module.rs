use std::{path::PathBuf, rc::Rc};

use crate::{
    ast::ast::BlockStmt,
    type_checker::types::{FunctionType, Type},
    vm::object::{Builtin, Object},
};

/// A host-provided module addressed by a reserved name such as `std`.
#[derive(Debug)]
pub struct NativeModule {
    pub name: String,
    pub builtins: Vec<Rc<Builtin>>,
}

impl NativeModule {
    pub fn new(name: &str) -> Self {
        NativeModule {
            name: name.to_string(),
            builtins: vec![],
        }
    }

    pub fn with_builtin(
        mut self,
        name: &str,
        ty: FunctionType,
        func: impl Fn(&[Object]) -> Result<Object, String> + 'static,
    ) -> Self {
        self.builtins.push(Rc::new(Builtin::new(name, ty, func)));
        self
    }

    /// Exported names and their types, in registration order.
    pub fn exports(&self) -> Vec<(String, Type)> {
        self.builtins
            .iter()
            .map(|builtin| (builtin.name.clone(), Type::Function(builtin.ty.clone())))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum ModuleKind {
    /// Source module with its parsed body.
    Virtual(BlockStmt),
    Native(Rc<NativeModule>),
}

#[derive(Debug, Clone)]
pub struct Module {
    /// Normalised path for source modules, reserved name for native ones.
    /// Unique within one module graph.
    pub key: String,
    pub path: Option<PathBuf>,
    pub kind: ModuleKind,
}

impl Module {
    pub fn virtual_module(path: PathBuf, body: BlockStmt) -> Self {
        Module {
            key: path.display().to_string(),
            path: Some(path),
            kind: ModuleKind::Virtual(body),
        }
    }

    pub fn native_module(native: Rc<NativeModule>) -> Self {
        Module {
            key: native.name.clone(),
            path: None,
            kind: ModuleKind::Native(native),
        }
    }

    /// Paths named by the module's top-level `use` statements.
    pub fn imports(&self) -> Vec<String> {
        match &self.kind {
            ModuleKind::Virtual(body) => body.imports().map(|stmt| stmt.path.clone()).collect(),
            ModuleKind::Native(_) => vec![],
        }
    }
}
