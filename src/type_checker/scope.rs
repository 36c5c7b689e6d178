//! Lexical scopes used during type checking.
//!
//! All scopes of a compilation unit live in one [`ScopeArena`] and refer to
//! each other by [`ScopeId`]. Each module owns a Global root holding its
//! exports and diagnostics; every function literal opens a Local scope whose
//! parent is the scope the literal appears in.

use std::{fmt::Display, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{errors::errors::Diagnostic, Position};

use super::types::{FunctionType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

/// Compile-time identity of one declared variable.
///
/// Ids are unique within a [`ScopeArena`], so two variables never share a
/// runtime cell even when one shadows the other.
#[derive(Debug, PartialEq, Eq)]
pub struct CellTemplate {
    pub id: u32,
    pub name: String,
}

impl Display for CellTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub ty: Type,
    pub cell: Rc<CellTemplate>,
}

#[derive(Debug)]
pub enum ScopeKind {
    Global {
        exports: Vec<(String, Type)>,
        diagnostics: Vec<Diagnostic>,
    },
    Local {
        parent: ScopeId,
        self_type: FunctionType,
    },
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Variables in declaration order. Parameters come first.
    variables: Vec<Variable>,
    lookup: FxHashMap<String, usize>,
    parameters: usize,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            variables: vec![],
            lookup: FxHashMap::default(),
            parameters: 0,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self.kind, ScopeKind::Global { .. })
    }

    /// Index of `name` in declaration order.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn variable(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    /// Parameter variables, in signature order.
    pub fn parameters(&self) -> &[Variable] {
        &self.variables[..self.parameters]
    }

    /// Every variable declared in this scope that is not a parameter.
    pub fn locals(&self) -> &[Variable] {
        &self.variables[self.parameters..]
    }
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    next_cell: u32,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena::default()
    }

    fn add(&mut self, scope: Scope) -> ScopeId {
        self.scopes.push(scope);
        ScopeId(self.scopes.len() - 1)
    }

    pub fn new_global(&mut self) -> ScopeId {
        self.add(Scope::new(ScopeKind::Global {
            exports: vec![],
            diagnostics: vec![],
        }))
    }

    pub fn new_local(&mut self, parent: ScopeId, self_type: FunctionType) -> ScopeId {
        self.add(Scope::new(ScopeKind::Local { parent, self_type }))
    }

    /// A Global scope whose variables are all exported, for host-provided modules.
    pub fn new_native(&mut self, exports: &[(String, Type)]) -> ScopeId {
        let id = self.new_global();
        for (name, ty) in exports {
            self.new_variable(id, name, ty.clone(), Position::null());
            self.add_export(id, name, ty.clone(), Position::null());
        }
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        match self.get(id).kind {
            ScopeKind::Local { parent, .. } => Some(parent),
            ScopeKind::Global { .. } => None,
        }
    }

    /// The Global scope at the root of `id`'s chain.
    pub fn root(&self, id: ScopeId) -> ScopeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn has_local_variable(&self, id: ScopeId, name: &str) -> bool {
        self.get(id).lookup.contains_key(name)
    }

    /// Declares `name` in `id` only. Redeclaring a name in the same scope is
    /// reported as a diagnostic and yields `None`.
    pub fn new_variable(
        &mut self,
        id: ScopeId,
        name: &str,
        ty: Type,
        position: Position,
    ) -> Option<Rc<CellTemplate>> {
        if self.has_local_variable(id, name) {
            self.new_error(id, position, format!("'{}' is already declared", name));
            return None;
        }

        let cell = Rc::new(CellTemplate {
            id: self.next_cell,
            name: name.to_string(),
        });
        self.next_cell += 1;

        let scope = self.get_mut(id);
        scope.lookup.insert(name.to_string(), scope.variables.len());
        scope.variables.push(Variable {
            ty,
            cell: Rc::clone(&cell),
        });

        Some(cell)
    }

    /// Declares a function parameter. Parameters must be declared before any
    /// other variable of the scope.
    pub fn new_parameter(
        &mut self,
        id: ScopeId,
        name: &str,
        ty: Type,
        position: Position,
    ) -> Option<Rc<CellTemplate>> {
        let cell = self.new_variable(id, name, ty, position)?;
        self.get_mut(id).parameters += 1;
        Some(cell)
    }

    /// Finds `name` walking from `id` out to the module root.
    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&Variable> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.get(scope_id);
            if let Some(index) = scope.variable_index(name) {
                return scope.variable(index);
            }
            current = self.parent(scope_id);
        }
        None
    }

    pub fn has_self_reference(&self, id: ScopeId) -> bool {
        self.get_self_reference(id).is_some()
    }

    /// Signature of the function whose body `id` belongs to.
    pub fn get_self_reference(&self, id: ScopeId) -> Option<&FunctionType> {
        match &self.get(id).kind {
            ScopeKind::Local { self_type, .. } => Some(self_type),
            ScopeKind::Global { .. } => None,
        }
    }

    /// Records a diagnostic on the module that owns `id`.
    pub fn new_error(&mut self, id: ScopeId, position: Position, message: impl Into<String>) {
        let root = self.root(id);
        if let ScopeKind::Global { diagnostics, .. } = &mut self.get_mut(root).kind {
            diagnostics.push(Diagnostic::new(position, message));
        }
    }

    pub fn has_errors(&self, id: ScopeId) -> bool {
        !self.get_errors(id).is_empty()
    }

    pub fn get_errors(&self, id: ScopeId) -> &[Diagnostic] {
        match &self.get(self.root(id)).kind {
            ScopeKind::Global { diagnostics, .. } => diagnostics,
            ScopeKind::Local { .. } => &[],
        }
    }

    pub fn exports(&self, id: ScopeId) -> &[(String, Type)] {
        match &self.get(id).kind {
            ScopeKind::Global { exports, .. } => exports,
            ScopeKind::Local { .. } => &[],
        }
    }

    pub fn get_export(&self, id: ScopeId, name: &str) -> Option<&Type> {
        self.exports(id)
            .iter()
            .find(|(export, _)| export == name)
            .map(|(_, ty)| ty)
    }

    /// Exports `name` from the Global scope `id`. Only Global scopes track
    /// exports, so anything else is reported.
    pub fn add_export(&mut self, id: ScopeId, name: &str, ty: Type, position: Position) -> bool {
        if self.get_export(id, name).is_some() {
            self.new_error(id, position, format!("'{}' is already exported", name));
            return false;
        }

        if !self.get(id).is_global() {
            self.new_error(id, position, "'pub' is only allowed at the top level of a module");
            return false;
        }

        if let ScopeKind::Global { exports, .. } = &mut self.get_mut(id).kind {
            exports.push((name.to_string(), ty));
        }
        true
    }
}
