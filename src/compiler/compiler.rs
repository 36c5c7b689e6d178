//! Main compiler module.
//!
//! This module contains the Compiler structure that lowers one checked module
//! into bytecode. Every function body, the module body included, becomes its
//! own [`ClosureTemplate`].

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    ast::ast::{BlockStmt, NodeId},
    errors::errors::InternalFault,
    linker::{linker::{LinkedModule, Program}, module::ModuleKind},
    type_checker::scope::{CellTemplate, ScopeArena, ScopeId},
};

use super::{
    bytecode::{Bytecode, ClosureTemplate, Constant, Instruction},
    stmt::gen_statement,
};

/// The state of compiling one module.
///
/// Variables are never looked up by name alone: the compiler replays the
/// order in which the checker declared them, so a name resolves to the same
/// cell it resolved to during checking.
pub struct Compiler<'a> {
    /// Scopes filled in by the checker
    pub arena: &'a ScopeArena,
    /// The module being compiled
    pub module: &'a LinkedModule,
    /// Every module of the program, for resolving imports
    pub modules: &'a [LinkedModule],
    /// The scope of the function body being compiled
    pub current_scope: ScopeId,
    /// How many variables of each scope have been declared so far
    visible: FxHashMap<ScopeId, usize>,
    /// Counter for closure template ids
    next_template: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(program: &'a Program, module: &'a LinkedModule) -> Self {
        Compiler {
            arena: &program.arena,
            module,
            modules: &program.modules,
            current_scope: module.scopes.global,
            visible: FxHashMap::default(),
            next_template: 0,
        }
    }

    fn advance_template_id(&mut self) -> u32 {
        let id = self.next_template;
        self.next_template += 1;
        id
    }

    /// Marks the variable `name` of the current scope as declared.
    pub fn declare(&mut self, name: &str) -> Result<Rc<CellTemplate>, InternalFault> {
        let scope = self.arena.get(self.current_scope);
        let index = scope
            .variable_index(name)
            .ok_or_else(|| InternalFault::MissingVariable {
                name: name.to_string(),
            })?;
        let cell = scope
            .variable(index)
            .map(|variable| Rc::clone(&variable.cell))
            .ok_or_else(|| InternalFault::MissingVariable {
                name: name.to_string(),
            })?;

        self.visible.insert(self.current_scope, index + 1);
        Ok(cell)
    }

    /// The cell `name` refers to at this point of the body.
    pub fn resolve(&self, name: &str) -> Result<Rc<CellTemplate>, InternalFault> {
        let mut current = Some(self.current_scope);

        while let Some(scope_id) = current {
            let scope = self.arena.get(scope_id);
            let visible = self.visible.get(&scope_id).copied().unwrap_or(0);

            if let Some(index) = scope.variable_index(name) {
                if index < visible {
                    if let Some(variable) = scope.variable(index) {
                        return Ok(Rc::clone(&variable.cell));
                    }
                }
            }
            current = self.arena.parent(scope_id);
        }

        Err(InternalFault::MissingVariable {
            name: name.to_string(),
        })
    }

    /// The Local scope the checker opened for a function literal.
    pub fn function_scope(&self, id: NodeId) -> Result<ScopeId, InternalFault> {
        self.module
            .scopes
            .functions
            .get(&id)
            .copied()
            .ok_or(InternalFault::MissingFunctionScope { id })
    }

    /// Key of the module imported by `use path`.
    pub fn linked_module(&self, path: &str) -> Result<&'a LinkedModule, InternalFault> {
        self.module
            .links
            .get(path)
            .and_then(|&index| self.modules.get(index))
            .ok_or_else(|| InternalFault::UnlinkedImport {
                path: path.to_string(),
            })
    }

    /// Compiles a function body that runs in `scope`.
    pub fn compile_body(
        &mut self,
        scope: ScopeId,
        body: &BlockStmt,
        is_module: bool,
    ) -> Result<Rc<ClosureTemplate>, InternalFault> {
        let id = self.advance_template_id();
        let outer_scope = self.current_scope;
        self.current_scope = scope;

        let parameters: Vec<Rc<CellTemplate>> = self
            .arena
            .get(scope)
            .parameters()
            .iter()
            .map(|variable| Rc::clone(&variable.cell))
            .collect();
        self.visible.insert(scope, parameters.len());

        let mut bytecode = Bytecode::new();
        for local in self.arena.get(scope).locals() {
            bytecode.emit(Instruction::Reserve(Rc::clone(&local.cell)));
        }

        for statement in body.iter() {
            gen_statement(self, &mut bytecode, statement)?;
        }

        if is_module {
            bytecode.emit(Instruction::Halt);
        } else {
            bytecode.emit(Instruction::Push(Constant::None));
            bytecode.emit(Instruction::Return);
        }

        self.current_scope = outer_scope;
        trace!(template = id, instructions = bytecode.len(), "compiled function body");

        Ok(Rc::new(ClosureTemplate {
            id,
            parameters,
            bytecode,
        }))
    }
}

/// Compiles the body of a checked source module. Native modules have no
/// bytecode and yield `None`.
pub fn compile_module(
    program: &Program,
    module: &LinkedModule,
) -> Result<Option<Rc<ClosureTemplate>>, InternalFault> {
    let ModuleKind::Virtual(body) = &module.module.kind else {
        return Ok(None);
    };

    let mut compiler = Compiler::new(program, module);
    let template = compiler.compile_body(module.scopes.global, body, true)?;

    debug!(
        module = %module.module.key,
        templates = compiler.next_template,
        "compiled module"
    );
    Ok(Some(template))
}
