use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    errors::errors::{Diagnostic, InternalFault},
    type_checker::{
        scope::ScopeArena,
        type_checker::{check_module, Imports, ModuleScopes},
    },
};

use super::{
    graph::ModuleGraph,
    module::{Module, ModuleKind},
};

/// One module after linking and checking.
#[derive(Debug)]
pub struct LinkedModule {
    pub module: Module,
    pub scopes: ModuleScopes,
    /// `use` path to the index of the imported module in [`Program::modules`].
    pub links: FxHashMap<String, usize>,
}

/// Every module of a compilation unit, dependencies first and root last.
#[derive(Debug)]
pub struct Program {
    pub arena: ScopeArena,
    pub modules: Vec<LinkedModule>,
}

impl Program {
    pub fn root(&self) -> Option<&LinkedModule> {
        self.modules.last()
    }

    pub fn get(&self, key: &str) -> Option<&LinkedModule> {
        self.modules.iter().find(|linked| linked.module.key == key)
    }

    /// Diagnostics of every module, in compile order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.modules
            .iter()
            .flat_map(|linked| self.arena.get_errors(linked.scopes.global).iter().cloned())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.modules
            .iter()
            .any(|linked| self.arena.has_errors(linked.scopes.global))
    }

    pub fn compile_order(&self) -> Vec<&str> {
        self.modules
            .iter()
            .map(|linked| linked.module.key.as_str())
            .collect()
    }
}

/// Checks every module of an acyclic graph in dependency order. Each module
/// sees the Global scopes of its already checked dependencies.
pub fn link(mut graph: ModuleGraph) -> Result<Program, InternalFault> {
    let order = graph.topological_order()?;
    debug!(
        order = ?order
            .iter()
            .map(|&node| graph.nodes[node].module.key.as_str())
            .collect::<Vec<_>>(),
        "computed compile order"
    );

    let mut positions: FxHashMap<usize, usize> = FxHashMap::default();
    let mut arena = ScopeArena::new();
    let mut modules: Vec<LinkedModule> = vec![];

    for &node in &order {
        let graph_node = &graph.nodes[node];

        let mut links = FxHashMap::default();
        let mut imports = Imports::default();
        for (use_path, child) in &graph_node.children {
            let position = *positions.get(child).ok_or_else(|| InternalFault::MalformedGraph {
                module: graph.nodes[*child].module.key.clone(),
            })?;
            links.insert(use_path.clone(), position);
            imports.insert(use_path.clone(), modules[position].scopes.global);
        }

        let scopes = match &graph_node.module.kind {
            ModuleKind::Virtual(body) => check_module(&mut arena, body, &imports),
            ModuleKind::Native(native) => ModuleScopes {
                global: arena.new_native(&native.exports()),
                functions: FxHashMap::default(),
            },
        };

        positions.insert(node, modules.len());
        modules.push(LinkedModule {
            module: graph_node.module.clone(),
            scopes,
            links,
        });
    }

    Ok(Program { arena, modules })
}
