//! The module dependency graph.
//!
//! Nodes live in one vector and refer to each other by index. The graph is
//! only needed until the compile order has been computed.

use std::{collections::VecDeque, path::PathBuf, rc::Rc};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    ast::ast::BlockStmt,
    errors::errors::{GraphError, InternalFault},
    parser::parser::parse_source,
};

use super::{
    loader::{resolve_path, ModuleLoader},
    module::{Module, NativeModule},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

#[derive(Debug)]
pub struct GraphNode {
    pub module: Module,
    /// Dependencies, keyed by the path written in the `use` statement.
    pub children: Vec<(String, usize)>,
    pub parents: Vec<usize>,
    state: VisitState,
}

impl GraphNode {
    fn new(module: Module) -> Self {
        GraphNode {
            module,
            children: vec![],
            parents: vec![],
            state: VisitState::Unvisited,
        }
    }
}

#[derive(Debug)]
pub struct ModuleGraph {
    pub nodes: Vec<GraphNode>,
    index: FxHashMap<String, usize>,
    pub root: usize,
}

impl ModuleGraph {
    /// Builds the graph breadth first from the root module. A `use` path that
    /// names a registered native module refers to it, any other path is a file
    /// relative to the importer. Every module is loaded once even when several
    /// modules import it. The first load or parse failure aborts the build.
    pub fn build(
        root_path: PathBuf,
        root: BlockStmt,
        loader: &dyn ModuleLoader,
        natives: &[Rc<NativeModule>],
    ) -> Result<ModuleGraph, GraphError> {
        let mut graph = ModuleGraph {
            nodes: vec![],
            index: FxHashMap::default(),
            root: 0,
        };
        graph.root = graph.add(Module::virtual_module(root_path, root));

        let mut queue = VecDeque::from([graph.root]);

        while let Some(current) = queue.pop_front() {
            let imports = graph.nodes[current].module.imports();
            for use_path in imports {
                let native = natives.iter().find(|native| native.name == use_path);
                let child = if let Some(native) = native {
                    match graph.index.get(&use_path) {
                        Some(&index) => index,
                        None => graph.add(Module::native_module(Rc::clone(native))),
                    }
                } else {
                    let importer = graph.nodes[current].module.path.clone().unwrap_or_default();
                    let resolved = resolve_path(&importer, &use_path);
                    let key = resolved.display().to_string();

                    match graph.index.get(&key) {
                        Some(&index) => index,
                        None => {
                            let source = loader.load(&resolved).map_err(|source| GraphError::Io {
                                path: resolved.clone(),
                                source,
                            })?;
                            let body = parse_source(&source).map_err(|error| GraphError::Syntax {
                                path: resolved.clone(),
                                error,
                            })?;
                            debug!(module = %key, "loaded module");

                            let index = graph.add(Module::virtual_module(resolved, body));
                            queue.push_back(index);
                            index
                        }
                    }
                };

                graph.add_edge(current, use_path, child);
            }
        }

        Ok(graph)
    }

    fn add(&mut self, module: Module) -> usize {
        let index = self.nodes.len();
        self.index.insert(module.key.clone(), index);
        self.nodes.push(GraphNode::new(module));
        index
    }

    fn add_edge(&mut self, parent: usize, use_path: String, child: usize) {
        if self.nodes[parent]
            .children
            .iter()
            .any(|(path, _)| *path == use_path)
        {
            return;
        }

        debug!(
            from = %self.nodes[parent].module.key,
            to = %self.nodes[child].module.key,
            "added import edge"
        );
        self.nodes[parent].children.push((use_path, child));
        if !self.nodes[child].parents.contains(&parent) {
            self.nodes[child].parents.push(parent);
        }
    }

    pub fn get_index(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn reset(&mut self) {
        for node in &mut self.nodes {
            node.state = VisitState::Unvisited;
        }
    }

    /// Fails with the repeating import path if the graph has a cycle.
    pub fn detect_cycles(&mut self) -> Result<(), GraphError> {
        self.reset();
        let mut path = vec![];
        self.visit_for_cycles(self.root, &mut path)
    }

    fn visit_for_cycles(&mut self, node: usize, path: &mut Vec<usize>) -> Result<(), GraphError> {
        match self.nodes[node].state {
            VisitState::Done => Ok(()),
            VisitState::InProgress => {
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                let names: Vec<&str> = path[start..]
                    .iter()
                    .chain(std::iter::once(&node))
                    .map(|&n| self.nodes[n].module.key.as_str())
                    .collect();
                Err(GraphError::Cycle {
                    path: names.join(" <- "),
                })
            }
            VisitState::Unvisited => {
                self.nodes[node].state = VisitState::InProgress;
                path.push(node);

                let children: Vec<usize> = self.nodes[node].children.iter().map(|(_, c)| *c).collect();
                for child in children {
                    self.visit_for_cycles(child, path)?;
                }

                path.pop();
                self.nodes[node].state = VisitState::Done;
                Ok(())
            }
        }
    }

    /// Dependencies first, root last. Must run after [`detect_cycles`]
    /// succeeded; meeting an in-progress node here means the graph changed
    /// underneath us.
    ///
    /// [`detect_cycles`]: ModuleGraph::detect_cycles
    pub fn topological_order(&mut self) -> Result<Vec<usize>, InternalFault> {
        self.reset();
        let mut order = vec![];
        self.visit_for_order(self.root, &mut order)?;
        Ok(order)
    }

    fn visit_for_order(&mut self, node: usize, order: &mut Vec<usize>) -> Result<(), InternalFault> {
        match self.nodes[node].state {
            VisitState::Done => Ok(()),
            VisitState::InProgress => Err(InternalFault::MalformedGraph {
                module: self.nodes[node].module.key.clone(),
            }),
            VisitState::Unvisited => {
                self.nodes[node].state = VisitState::InProgress;

                let children: Vec<usize> = self.nodes[node].children.iter().map(|(_, c)| *c).collect();
                for child in children {
                    self.visit_for_order(child, order)?;
                }

                self.nodes[node].state = VisitState::Done;
                order.push(node);
                Ok(())
            }
        }
    }
}
