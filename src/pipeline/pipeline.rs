//! End-to-end orchestration: load, resolve, check, compile, evaluate.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    ast::ast::BlockStmt,
    compiler::{bytecode::ClosureTemplate, compiler::compile_module},
    errors::errors::{GraphError, InternalFault, PipelineError},
    linker::{
        graph::ModuleGraph,
        linker::{link, LinkedModule, Program},
        loader::{normalize, FileLoader, ModuleLoader},
        module::{ModuleKind, NativeModule},
    },
    parser::parser::parse_source,
    vm::{
        environment::Environment,
        object::Object,
        stdlib::std_module,
        vm::{DEFAULT_MAX_CALL_DEPTH, VM},
    },
};

/// Settings for a [`Pipeline`].
pub struct PipelineConfig {
    /// Modules importable by reserved name
    pub natives: Vec<Rc<NativeModule>>,
    /// Nested closure calls allowed before the run is aborted
    pub max_call_depth: usize,
    /// Where imported module sources come from
    pub loader: Box<dyn ModuleLoader>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            natives: vec![Rc::new(std_module())],
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            loader: Box::new(FileLoader),
        }
    }
}

impl PipelineConfig {
    /// Adds a native module, replacing one registered under the same name.
    pub fn with_native(mut self, native: NativeModule) -> Self {
        self.natives.retain(|existing| existing.name != native.name);
        self.natives.push(Rc::new(native));
        self
    }

    pub fn without_natives(mut self) -> Self {
        self.natives.clear();
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }
}

/// The outcome of evaluating the root module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleValue {
    /// Value of a top-level `return`, otherwise `None`
    pub result: Object,
    /// Values of the module's `pub` declarations
    pub exports: FxHashMap<String, Object>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolves and checks the program rooted at `path`, read through the
    /// configured loader. Diagnostics are left on the returned program.
    pub fn check_file(&self, path: impl AsRef<Path>) -> Result<Program, PipelineError> {
        let path = normalize(path.as_ref());
        let source = self
            .config
            .loader
            .load(&path)
            .map_err(|source| GraphError::Io {
                path: path.clone(),
                source,
            })?;
        self.check_source(path, &source)
    }

    pub fn check_source(
        &self,
        path: impl AsRef<Path>,
        source: &str,
    ) -> Result<Program, PipelineError> {
        let ast = parse_source(source)?;
        self.check_ast(path, ast)
    }

    pub fn check_ast(&self, path: impl AsRef<Path>, ast: BlockStmt) -> Result<Program, PipelineError> {
        let path: PathBuf = normalize(path.as_ref());

        let mut graph = ModuleGraph::build(
            path,
            ast,
            self.config.loader.as_ref(),
            &self.config.natives,
        )?;
        graph.detect_cycles()?;
        debug!(modules = graph.nodes.len(), "resolved module graph");

        Ok(link(graph)?)
    }

    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<ModuleValue, PipelineError> {
        let program = self.check_file(path)?;
        self.run_checked(&program)
    }

    pub fn run_source(
        &self,
        path: impl AsRef<Path>,
        source: &str,
    ) -> Result<ModuleValue, PipelineError> {
        let program = self.check_source(path, source)?;
        self.run_checked(&program)
    }

    pub fn run_ast(&self, path: impl AsRef<Path>, ast: BlockStmt) -> Result<ModuleValue, PipelineError> {
        let program = self.check_ast(path, ast)?;
        self.run_checked(&program)
    }

    fn run_checked(&self, program: &Program) -> Result<ModuleValue, PipelineError> {
        if program.has_errors() {
            let diagnostics = program.diagnostics();
            warn!(diagnostics = diagnostics.len(), "type checking failed");
            return Err(PipelineError::Diagnostics(diagnostics));
        }
        self.execute(program)
    }

    /// Compiles every source module, in compile order. Native modules have
    /// no template.
    pub fn compile(
        &self,
        program: &Program,
    ) -> Result<Vec<Option<Rc<ClosureTemplate>>>, PipelineError> {
        program
            .modules
            .iter()
            .map(|module| compile_module(program, module).map_err(PipelineError::from))
            .collect()
    }

    /// Compiles and evaluates every module, dependencies first, without
    /// looking at diagnostics.
    pub fn execute(&self, program: &Program) -> Result<ModuleValue, PipelineError> {
        let templates = self.compile(program)?;
        let mut vm = VM::new(self.config.max_call_depth);
        let mut root = None;

        for (module, template) in program.modules.iter().zip(&templates) {
            match (&module.module.kind, template) {
                (ModuleKind::Native(native), _) => vm.register_native(native),
                (ModuleKind::Virtual(_), Some(template)) => {
                    let (result, env) = vm.evaluate(template)?;
                    let exports = collect_exports(program, module, &env)?;
                    debug!(module = %module.module.key, exports = exports.len(), "evaluated module");

                    vm.register_module(&module.module.key, exports.clone());
                    root = Some(ModuleValue { result, exports });
                }
                (ModuleKind::Virtual(_), None) => {
                    return Err(InternalFault::UncheckedModule {
                        path: module.module.key.clone(),
                    }
                    .into())
                }
            }
        }

        root.ok_or_else(|| {
            InternalFault::UncheckedModule {
                path: String::from("<root>"),
            }
            .into()
        })
    }
}

/// Reads the value of every `pub` declaration of `module` from the
/// environment its body ran in.
fn collect_exports(
    program: &Program,
    module: &LinkedModule,
    env: &Environment,
) -> Result<FxHashMap<String, Object>, PipelineError> {
    let global = program.arena.get(module.scopes.global);
    let mut exports = FxHashMap::default();

    for (name, _) in program.arena.exports(module.scopes.global) {
        let variable = global
            .variable_index(name)
            .and_then(|index| global.variable(index))
            .ok_or_else(|| InternalFault::MissingVariable { name: name.clone() })?;
        exports.insert(name.clone(), env.load(&variable.cell)?);
    }

    Ok(exports)
}
