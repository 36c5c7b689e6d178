//! Unit tests for the linker module.
//!
//! This module contains tests for:
//! - Path resolution and loaders
//! - Graph construction, memoisation and fail-fast errors
//! - Cycle detection and topological order
//! - Linking checked scopes across modules

use std::{path::Path, rc::Rc};

use pretty_assertions::assert_eq;

use super::{
    graph::ModuleGraph,
    linker::link,
    loader::{normalize, resolve_path, MemoryLoader, ModuleLoader},
    module::NativeModule,
};
use crate::{
    errors::errors::{GraphError, InternalFault},
    parser::parser::parse_source,
    type_checker::types::{FunctionType, Type},
    vm::object::Object,
};

fn natives() -> Vec<Rc<NativeModule>> {
    vec![Rc::new(NativeModule::new("host").with_builtin(
        "twice",
        FunctionType::new(vec![Type::int()], Type::int()),
        |args| Ok(Object::Int(args[0].as_int().unwrap_or(0) * 2)),
    ))]
}

fn build(loader: &MemoryLoader, root: &str) -> Result<ModuleGraph, GraphError> {
    let source = loader.load(Path::new(root)).unwrap();
    ModuleGraph::build(
        root.into(),
        parse_source(&source).unwrap(),
        loader,
        &natives(),
    )
}

fn keys(graph: &ModuleGraph, order: &[usize]) -> Vec<String> {
    order
        .iter()
        .map(|&node| graph.nodes[node].module.key.clone())
        .collect()
}

#[test]
fn test_normalize_and_resolve() {
    assert_eq!(normalize(Path::new("a/./b/../c")), Path::new("a/c"));
    assert_eq!(normalize(Path::new("../x")), Path::new("../x"));
    assert_eq!(resolve_path(Path::new("lib/main"), "./util"), Path::new("lib/util"));
    assert_eq!(resolve_path(Path::new("lib/main"), "../top"), Path::new("top"));
    assert_eq!(resolve_path(Path::new("main"), "./b"), Path::new("b"));
}

#[test]
fn test_memory_loader_normalises_keys() {
    let loader = MemoryLoader::new().with_module("./dir/../a", "let x := 1;");
    assert_eq!(loader.load(Path::new("a")).unwrap(), "let x := 1;");
    assert!(loader.load(Path::new("missing")).is_err());
}

#[test]
fn test_diamond_is_loaded_once() {
    let loader = MemoryLoader::new()
        .with_module("main", "use \"./left\"; use \"./right\";")
        .with_module("left", "use \"./base\";")
        .with_module("right", "use \"./base\"; use \"host\";")
        .with_module("base", "pub let x := 1;");

    let mut graph = build(&loader, "main").unwrap();
    assert_eq!(graph.nodes.len(), 5);

    let base = graph.get_index("base").unwrap();
    assert_eq!(graph.nodes[base].parents.len(), 2);

    graph.detect_cycles().unwrap();
    let order = graph.topological_order().unwrap();
    assert_eq!(keys(&graph, &order), vec!["base", "left", "host", "right", "main"]);
}

#[test]
fn test_order_places_dependencies_first() {
    let loader = MemoryLoader::new()
        .with_module("a", "use \"./b\"; use \"./c\"; use \"./d\";")
        .with_module("b", "use \"./c\"; use \"./e\";")
        .with_module("c", "use \"./e\";")
        .with_module("d", "use \"./b\";")
        .with_module("e", "");

    let mut graph = build(&loader, "a").unwrap();
    graph.detect_cycles().unwrap();
    let order = graph.topological_order().unwrap();

    assert_eq!(order.len(), graph.nodes.len());
    for (position, &node) in order.iter().enumerate() {
        for (_, child) in &graph.nodes[node].children {
            let child_position = order.iter().position(|n| n == child).unwrap();
            assert!(child_position < position);
        }
    }
    assert_eq!(*order.last().unwrap(), graph.root);
}

#[test]
fn test_cycle_is_reported_with_its_path() {
    let loader = MemoryLoader::new()
        .with_module("a", "use \"./b\";")
        .with_module("b", "use \"./c\";")
        .with_module("c", "use \"./a\";");

    let mut graph = build(&loader, "a").unwrap();
    let error = graph.detect_cycles().unwrap_err();
    assert_eq!(error.to_string(), "import cycle detected: a <- b <- c <- a");
}

#[test]
fn test_cycle_path_is_minimal() {
    let loader = MemoryLoader::new()
        .with_module("root", "use \"./x\";")
        .with_module("x", "use \"./y\";")
        .with_module("y", "use \"./x\";");

    let mut graph = build(&loader, "root").unwrap();
    match graph.detect_cycles() {
        Err(GraphError::Cycle { path }) => assert_eq!(path, "x <- y <- x"),
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_sorting_a_cyclic_graph_is_an_internal_fault() {
    let loader = MemoryLoader::new()
        .with_module("a", "use \"./b\";")
        .with_module("b", "use \"./a\";");

    let mut graph = build(&loader, "a").unwrap();
    assert!(matches!(
        graph.topological_order(),
        Err(InternalFault::MalformedGraph { .. })
    ));
}

#[test]
fn test_missing_module_fails_fast() {
    let loader = MemoryLoader::new().with_module("a", "use \"./gone\";");
    assert!(matches!(build(&loader, "a"), Err(GraphError::Io { .. })));
}

#[test]
fn test_syntax_error_in_dependency() {
    let loader = MemoryLoader::new()
        .with_module("a", "use \"./b\";")
        .with_module("b", "let := ;");
    assert!(matches!(build(&loader, "a"), Err(GraphError::Syntax { .. })));
}

#[test]
fn test_bare_path_resolves_against_importer() {
    let loader = MemoryLoader::new()
        .with_module("app/main", "use \"lib\"; use \"host\";")
        .with_module("app/lib", "pub let x := 1;");

    let graph = build(&loader, "app/main").unwrap();
    let keys: Vec<&str> = graph.nodes.iter().map(|node| node.module.key.as_str()).collect();
    assert_eq!(keys, vec!["app/main", "app/lib", "host"]);
}

#[test]
fn test_unregistered_name_is_loaded_as_file() {
    let loader = MemoryLoader::new().with_module("a", "use \"nothing\";");
    match build(&loader, "a") {
        Err(GraphError::Io { path, .. }) => assert_eq!(path, Path::new("nothing")),
        other => panic!("expected a load failure, got {:?}", other),
    }
}

#[test]
fn test_link_checks_against_dependencies() {
    let loader = MemoryLoader::new()
        .with_module("main", "use \"./lib\"; use \"host\" (twice); let y := twice(value);")
        .with_module("lib", "pub let value := 21;");

    let mut graph = build(&loader, "main").unwrap();
    graph.detect_cycles().unwrap();
    let program = link(graph).unwrap();

    assert!(!program.has_errors());
    assert_eq!(program.compile_order(), vec!["lib", "host", "main"]);

    let root = program.root().unwrap();
    assert_eq!(root.links.get("./lib"), Some(&0));
    assert_eq!(root.links.get("host"), Some(&1));

    let y = program.arena.lookup(root.scopes.global, "y").unwrap();
    assert_eq!(y.ty.to_string(), "Int");
}

#[test]
fn test_link_collects_diagnostics_from_every_module() {
    let loader = MemoryLoader::new()
        .with_module("main", "use \"./lib\"; let y: Str := value;")
        .with_module("lib", "pub let value := nope;");

    let mut graph = build(&loader, "main").unwrap();
    graph.detect_cycles().unwrap();
    let program = link(graph).unwrap();

    let messages: Vec<_> = program
        .diagnostics()
        .into_iter()
        .map(|diagnostic| diagnostic.message)
        .collect();
    // The imported `value` has type ERROR, so the annotation does not cascade.
    assert_eq!(messages, vec!["'nope' is not declared"]);
}
