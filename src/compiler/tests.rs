//! Unit tests for the compiler module.
//!
//! This module contains tests for:
//! - The bytecode dump of module and function bodies
//! - Cell reservation and resolution under shadowing
//! - Jump patching and statement cleanup
//! - Imports

use std::{path::Path, rc::Rc};

use pretty_assertions::assert_eq;

use super::{
    bytecode::{ClosureTemplate, Constant, Instruction},
    compiler::compile_module,
};
use crate::{
    errors::errors::InternalFault,
    linker::{
        graph::ModuleGraph,
        linker::{link, Program},
        loader::{MemoryLoader, ModuleLoader},
    },
    parser::parser::parse_source,
    vm::stdlib::std_module_with_output,
};

fn link_program(loader: &MemoryLoader, root: &str) -> Program {
    let source = loader.load(Path::new(root)).unwrap();
    let natives = vec![Rc::new(std_module_with_output(|_| {}))];
    let graph = ModuleGraph::build(root.into(), parse_source(&source).unwrap(), loader, &natives).unwrap();
    link(graph).unwrap()
}

fn program(loader: &MemoryLoader, root: &str) -> Program {
    let program = link_program(loader, root);
    assert!(program.diagnostics().is_empty(), "{:?}", program.diagnostics());
    program
}

fn compile(source: &str) -> Rc<ClosureTemplate> {
    let loader = MemoryLoader::new().with_module("main.ql", source);
    compile_root(&program(&loader, "main.ql"))
}

fn compile_root(program: &Program) -> Rc<ClosureTemplate> {
    let root = program.root().unwrap();
    compile_module(program, root).unwrap().unwrap()
}

#[test]
fn test_module_dump() {
    let template = compile("let a := 1; let b := a + 2;");

    assert_eq!(
        template.to_string(),
        "closure #0 ()\n\
         0000 RESERVE a#0\n\
         0001 RESERVE b#1\n\
         0002 PUSH 1\n\
         0003 STORE a#0\n\
         0004 LOAD a#0\n\
         0005 PUSH 2\n\
         0006 ADD\n\
         0007 STORE b#1\n\
         0008 HALT\n"
    );
}

#[test]
fn test_function_dump() {
    let template = compile("let add := fn(a: Int, b: Int): Int { return a + b; };");

    assert_eq!(
        template.to_string(),
        "closure #0 ()\n\
         0000 RESERVE add#2\n\
         0001 PUSH <closure #1>\n\
         0002 STORE add#2\n\
         0003 HALT\n\
         closure #1 (a#0 b#1)\n\
         0000 LOAD a#0\n\
         0001 LOAD b#1\n\
         0002 ADD\n\
         0003 RETURN\n\
         0004 PUSH none\n\
         0005 RETURN\n"
    );
}

#[test]
fn test_parameters_are_not_reserved() {
    let template = compile("let f := fn(n: Int) { let m := n; };");
    let function = template.nested().next().unwrap();

    let reserved: Vec<String> = function
        .bytecode
        .instructions
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Reserve(cell) => Some(cell.to_string()),
            _ => None,
        })
        .collect();

    assert_eq!(reserved, vec![String::from("m#1")]);
    assert_eq!(function.parameters.len(), 1);
}

#[test]
fn test_if_jump_is_patched_past_body() {
    let template = compile("let x := 1; if x > 0 { x = 2; }");

    assert_eq!(
        template.bytecode.to_string(),
        "0000 RESERVE x#0\n\
         0001 PUSH 1\n\
         0002 STORE x#0\n\
         0003 LOAD x#0\n\
         0004 PUSH 0\n\
         0005 GT\n\
         0006 JUMP_IF_FALSE 9\n\
         0007 PUSH 2\n\
         0008 STORE x#0\n\
         0009 HALT\n"
    );
}

#[test]
fn test_if_body_declarations_are_reserved_up_front() {
    let template = compile("if true { let y := 1; }");
    assert!(matches!(
        &template.bytecode.instructions[0],
        Instruction::Reserve(cell) if cell.name == "y"
    ));
}

#[test]
fn test_expression_statements_are_popped() {
    let template = compile("let x := 1; x + 1; x = 3;");
    let dump = template.bytecode.to_string();

    // The sum is discarded, the assignment leaves nothing behind.
    assert!(dump.contains("0005 ADD\n0006 POP\n"));
    assert!(dump.ends_with("0007 PUSH 3\n0008 STORE x#0\n0009 HALT\n"));
}

#[test]
fn test_nested_assignment_pushes_none() {
    // Rejected by the checker since assignments have no value, but still
    // lowered so the stack stays balanced.
    let loader = MemoryLoader::new().with_module("main.ql", "let x := 1; let y := 2; x = y = 3;");
    let program = link_program(&loader, "main.ql");
    assert!(program.has_errors());
    let template = compile_root(&program);

    assert_eq!(
        template.bytecode.instructions[6..]
            .iter()
            .map(|instruction| instruction.to_string())
            .collect::<Vec<_>>(),
        vec!["PUSH 3", "STORE y#1", "PUSH none", "STORE x#0", "HALT"]
    );
}

#[test]
fn test_shadowing_resolves_to_the_declared_cell() {
    let template = compile(
        "let x := 1;\n\
         let f := fn(): Int { let y := x; let x := 2; return x + y; };",
    );
    let function = template.nested().next().unwrap();

    assert_eq!(
        function.bytecode.to_string(),
        "0000 RESERVE y#1\n\
         0001 RESERVE x#2\n\
         0002 LOAD x#0\n\
         0003 STORE y#1\n\
         0004 PUSH 2\n\
         0005 STORE x#2\n\
         0006 LOAD x#2\n\
         0007 LOAD y#1\n\
         0008 ADD\n\
         0009 RETURN\n\
         0010 PUSH none\n\
         0011 RETURN\n"
    );
}

#[test]
fn test_dispatch_pushes_arguments_before_callee() {
    let template = compile("let f := fn(a: Int, b: Str) {}; f(1, \"s\");");

    assert_eq!(
        template.bytecode.instructions[3..]
            .iter()
            .map(|instruction| instruction.to_string())
            .collect::<Vec<_>>(),
        vec!["PUSH 1", "PUSH \"s\"", "LOAD f#2", "DISPATCH 2", "POP", "HALT"]
    );
}

#[test]
fn test_self_and_lists() {
    let template = compile("let f := fn(n: Int): Int? { self; return [n, n][0 + 1]; };");
    let function = template.nested().next().unwrap();

    assert_eq!(
        function
            .bytecode
            .instructions
            .iter()
            .map(|instruction| instruction.to_string())
            .collect::<Vec<_>>(),
        vec![
            "LOAD_SELF",
            "POP",
            "LOAD n#0",
            "LOAD n#0",
            "MAKE_LIST 2",
            "PUSH 0",
            "PUSH 1",
            "ADD",
            "SUBSCRIPT",
            "RETURN",
            "PUSH none",
            "RETURN"
        ]
    );
}

#[test]
fn test_template_ids_are_unique_per_module() {
    let template = compile("let f := fn() { let g := fn() {}; }; let h := fn() {};");

    let ids: Vec<u32> = template.nested().map(|nested| nested.id).collect();
    let inner: Vec<u32> = template
        .nested()
        .flat_map(|nested| nested.nested().map(|inner| inner.id).collect::<Vec<_>>())
        .collect();

    assert_eq!(template.id, 0);
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(inner, vec![2]);
}

#[test]
fn test_imports_store_into_module_cells() {
    let loader = MemoryLoader::new()
        .with_module("main.ql", "use \"./lib.ql\"; let y := x;")
        .with_module("lib.ql", "pub let x := 1;");
    let program = program(&loader, "main.ql");

    assert_eq!(
        compile_root(&program).bytecode.to_string(),
        "0000 RESERVE x#1\n\
         0001 RESERVE y#2\n\
         0002 IMPORT lib.ql.x\n\
         0003 STORE x#1\n\
         0004 LOAD x#1\n\
         0005 STORE y#2\n\
         0006 HALT\n"
    );
}

#[test]
fn test_use_filter_imports_only_named_exports() {
    let loader = MemoryLoader::new().with_module("main.ql", "use \"std\" (print, len);");
    let program = program(&loader, "main.ql");

    let imports: Vec<String> = compile_root(&program)
        .bytecode
        .instructions
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Import { module, name } => Some(format!("{}.{}", module, name)),
            _ => None,
        })
        .collect();

    assert_eq!(imports, vec![String::from("std.print"), String::from("std.len")]);
}

#[test]
fn test_native_modules_have_no_template() {
    let loader = MemoryLoader::new().with_module("main.ql", "use \"std\";");
    let program = program(&loader, "main.ql");

    let native = program.get("std").unwrap();
    assert!(compile_module(&program, native).unwrap().is_none());
}

#[test]
fn test_string_constants_are_quoted_in_dumps() {
    let template = compile("let s := \"a b\";");
    assert!(matches!(
        &template.bytecode.instructions[1],
        Instruction::Push(Constant::Str(value)) if value.as_ref() == "a b"
    ));
    assert!(template.to_string().contains("PUSH \"a b\"\n"));
}

#[test]
fn test_unknown_operator_is_internal_fault() {
    assert_eq!(Instruction::binary("**").map(|i| i.to_string()), None);
    assert_eq!(
        InternalFault::UnknownOperator {
            operator: String::from("**")
        }
        .to_string(),
        "operator \"**\" has no instruction"
    );
}
