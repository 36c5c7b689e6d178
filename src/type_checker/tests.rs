//! Unit tests for the type checker module.
//!
//! This module contains tests for:
//! - Type equality and display
//! - Scope bookkeeping
//! - Operator resolution
//! - Diagnostics produced by checking statements and expressions

use pretty_assertions::assert_eq;

use super::{
    operators::{resolve_operator, OperatorError},
    scope::ScopeArena,
    type_checker::{check_module, Imports, ModuleScopes},
    types::{FunctionType, Type},
};
use crate::{
    ast::types::TypeNote,
    parser::parser::parse_source,
    Position,
};

fn check_with(arena: &mut ScopeArena, source: &str, imports: &Imports) -> ModuleScopes {
    let ast = parse_source(source).unwrap();
    check_module(arena, &ast, imports)
}

fn check(source: &str) -> (ScopeArena, ModuleScopes) {
    let mut arena = ScopeArena::new();
    let scopes = check_with(&mut arena, source, &Imports::default());
    (arena, scopes)
}

fn diagnostics(source: &str) -> Vec<String> {
    let (arena, scopes) = check(source);
    arena
        .get_errors(scopes.global)
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect()
}

fn messages(source: &str) -> Vec<String> {
    let (arena, scopes) = check(source);
    arena
        .get_errors(scopes.global)
        .iter()
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

fn sample_types() -> Vec<Type> {
    vec![
        Type::Error,
        Type::Any,
        Type::Void,
        Type::int(),
        Type::str(),
        Type::bool(),
        Type::function(vec![], Type::Void),
        Type::function(vec![Type::int(), Type::bool()], Type::str()),
        Type::function(vec![Type::bool(), Type::int()], Type::str()),
        Type::function(vec![Type::Any], Type::Void),
        Type::Tuple(vec![Type::int(), Type::str()]),
        Type::Tuple(vec![Type::str(), Type::int()]),
        Type::list(Type::int()),
        Type::list(Type::Any),
        Type::optional(Type::int()),
        Type::optional(Type::str()),
    ]
}

// TYPES

#[test]
fn test_equality_is_reflexive_except_for_error() {
    for ty in sample_types() {
        assert_eq!(ty.equals(&ty), !ty.is_error(), "{}", ty);
    }
}

#[test]
fn test_equality_is_symmetric() {
    let types = sample_types();
    for a in &types {
        for b in &types {
            assert_eq!(a.equals(b), b.equals(a), "{} vs {}", a, b);
        }
    }
}

#[test]
fn test_any_matches_everything_but_error_and_void() {
    for ty in sample_types() {
        let expected = !ty.is_error() && !ty.is_void();
        assert_eq!(Type::Any.equals(&ty), expected, "{}", ty);
        assert_eq!(ty.equals(&Type::Any), expected, "{}", ty);
    }
}

#[test]
fn test_error_equals_nothing() {
    for ty in sample_types() {
        assert!(!Type::Error.equals(&ty));
    }
}

#[test]
fn test_structural_equality_is_order_sensitive() {
    let a = Type::function(vec![Type::int(), Type::bool()], Type::str());
    let b = Type::function(vec![Type::bool(), Type::int()], Type::str());
    assert!(!a.equals(&b));
    assert!(a.equals(&Type::function(vec![Type::int(), Type::bool()], Type::str())));
    assert!(!Type::Tuple(vec![Type::int()]).equals(&Type::Tuple(vec![Type::int(), Type::int()])));
    assert!(Type::list(Type::Any).equals(&Type::list(Type::str())));
}

#[test]
fn test_type_display() {
    assert_eq!(Type::Error.to_string(), "ERROR");
    assert_eq!(Type::Void.to_string(), "Void");
    assert_eq!(Type::Any.to_string(), "Any");
    assert_eq!(Type::Tuple(vec![Type::int(), Type::str()]).to_string(), "(Int Str)");
    assert_eq!(
        Type::optional(Type::list(Type::int())).to_string(),
        "[Int]?"
    );
}

#[test]
fn test_note_round_trip() {
    let cases = vec![
        (
            TypeNote::Function {
                parameters: vec![],
                return_type: Box::new(TypeNote::Void),
            },
            "() => Void",
        ),
        (
            TypeNote::Function {
                parameters: vec![TypeNote::ident("Int"), TypeNote::ident("Bool")],
                return_type: Box::new(TypeNote::ident("Str")),
            },
            "(Int Bool) => Str",
        ),
        (TypeNote::List(Box::new(TypeNote::ident("Int"))), "[Int]"),
        (TypeNote::Optional(Box::new(TypeNote::ident("Int"))), "Int?"),
    ];

    for (note, expected) in cases {
        assert_eq!(Type::from_note(&note).to_string(), expected);
    }
}

#[test]
fn test_parsed_annotation_round_trip() {
    let (arena, scopes) = check("let f: (Int Bool) => Str := fn(a: Int, b: Bool): Str { return \"\"; };");
    let variable = arena.lookup(scopes.global, "f").unwrap();
    assert_eq!(variable.ty.to_string(), "(Int Bool) => Str");
}

// SCOPES

#[test]
fn test_scope_redeclaration_is_a_diagnostic() {
    let mut arena = ScopeArena::new();
    let global = arena.new_global();
    assert!(arena.new_variable(global, "x", Type::int(), Position::new(1, 1)).is_some());
    assert!(arena.new_variable(global, "x", Type::str(), Position::new(2, 1)).is_none());
    assert_eq!(
        arena.get_errors(global)[0].to_string(),
        "(2:1) 'x' is already declared"
    );
}

#[test]
fn test_scope_lookup_walks_outwards_and_errors_reach_root() {
    let mut arena = ScopeArena::new();
    let global = arena.new_global();
    arena.new_variable(global, "x", Type::int(), Position::null());

    let local = arena.new_local(global, FunctionType::new(vec![], Type::Void));
    arena.new_variable(local, "x", Type::str(), Position::null());
    let inner = arena.new_local(local, FunctionType::new(vec![Type::int()], Type::int()));

    assert_eq!(arena.lookup(inner, "x").unwrap().ty.to_string(), "Str");
    assert_eq!(arena.lookup(global, "x").unwrap().ty.to_string(), "Int");
    assert!(!arena.has_local_variable(inner, "x"));
    assert!(arena.has_self_reference(inner));
    assert!(!arena.has_self_reference(global));
    assert_eq!(arena.root(inner), global);

    arena.new_error(inner, Position::new(3, 4), "boom");
    assert!(arena.has_errors(global));
    assert!(arena.has_errors(inner));
}

#[test]
fn test_cells_never_alias() {
    let mut arena = ScopeArena::new();
    let global = arena.new_global();
    let outer = arena.new_variable(global, "x", Type::int(), Position::null()).unwrap();
    let local = arena.new_local(global, FunctionType::new(vec![], Type::Void));
    let inner = arena.new_variable(local, "x", Type::int(), Position::null()).unwrap();

    assert_ne!(outer.id, inner.id);
}

#[test]
fn test_parameters_precede_locals() {
    let (arena, scopes) = check("let f := fn(a: Int, b: Int): Int { let c := a + b; return c; };");
    let local = arena.get(*scopes.functions.values().next().unwrap());

    let parameters: Vec<_> = local.parameters().iter().map(|v| v.cell.name.clone()).collect();
    let locals: Vec<_> = local.locals().iter().map(|v| v.cell.name.clone()).collect();
    assert_eq!(parameters, vec!["a", "b"]);
    assert_eq!(locals, vec!["c"]);
}

#[test]
fn test_only_global_scopes_export() {
    let mut arena = ScopeArena::new();
    let global = arena.new_global();
    let local = arena.new_local(global, FunctionType::new(vec![], Type::Void));

    assert!(arena.add_export(global, "x", Type::int(), Position::null()));
    assert!(!arena.add_export(global, "x", Type::int(), Position::new(2, 2)));
    assert!(!arena.add_export(local, "y", Type::int(), Position::new(3, 3)));
    assert_eq!(arena.exports(global).len(), 1);
    assert_eq!(arena.get_errors(global).len(), 2);
}

// OPERATORS

#[test]
fn test_operator_table() {
    assert_eq!(
        resolve_operator("+", &Type::str(), &Type::str()).unwrap().to_string(),
        "Str"
    );
    assert_eq!(
        resolve_operator("<", &Type::int(), &Type::int()).unwrap().to_string(),
        "Bool"
    );
    assert_eq!(
        resolve_operator("[", &Type::str(), &Type::int()).unwrap().to_string(),
        "Str?"
    );
    assert_eq!(
        resolve_operator("+", &Type::int(), &Type::str()).unwrap_err(),
        OperatorError::Mismatch
    );
    assert_eq!(
        resolve_operator("^", &Type::int(), &Type::int()).unwrap_err(),
        OperatorError::Unknown
    );
}

// CHECKER

#[test]
fn test_literal_declaration_binds_int() {
    let (arena, scopes) = check("let a := 123;");
    assert!(!arena.has_errors(scopes.global));
    assert_eq!(arena.lookup(scopes.global, "a").unwrap().ty.to_string(), "Int");
}

#[test]
fn test_return_mismatch_position() {
    assert_eq!(
        diagnostics("let f := fn(): Int { return \"abc\"; };"),
        vec!["(1:30) expected to return 'Int', got 'Str'"]
    );
}

#[test]
fn test_dispatch_on_function() {
    assert!(diagnostics(
        "let add := fn(a: Int, b: Int): Int { return a + b; }; add(2, 5);"
    )
    .is_empty());
}

#[test]
fn test_dispatch_on_non_function() {
    assert_eq!(
        messages("let add := 1; add(2, 5);"),
        vec!["cannot call function on type 'Int'"]
    );
}

#[test]
fn test_dispatch_arity_and_argument_mismatches() {
    assert_eq!(
        messages("let f := fn(a: Int, b: Str) {}; f(1); f(\"x\", 2);"),
        vec![
            "expected 2 arguments, got 1",
            "expected argument 1 to be 'Int', got 'Str'",
            "expected argument 2 to be 'Str', got 'Int'",
        ]
    );
}

#[test]
fn test_dispatch_checks_arguments_before_callee() {
    assert_eq!(
        messages("missing(nope);"),
        vec!["'nope' is not declared", "'missing' is not declared"]
    );
}

#[test]
fn test_dispatch_on_any_yields_any() {
    assert!(messages("let f := fn(g: Any) { let x: Int := g(1); };").is_empty());
}

#[test]
fn test_return_diagnostics() {
    assert_eq!(
        messages(
            "let a := fn() { return 1; };
             let b := fn(): Int { return; };
             return 2;"
        ),
        vec![
            "expected no return value, got 'Int'",
            "expected to return 'Int', got no value",
            "cannot return outside of a function",
        ]
    );
}

#[test]
fn test_error_operands_do_not_cascade() {
    assert_eq!(
        messages("let f := fn(): Int { return nope + 1; };"),
        vec!["'nope' is not declared"]
    );
}

#[test]
fn test_undeclared_variable_reports_once() {
    let (arena, scopes) = check("let x := y; let z := x + 1;");
    assert_eq!(arena.get_errors(scopes.global).len(), 1);
    assert!(arena.lookup(scopes.global, "x").unwrap().ty.is_error());
}

#[test]
fn test_self_is_the_enclosing_function() {
    assert!(messages(
        "let fact := fn(n: Int): Int {
            if n < 2 { return 1; }
            return n * self(n - 1);
        };"
    )
    .is_empty());
    assert_eq!(
        messages("let s := self;"),
        vec!["'self' can only be used inside a function"]
    );
}

#[test]
fn test_binary_operator_diagnostics() {
    assert_eq!(
        messages("let a := 1 + \"x\"; let b := true < false;"),
        vec![
            "cannot apply '+' to 'Int' and 'Str'",
            "cannot apply '<' to 'Bool' and 'Bool'",
        ]
    );
}

#[test]
fn test_subscripts() {
    let (arena, scopes) = check("let a := [1, 2][0]; let b := \"abc\"[1];");
    assert!(!arena.has_errors(scopes.global));
    assert_eq!(arena.lookup(scopes.global, "a").unwrap().ty.to_string(), "Int?");
    assert_eq!(arena.lookup(scopes.global, "b").unwrap().ty.to_string(), "Str?");

    assert_eq!(
        messages("let c := [1][\"x\"]; let d := 5[1];"),
        vec![
            "expected list index of type 'Int', got 'Str'",
            "cannot subscript 'Int' with 'Int'",
        ]
    );
}

#[test]
fn test_list_literals() {
    let (arena, scopes) = check("let xs := [1, 2, 3];");
    assert_eq!(arena.lookup(scopes.global, "xs").unwrap().ty.to_string(), "[Int]");

    assert_eq!(
        messages("let a := []; let b := [1, \"x\", true];"),
        vec![
            "cannot infer the element type of an empty list",
            "expected list element of type 'Int', got 'Str'",
        ]
    );
}

#[test]
fn test_assignment() {
    assert!(messages("let x := 1; x = 2;").is_empty());
    assert_eq!(
        messages("let x := 1; x = \"s\"; y = 1; 1 = 2;"),
        vec![
            "cannot assign 'Str' to 'x' of type 'Int'",
            "'y' is not declared",
            "only variables can be assigned to",
        ]
    );
}

#[test]
fn test_void_is_not_a_value() {
    assert_eq!(
        messages("let f := fn() {}; f(); let x := f();"),
        vec!["expected a value, got 'Void'"]
    );
    assert_eq!(
        messages("let x := 1; let y := (x = 2);"),
        vec!["expected a value, got 'Void'"]
    );
}

#[test]
fn test_if_condition_must_be_bool() {
    assert_eq!(
        messages("if 1 { let a := 1; }"),
        vec!["expected condition of type 'Bool', got 'Int'"]
    );
}

#[test]
fn test_annotated_declaration() {
    let (arena, scopes) = check("let x: Any := 1;");
    assert_eq!(arena.lookup(scopes.global, "x").unwrap().ty.to_string(), "Any");

    assert_eq!(
        messages("let y: Str := 1;"),
        vec!["cannot declare 'y' as 'Str' with a value of type 'Int'"]
    );
}

#[test]
fn test_duplicate_parameters() {
    assert_eq!(
        messages("let f := fn(a: Int, a: Int) {};"),
        vec!["'a' is already declared"]
    );
}

#[test]
fn test_pub_records_exports() {
    let (arena, scopes) = check("pub let a := 1; let b := 2; pub let c := \"x\";");
    let exports: Vec<_> = arena
        .exports(scopes.global)
        .iter()
        .map(|(name, ty)| format!("{}:{}", name, ty))
        .collect();
    assert_eq!(exports, vec!["a:Int", "c:Str"]);
}

#[test]
fn test_nested_pub_and_use() {
    assert_eq!(
        messages("let f := fn() { pub let a := 1; use \"x\"; };"),
        vec![
            "'pub' is only allowed at the top level of a module",
            "'use' is only allowed at the top level of a module",
        ]
    );
}

#[test]
fn test_pub_inside_if_body() {
    let (arena, scopes) = check("if false { pub let x := 1; }");

    assert_eq!(
        arena
            .get_errors(scopes.global)
            .iter()
            .map(|diagnostic| diagnostic.to_string())
            .collect::<Vec<_>>(),
        vec!["(1:12) 'pub' is only allowed at the top level of a module"]
    );
    assert!(arena.exports(scopes.global).is_empty());
}

#[test]
fn test_use_inside_if_body() {
    let mut arena = ScopeArena::new();
    let dependency = check_with(&mut arena, "pub let one := 1;", &Imports::default());
    let mut imports = Imports::default();
    imports.insert(String::from("./dep"), dependency.global);

    let scopes = check_with(&mut arena, "if true { use \"./dep\"; }", &imports);
    let errors: Vec<_> = arena
        .get_errors(scopes.global)
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect();

    assert_eq!(
        errors,
        vec!["(1:11) 'use' is only allowed at the top level of a module"]
    );
    assert!(arena.lookup(scopes.global, "one").is_none());
}

#[test]
fn test_use_declares_imports() {
    let mut arena = ScopeArena::new();
    let dependency = check_with(
        &mut arena,
        "pub let one := 1; pub let name := \"q\"; let hidden := 0;",
        &Imports::default(),
    );

    let mut imports = Imports::default();
    imports.insert(String::from("./dep"), dependency.global);

    let all = check_with(&mut arena, "use \"./dep\"; let x := one + 1;", &imports);
    assert!(!arena.has_errors(all.global));
    assert!(arena.lookup(all.global, "name").is_some());

    let filtered = check_with(
        &mut arena,
        "use \"./dep\" (one, hidden); let y := name;",
        &imports,
    );
    let errors: Vec<_> = arena
        .get_errors(filtered.global)
        .iter()
        .map(|diagnostic| diagnostic.message.clone())
        .collect();
    assert_eq!(
        errors,
        vec!["'hidden' is not exported by './dep'", "'name' is not declared"]
    );
    assert!(arena.lookup(filtered.global, "one").is_some());
}

#[test]
fn test_checking_continues_after_errors() {
    assert_eq!(
        messages("let a := nope; let a := 2; if a { } let b := [];"),
        vec![
            "'nope' is not declared",
            "'a' is already declared",
            "cannot infer the element type of an empty list",
        ]
    );
}

#[test]
fn test_function_scopes_are_recorded() {
    let (_, scopes) = check("let f := fn() { let g := fn() {}; }; let h := fn() {};");
    assert_eq!(scopes.functions.len(), 3);
}
