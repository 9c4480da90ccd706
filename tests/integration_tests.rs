//! Integration tests for end-to-end checking.
//!
//! These tests verify that the complete pipeline works correctly from source
//! code through tokenization, parsing and type checking, down to the
//! diagnostics and types recorded in the resulting module.

use std::rc::Rc;

use typeck::{
    ast::ast::{Ast, NodeKind},
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{
        module::Module,
        type_checker::{type_check, CheckOptions},
    },
    types::types::Type,
};

fn check(source: &str) -> (Ast, Module) {
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();
    let ast = parse(tokens, Rc::new("test.lang".to_string())).unwrap();
    let module = type_check(&ast, CheckOptions::default()).unwrap();
    (ast, module)
}

fn type_of_item(module: &Module, name: &str) -> Option<Type> {
    module
        .items()
        .into_iter()
        .find(|symbol| symbol.name == name)
        .and_then(|symbol| symbol.ty.clone())
}

#[test]
fn test_check_simple_declaration() {
    let (_, module) = check("x := 1");

    assert!(!module.has_errors());
    assert_eq!(type_of_item(&module, "x"), Some(Type::i32()));
}

#[test]
fn test_check_redeclaration() {
    let (ast, module) = check("x := 1\nx := 2");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].kind(),
        ErrorImpl::AlreadyDefined { name, .. } if name == "x"
    ));

    let NodeKind::VarDecl { name, .. } = ast.kind(ast.items()[1]) else {
        panic!("expected a variable declaration");
    };
    assert_eq!(errors[0].get_node(), Some(*name));
}

#[test]
fn test_check_function_call() {
    let (_, module) = check("f := (a: i32, b: i32) i32 { a + b }\nr := f(1, 2)");

    assert!(!module.has_errors());
    assert_eq!(type_of_item(&module, "r"), Some(Type::i32()));
}

#[test]
fn test_check_function_arity() {
    let (ast, module) = check("f := (a: i32, b: i32) i32 { a + b }\nr := f(1)");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].kind(),
        ErrorImpl::ArityMismatch { index: 1, .. }
    ));

    let node = errors[0].get_node().unwrap();
    assert!(matches!(ast.kind(node), NodeKind::ParenList(items) if items.len() == 1));
}

#[test]
fn test_check_if_else() {
    let (_, module) = check("v := if true { 1 } else { 2 }");

    assert!(!module.has_errors());
    assert_eq!(type_of_item(&module, "v"), Some(Type::i32()));
}

#[test]
fn test_check_if_else_mismatch() {
    let (ast, module) = check("v := if true { 1 } else { \"no\" }");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);

    match errors[0].kind() {
        ErrorImpl::TypeMismatch { expected, .. } => assert_eq!(expected, &Type::i32()),
        other => panic!("expected a type mismatch, got {:?}", other),
    }

    let node = errors[0].get_node().unwrap();
    assert!(matches!(ast.kind(node), NodeKind::Literal { value, .. } if value == "no"));
}

#[test]
fn test_check_array_literal_mismatch() {
    let (ast, module) = check("xs := [1, 2, \"x\"]");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind(), ErrorImpl::TypeMismatch { .. }));

    let NodeKind::VarDecl { value, .. } = ast.kind(ast.items()[0]) else {
        panic!("expected a variable declaration");
    };
    let NodeKind::BracketList(items) = ast.kind(value.unwrap()) else {
        panic!("expected an array literal");
    };
    assert_eq!(errors[0].get_node(), Some(items[2]));
}

#[test]
fn test_check_tuple_index_out_of_range() {
    let (_, module) = check("t := (1, true)\nx := t[5]");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind(),
        &ErrorImpl::IndexOutOfRange { index: 5, len: 2 }
    );
}

#[test]
fn test_check_nested_shadowing() {
    let source = "x := 1\nf := () bool {\n    x := true\n    x\n}\ny: i32 = x";
    let (_, module) = check(source);

    assert!(!module.has_errors());
    assert_eq!(module.warnings().count(), 0);
    assert_eq!(type_of_item(&module, "y"), Some(Type::i32()));
}

#[test]
fn test_check_reports_every_failing_statement() {
    let (_, module) = check("a := b\nc: bool = 1\nd := 2\ne := @nope()");

    let names: Vec<&str> = module.diagnostics().map(|e| e.get_error_name()).collect();
    assert_eq!(names, ["UndefinedIdentifier", "TypeMismatch", "UnknownBuiltin"]);
    assert_eq!(type_of_item(&module, "d"), Some(Type::i32()));
}

#[test]
fn test_check_program() {
    let source = "\
struct Point {
    x: i32
    y: i32
}

type Grid = [4]Point

sum := (xs: [3]i32) i32 {
    total := 0
    i := 0
    while i < 3 {
        total = total + xs[i]
        i = i + 1
    }
    total
}

n := sum([1, 2, 3])
@assert(@size_of(Grid) == 32)
@print(n)
";
    let (_, module) = check(source);

    let names: Vec<&str> = module.diagnostics().map(|e| e.get_error_name()).collect();
    assert!(names.is_empty(), "{:?}", names);
    assert_eq!(type_of_item(&module, "n"), Some(Type::i32()));
}
