//! Unit tests for the type checker.
//!
//! Covers memoization, scopes and shadowing, lazy declaration resolution,
//! constant folding, built-in evaluation and the internal error paths.

use std::rc::Rc;

use super::{
    events::{CheckEvent, CheckObserver},
    module::Module,
    scope::{Scope, ScopeKind},
    symbols::{Symbol, SymbolKind},
    type_checker::{type_check, type_check_with_observer, CheckOptions, Checker},
    value::{TypedValue, Value},
};
use crate::{
    ast::ast::{Ast, AstBuilder, NodeKind},
    errors::errors::{ErrorImpl, InternalError},
    lexer::lexer::tokenize,
    parser::parser::parse,
    types::types::{PrimitiveKind, Type},
    Span,
};

#[derive(Default)]
struct RecordingObserver {
    events: Vec<String>,
}

impl CheckObserver for RecordingObserver {
    fn on_event(&mut self, event: CheckEvent<'_>) {
        let entry = match event {
            CheckEvent::Def { name, kind, .. } => format!("def {} {}", kind, name),
            CheckEvent::Use { name, .. } => format!("use {}", name),
            CheckEvent::ScopeEnter { kind, .. } => format!("enter {}", kind),
            CheckEvent::ScopeExit { .. } => String::from("exit"),
            CheckEvent::BuiltinEvaluated { name, .. } => format!("builtin {}", name),
        };
        self.events.push(entry);
    }
}

fn parse_source(source: &str) -> Ast {
    let tokens = tokenize(source.to_string(), Some("test.lang".to_string())).unwrap();
    parse(tokens, Rc::new("test.lang".to_string())).unwrap()
}

fn check_with(source: &str, options: CheckOptions) -> (Ast, Module) {
    let ast = parse_source(source);
    let module = type_check(&ast, options).unwrap();
    (ast, module)
}

fn check_source(source: &str) -> (Ast, Module) {
    check_with(source, CheckOptions::default())
}

fn error_names(module: &Module) -> Vec<&str> {
    module.diagnostics().map(|error| error.get_error_name()).collect()
}

fn item_type(module: &Module, name: &str) -> Type {
    module
        .items()
        .into_iter()
        .find(|symbol| symbol.name == name)
        .and_then(|symbol| symbol.ty.clone())
        .unwrap_or_else(|| panic!("no typed item named {}", name))
}

fn item_value(ast: &Ast, module: &Module, index: usize) -> Option<Value> {
    module
        .value_of(ast.items()[index])
        .and_then(|typed| typed.value.clone())
}

#[test]
fn test_typed_value_merge_keeps_known_fields() {
    let mut typed = TypedValue::constant(Type::i32(), Value::Int(3));

    typed.merge(TypedValue::default());
    assert_eq!(typed, TypedValue::constant(Type::i32(), Value::Int(3)));

    typed.merge(TypedValue::new(Type::bool()));
    assert_eq!(typed.ty, Some(Type::bool()));
    assert_eq!(typed.value, Some(Value::Int(3)));
}

#[test]
fn test_scope_define_keeps_first_symbol() {
    let mut module = Module::new();
    let scope = module.scope;

    let first = module
        .symbols
        .alloc(Symbol::new("x", SymbolKind::TypeAlias, scope, None, None));
    let second = module
        .symbols
        .alloc(Symbol::new("x", SymbolKind::TypeAlias, scope, None, None));

    assert_eq!(module.define(scope, first), None);
    assert_eq!(module.define(scope, second), Some(first));
    assert_eq!(module.scope(scope).get("x"), Some(first));
    assert_eq!(module.scope(scope).len(), 1);
}

#[test]
fn test_lookup_walks_enclosing_scopes() {
    let mut module = Module::new();
    let outer = module.scope;
    let inner = module.new_scope(ScopeKind::Block, outer);

    let symbol = module
        .symbols
        .alloc(Symbol::new("y", SymbolKind::TypeAlias, outer, None, None));
    module.define(outer, symbol);

    assert_eq!(module.lookup(inner, "y"), Some(symbol));
    assert_eq!(module.lookup(inner, "missing"), None);
    assert!(Scope::new(ScopeKind::Block, None).is_empty());
}

#[test]
fn test_variable_types() {
    let (_, module) = check_source("a := 1\nb: bool = true\nc := (a, b)\nd := [1, 2, 3]\ne := &a");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(item_type(&module, "a"), Type::i32());
    assert_eq!(item_type(&module, "b"), Type::bool());
    assert_eq!(
        item_type(&module, "c"),
        Type::tuple(vec![Type::i32(), Type::bool()])
    );
    assert_eq!(item_type(&module, "d"), Type::array(Some(3), Type::i32()));
    assert_eq!(item_type(&module, "e"), Type::reference(Type::i32()));
}

#[test]
fn test_placeholder_array_size_adopts_initializer() {
    let (_, module) = check_source("xs: [_]i32 = [4, 5]");

    assert!(!module.has_errors());
    assert_eq!(item_type(&module, "xs"), Type::array(Some(2), Type::i32()));
}

#[test]
fn test_type_as_initializer_is_not_a_value() {
    let (_, module) = check_source("t := i32");

    assert_eq!(error_names(&module), ["NotAValue"]);
}

#[test]
fn test_value_as_annotation_is_not_a_type() {
    let (_, module) = check_source("n := 1\nm: n = 2");

    assert_eq!(error_names(&module), ["NotAType"]);
}

#[test]
fn test_missing_type() {
    let (_, module) = check_source("x: [_]i32");
    assert!(!module.has_errors());

    let (_, module) = check_source("struct S { a }");
    assert_eq!(error_names(&module), ["MissingType"]);
}

#[test]
fn test_poisoned_variable_does_not_cascade() {
    let (_, module) = check_source("x := y\nz := x + 1\nw := z");

    assert_eq!(error_names(&module), ["UndefinedIdentifier"]);
}

#[test]
fn test_functions_resolve_before_declaration() {
    let (_, module) = check_source("y := f()\nf := () i32 { 1 }");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(item_type(&module, "y"), Type::i32());
    assert!(item_type(&module, "f").is_func());
}

#[test]
fn test_recursive_function() {
    let source = "fact := (n: i32) i32 {\n    if n < 2 { 1 } else { n * fact(n - 1) }\n}\nx := fact(5)";
    let (_, module) = check_source(source);

    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(item_type(&module, "x"), Type::i32());
}

#[test]
fn test_function_body_checked_at_declaration() {
    let (_, module) = check_source("y := 2\nf := () i32 { y }\nmain := () i32 { f() }");
    assert!(!module.has_errors(), "{:?}", error_names(&module));

    let (_, module) = check_source("main := () i32 { f() }\ny := 2\nf := () i32 { y }");
    assert!(!module.has_errors(), "{:?}", error_names(&module));

    let (_, module) = check_source("f := () i32 { y }\ny := 2\nx := f()");
    assert_eq!(error_names(&module), ["UndefinedIdentifier"]);
    assert_eq!(item_type(&module, "x"), Type::i32());
}

#[test]
fn test_function_body_must_match_result() {
    let (ast, module) = check_source("f := () i32 { true }");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind(),
        &ErrorImpl::TypeMismatch {
            expected: Type::i32(),
            received: Type::bool()
        }
    );

    let node = errors[0].get_node().unwrap();
    assert_eq!(ast.ident_name(node), Some("true"));
}

#[test]
fn test_function_declaration_errors() {
    let (_, module) = check_source("f := (a: i32) i32");
    assert_eq!(error_names(&module), ["MissingFunctionBody"]);

    let (_, module) = check_source("g := (a: i32 = 1) {}");
    assert_eq!(error_names(&module), ["DefaultParameterValue"]);
}

#[test]
fn test_cyclic_aliases() {
    let (_, module) = check_source("type A = A");
    assert_eq!(error_names(&module), ["CyclicDefinition"]);

    let (_, module) = check_source("type A = B\ntype B = A\nx: A = 1");
    assert_eq!(error_names(&module), ["CyclicDefinition"]);
}

#[test]
fn test_alias_is_transparent() {
    let (_, module) = check_source("type Int = i32\nx: Int = 3\ny: i32 = x");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
}

#[test]
fn test_structs_and_enums() {
    let (_, module) = check_source("struct Node { value: i32, next: &Node }\nenum Color { Red, Green }");
    assert!(!module.has_errors(), "{:?}", error_names(&module));

    let (_, module) = check_source("struct Loop { inner: Loop }");
    assert_eq!(error_names(&module), ["CyclicDefinition"]);

    let (_, module) = check_source("struct Pair { a: i32, a: bool }");
    assert_eq!(error_names(&module), ["AlreadyDefined"]);

    let (_, module) = check_source("enum E { A, A }");
    assert_eq!(error_names(&module), ["AlreadyDefined"]);
}

#[test]
fn test_size_of() {
    let (ast, module) = check_source("@size_of((i32, bool))\nstruct P { x: i32, y: [2]i32 }\n@size_of(P)");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(item_value(&ast, &module, 0), Some(Value::Int(5)));
    assert_eq!(item_value(&ast, &module, 2), Some(Value::Int(12)));

    let (_, module) = check_source("@size_of(any)");
    assert_eq!(error_names(&module), ["UnsizedType"]);
}

#[test]
fn test_builtin_errors() {
    let (_, module) = check_source("@assert(1 == 2)\n@assert(1 < 2)");
    assert_eq!(error_names(&module), ["AssertionFailed"]);

    let (_, module) = check_source("@nope(1)");
    assert_eq!(error_names(&module), ["UnknownBuiltin"]);

    let (_, module) = check_source("@print { 1 }");
    assert_eq!(error_names(&module), ["UnsupportedArgumentForm"]);

    let (_, module) = check_source("@size_of(i32, bool)");
    assert_eq!(error_names(&module), ["ArityMismatch"]);
}

#[test]
fn test_print_is_variadic() {
    let (_, module) = check_source("@print()\n@print(1, true, \"x\")");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
}

#[test]
fn test_type_of_builtin() {
    let (_, module) = check_source("T := @type_of(1)\nx: T = 2");

    assert_eq!(error_names(&module), ["NotAValue"]);

    let (_, module) = check_source("type T = @type_of(true)\nx: T = false");
    assert!(!module.has_errors(), "{:?}", error_names(&module));
}

#[test]
fn test_builtin_evaluated_once() {
    let ast = parse_source("@size_of([4]i32)");
    let node = ast.items()[0];
    let mut observer = RecordingObserver::default();

    let (first, second) = {
        let mut checker = Checker::new(&ast, CheckOptions::default(), &mut observer);
        let first = checker.value_of(node).unwrap();
        let second = checker.value_of(node).unwrap();
        (first, second)
    };

    assert_eq!(first, second);
    assert_eq!(first.value, Some(Value::Int(16)));

    let evaluations = observer
        .events
        .iter()
        .filter(|event| *event == "builtin size_of")
        .count();
    assert_eq!(evaluations, 1);
}

#[test]
fn test_observer_sees_defs_before_uses() {
    let ast = parse_source("x := 1\nx + 1");
    let mut observer = RecordingObserver::default();
    let module = type_check_with_observer(&ast, CheckOptions::default(), &mut observer).unwrap();

    assert!(!module.has_errors());

    let def = observer.events.iter().position(|e| e == "def var x").unwrap();
    let usage = observer.events.iter().position(|e| e == "use x").unwrap();
    assert!(def < usage);
    assert!(observer.events.contains(&String::from("def const true")));
    assert!(observer.events.contains(&String::from("enter module")));
}

#[test]
fn test_defs_and_uses_are_disjoint() {
    let (ast, module) = check_source("x := 1\ny := x");

    let NodeKind::VarDecl { name, value, .. } = ast.kind(ast.items()[1]) else {
        panic!("expected a variable declaration");
    };

    let NodeKind::VarDecl { name: x_def, .. } = ast.kind(ast.items()[0]) else {
        panic!("expected a variable declaration");
    };

    let x_use = value.unwrap();
    assert!(module.uses.contains_key(&x_use));
    assert!(!module.defs.contains_key(&x_use));
    assert!(module.defs.contains_key(name));
    assert_eq!(module.symbol_at(x_use), module.defs.get(x_def).copied());
}

#[test]
fn test_redefinition_and_shadowing() {
    let (_, module) = check_source("x := 1\nx := 2");
    assert_eq!(error_names(&module), ["AlreadyDefined"]);

    let (_, module) = check_source("x := 1\n{\n    x := true\n    y: bool = x\n}\nz: i32 = x");
    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(module.warnings().count(), 0);
}

#[test]
fn test_shadowing_warning_option() {
    let options = CheckOptions {
        warn_on_shadowing: true,
        ..CheckOptions::default()
    };
    let (_, module) = check_with("x := 1\n{ x := true }", options);

    assert!(!module.has_errors());
    let warnings: Vec<_> = module.warnings().map(|w| w.get_error_name()).collect();
    assert_eq!(warnings, ["Shadowed"]);
}

#[test]
fn test_constant_folding() {
    let (ast, module) = check_source("1 + 2 * 3\n-(4 - 6)\n!true\n7 % 4 == 3\n1.5 * 2");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(item_value(&ast, &module, 0), Some(Value::Int(7)));
    assert_eq!(item_value(&ast, &module, 1), Some(Value::Int(2)));
    assert_eq!(item_value(&ast, &module, 2), Some(Value::Bool(false)));
    assert_eq!(item_value(&ast, &module, 3), Some(Value::Bool(true)));
    assert_eq!(item_value(&ast, &module, 4), Some(Value::Float(3.0)));
}

#[test]
fn test_division_by_zero() {
    let (_, module) = check_source("x := 1\ny := x / 0");

    assert_eq!(error_names(&module), ["DivisionByZero"]);
}

#[test]
fn test_overflowing_constant_has_no_value() {
    let (ast, module) = check_source("9223372036854775807 + 1\n2 + 1");

    assert!(!module.has_errors());
    assert_eq!(item_value(&ast, &module, 0), None);
    assert_eq!(item_value(&ast, &module, 1), Some(Value::Int(3)));
}

#[test]
fn test_integer_constant_must_fit_i32() {
    let (_, module) = check_source("x: i32 = 3000000000\ny := 5000000000");
    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0].kind(),
        &ErrorImpl::ConstantOverflow {
            value: 3000000000,
            target: Type::i32()
        }
    );
    assert_eq!(errors[1].get_error_name(), "ConstantOverflow");

    let (_, module) = check_source("z := 2147483647 + 1");
    assert_eq!(error_names(&module), ["ConstantOverflow"]);

    let (_, module) = check_source("n := 1\nm := n + 2147483648");
    assert_eq!(error_names(&module), ["ConstantOverflow"]);

    let (_, module) = check_source("f := (a: i32) {}\nf(4294967296)");
    assert_eq!(error_names(&module), ["ConstantOverflow"]);

    let (_, module) = check_source("low := -2147483648\nhigh := 2147483647\nbig := 2147483647 + 1 - 1");
    assert!(!module.has_errors(), "{:?}", error_names(&module));
}

#[test]
fn test_operator_errors() {
    let (_, module) = check_source("-true");
    assert_eq!(error_names(&module), ["UndefinedOperator"]);

    let (_, module) = check_source("\"a\" + \"b\"");
    assert_eq!(error_names(&module), ["UndefinedOperator"]);

    let (_, module) = check_source("1 + true");
    assert_eq!(error_names(&module), ["TypeMismatch"]);

    let (_, module) = check_source("x := 1\nx.*");
    assert_eq!(error_names(&module), ["NotAReference"]);

    let (_, module) = check_source("x := 1\n&mut x");
    assert_eq!(error_names(&module), ["Unsupported"]);
}

#[test]
fn test_unwrap_reference() {
    let (_, module) = check_source("x := 1\nr := &x\ny: i32 = r.*\nr.* = 3");

    assert!(!module.has_errors(), "{:?}", error_names(&module));
}

#[test]
fn test_assignment_targets() {
    let (_, module) = check_source("x := 1\nx = 2\nxs := [1, 2]\nxs[0] = 5");
    assert!(!module.has_errors(), "{:?}", error_names(&module));

    let (_, module) = check_source("true = false");
    assert_eq!(error_names(&module), ["NotAssignable"]);

    let (_, module) = check_source("x := 1\nx + 1 = 2");
    assert_eq!(error_names(&module), ["NotAssignable"]);
}

#[test]
fn test_indexing() {
    let (_, module) = check_source("t := (1, true)\nb: bool = t[1]\nxs := [1, 2]\nn: i32 = xs[1]");
    assert!(!module.has_errors(), "{:?}", error_names(&module));

    let (_, module) = check_source("xs := [1, 2]\nxs[2]");
    assert_eq!(error_names(&module), ["IndexOutOfRange"]);

    let (_, module) = check_source("t := (1, true)\ni := 0\nt[i]");
    assert_eq!(error_names(&module), ["ExpectedConstantIndex"]);

    let (_, module) = check_source("x := 1\nx[0]");
    assert_eq!(error_names(&module), ["NotAnArrayOrTuple"]);

    let (_, module) = check_source("xs := [1]\nxs[true]");
    assert_eq!(error_names(&module), ["TypeMismatch"]);
}

#[test]
fn test_call_errors() {
    let (_, module) = check_source("x := 1\nx(2)");
    assert_eq!(error_names(&module), ["NotAFunction"]);

    let (ast, module) = check_source("f := (a: i32, b: bool) {}\nf(1, 2)");
    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].kind(),
        ErrorImpl::ArgumentTypeMismatch { index: 1, .. }
    ));
    assert!(matches!(
        ast.kind(errors[0].get_node().unwrap()),
        NodeKind::Literal { value, .. } if value == "2"
    ));
}

#[test]
fn test_array_types() {
    let (_, module) = check_source("m: [2]([3]i32) = [[1, 2, 3], [4, 5, 6]]");
    assert!(!module.has_errors(), "{:?}", error_names(&module));
    assert_eq!(
        item_type(&module, "m"),
        Type::array(Some(2), Type::array(Some(3), Type::i32()))
    );

    let (_, module) = check_source("x: [99999999999]i32");
    assert_eq!(error_names(&module), ["InvalidArraySize"]);
}

#[test]
fn test_empty_array_literal_is_unknown() {
    let (_, module) = check_source("xs := []");

    assert_eq!(
        item_type(&module, "xs"),
        Type::array(Some(0), Type::Primitive(PrimitiveKind::Unknown))
    );
}

#[test]
fn test_condition_error_keeps_partial_type() {
    let (_, module) = check_source("x := if 1 { 2 } else { 3 }");

    let errors: Vec<_> = module.diagnostics().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind(),
        &ErrorImpl::TypeMismatch {
            expected: Type::bool(),
            received: Type::Primitive(PrimitiveKind::UntypedInt)
        }
    );
    assert_eq!(errors[0].get_partial_type(), Some(&Type::i32()));
}

#[test]
fn test_untyped_bool_condition_is_rejected() {
    let (_, module) = check_source("while 1 < 2 {}");
    assert_eq!(error_names(&module), ["TypeMismatch"]);

    let (_, module) = check_source("i := 0\nwhile i < 3 { i = i + 1 }");
    assert!(!module.has_errors(), "{:?}", error_names(&module));
}

#[test]
fn test_loop_body_must_be_unit() {
    let (_, module) = check_source("while true { 1 }");

    assert_eq!(error_names(&module), ["NonUnitLoopBody"]);
}

#[test]
fn test_recursion_limit() {
    let options = CheckOptions {
        recursion_limit: 4,
        ..CheckOptions::default()
    };
    let (_, module) = check_with("x := 1 + 1 + 1 + 1 + 1 + 1 + 1", options);

    assert_eq!(error_names(&module), ["RecursionLimit"]);
}

#[test]
fn test_bad_node_is_an_internal_error() {
    let mut builder = AstBuilder::new();
    let bad = builder.alloc(NodeKind::BadNode, Span::null());
    let root = builder.alloc(NodeKind::Module(vec![bad]), Span::null());
    let ast = builder.finish(root);

    let result = type_check(&ast, CheckOptions::default());
    assert_eq!(result.err(), Some(InternalError::BadNode { node: bad }));
}

#[test]
fn test_items_in_definition_order() {
    let (_, module) = check_source("b := 1\na := true\nf := () {}");

    let names: Vec<&str> = module.items().iter().map(|symbol| symbol.name()).collect();
    assert_eq!(names, ["f", "b", "a"]);
}
