//! Unit tests for error handling.
//!
//! This module contains tests for error types, check results and error
//! reporting helpers.

use crate::ast::ast::{AstBuilder, NodeId, NodeKind};
use crate::errors::errors::{
    CheckError, Error, ErrorImpl, ErrorTip, InternalError, Severity,
};
use crate::types::types::Type;
use crate::{Position, Span};
use std::rc::Rc;

fn position(offset: u32) -> Position {
    Position(offset, Rc::new("test.lang".to_string()))
}

fn node() -> (NodeId, Span) {
    let span = Span {
        start: position(4),
        end: position(9),
    };
    let mut builder = AstBuilder::new();
    let id = builder.alloc(NodeKind::Ident(String::from("x")), span.clone());
    (id, span)
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "$".to_string(),
        },
        position(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_severity(), Severity::Error);
    assert!(error.get_node().is_none());
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_span().end.0, 42);
}

#[test]
fn test_error_at_node() {
    let (id, span) = node();
    let error = Error::at_node(
        ErrorImpl::UndefinedIdentifier {
            name: "x".to_string(),
        },
        id,
        span,
    );

    assert_eq!(error.get_node(), Some(id));
    assert_eq!(error.get_position().0, 4);
    assert_eq!(error.get_span().end.0, 9);
    assert_eq!(error.to_string(), "undefined identifier 'x'");
}

#[test]
fn test_warning() {
    let (id, span) = node();
    let error = Error::warning(
        ErrorImpl::Shadowed {
            name: "x".to_string(),
        },
        id,
        span,
    );

    assert!(error.is_warning());
    assert_eq!(error.get_error_name(), "Shadowed");
}

#[test]
fn test_partial_type() {
    let (id, span) = node();
    let error = Error::at_node(
        ErrorImpl::TypeMismatch {
            expected: Type::bool(),
            received: Type::i32(),
        },
        id,
        span,
    )
    .with_partial_type(Type::i32());

    assert_eq!(error.get_partial_type(), Some(&Type::i32()));
    assert_eq!(
        error.to_string(),
        "type mismatch: expected 'bool', got 'i32'"
    );
}

#[test]
fn test_index_out_of_range_message() {
    let error = ErrorImpl::IndexOutOfRange { index: 5, len: 3 };
    assert_eq!(error.to_string(), "index 5 out of range 0..2");
}

#[test]
fn test_already_defined_tip_names_previous_site() {
    let (id, span) = node();
    let error = Error::at_node(
        ErrorImpl::AlreadyDefined {
            name: "x".to_string(),
            previous: Span {
                start: position(1),
                end: position(2),
            },
        },
        id,
        span,
    );

    assert_eq!(
        error.get_tip().to_string(),
        "`x` was first declared at offset 1, rename one of them"
    );
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "$".to_string(),
        },
        position(0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        position(0),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(_) => (),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_check_error_conversions() {
    let error = Error::new(ErrorImpl::DivisionByZero, position(0));
    let check_error: CheckError = error.into();
    assert!(matches!(check_error, CheckError::Diagnostic(_)));

    let (id, _) = node();
    let check_error: CheckError = InternalError::BadNode { node: id }.into();
    assert!(matches!(
        check_error,
        CheckError::Internal(InternalError::BadNode { .. })
    ));
}

#[test]
fn test_constant_overflow_message() {
    let (id, span) = node();
    let error = Error::at_node(
        ErrorImpl::ConstantOverflow {
            value: 3000000000,
            target: Type::i32(),
        },
        id,
        span,
    );

    assert_eq!(error.to_string(), "constant 3000000000 overflows 'i32'");
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
}
