use std::fmt::Display;

use thiserror::Error;

use crate::ast::ast::NodeId;
use crate::types::types::Type;
use crate::{Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
    node: Option<NodeId>,
    severity: Severity,
    partial_type: Option<Type>,
}

impl Error {
    /// Creates an error without a syntax node, as raised by the lexer and
    /// the parser.
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            span: Span {
                start: position.clone(),
                end: position,
            },
            node: None,
            severity: Severity::Error,
            partial_type: None,
        }
    }

    /// Creates a checker diagnostic attached to `node`.
    pub fn at_node(error_impl: ErrorImpl, node: NodeId, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
            node: Some(node),
            severity: Severity::Error,
            partial_type: None,
        }
    }

    pub fn warning(error_impl: ErrorImpl, node: NodeId, span: Span) -> Self {
        Error {
            severity: Severity::Warning,
            ..Error::at_node(error_impl, node, span)
        }
    }

    /// Attaches the type that was already known when the error was raised.
    pub fn with_partial_type(mut self, ty: Type) -> Self {
        self.partial_type = Some(ty);
        self
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn get_partial_type(&self) -> Option<&Type> {
        self.partial_type.as_ref()
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UndefinedIdentifier { .. } => "UndefinedIdentifier",
            ErrorImpl::NoType { .. } => "NoType",
            ErrorImpl::AlreadyDefined { .. } => "AlreadyDefined",
            ErrorImpl::NotAType { .. } => "NotAType",
            ErrorImpl::NotAValue { .. } => "NotAValue",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::UndefinedOperator { .. } => "UndefinedOperator",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::NotAnArrayOrTuple { .. } => "NotAnArrayOrTuple",
            ErrorImpl::NotAReference { .. } => "NotAReference",
            ErrorImpl::NotAssignable => "NotAssignable",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            ErrorImpl::ExpectedArgumentCount { .. } => "ExpectedArgumentCount",
            ErrorImpl::IndexOutOfRange { .. } => "IndexOutOfRange",
            ErrorImpl::ExpectedConstantIndex => "ExpectedConstantIndex",
            ErrorImpl::InvalidArraySize { .. } => "InvalidArraySize",
            ErrorImpl::UnknownBuiltin { .. } => "UnknownBuiltin",
            ErrorImpl::MissingFunctionBody { .. } => "MissingFunctionBody",
            ErrorImpl::MissingType { .. } => "MissingType",
            ErrorImpl::DefaultParameterValue { .. } => "DefaultParameterValue",
            ErrorImpl::UnsupportedArgumentForm => "UnsupportedArgumentForm",
            ErrorImpl::Unsupported { .. } => "Unsupported",
            ErrorImpl::NonUnitLoopBody { .. } => "NonUnitLoopBody",
            ErrorImpl::CyclicDefinition { .. } => "CyclicDefinition",
            ErrorImpl::RecursionLimit { .. } => "RecursionLimit",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::ConstantOverflow { .. } => "ConstantOverflow",
            ErrorImpl::AssertionFailed => "AssertionFailed",
            ErrorImpl::UnsizedType { .. } => "UnsizedType",
            ErrorImpl::Redefined { .. } => "Redefined",
            ErrorImpl::Shadowed { .. } => "Shadowed",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a separator?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UndefinedIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` must be declared before it is used", name))
            }
            ErrorImpl::AlreadyDefined { name, previous } => ErrorTip::Suggestion(format!(
                "`{}` was first declared at offset {}, rename one of them",
                name, previous.start.0
            )),
            ErrorImpl::NotAType { .. } => {
                ErrorTip::Suggestion(String::from("A type annotation is expected here"))
            }
            ErrorImpl::NotAValue { .. } => {
                ErrorTip::Suggestion(String::from("A value is expected here, not a type"))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ArityMismatch { .. } | ErrorImpl::ArgumentTypeMismatch { .. } => {
                ErrorTip::Suggestion(String::from(
                    "Check the arguments against the function signature",
                ))
            }
            ErrorImpl::IndexOutOfRange { len, .. } => ErrorTip::Suggestion(format!(
                "Valid indices are 0..{}",
                len.saturating_sub(1)
            )),
            ErrorImpl::ExpectedConstantIndex => ErrorTip::Suggestion(String::from(
                "Tuple elements are selected with an integer literal",
            )),
            ErrorImpl::MissingFunctionBody { name } => {
                ErrorTip::Suggestion(format!("Add a `{{ ... }}` body to `{}`", name))
            }
            ErrorImpl::MissingType { name } => ErrorTip::Suggestion(format!(
                "Give `{}` a type annotation or an initial value",
                name
            )),
            ErrorImpl::UnsupportedArgumentForm => ErrorTip::Suggestion(String::from(
                "Built-ins take their arguments in parentheses",
            )),
            ErrorImpl::NonUnitLoopBody { .. } => ErrorTip::Suggestion(String::from(
                "The last statement of a loop body must not produce a value",
            )),
            ErrorImpl::CyclicDefinition { name } => {
                ErrorTip::Suggestion(format!("`{}` refers to itself", name))
            }
            ErrorImpl::ConstantOverflow { target, .. } => ErrorTip::Suggestion(format!(
                "The value must lie within the range of `{}`",
                target
            )),
            ErrorImpl::Unsupported { .. } => ErrorTip::Suggestion(String::from(
                "This feature is expected to be handled, but has not yet been implemented",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    #[error("undefined identifier '{name}'")]
    UndefinedIdentifier { name: String },
    #[error("'{name}' has no type")]
    NoType { name: String },
    #[error("'{name}' is already defined")]
    AlreadyDefined { name: String, previous: Span },
    #[error("expected type, got '{received}'")]
    NotAType { received: Type },
    #[error("expected value, got type '{received}'")]
    NotAValue { received: Type },
    #[error("type mismatch: expected '{expected}', got '{received}'")]
    TypeMismatch { expected: Type, received: Type },
    #[error("operator '{operator}' is not defined for '{operand}'")]
    UndefinedOperator { operator: String, operand: Type },
    #[error("'{received}' is not a function")]
    NotAFunction { received: Type },
    #[error("'{received}' is not an array or tuple")]
    NotAnArrayOrTuple { received: Type },
    #[error("'{received}' is not a reference")]
    NotAReference { received: Type },
    #[error("left-hand side of assignment is not assignable")]
    NotAssignable,
    #[error("{message}")]
    ArityMismatch { index: usize, message: String },
    #[error("{message}")]
    ArgumentTypeMismatch { index: usize, message: String },
    #[error("expected {expected} argument(s), got {received}")]
    ExpectedArgumentCount { expected: usize, received: usize },
    #[error("index {index} out of range 0..{}", .len.saturating_sub(1))]
    IndexOutOfRange { index: i64, len: usize },
    #[error("tuple index must be a constant integer")]
    ExpectedConstantIndex,
    #[error("invalid array size: {message}")]
    InvalidArraySize { message: String },
    #[error("unknown built-in '@{name}'")]
    UnknownBuiltin { name: String },
    #[error("function '{name}' has no body")]
    MissingFunctionBody { name: String },
    #[error("'{name}' needs a type")]
    MissingType { name: String },
    #[error("parameter '{name}' cannot have a default value")]
    DefaultParameterValue { name: String },
    #[error("built-in arguments must be a parenthesised list")]
    UnsupportedArgumentForm,
    #[error("{feature} is not supported")]
    Unsupported { feature: String },
    #[error("loop body must not produce a value, got '{received}'")]
    NonUnitLoopBody { received: Type },
    #[error("'{name}' is defined in terms of itself")]
    CyclicDefinition { name: String },
    #[error("expression nesting exceeds the limit of {limit}")]
    RecursionLimit { limit: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("constant {value} overflows '{target}'")]
    ConstantOverflow { value: i64, target: Type },
    #[error("assertion failed")]
    AssertionFailed,
    #[error("'{received}' has no known size")]
    UnsizedType { received: Type },

    #[error("'{name}' is redefined")]
    Redefined { name: String },
    #[error("'{name}' shadows an outer declaration")]
    Shadowed { name: String },
}

/// Invariant violations in the syntax tree or in the checker itself.
///
/// These never become diagnostics; they abort the check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("malformed node reached the checker")]
    BadNode { node: NodeId },
    #[error("unexpected {shape} node in expression position")]
    UnexpectedNode { node: NodeId, shape: &'static str },
    #[error("identifier is both a definition and a use")]
    DefinitionUsedAsReference { node: NodeId },
    #[error("{message}")]
    Invariant { message: String },
}

/// Outcome of a failed checker step.
#[derive(Debug, Clone)]
pub enum CheckError {
    /// A new diagnostic the caller should record.
    Diagnostic(Box<Error>),
    /// Failure already recorded in the module's diagnostics.
    Reported,
    Internal(InternalError),
}

impl From<Error> for CheckError {
    fn from(error: Error) -> Self {
        CheckError::Diagnostic(Box::new(error))
    }
}

impl From<InternalError> for CheckError {
    fn from(error: InternalError) -> Self {
        CheckError::Internal(error)
    }
}

pub type CheckResult<T> = Result<T, CheckError>;
