use std::fmt::{self, Display};

use crate::types::types::Type;

/// A value known at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view used when an int meets a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// The memoized result for one node: its type and, when it could be
/// evaluated, its constant value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedValue {
    pub ty: Option<Type>,
    pub value: Option<Value>,
}

impl TypedValue {
    pub fn new(ty: Type) -> Self {
        TypedValue {
            ty: Some(ty),
            value: None,
        }
    }

    pub fn constant(ty: Type, value: Value) -> Self {
        TypedValue {
            ty: Some(ty),
            value: Some(value),
        }
    }

    /// Folds `update` into `self`. Fields missing from `update` keep their
    /// previous contents.
    pub fn merge(&mut self, update: TypedValue) {
        if let Some(ty) = update.ty {
            self.ty = Some(ty);
        }
        if let Some(value) = update.value {
            self.value = Some(value);
        }
    }
}
