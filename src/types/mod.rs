//! Type algebra for the checker.
//!
//! This module defines the semantic types produced by type inference:
//!
//! - Primitive types, including the provisional "untyped" literal kinds
//! - Tuples (the empty tuple is unit), fixed-size arrays and references
//! - Function types with argument checking
//! - Aliases, nominal struct/enum types and type descriptors
//!
//! Types are plain immutable values. Structural comparison goes through
//! [`Type::equals`]; the derived `PartialEq` is exact identity and is what
//! hash maps keyed by type use.

pub mod func;
pub mod types;
