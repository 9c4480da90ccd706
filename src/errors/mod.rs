//! Error types and error handling for the front end and the checker.
//!
//! This module defines the error types used throughout analysis. It
//! includes:
//!
//! - Error structures with source span, node and severity information
//! - Specific error variants for lexing, parsing and type checking
//! - Internal invariant violations, kept apart from user diagnostics
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
