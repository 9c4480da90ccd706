//! Type checking and semantic analysis module.
//!
//! This module walks the syntax tree produced by the parser and records,
//! for every expression node, its type and any constant value that could
//! be computed at compile time:
//!
//! - Resolving identifiers through nested scopes down to the universe
//! - Lazily resolving functions, aliases, structs and enums so they can be
//!   used before their declaration
//! - Checking operators, calls, indexing and control flow
//! - Evaluating the `@size_of`, `@type_of`, `@assert` and `@print` built-ins
//! - Collecting diagnostics and carrying on after each failed statement
//!
//! Results are memoized per node in the [`Module`](module::Module) returned
//! by [`type_check`](type_checker::type_check).

pub mod block;
pub mod builtins;
pub mod events;
pub mod module;
pub mod resolver;
pub mod scope;
pub mod symbols;
pub mod type_checker;
pub mod type_of;
pub mod value;

#[cfg(test)]
mod tests;
