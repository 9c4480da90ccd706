//! Parser module for building the arena syntax tree.
//!
//! This module contains the parser that transforms a stream of tokens
//! into an [`Ast`](crate::ast::ast::Ast). It uses a Pratt parser for
//! expressions with operator precedence and handles:
//!
//! - Declarations (variables, functions, type aliases, structs, enums)
//! - Expressions (operators, calls, indexing, lists, literals)
//! - Type expressions (array types, signatures, references)
//! - Control flow (`if`/`else`, `while`) and blocks
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling. Line
//! breaks end statements.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
