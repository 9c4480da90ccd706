/// AST (Abstract Syntax Tree) module
/// Contains the arena based syntax tree produced by the parser
///
/// Submodules:
/// - ast: node shapes, the node arena and its builder
pub mod ast;
