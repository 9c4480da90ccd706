use std::{collections::HashMap, fmt::Display};

use la_arena::Idx;

use super::symbols::SymbolId;

pub type ScopeId = Idx<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Universe,
    Module,
    Func,
    Block,
}

impl Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScopeKind::Universe => "universe",
            ScopeKind::Module => "module",
            ScopeKind::Func => "func",
            ScopeKind::Block => "block",
        };
        write!(f, "{}", name)
    }
}

/// A symbol table with a link to its enclosing scope.
///
/// Lookups that walk the parent chain live on
/// [`Module`](super::module::Module), which owns the scope arena.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    symbols: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            parent,
            symbols: HashMap::new(),
        }
    }

    /// Looks `name` up in this scope only.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    /// Adds `symbol` under `name`.
    ///
    /// If the name is already taken in this scope the table is left
    /// untouched and the previous symbol is returned.
    pub fn define(&mut self, name: &str, symbol: SymbolId) -> Option<SymbolId> {
        if let Some(previous) = self.get(name) {
            return Some(previous);
        }

        self.symbols.insert(name.to_string(), symbol);
        None
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.symbols.iter().map(|(name, id)| (name.as_str(), *id))
    }
}
