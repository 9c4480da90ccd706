use std::collections::HashMap;

use la_arena::{Arena, ArenaMap};

use crate::{ast::ast::NodeId, errors::errors::Error, types::types::Type};

use super::{
    scope::{Scope, ScopeId, ScopeKind},
    symbols::{Symbol, SymbolId},
    value::TypedValue,
};

/// Everything learned about one compilation unit.
#[derive(Debug)]
pub struct Module {
    /// Memoized type and value of every checked node.
    pub types: ArenaMap<NodeId, TypedValue>,
    /// Defining identifiers.
    pub defs: HashMap<NodeId, SymbolId>,
    /// Referencing identifiers, disjoint from `defs`.
    pub uses: HashMap<NodeId, SymbolId>,
    /// Nominal struct and enum types to their declaring symbol.
    pub type_syms: HashMap<Type, SymbolId>,
    /// Diagnostics in the order they were raised.
    pub errors: Vec<Error>,
    pub symbols: Arena<Symbol>,
    pub scopes: Arena<Scope>,
    pub universe: ScopeId,
    pub scope: ScopeId,
}

impl Module {
    /// An empty module whose scope nests in a fresh universe scope.
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let universe = scopes.alloc(Scope::new(ScopeKind::Universe, None));
        let scope = scopes.alloc(Scope::new(ScopeKind::Module, Some(universe)));

        Module {
            types: ArenaMap::default(),
            defs: HashMap::new(),
            uses: HashMap::new(),
            type_syms: HashMap::new(),
            errors: vec![],
            symbols: Arena::new(),
            scopes,
            universe,
            scope,
        }
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn new_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        self.scopes.alloc(Scope::new(kind, Some(parent)))
    }

    /// Finds `name` in `scope` or the nearest enclosing scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);

        while let Some(id) = current {
            let scope = &self.scopes[id];
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }

        None
    }

    /// Defines an allocated symbol in `scope`. See [`Scope::define`].
    pub fn define(&mut self, scope: ScopeId, symbol: SymbolId) -> Option<SymbolId> {
        let name = self.symbols[symbol].name.clone();
        self.scopes[scope].define(&name, symbol)
    }

    /// The symbol an identifier node refers to from `scope`.
    pub fn symbol_of(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lookup(scope, name)
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(node).and_then(|typed| typed.ty.as_ref())
    }

    pub fn value_of(&self, node: NodeId) -> Option<&TypedValue> {
        self.types.get(node)
    }

    /// The symbol declared or referenced by an identifier node.
    pub fn symbol_at(&self, ident: NodeId) -> Option<SymbolId> {
        self.defs
            .get(&ident)
            .or_else(|| self.uses.get(&ident))
            .copied()
    }

    /// Diagnostics of error severity.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Error> {
        self.errors.iter().filter(|error| !error.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Error> {
        self.errors.iter().filter(|error| error.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().next().is_some()
    }

    /// Module-level symbols, in the order they were defined. Predeclared
    /// functions and types come first.
    pub fn items(&self) -> Vec<&Symbol> {
        let mut items: Vec<(SymbolId, &Symbol)> = self.scopes[self.scope]
            .symbols()
            .map(|(_, id)| (id, &self.symbols[id]))
            .collect();
        items.sort_by_key(|(id, _)| u32::from(id.into_raw()));
        items.into_iter().map(|(_, symbol)| symbol).collect()
    }
}

impl Default for Module {
    fn default() -> Self {
        Module::new()
    }
}
