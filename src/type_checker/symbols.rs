use la_arena::Idx;

use crate::{ast::ast::NodeId, types::types::Type};

use super::{scope::ScopeId, value::Value};

pub type SymbolId = Idx<Symbol>;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Var {
        is_param: bool,
        /// Set only for universe constants such as `true`.
        constant: Option<Value>,
    },
    Func {
        /// Scope holding the parameters; the body block nests inside it.
        scope: ScopeId,
    },
    TypeAlias,
    Struct {
        fields: Vec<(String, Type)>,
    },
    Enum {
        variants: Vec<String>,
    },
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Var { is_param: true, .. } => "param",
            SymbolKind::Var { constant: Some(_), .. } => "const",
            SymbolKind::Var { .. } => "var",
            SymbolKind::Func { .. } => "func",
            SymbolKind::TypeAlias => "type",
            SymbolKind::Struct { .. } => "struct",
            SymbolKind::Enum { .. } => "enum",
        }
    }
}

/// Where a symbol is in lazy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved,
    /// Resolution failed and was reported; uses stay silent.
    Poisoned,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declaring scope.
    pub owner: ScopeId,
    /// Declaring node, `None` for universe symbols.
    pub node: Option<NodeId>,
    /// Defining identifier, `None` for universe symbols.
    pub ident: Option<NodeId>,
    pub ty: Option<Type>,
    pub state: ResolutionState,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        owner: ScopeId,
        node: Option<NodeId>,
        ident: Option<NodeId>,
    ) -> Self {
        Symbol {
            name: name.into(),
            kind,
            owner,
            node,
            ident,
            ty: None,
            state: ResolutionState::Unresolved,
        }
    }

    /// A symbol whose type is known up front.
    pub fn resolved(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self.state = ResolutionState::Resolved;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn is_var(&self) -> bool {
        matches!(self.kind, SymbolKind::Var { .. })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, SymbolKind::Var { constant: Some(_), .. })
    }

    pub fn constant(&self) -> Option<&Value> {
        match &self.kind {
            SymbolKind::Var { constant, .. } => constant.as_ref(),
            _ => None,
        }
    }

    /// Whether a use that finds this symbol mid-resolution is a cycle
    /// rather than a missing type.
    pub fn is_type_like(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::TypeAlias | SymbolKind::Struct { .. } | SymbolKind::Enum { .. }
        )
    }
}
