use crate::{ast::ast::NodeId, types::types::Type};

use super::{
    scope::{ScopeId, ScopeKind},
    symbols::SymbolId,
};

/// Points in checking an observer is told about.
#[derive(Debug, Clone, Copy)]
pub enum CheckEvent<'e> {
    Def {
        name: &'e str,
        kind: &'static str,
        symbol: SymbolId,
        ident: Option<NodeId>,
        ty: Option<&'e Type>,
    },
    Use {
        name: &'e str,
        symbol: SymbolId,
        ident: NodeId,
    },
    ScopeEnter {
        scope: ScopeId,
        kind: ScopeKind,
    },
    ScopeExit {
        scope: ScopeId,
    },
    BuiltinEvaluated {
        name: &'e str,
        node: NodeId,
    },
}

pub trait CheckObserver {
    fn on_event(&mut self, event: CheckEvent<'_>);
}

/// Forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CheckObserver for TracingObserver {
    fn on_event(&mut self, event: CheckEvent<'_>) {
        match event {
            CheckEvent::Def { name, kind, ty, .. } => match ty {
                Some(ty) => tracing::debug!(name, kind, ty = %ty, "def"),
                None => tracing::debug!(name, kind, "def"),
            },
            CheckEvent::Use { name, ident, .. } => {
                tracing::trace!(name, ident = ?ident, "use")
            }
            CheckEvent::ScopeEnter { scope, kind } => {
                tracing::trace!(scope = ?scope, kind = %kind, "push scope")
            }
            CheckEvent::ScopeExit { scope } => tracing::trace!(scope = ?scope, "pop scope"),
            CheckEvent::BuiltinEvaluated { name, node } => {
                tracing::debug!(name, node = ?node, "evaluated built-in")
            }
        }
    }
}
