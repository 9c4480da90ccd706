use crate::{
    ast::ast::{Ast, NodeId, NodeKind},
    errors::errors::{CheckError, CheckResult, Error, ErrorImpl, InternalError},
    types::types::{PrimitiveKind, Type},
    Span,
};

use super::{
    events::{CheckEvent, CheckObserver, TracingObserver},
    module::Module,
    scope::ScopeId,
    symbols::{Symbol, SymbolId, SymbolKind},
    value::{TypedValue, Value},
};

/// Knobs for a single [`type_check`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Deepest expression nesting before checking gives up with
    /// `RecursionLimit`.
    pub recursion_limit: usize,
    /// Emit a `Shadowed` warning when a declaration hides an outer one.
    pub warn_on_shadowing: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            recursion_limit: 256,
            warn_on_shadowing: false,
        }
    }
}

/// Checking state for one syntax tree.
pub struct Checker<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) module: Module,
    pub(crate) options: CheckOptions,
    observer: &'a mut dyn CheckObserver,
    /// Scope new names are looked up and declared in.
    pub(crate) scope: ScopeId,
    depth: usize,
}

impl<'a> Checker<'a> {
    pub fn new(ast: &'a Ast, options: CheckOptions, observer: &'a mut dyn CheckObserver) -> Self {
        let module = Module::new();
        let scope = module.scope;

        let mut checker = Checker {
            ast,
            module,
            options,
            observer,
            scope,
            depth: 0,
        };
        checker.populate_universe();
        checker
    }

    fn populate_universe(&mut self) {
        let universe = self.module.universe;

        let types = [
            ("i32", PrimitiveKind::I32),
            ("bool", PrimitiveKind::Bool),
            ("any", PrimitiveKind::Any),
            ("typedesc", PrimitiveKind::AnyTypeDesc),
        ];
        for (name, kind) in types {
            let symbol = Symbol::new(name, SymbolKind::TypeAlias, universe, None, None)
                .resolved(Type::type_desc(Type::Primitive(kind)));
            self.define_universe(symbol);
        }

        for (name, value) in [("true", true), ("false", false)] {
            let kind = SymbolKind::Var {
                is_param: false,
                constant: Some(Value::Bool(value)),
            };
            let symbol = Symbol::new(name, kind, universe, None, None).resolved(Type::bool());
            self.define_universe(symbol);
        }
    }

    fn define_universe(&mut self, symbol: Symbol) {
        let universe = self.module.universe;
        let id = self.module.symbols.alloc(symbol);
        self.module.define(universe, id);

        let symbol = self.module.symbol(id);
        self.observer.on_event(CheckEvent::Def {
            name: &symbol.name,
            kind: symbol.kind.describe(),
            symbol: id,
            ident: None,
            ty: symbol.ty.as_ref(),
        });
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn finish(self) -> Module {
        self.module
    }

    /// Checks every item of the module root in order.
    pub fn check_module(&mut self) -> Result<(), InternalError> {
        let ast = self.ast;
        let NodeKind::Module(items) = ast.kind(ast.root) else {
            return Err(InternalError::UnexpectedNode {
                node: ast.root,
                shape: ast.kind(ast.root).shape(),
            });
        };

        let module_scope = self.module.scope;
        let saved = self.enter_scope(module_scope);
        let result = self.check_statements(items);
        self.leave_scope(saved);
        result?;

        tracing::debug!(
            symbols = self.module.scope(module_scope).len(),
            errors = self.module.errors.len(),
            "checked module"
        );
        Ok(())
    }

    /// A diagnostic located at `node`.
    pub(crate) fn error(&self, kind: ErrorImpl, node: NodeId) -> Error {
        Error::at_node(kind, node, self.ast.span(node))
    }

    pub(crate) fn warn(&mut self, kind: ErrorImpl, node: NodeId) {
        let warning = Error::warning(kind, node, self.ast.span(node));
        tracing::debug!(warning = %warning, "warning");
        self.module.errors.push(warning);
    }

    /// Records a failed step. Internal errors are handed back to abort the
    /// check.
    pub(crate) fn report(&mut self, error: CheckError) -> Result<(), InternalError> {
        match error {
            CheckError::Diagnostic(error) => {
                tracing::debug!(error = %error, "diagnostic");
                self.module.errors.push(*error);
                Ok(())
            }
            CheckError::Reported => Ok(()),
            CheckError::Internal(error) => Err(error),
        }
    }

    /// Merges a result into the memo table without losing what is already
    /// known about `node`.
    pub(crate) fn set_value(&mut self, node: NodeId, typed: TypedValue) {
        match self.module.types.get_mut(node) {
            Some(existing) => existing.merge(typed),
            None => {
                self.module.types.insert(node, typed);
            }
        }
    }

    pub(crate) fn enter_scope(&mut self, scope: ScopeId) -> ScopeId {
        let saved = self.scope;
        self.scope = scope;
        self.observer.on_event(CheckEvent::ScopeEnter {
            scope,
            kind: self.module.scope(scope).kind,
        });
        saved
    }

    pub(crate) fn leave_scope(&mut self, saved: ScopeId) {
        self.observer
            .on_event(CheckEvent::ScopeExit { scope: self.scope });
        self.scope = saved;
    }

    /// Records `ident` as the defining occurrence of `symbol`.
    pub(crate) fn new_def(&mut self, ident: NodeId, symbol: SymbolId) {
        if self.module.defs.insert(ident, symbol).is_some() {
            let name = self.module.symbol(symbol).name.clone();
            self.warn(ErrorImpl::Redefined { name }, ident);
        }

        let sym = self.module.symbol(symbol);
        self.observer.on_event(CheckEvent::Def {
            name: &sym.name,
            kind: sym.kind.describe(),
            symbol,
            ident: Some(ident),
            ty: sym.ty.as_ref(),
        });
    }

    /// Records `ident` as a reference to `symbol`.
    pub(crate) fn new_use(&mut self, ident: NodeId, symbol: SymbolId) -> Result<(), InternalError> {
        if self.module.defs.contains_key(&ident) {
            return Err(InternalError::DefinitionUsedAsReference { node: ident });
        }

        self.module.uses.insert(ident, symbol);

        let sym = self.module.symbol(symbol);
        self.observer.on_event(CheckEvent::Use {
            name: &sym.name,
            symbol,
            ident,
        });
        Ok(())
    }

    /// Defines `symbol` in `scope` and records its identifier.
    ///
    /// A name already taken in `scope` is an `AlreadyDefined` error naming
    /// both declarations.
    pub(crate) fn declare(&mut self, scope: ScopeId, symbol: SymbolId) -> CheckResult<()> {
        let sym = self.module.symbol(symbol);
        let name = sym.name.clone();
        let Some(ident) = sym.ident else {
            return Err(InternalError::Invariant {
                message: format!("symbol `{}` has no identifier", name),
            }
            .into());
        };

        self.new_def(ident, symbol);

        if let Some(previous) = self.module.define(scope, symbol) {
            let previous = self
                .module
                .symbol(previous)
                .ident
                .map(|ident| self.ast.span(ident))
                .unwrap_or_else(Span::null);

            return Err(self
                .error(ErrorImpl::AlreadyDefined { name, previous }, ident)
                .into());
        }

        if self.options.warn_on_shadowing {
            let outer = self
                .module
                .scope(scope)
                .parent
                .and_then(|parent| self.module.lookup(parent, &name));

            if outer.is_some() {
                self.warn(ErrorImpl::Shadowed { name }, ident);
            }
        }

        Ok(())
    }

    pub(crate) fn notify_builtin(&mut self, name: &str, node: NodeId) {
        self.observer
            .on_event(CheckEvent::BuiltinEvaluated { name, node });
    }

    /// Runs `f` one nesting level deeper, failing once the configured limit
    /// is reached.
    pub(crate) fn nested<T>(
        &mut self,
        node: NodeId,
        f: impl FnOnce(&mut Self) -> CheckResult<T>,
    ) -> CheckResult<T> {
        if self.depth >= self.options.recursion_limit {
            let limit = self.options.recursion_limit;
            return Err(self.error(ErrorImpl::RecursionLimit { limit }, node).into());
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// Type checks a parsed module.
///
/// # Arguments
///
/// * `ast` - The syntax tree to check
/// * `options` - Limits and warning switches
///
/// # Returns
///
/// The annotated [`Module`] with its diagnostics, or an [`InternalError`]
/// when the tree itself is malformed.
pub fn type_check(ast: &Ast, options: CheckOptions) -> Result<Module, InternalError> {
    let mut observer = TracingObserver;
    type_check_with_observer(ast, options, &mut observer)
}

/// Like [`type_check`], reporting progress to `observer`.
pub fn type_check_with_observer(
    ast: &Ast,
    options: CheckOptions,
    observer: &mut dyn CheckObserver,
) -> Result<Module, InternalError> {
    let mut checker = Checker::new(ast, options, observer);
    checker.check_module()?;
    Ok(checker.finish())
}
