use std::collections::HashMap;

use crate::{
    ast::ast::{NodeId, NodeKind},
    errors::errors::{CheckError, CheckResult, ErrorImpl, InternalError},
    types::{
        func::Func,
        types::{Named, NamedKind, Tuple, Type},
    },
};

use super::{
    module::Module,
    scope::ScopeKind,
    symbols::{ResolutionState, Symbol, SymbolId, SymbolKind},
    type_checker::Checker,
    value::TypedValue,
};

impl<'a> Checker<'a> {
    /// Declares the function, alias, struct and enum items of a statement
    /// list in the current scope, leaving them unresolved.
    pub(crate) fn predeclare(&mut self, items: &[NodeId]) -> Result<(), InternalError> {
        let ast = self.ast;

        for &item in items {
            let (name, kind) = match ast.kind(item) {
                NodeKind::FuncDecl { name, .. } => {
                    let scope = self.module.new_scope(ScopeKind::Func, self.scope);
                    (*name, SymbolKind::Func { scope })
                }
                NodeKind::TypeAliasDecl { name, .. } => (*name, SymbolKind::TypeAlias),
                NodeKind::StructDecl { name, .. } => (*name, SymbolKind::Struct { fields: vec![] }),
                NodeKind::EnumDecl { name, .. } => (*name, SymbolKind::Enum { variants: vec![] }),
                _ => continue,
            };

            let ident = self.ident_name(name)?;
            let symbol = self.module.symbols.alloc(Symbol::new(
                ident,
                kind,
                self.scope,
                Some(item),
                Some(name),
            ));

            if let Err(error) = self.declare(self.scope, symbol) {
                self.report(error)?;
            }
        }

        Ok(())
    }

    /// Checks a declaration statement.
    pub(crate) fn check_decl(&mut self, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;

        let name = match ast.kind(node) {
            NodeKind::VarDecl { .. } => return self.check_var_decl(node),
            NodeKind::FuncDecl { name, .. }
            | NodeKind::TypeAliasDecl { name, .. }
            | NodeKind::StructDecl { name, .. }
            | NodeKind::EnumDecl { name, .. } => *name,
            other => {
                return Err(InternalError::UnexpectedNode {
                    node,
                    shape: other.shape(),
                }
                .into())
            }
        };

        let Some(symbol) = self.module.defs.get(&name).copied() else {
            return Err(InternalError::Invariant {
                message: String::from("declaration was not predeclared"),
            }
            .into());
        };

        self.resolve_symbol(symbol)?;

        // Uses of a function only need its signature. The body is checked
        // here, in the scope as it stands at the declaration.
        if matches!(ast.kind(node), NodeKind::FuncDecl { .. }) {
            return self.check_func_body(symbol, node);
        }

        Ok(())
    }

    /// Resolves a declared symbol if nobody has done so yet.
    ///
    /// Diagnostics raised while resolving are recorded here. A symbol that
    /// failed before receiving a type is poisoned so that its uses stay
    /// silent.
    pub(crate) fn resolve_symbol(&mut self, symbol: SymbolId) -> Result<(), InternalError> {
        let sym = self.module.symbol(symbol);
        if sym.state != ResolutionState::Unresolved {
            return Ok(());
        }

        let (owner, node) = (sym.owner, sym.node);
        let Some(node) = node else {
            return Err(InternalError::Invariant {
                message: format!("`{}` has no declaration to resolve", sym.name),
            });
        };

        self.module.symbol_mut(symbol).state = ResolutionState::Resolving;

        let saved = self.scope;
        self.scope = owner;

        let ast = self.ast;
        let result = match ast.kind(node) {
            NodeKind::FuncDecl { .. } => self.resolve_func(symbol, node),
            NodeKind::TypeAliasDecl { .. } => self.resolve_type_alias(symbol, node),
            NodeKind::StructDecl { .. } => self.resolve_struct(symbol, node),
            NodeKind::EnumDecl { .. } => self.resolve_enum(symbol, node),
            other => Err(InternalError::UnexpectedNode {
                node,
                shape: other.shape(),
            }
            .into()),
        };

        self.scope = saved;

        let sym = self.module.symbol_mut(symbol);
        sym.state = match (&result, &sym.ty) {
            (Err(_), None) => ResolutionState::Poisoned,
            _ => ResolutionState::Resolved,
        };

        if let Some(ty) = &sym.ty {
            tracing::debug!(name = %sym.name, ty = %ty, "resolved");
        }

        match result {
            Ok(()) => Ok(()),
            Err(error) => self.report(error),
        }
    }

    /// Evaluates a type expression and returns the type it denotes.
    pub(crate) fn expect_type(&mut self, node: NodeId) -> CheckResult<Type> {
        let ty = self.type_of(node)?;

        if !ty.is_type_desc() {
            return Err(self.error(ErrorImpl::NotAType { received: ty }, node).into());
        }

        Ok(ty.skip_type_desc())
    }

    pub(crate) fn ident_name(&self, node: NodeId) -> Result<String, InternalError> {
        match self.ast.ident_name(node) {
            Some(name) => Ok(name.to_string()),
            None => Err(InternalError::UnexpectedNode {
                node,
                shape: self.ast.kind(node).shape(),
            }),
        }
    }

    /// Resolves a local variable and defines it in the current scope.
    ///
    /// A variable that fails to resolve is still defined, poisoned, so that
    /// later uses do not raise follow-up errors.
    fn check_var_decl(&mut self, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;
        let NodeKind::VarDecl { name, .. } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };

        let kind = SymbolKind::Var {
            is_param: false,
            constant: None,
        };
        let symbol = Symbol::new(self.ident_name(*name)?, kind, self.scope, Some(node), Some(*name));
        let symbol = self.module.symbols.alloc(symbol);

        let resolved = self.resolve_var_decl(node);

        let sym = self.module.symbol_mut(symbol);
        match resolved {
            Ok(ty) => {
                sym.ty = Some(ty);
                sym.state = ResolutionState::Resolved;
                self.declare(self.scope, symbol)
            }
            Err(error) => {
                sym.state = ResolutionState::Poisoned;
                if let Err(declared) = self.declare(self.scope, symbol) {
                    self.report(declared)?;
                }
                Err(error)
            }
        }
    }

    /// The type of a variable declaration, from its annotation and its
    /// initializer.
    fn resolve_var_decl(&mut self, node: NodeId) -> CheckResult<Type> {
        let ast = self.ast;
        let NodeKind::VarDecl { name, ty, value } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };

        let mut declared = match ty {
            Some(ty) => Some(self.expect_type(*ty)?),
            None => None,
        };

        if let Some(value) = value {
            let (received, constant) = self.evaluate(*value)?;

            if received.is_type_desc() {
                return Err(self.error(ErrorImpl::NotAValue { received }, *value).into());
            }

            let received = received.skip_untyped();

            let ty = match declared {
                Some(expected) if !expected.equals(&received) => {
                    return Err(self
                        .error(ErrorImpl::TypeMismatch { expected, received }, *value)
                        .into());
                }
                Some(expected) => adopt_array_size(expected, &received),
                None => received,
            };

            self.check_representable(*value, constant.as_ref(), &ty)?;
            declared = Some(ty);
        }

        match declared {
            Some(ty) => Ok(ty),
            None => {
                let missing = self.ident_name(*name)?;
                Err(self
                    .error(ErrorImpl::MissingType { name: missing }, *name)
                    .into())
            }
        }
    }

    fn resolve_func(&mut self, symbol: SymbolId, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;
        let NodeKind::FuncDecl { signature, .. } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };
        let SymbolKind::Func { scope } = self.module.symbol(symbol).kind else {
            return Err(self.unexpected(node));
        };
        let NodeKind::Signature { params, result } = ast.kind(*signature) else {
            return Err(self.unexpected(*signature));
        };
        let Some(params) = ast.list(*params) else {
            return Err(self.unexpected(*signature));
        };

        let mut param_types = vec![];

        for &param in params {
            match ast.kind(param) {
                NodeKind::Binding {
                    name,
                    ty: Some(ty),
                } => {
                    let ty = self.expect_type(*ty)?;
                    let kind = SymbolKind::Var {
                        is_param: true,
                        constant: None,
                    };
                    let param_symbol = Symbol::new(
                        self.ident_name(*name)?,
                        kind,
                        scope,
                        Some(param),
                        Some(*name),
                    )
                    .resolved(ty.clone());

                    let param_symbol = self.module.symbols.alloc(param_symbol);
                    if let Err(error) = self.declare(scope, param_symbol) {
                        self.report(error)?;
                    }
                    param_types.push(ty);
                }
                NodeKind::Binding { name, ty: None } => {
                    let name = self.ident_name(*name)?;
                    return Err(self.error(ErrorImpl::MissingType { name }, param).into());
                }
                NodeKind::BindingWithValue { name, .. } => {
                    let name = self.ident_name(*name)?;
                    return Err(self
                        .error(ErrorImpl::DefaultParameterValue { name }, param)
                        .into());
                }
                _ => return Err(self.unexpected(param)),
            }
        }

        let result = match result {
            Some(result) => Tuple::new(vec![self.expect_type(*result)?]),
            None => Tuple::unit(),
        };

        let ty = Type::Func(Func::new(Tuple::new(param_types), result, false));

        self.set_value(*signature, TypedValue::new(Type::type_desc(ty.clone())));
        self.module.symbol_mut(symbol).ty = Some(ty);

        Ok(())
    }

    /// Checks a function body against the declared result type. Functions
    /// whose signature failed to resolve are skipped.
    fn check_func_body(&mut self, symbol: SymbolId, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;
        let NodeKind::FuncDecl { name, body, .. } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };

        let sym = self.module.symbol(symbol);
        let (SymbolKind::Func { scope }, Some(Type::Func(func))) = (&sym.kind, &sym.ty) else {
            return Ok(());
        };
        let (scope, expected) = (*scope, func.result_type());

        let Some(body) = body else {
            let func_name = self.ident_name(*name)?;
            return Err(self
                .error(ErrorImpl::MissingFunctionBody { name: func_name }, *name)
                .into());
        };

        let saved = self.enter_scope(scope);
        let received = self.type_of(*body);
        self.leave_scope(saved);
        let received = received?;

        let last = ast.trailing(*body);
        if !received.equals(&expected) {
            return Err(self
                .error(ErrorImpl::TypeMismatch { expected, received }, last)
                .into());
        }

        let constant = self.module.value_of(last).and_then(|typed| typed.value.clone());
        self.check_representable(last, constant.as_ref(), &expected)
    }

    fn resolve_type_alias(&mut self, symbol: SymbolId, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;
        let NodeKind::TypeAliasDecl { name, expr } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };

        let base = self.expect_type(*expr)?;
        let alias = Type::alias(self.ident_name(*name)?, base);
        self.module.symbol_mut(symbol).ty = Some(Type::type_desc(alias));

        Ok(())
    }

    /// Structs get their nominal type before their fields are resolved, so
    /// fields may refer to the struct through a reference.
    fn resolve_struct(&mut self, symbol: SymbolId, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;
        let NodeKind::StructDecl { name, fields } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };

        let struct_name = self.ident_name(*name)?;
        let ty = self.register_named(symbol, NamedKind::Struct, &struct_name);

        let mut resolved = vec![];
        let mut seen: HashMap<String, NodeId> = HashMap::new();

        for &field in fields {
            let (field_name, field_ty) = match ast.kind(field) {
                NodeKind::Binding {
                    name,
                    ty: Some(ty),
                } => (*name, *ty),
                NodeKind::Binding { name, ty: None } => {
                    let name = self.ident_name(*name)?;
                    return Err(self.error(ErrorImpl::MissingType { name }, field).into());
                }
                NodeKind::BindingWithValue { .. } => {
                    let feature = String::from("default field values");
                    return Err(self.error(ErrorImpl::Unsupported { feature }, field).into());
                }
                _ => return Err(self.unexpected(field)),
            };

            let name = self.ident_name(field_name)?;
            if let Some(previous) = seen.get(&name) {
                let previous = ast.span(*previous);
                return Err(self
                    .error(ErrorImpl::AlreadyDefined { name, previous }, field_name)
                    .into());
            }

            let field_type = self.expect_type(field_ty)?;
            if contains_by_value(&self.module, &field_type, &ty, &mut vec![]) {
                return Err(self
                    .error(ErrorImpl::CyclicDefinition { name: struct_name }, field_ty)
                    .into());
            }

            seen.insert(name.clone(), field_name);
            resolved.push((name, field_type));
        }

        if let SymbolKind::Struct { fields } = &mut self.module.symbol_mut(symbol).kind {
            *fields = resolved;
        }

        Ok(())
    }

    fn resolve_enum(&mut self, symbol: SymbolId, node: NodeId) -> CheckResult<()> {
        let ast = self.ast;
        let NodeKind::EnumDecl { name, variants } = ast.kind(node) else {
            return Err(self.unexpected(node));
        };

        let enum_name = self.ident_name(*name)?;
        self.register_named(symbol, NamedKind::Enum, &enum_name);

        let mut names: Vec<String> = vec![];
        let mut idents: Vec<NodeId> = vec![];

        for &variant in variants {
            let name = self.ident_name(variant)?;

            if let Some(index) = names.iter().position(|existing| *existing == name) {
                let previous = ast.span(idents[index]);
                return Err(self
                    .error(ErrorImpl::AlreadyDefined { name, previous }, variant)
                    .into());
            }

            names.push(name);
            idents.push(variant);
        }

        if let SymbolKind::Enum { variants } = &mut self.module.symbol_mut(symbol).kind {
            *variants = names;
        }

        Ok(())
    }

    /// Gives a struct or enum symbol its nominal type and indexes it in
    /// `type_syms`.
    fn register_named(&mut self, symbol: SymbolId, kind: NamedKind, name: &str) -> Type {
        let ty = Type::Named(Named {
            kind,
            name: name.to_string(),
            id: u32::from(symbol.into_raw()),
        });

        self.module.symbol_mut(symbol).ty = Some(Type::type_desc(ty.clone()));
        self.module.type_syms.insert(ty.clone(), symbol);
        ty
    }

    pub(crate) fn unexpected(&self, node: NodeId) -> CheckError {
        InternalError::UnexpectedNode {
            node,
            shape: self.ast.kind(node).shape(),
        }
        .into()
    }
}

/// An annotation with a `_` array size takes the size of its initializer.
fn adopt_array_size(declared: Type, value: &Type) -> Type {
    match (declared.as_array(), value.as_array()) {
        (Some(expected), Some(received)) if expected.size.is_none() => {
            Type::array(received.size, (*expected.elem).clone())
        }
        _ => declared,
    }
}

/// Whether a value of type `ty` embeds a `target` without indirection.
fn contains_by_value(module: &Module, ty: &Type, target: &Type, visited: &mut Vec<u32>) -> bool {
    match ty.skip_alias() {
        Type::Named(named) => {
            if Type::Named(named.clone()) == *target {
                return true;
            }
            if named.kind != NamedKind::Struct || visited.contains(&named.id) {
                return false;
            }
            visited.push(named.id);

            let Some(symbol) = module.type_syms.get(&Type::Named(named.clone())) else {
                return false;
            };
            match &module.symbol(*symbol).kind {
                SymbolKind::Struct { fields } => fields
                    .iter()
                    .any(|(_, field)| contains_by_value(module, field, target, visited)),
                _ => false,
            }
        }
        Type::Tuple(tuple) => tuple
            .types
            .iter()
            .any(|elem| contains_by_value(module, elem, target, visited)),
        Type::Array(array) => contains_by_value(module, &array.elem, target, visited),
        _ => false,
    }
}
