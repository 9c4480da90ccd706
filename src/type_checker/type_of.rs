use crate::{
    ast::ast::{LiteralKind, NodeId, NodeKind, OperatorKind},
    errors::errors::{CheckError, CheckResult, ErrorImpl, InternalError},
    lexer::lexer::{parse_float_literal, parse_int_literal},
    types::{
        func::{ArgumentFaultKind, Func},
        types::{PrimitiveKind, Tuple, Type},
    },
};

use super::{
    builtins::BUILTINS,
    symbols::ResolutionState,
    type_checker::Checker,
    value::{TypedValue, Value},
};

impl<'a> Checker<'a> {
    /// Type and constant value of an expression node.
    ///
    /// Results are memoized per node, so asking twice never re-runs
    /// inference or built-in evaluation.
    pub fn value_of(&mut self, node: NodeId) -> CheckResult<TypedValue> {
        if let Some(typed) = self.module.types.get(node) {
            if typed.ty.is_some() {
                return Ok(typed.clone());
            }
        }

        let typed = self.nested(node, |checker| checker.eval(node))?;
        self.set_value(node, typed.clone());
        Ok(typed)
    }

    /// Type of an expression node. See [`Checker::value_of`].
    pub fn type_of(&mut self, node: NodeId) -> CheckResult<Type> {
        Ok(self.evaluate(node)?.0)
    }

    pub(crate) fn evaluate(&mut self, node: NodeId) -> CheckResult<(Type, Option<Value>)> {
        let typed = self.value_of(node)?;
        match typed.ty {
            Some(ty) => Ok((ty, typed.value)),
            None => Err(InternalError::Invariant {
                message: String::from("memoized node has no type"),
            }
            .into()),
        }
    }

    /// Rejects an integer constant that does not fit the `i32` it is
    /// converted to.
    pub(crate) fn check_representable(
        &mut self,
        node: NodeId,
        value: Option<&Value>,
        target: &Type,
    ) -> CheckResult<()> {
        let Some(Value::Int(value)) = value else {
            return Ok(());
        };

        if target.as_primitive() != Some(PrimitiveKind::I32) || i32::try_from(*value).is_ok() {
            return Ok(());
        }

        let error = ErrorImpl::ConstantOverflow {
            value: *value,
            target: target.clone(),
        };
        Err(self.error(error, node).into())
    }

    fn operator(&self, op: NodeId) -> CheckResult<OperatorKind> {
        match self.ast.kind(op) {
            NodeKind::Operator(kind) => Ok(*kind),
            _ => Err(self.unexpected(op)),
        }
    }

    fn eval(&mut self, node: NodeId) -> CheckResult<TypedValue> {
        let ast = self.ast;

        match ast.kind(node) {
            NodeKind::BadNode => Err(InternalError::BadNode { node }.into()),
            NodeKind::Module(_)
            | NodeKind::Operator(_)
            | NodeKind::Binding { .. }
            | NodeKind::BindingWithValue { .. }
            | NodeKind::VarDecl { .. }
            | NodeKind::FuncDecl { .. }
            | NodeKind::TypeAliasDecl { .. }
            | NodeKind::StructDecl { .. }
            | NodeKind::EnumDecl { .. } => Err(self.unexpected(node)),

            NodeKind::Empty => Ok(TypedValue::new(Type::unit())),
            NodeKind::Ident(name) => self.check_ident(node, name),
            NodeKind::Literal { kind, value } => self.check_literal(node, *kind, value),
            NodeKind::ArrayType { args, elem } => self.check_array_type(*args, *elem),

            NodeKind::ParenList(items) => self.check_paren_list(items),
            NodeKind::BracketList(items) => self.check_array_literal(node, items),
            NodeKind::CurlyList(items) => Ok(TypedValue::new(self.check_block(items)?)),

            NodeKind::PrefixOp { op, operand } => self.check_prefix(*op, *operand),
            NodeKind::InfixOp { op, lhs, rhs } => self.check_infix(node, *op, *lhs, *rhs),
            NodeKind::PostfixOp { op, operand } => self.check_postfix(*op, *operand),

            NodeKind::Call { callee, args } => self.check_call(*callee, *args),
            NodeKind::Index { target, args } => self.check_index(*target, *args),
            NodeKind::BuiltInCall { name, args } => self.check_builtin_call(node, *name, *args),

            NodeKind::If { cond, body, else_ } => self.check_if(*cond, *body, *else_),
            NodeKind::While { cond, body } => self.check_while(*cond, *body),
            NodeKind::Signature { params, result } => self.check_signature(*params, *result),
        }
    }

    fn check_ident(&mut self, node: NodeId, name: &str) -> CheckResult<TypedValue> {
        let Some(symbol) = self.module.lookup(self.scope, name) else {
            let name = name.to_string();
            return Err(self
                .error(ErrorImpl::UndefinedIdentifier { name }, node)
                .into());
        };

        self.new_use(node, symbol)?;

        if self.module.symbol(symbol).state == ResolutionState::Unresolved {
            self.resolve_symbol(symbol)?;
        }

        let sym = self.module.symbol(symbol);
        if sym.state == ResolutionState::Poisoned {
            return Err(CheckError::Reported);
        }

        match &sym.ty {
            Some(ty) => Ok(TypedValue {
                ty: Some(ty.clone()),
                value: sym.constant().cloned(),
            }),
            None if sym.is_type_like() => {
                let name = sym.name.clone();
                Err(self.error(ErrorImpl::CyclicDefinition { name }, node).into())
            }
            None => {
                let name = sym.name.clone();
                Err(self.error(ErrorImpl::NoType { name }, node).into())
            }
        }
    }

    fn check_literal(
        &mut self,
        node: NodeId,
        kind: LiteralKind,
        text: &str,
    ) -> CheckResult<TypedValue> {
        let parsed = match kind {
            LiteralKind::Int => parse_int_literal(text)
                .map(|n| TypedValue::constant(Type::untyped(PrimitiveKind::UntypedInt), Value::Int(n))),
            LiteralKind::Float => parse_float_literal(text).map(|x| {
                TypedValue::constant(Type::untyped(PrimitiveKind::UntypedFloat), Value::Float(x))
            }),
            LiteralKind::String => Some(TypedValue::constant(
                Type::untyped(PrimitiveKind::UntypedString),
                Value::String(text.to_string()),
            )),
        };

        match parsed {
            Some(typed) => Ok(typed),
            None => {
                let token = text.to_string();
                Err(self.error(ErrorImpl::NumberParseError { token }, node).into())
            }
        }
    }

    fn check_array_type(&mut self, args: NodeId, elem: NodeId) -> CheckResult<TypedValue> {
        let ast = self.ast;
        let items = ast.list(args).ok_or_else(|| self.unexpected(args))?;

        if items.len() != 1 {
            return Err(self
                .error(
                    ErrorImpl::ExpectedArgumentCount {
                        expected: 1,
                        received: items.len(),
                    },
                    args,
                )
                .into());
        }

        let size_node = items[0];
        let size = match ast.kind(size_node) {
            NodeKind::Ident(name) if name == "_" => None,
            NodeKind::Literal {
                kind: LiteralKind::Int,
                value,
            } => match parse_int_literal(value).and_then(|n| u32::try_from(n).ok()) {
                Some(size) => Some(size),
                None => {
                    let message = format!("`{}` does not fit an array size", value);
                    return Err(self
                        .error(ErrorImpl::InvalidArraySize { message }, size_node)
                        .into());
                }
            },
            _ => {
                let message = String::from("expected an integer literal or `_`");
                return Err(self
                    .error(ErrorImpl::InvalidArraySize { message }, size_node)
                    .into());
            }
        };

        let elem = self.expect_type(elem)?;
        Ok(TypedValue::new(Type::type_desc(Type::array(size, elem))))
    }

    /// `()` is unit. Otherwise a list of types is a tuple type and a list
    /// of values a tuple value.
    fn check_paren_list(&mut self, items: &[NodeId]) -> CheckResult<TypedValue> {
        let Some((&first, _)) = items.split_first() else {
            return Ok(TypedValue::new(Type::unit()));
        };

        let types = self.type_of(first)?.is_type_desc();
        let mut elems = Vec::with_capacity(items.len());

        for &item in items {
            let (ty, value) = self.evaluate(item)?;

            match (types, ty.is_type_desc()) {
                (true, true) => elems.push(ty.skip_type_desc()),
                (false, false) => {
                    let elem = ty.skip_untyped();
                    self.check_representable(item, value.as_ref(), &elem)?;
                    elems.push(elem);
                }
                (true, false) => {
                    return Err(self.error(ErrorImpl::NotAType { received: ty }, item).into())
                }
                (false, true) => {
                    return Err(self.error(ErrorImpl::NotAValue { received: ty }, item).into())
                }
            }
        }

        let tuple = Type::tuple(elems);
        Ok(TypedValue::new(if types {
            Type::type_desc(tuple)
        } else {
            tuple
        }))
    }

    fn check_array_literal(&mut self, node: NodeId, items: &[NodeId]) -> CheckResult<TypedValue> {
        let mut elem: Option<Type> = None;

        for &item in items {
            let (ty, value) = self.evaluate(item)?;

            if ty.is_type_desc() {
                return Err(self.error(ErrorImpl::NotAValue { received: ty }, item).into());
            }

            let expected = match &elem {
                None => ty.skip_untyped(),
                Some(expected) if !ty.equals(expected) => {
                    let expected = expected.clone();
                    return Err(self
                        .error(ErrorImpl::TypeMismatch { expected, received: ty }, item)
                        .into());
                }
                Some(expected) => expected.clone(),
            };

            self.check_representable(item, value.as_ref(), &expected)?;
            elem = Some(expected);
        }

        let size = u32::try_from(items.len()).map_err(|_| {
            let message = format!("{} elements do not fit an array", items.len());
            self.error(ErrorImpl::InvalidArraySize { message }, node)
        })?;

        let elem = elem.unwrap_or_else(Type::unknown);
        Ok(TypedValue::new(Type::array(Some(size), elem)))
    }

    fn check_prefix(&mut self, op_node: NodeId, operand: NodeId) -> CheckResult<TypedValue> {
        let op = self.operator(op_node)?;
        let (ty, value) = self.evaluate(operand)?;
        let kind = ty.as_primitive();

        match op {
            OperatorKind::Neg if kind.is_some_and(PrimitiveKind::is_numeric) => {
                let value = match value {
                    Some(Value::Int(n)) => n.checked_neg().map(Value::Int),
                    Some(Value::Float(x)) => Some(Value::Float(-x)),
                    _ => None,
                };
                Ok(folded(ty, value))
            }
            OperatorKind::Not if kind.is_some_and(PrimitiveKind::is_boolean) => {
                let value = value.and_then(|v| v.as_bool()).map(|b| Value::Bool(!b));
                Ok(folded(ty, value))
            }
            OperatorKind::Addr if ty.is_type_desc() => Ok(TypedValue::new(Type::type_desc(
                Type::reference(ty.skip_type_desc()),
            ))),
            OperatorKind::Addr => {
                let base = ty.skip_untyped();
                self.check_representable(operand, value.as_ref(), &base)?;
                Ok(TypedValue::new(Type::reference(base)))
            }
            OperatorKind::MutAddr => {
                let feature = String::from("mutable references");
                Err(self.error(ErrorImpl::Unsupported { feature }, op_node).into())
            }
            _ => Err(self.undefined_operator(op, ty, op_node)),
        }
    }

    fn check_infix(
        &mut self,
        node: NodeId,
        op_node: NodeId,
        lhs: NodeId,
        rhs: NodeId,
    ) -> CheckResult<TypedValue> {
        let op = self.operator(op_node)?;
        let (left, left_value) = self.evaluate(lhs)?;
        let (right, right_value) = self.evaluate(rhs)?;

        if !left.equals(&right) {
            return Err(self
                .error(
                    ErrorImpl::TypeMismatch {
                        expected: left,
                        received: right,
                    },
                    node,
                )
                .into());
        }

        let kind = left.as_primitive();
        let common = left.common(&right);

        self.check_representable(lhs, left_value.as_ref(), &common)?;
        self.check_representable(rhs, right_value.as_ref(), &common)?;

        if op == OperatorKind::Assign {
            if !self.is_assignable(lhs) {
                return Err(self.error(ErrorImpl::NotAssignable, lhs).into());
            }
            return Ok(TypedValue::new(Type::unit()));
        }

        if op.is_arithmetic() && kind.is_some_and(PrimitiveKind::is_numeric) {
            if matches!(op, OperatorKind::Div | OperatorKind::Mod)
                && right_value.as_ref().and_then(Value::as_float) == Some(0.0)
            {
                return Err(self.error(ErrorImpl::DivisionByZero, rhs).into());
            }

            let value = match (left_value, right_value) {
                (Some(l), Some(r)) => fold_arithmetic(op, &l, &r),
                _ => None,
            };
            self.check_representable(node, value.as_ref(), &common)?;
            return Ok(folded(common, value));
        }

        if op.is_comparison()
            && kind.is_some_and(|kind| kind.is_numeric() || kind.is_boolean())
        {
            let ty = if common.is_untyped() {
                Type::untyped(PrimitiveKind::UntypedBool)
            } else {
                Type::bool()
            };
            let value = match (left_value, right_value) {
                (Some(l), Some(r)) => fold_comparison(op, &l, &r),
                _ => None,
            };
            return Ok(folded(ty, value));
        }

        Err(self.undefined_operator(op, left, op_node))
    }

    /// Whether `node` names a storage location: a variable, an element of
    /// one, or the target of a reference.
    fn is_assignable(&self, node: NodeId) -> bool {
        match self.ast.kind(node) {
            NodeKind::Ident(_) => self.module.uses.get(&node).is_some_and(|symbol| {
                let symbol = self.module.symbol(*symbol);
                symbol.is_var() && !symbol.is_constant()
            }),
            NodeKind::Index { target, .. } => self.is_assignable(*target),
            NodeKind::PostfixOp { op, .. } => {
                matches!(self.ast.kind(*op), NodeKind::Operator(OperatorKind::Unwrap))
            }
            _ => false,
        }
    }

    fn check_postfix(&mut self, op_node: NodeId, operand: NodeId) -> CheckResult<TypedValue> {
        let op = self.operator(op_node)?;

        match op {
            OperatorKind::Unwrap => {
                let ty = self.type_of(operand)?;
                match ty.as_reference() {
                    Some(base) => Ok(TypedValue::new(base.clone())),
                    None => Err(self
                        .error(ErrorImpl::NotAReference { received: ty }, operand)
                        .into()),
                }
            }
            OperatorKind::Try => {
                let feature = String::from("the `?` operator");
                Err(self.error(ErrorImpl::Unsupported { feature }, op_node).into())
            }
            _ => {
                let ty = self.type_of(operand)?;
                Err(self.undefined_operator(op, ty, op_node))
            }
        }
    }

    fn check_call(&mut self, callee: NodeId, args: NodeId) -> CheckResult<TypedValue> {
        let ty = self.type_of(callee)?;
        let Some(func) = ty.as_func().cloned() else {
            return Err(self
                .error(ErrorImpl::NotAFunction { received: ty }, callee)
                .into());
        };

        let ast = self.ast;
        let items = ast.list(args).ok_or_else(|| self.unexpected(args))?;
        self.check_call_args(&func, args, items)?;

        Ok(TypedValue::new(func.result_type()))
    }

    /// Types every argument and validates them against `func`.
    ///
    /// A wrong argument is reported at that argument, a wrong count at the
    /// whole list.
    fn check_call_args(&mut self, func: &Func, args: NodeId, items: &[NodeId]) -> CheckResult<()> {
        let mut types = Vec::with_capacity(items.len());
        let mut values = Vec::with_capacity(items.len());
        for &item in items {
            let (ty, value) = self.evaluate(item)?;
            types.push(ty);
            values.push(value);
        }

        let Err(fault) = func.check_args(&Tuple::new(types)) else {
            for (index, (&item, value)) in items.iter().zip(&values).enumerate() {
                if let Some(param) = func.param_at(index) {
                    self.check_representable(item, value.as_ref(), param)?;
                }
            }
            return Ok(());
        };

        let index = fault.index;
        let message = fault.to_string();

        let error = match fault.kind {
            ArgumentFaultKind::Mismatch { .. } => self.error(
                ErrorImpl::ArgumentTypeMismatch { index, message },
                items.get(index).copied().unwrap_or(args),
            ),
            ArgumentFaultKind::TooMany { .. } | ArgumentFaultKind::NotEnough { .. } => {
                self.error(ErrorImpl::ArityMismatch { index, message }, args)
            }
        };

        Err(error.into())
    }

    fn check_index(&mut self, target: NodeId, args: NodeId) -> CheckResult<TypedValue> {
        let ty = self.type_of(target)?;
        let ast = self.ast;
        let items = ast.list(args).ok_or_else(|| self.unexpected(args))?;

        if items.len() != 1 {
            return Err(self
                .error(
                    ErrorImpl::ExpectedArgumentCount {
                        expected: 1,
                        received: items.len(),
                    },
                    args,
                )
                .into());
        }

        let index_node = items[0];
        let (index_ty, index) = self.evaluate(index_node)?;
        let index = index.as_ref().and_then(Value::as_int);

        if let Some(array) = ty.as_array() {
            if !index_ty.equals(&Type::i32()) {
                return Err(self
                    .error(
                        ErrorImpl::TypeMismatch {
                            expected: Type::i32(),
                            received: index_ty,
                        },
                        index_node,
                    )
                    .into());
            }

            if let (Some(index), Some(size)) = (index, array.size) {
                if index < 0 || index >= i64::from(size) {
                    let len = size as usize;
                    return Err(self
                        .error(ErrorImpl::IndexOutOfRange { index, len }, index_node)
                        .into());
                }
            }

            return Ok(TypedValue::new((*array.elem).clone()));
        }

        if let Some(tuple) = ty.as_tuple() {
            let Some(index) = index else {
                return Err(self
                    .error(ErrorImpl::ExpectedConstantIndex, index_node)
                    .into());
            };

            let elem = usize::try_from(index)
                .ok()
                .and_then(|i| tuple.types.get(i));

            return match elem {
                Some(elem) => Ok(TypedValue::new(elem.clone())),
                None => {
                    let len = tuple.len();
                    Err(self
                        .error(ErrorImpl::IndexOutOfRange { index, len }, index_node)
                        .into())
                }
            };
        }

        Err(self
            .error(ErrorImpl::NotAnArrayOrTuple { received: ty }, target)
            .into())
    }

    fn check_builtin_call(
        &mut self,
        node: NodeId,
        name: NodeId,
        args: NodeId,
    ) -> CheckResult<TypedValue> {
        let ast = self.ast;
        let builtin_name = self.ident_name(name)?;

        let Some(builtin) = BUILTINS.get(builtin_name.as_str()) else {
            return Err(self
                .error(ErrorImpl::UnknownBuiltin { name: builtin_name }, name)
                .into());
        };

        let items = match ast.kind(args) {
            NodeKind::ParenList(items) => items,
            NodeKind::CurlyList(_) => {
                return Err(self.error(ErrorImpl::UnsupportedArgumentForm, args).into())
            }
            _ => return Err(self.unexpected(args)),
        };

        self.check_call_args(&builtin.signature, args, items)?;

        let result = (builtin.eval)(self, node, items)?;
        self.notify_builtin(builtin.name, node);

        Ok(result.unwrap_or_else(|| TypedValue::new(Type::unit())))
    }

    /// The body decides the type of an `if`; the `else` branch has to
    /// match it. Errors past the body keep its type as partial result.
    fn check_if(
        &mut self,
        cond: NodeId,
        body: NodeId,
        else_: Option<NodeId>,
    ) -> CheckResult<TypedValue> {
        let body_ty = self.type_of(body)?.skip_untyped();

        if let Some(else_) = else_ {
            let else_ty = self
                .type_of(else_)
                .map_err(|error| with_partial_type(error, &body_ty))?;

            if !else_ty.equals(&body_ty) {
                let error = self.error(
                    ErrorImpl::TypeMismatch {
                        expected: body_ty.clone(),
                        received: else_ty,
                    },
                    self.ast.trailing(else_),
                );
                return Err(error.with_partial_type(body_ty).into());
            }
        }

        self.expect_condition(cond)
            .map_err(|error| with_partial_type(error, &body_ty))?;

        Ok(TypedValue::new(body_ty))
    }

    fn check_while(&mut self, cond: NodeId, body: NodeId) -> CheckResult<TypedValue> {
        let body_ty = self.type_of(body)?;

        if !body_ty.is_unit() {
            return Err(self
                .error(ErrorImpl::NonUnitLoopBody { received: body_ty }, body)
                .into());
        }

        self.expect_condition(cond)?;
        Ok(TypedValue::new(Type::unit()))
    }

    /// Conditions must be of the `bool` type itself; untyped booleans are
    /// rejected.
    fn expect_condition(&mut self, cond: NodeId) -> CheckResult<()> {
        let ty = self.type_of(cond)?;

        if *ty.skip_alias() != Type::bool() {
            return Err(self
                .error(
                    ErrorImpl::TypeMismatch {
                        expected: Type::bool(),
                        received: ty,
                    },
                    cond,
                )
                .into());
        }

        Ok(())
    }

    fn check_signature(&mut self, params: NodeId, result: Option<NodeId>) -> CheckResult<TypedValue> {
        let ast = self.ast;
        let items = ast.list(params).ok_or_else(|| self.unexpected(params))?;

        let mut types = Vec::with_capacity(items.len());
        for &item in items {
            types.push(self.expect_type(item)?);
        }

        let result = match result {
            Some(result) => Tuple::new(vec![self.expect_type(result)?]),
            None => Tuple::unit(),
        };

        let func = Func::new(Tuple::new(types), result, false);
        Ok(TypedValue::new(Type::type_desc(Type::Func(func))))
    }

    fn undefined_operator(&self, op: OperatorKind, operand: Type, at: NodeId) -> CheckError {
        self.error(
            ErrorImpl::UndefinedOperator {
                operator: op.to_string(),
                operand,
            },
            at,
        )
        .into()
    }
}

fn folded(ty: Type, value: Option<Value>) -> TypedValue {
    TypedValue { ty: Some(ty), value }
}

fn with_partial_type(error: CheckError, ty: &Type) -> CheckError {
    match error {
        CheckError::Diagnostic(error) => error.with_partial_type(ty.clone()).into(),
        other => other,
    }
}

fn fold_arithmetic(op: OperatorKind, l: &Value, r: &Value) -> Option<Value> {
    if let (Value::Int(l), Value::Int(r)) = (l, r) {
        let (l, r) = (*l, *r);
        let value = match op {
            OperatorKind::Add => l.checked_add(r),
            OperatorKind::Sub => l.checked_sub(r),
            OperatorKind::Mul => l.checked_mul(r),
            OperatorKind::Div => l.checked_div(r),
            OperatorKind::Mod => l.checked_rem(r),
            OperatorKind::BitAnd => Some(l & r),
            OperatorKind::BitOr => Some(l | r),
            OperatorKind::BitXor => Some(l ^ r),
            OperatorKind::Shl => u32::try_from(r).ok().and_then(|r| l.checked_shl(r)),
            OperatorKind::Shr => u32::try_from(r).ok().and_then(|r| l.checked_shr(r)),
            _ => None,
        };
        return value.map(Value::Int);
    }

    let (l, r) = (l.as_float()?, r.as_float()?);
    let value = match op {
        OperatorKind::Add => l + r,
        OperatorKind::Sub => l - r,
        OperatorKind::Mul => l * r,
        OperatorKind::Div => l / r,
        OperatorKind::Mod => l % r,
        _ => return None,
    };

    value.is_finite().then_some(Value::Float(value))
}

fn fold_comparison(op: OperatorKind, l: &Value, r: &Value) -> Option<Value> {
    let ordering = match (l, r) {
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        (Value::Int(l), Value::Int(r)) => l.cmp(r),
        _ => l.as_float()?.partial_cmp(&r.as_float()?)?,
    };

    let result = match op {
        OperatorKind::Eq => ordering.is_eq(),
        OperatorKind::Ne => ordering.is_ne(),
        OperatorKind::Lt => ordering.is_lt(),
        OperatorKind::Le => ordering.is_le(),
        OperatorKind::Gt => ordering.is_gt(),
        OperatorKind::Ge => ordering.is_ge(),
        _ => return None,
    };

    Some(Value::Bool(result))
}
