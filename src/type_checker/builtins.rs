use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::ast::NodeId,
    errors::errors::{CheckResult, ErrorImpl},
    types::{
        func::Func,
        types::{NamedKind, PrimitiveKind, Tuple, Type},
    },
};

use super::{
    module::Module,
    symbols::SymbolKind,
    type_checker::Checker,
    value::{TypedValue, Value},
};

/// Compile-time evaluator of a built-in. Receives the call node and its
/// already typed argument nodes.
pub type BuiltInEval =
    fn(&mut Checker<'_>, NodeId, &[NodeId]) -> CheckResult<Option<TypedValue>>;

pub struct BuiltIn {
    pub name: &'static str,
    pub signature: Func,
    pub eval: BuiltInEval,
}

fn builtin(
    name: &'static str,
    params: Vec<Type>,
    result: Vec<Type>,
    variadic: bool,
    eval: BuiltInEval,
) -> (&'static str, BuiltIn) {
    (
        name,
        BuiltIn {
            name,
            signature: Func::new(Tuple::new(params), Tuple::new(result), variadic),
            eval,
        },
    )
}

lazy_static! {
    pub static ref BUILTINS: HashMap<&'static str, BuiltIn> = HashMap::from([
        builtin(
            "size_of",
            vec![Type::Primitive(PrimitiveKind::AnyTypeDesc)],
            vec![Type::i32()],
            false,
            eval_size_of,
        ),
        builtin(
            "type_of",
            vec![Type::any()],
            vec![Type::Primitive(PrimitiveKind::AnyTypeDesc)],
            false,
            eval_type_of,
        ),
        builtin("assert", vec![Type::bool()], vec![], false, eval_assert),
        builtin("print", vec![Type::any()], vec![], true, eval_print),
    ]);
}

/// Size in bytes of a value of type `ty`, `None` when it has none.
pub fn size_of(module: &Module, ty: &Type) -> Option<u32> {
    match ty.skip_alias() {
        Type::Primitive(PrimitiveKind::I32) => Some(4),
        Type::Primitive(PrimitiveKind::Bool) => Some(1),
        Type::Primitive(_) => None,
        Type::Tuple(tuple) => tuple
            .types
            .iter()
            .try_fold(0u32, |total, ty| total.checked_add(size_of(module, ty)?)),
        Type::Array(array) => array.size?.checked_mul(size_of(module, &array.elem)?),
        Type::Func(_) | Type::Ref(_) => Some(8),
        Type::Named(named) => match named.kind {
            NamedKind::Enum => Some(4),
            NamedKind::Struct => {
                let symbol = module.type_syms.get(&Type::Named(named.clone()))?;
                match &module.symbol(*symbol).kind {
                    SymbolKind::Struct { fields } => fields
                        .iter()
                        .try_fold(0u32, |total, (_, ty)| total.checked_add(size_of(module, ty)?)),
                    _ => None,
                }
            }
        },
        Type::Alias(_) | Type::TypeDesc(_) => None,
    }
}

fn eval_size_of(
    checker: &mut Checker<'_>,
    _node: NodeId,
    args: &[NodeId],
) -> CheckResult<Option<TypedValue>> {
    let arg = args[0];
    let ty = checker.type_of(arg)?.skip_type_desc();

    match size_of(&checker.module, &ty) {
        Some(size) => Ok(Some(TypedValue::constant(
            Type::i32(),
            Value::Int(i64::from(size)),
        ))),
        None => Err(checker.error(ErrorImpl::UnsizedType { received: ty }, arg).into()),
    }
}

fn eval_type_of(
    checker: &mut Checker<'_>,
    _node: NodeId,
    args: &[NodeId],
) -> CheckResult<Option<TypedValue>> {
    let ty = checker.type_of(args[0])?.skip_untyped();
    Ok(Some(TypedValue::new(Type::type_desc(ty))))
}

fn eval_assert(
    checker: &mut Checker<'_>,
    _node: NodeId,
    args: &[NodeId],
) -> CheckResult<Option<TypedValue>> {
    let cond = checker.value_of(args[0])?;

    if cond.value.as_ref().and_then(Value::as_bool) == Some(false) {
        return Err(checker.error(ErrorImpl::AssertionFailed, args[0]).into());
    }

    Ok(None)
}

fn eval_print(
    checker: &mut Checker<'_>,
    node: NodeId,
    args: &[NodeId],
) -> CheckResult<Option<TypedValue>> {
    for arg in args {
        let typed = checker.value_of(*arg)?;
        match (&typed.value, &typed.ty) {
            (Some(value), _) => tracing::info!(node = ?node, "{}", value),
            (None, Some(ty)) => tracing::info!(node = ?node, "<{}>", ty),
            (None, None) => {}
        }
    }

    Ok(None)
}

