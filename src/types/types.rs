use std::fmt::{self, Display};

use super::func::Func;

/// Kinds of primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Unknown,
    UntypedBool,
    UntypedInt,
    UntypedFloat,
    UntypedString,
    Bool,
    I32,
    Any,
    AnyTypeDesc,
}

impl PrimitiveKind {
    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            PrimitiveKind::UntypedBool
                | PrimitiveKind::UntypedInt
                | PrimitiveKind::UntypedFloat
                | PrimitiveKind::UntypedString
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveKind::UntypedInt | PrimitiveKind::UntypedFloat | PrimitiveKind::I32
        )
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, PrimitiveKind::UntypedBool | PrimitiveKind::Bool)
    }

    /// Default concrete representation of an untyped kind.
    ///
    /// Floats and strings have no concrete representation yet and stay
    /// untyped.
    pub fn concrete(self) -> PrimitiveKind {
        match self {
            PrimitiveKind::UntypedBool => PrimitiveKind::Bool,
            PrimitiveKind::UntypedInt => PrimitiveKind::I32,
            other => other,
        }
    }

    /// Whether a value of kind `self` can be used where `other` is expected
    /// (or the other way around).
    fn is_compatible_with(self, other: PrimitiveKind) -> bool {
        use PrimitiveKind::*;

        if self == other {
            return true;
        }

        matches!(
            (self, other),
            (UntypedBool, Bool)
                | (Bool, UntypedBool)
                | (UntypedInt, I32)
                | (I32, UntypedInt)
                | (UntypedInt, UntypedFloat)
                | (UntypedFloat, UntypedInt)
        )
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Unknown => "unknown",
            PrimitiveKind::UntypedBool => "untyped bool",
            PrimitiveKind::UntypedInt => "untyped int",
            PrimitiveKind::UntypedFloat => "untyped float",
            PrimitiveKind::UntypedString => "untyped string",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::Any => "any",
            PrimitiveKind::AnyTypeDesc => "typedesc",
        };
        write!(f, "{}", name)
    }
}

/// An ordered sequence of types. The empty tuple is the unit type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Tuple {
    pub types: Vec<Type>,
}

impl Tuple {
    pub fn new(types: Vec<Type>) -> Self {
        Tuple { types }
    }

    pub fn unit() -> Self {
        Tuple { types: vec![] }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn equals(&self, other: &Tuple) -> bool {
        self.types.len() == other.types.len()
            && self
                .types
                .iter()
                .zip(other.types.iter())
                .all(|(a, b)| a.equals(b))
    }
}

impl Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

/// A fixed-size array. A missing size is the `_` placeholder and matches
/// arrays of any size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Array {
    pub size: Option<u32>,
    pub elem: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias {
    pub name: String,
    pub base: Box<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKind {
    Struct,
    Enum,
}

/// A nominal type, identified by the id of its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Named {
    pub kind: NamedKind,
    pub name: String,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Tuple(Tuple),
    Array(Array),
    Func(Func),
    Ref(Box<Type>),
    Alias(Alias),
    TypeDesc(Box<Type>),
    Named(Named),
}

impl Type {
    pub fn unit() -> Type {
        Type::Tuple(Tuple::unit())
    }

    pub fn unknown() -> Type {
        Type::Primitive(PrimitiveKind::Unknown)
    }

    pub fn i32() -> Type {
        Type::Primitive(PrimitiveKind::I32)
    }

    pub fn bool() -> Type {
        Type::Primitive(PrimitiveKind::Bool)
    }

    pub fn any() -> Type {
        Type::Primitive(PrimitiveKind::Any)
    }

    pub fn untyped(kind: PrimitiveKind) -> Type {
        Type::Primitive(kind)
    }

    pub fn array(size: Option<u32>, elem: Type) -> Type {
        Type::Array(Array {
            size,
            elem: Box::new(elem),
        })
    }

    pub fn reference(base: Type) -> Type {
        Type::Ref(Box::new(base))
    }

    pub fn alias(name: impl Into<String>, base: Type) -> Type {
        Type::Alias(Alias {
            name: name.into(),
            base: Box::new(base),
        })
    }

    pub fn type_desc(base: Type) -> Type {
        Type::TypeDesc(Box::new(base))
    }

    pub fn tuple(types: Vec<Type>) -> Type {
        Type::Tuple(Tuple::new(types))
    }

    /// Strips exactly one level of alias indirection.
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Alias(alias) => &alias.base,
            other => other,
        }
    }

    /// Strips every alias level.
    pub fn skip_alias(&self) -> &Type {
        let mut ty = self;
        while let Type::Alias(alias) = ty {
            ty = &alias.base;
        }
        ty
    }

    /// The type denoted by a type descriptor, or the type itself.
    pub fn skip_type_desc(&self) -> Type {
        match self.skip_alias() {
            Type::TypeDesc(base) => (**base).clone(),
            _ => self.clone(),
        }
    }

    /// Concretizes an untyped literal type to its default representation.
    pub fn skip_untyped(&self) -> Type {
        match self {
            Type::Primitive(kind) => Type::Primitive(kind.concrete()),
            other => other.clone(),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.skip_alias(), Type::Tuple(tuple) if tuple.is_empty())
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Primitive(kind) if kind.is_untyped())
    }

    pub fn is_type_desc(&self) -> bool {
        matches!(self.skip_alias(), Type::TypeDesc(_))
    }

    pub fn is_func(&self) -> bool {
        self.as_func().is_some()
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self.skip_alias() {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self.skip_alias() {
            Type::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self.skip_alias() {
            Type::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&Func> {
        match self.skip_alias() {
            Type::Func(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Type> {
        match self.skip_alias() {
            Type::Ref(base) => Some(base),
            _ => None,
        }
    }

    pub fn as_named(&self) -> Option<&Named> {
        match self.skip_alias() {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }

    /// Structural compatibility.
    ///
    /// Aliases are transparent, `any` matches every value type and
    /// `typedesc` every type descriptor, untyped literal kinds match the
    /// concrete kind of the same category.
    pub fn equals(&self, other: &Type) -> bool {
        let (a, b) = (self.skip_alias(), other.skip_alias());

        match (a, b) {
            (Type::Primitive(PrimitiveKind::Any), other)
            | (other, Type::Primitive(PrimitiveKind::Any)) => !matches!(other, Type::TypeDesc(_)),
            (Type::Primitive(PrimitiveKind::AnyTypeDesc), other)
            | (other, Type::Primitive(PrimitiveKind::AnyTypeDesc)) => {
                matches!(other, Type::TypeDesc(_) | Type::Primitive(PrimitiveKind::AnyTypeDesc))
            }
            (Type::Primitive(x), Type::Primitive(y)) => x.is_compatible_with(*y),
            (Type::Tuple(x), Type::Tuple(y)) => x.equals(y),
            (Type::Array(x), Type::Array(y)) => {
                let sizes_match = match (x.size, y.size) {
                    (Some(n), Some(m)) => n == m,
                    _ => true,
                };
                sizes_match && x.elem.equals(&y.elem)
            }
            (Type::Func(x), Type::Func(y)) => x.equals(y),
            (Type::Ref(x), Type::Ref(y)) => x.equals(y),
            (Type::TypeDesc(x), Type::TypeDesc(y)) => x.equals(y),
            (Type::Named(x), Type::Named(y)) => x.id == y.id && x.kind == y.kind,
            _ => false,
        }
    }

    /// Picks the more concrete of two compatible operand types.
    pub fn common(&self, other: &Type) -> Type {
        match (self.as_primitive(), other.as_primitive()) {
            (Some(PrimitiveKind::UntypedInt), Some(PrimitiveKind::UntypedFloat)) => other.clone(),
            (Some(x), Some(_)) if x.is_untyped() && !other.is_untyped() => other.clone(),
            _ => self.clone(),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{}", kind),
            Type::Tuple(tuple) => write!(f, "{}", tuple),
            Type::Array(array) => match array.size {
                Some(size) => write!(f, "[{}]{}", size, array.elem),
                None => write!(f, "[_]{}", array.elem),
            },
            Type::Func(func) => write!(f, "{}", func),
            Type::Ref(base) => write!(f, "&{}", base),
            Type::Alias(alias) => write!(f, "{}", alias.name),
            Type::TypeDesc(base) => write!(f, "type {}", base),
            Type::Named(named) => write!(f, "{}", named.name),
        }
    }
}
