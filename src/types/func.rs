use std::fmt::{self, Display};

use super::types::{Tuple, Type};

/// A function type. Results are always a tuple; a single result is a
/// one-element tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Func {
    pub params: Tuple,
    pub result: Tuple,
    pub variadic: bool,
}

/// Why a list of arguments does not fit a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentFaultKind {
    TooMany { expected: usize, received: usize },
    NotEnough { expected: usize, received: usize },
    Mismatch { expected: Type, received: Type },
}

/// Result of a failed [`Func::check_args`]. `index` is the position of the
/// offending argument; for count faults it may equal the argument count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentFault {
    pub index: usize,
    pub kind: ArgumentFaultKind,
}

impl Display for ArgumentFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ArgumentFaultKind::TooMany { expected, received } => write!(
                f,
                "too many arguments (expected {}, got {})",
                expected, received
            ),
            ArgumentFaultKind::NotEnough { expected, received } => write!(
                f,
                "not enough arguments (expected {}, got {})",
                expected, received
            ),
            ArgumentFaultKind::Mismatch { expected, received } => write!(
                f,
                "expected '{}' for {} argument, got '{}' instead",
                expected,
                ordinalize(self.index + 1),
                received
            ),
        }
    }
}

impl Func {
    pub fn new(params: Tuple, result: Tuple, variadic: bool) -> Self {
        Func {
            params,
            result,
            variadic,
        }
    }

    /// The type a call expression produces: the single result unwrapped,
    /// otherwise the whole result tuple.
    pub fn result_type(&self) -> Type {
        if self.result.len() == 1 {
            self.result.types[0].clone()
        } else {
            Type::Tuple(self.result.clone())
        }
    }

    pub fn equals(&self, other: &Func) -> bool {
        self.variadic == other.variadic
            && self.result.equals(&other.result)
            && self.params.equals(&other.params)
    }

    /// The parameter that takes the argument at `index`, the last one for
    /// trailing variadic arguments.
    pub fn param_at(&self, index: usize) -> Option<&Type> {
        match self.params.types.get(index) {
            Some(ty) => Some(ty),
            None if self.variadic => self.params.types.last(),
            None => None,
        }
    }

    /// Validates argument types against the parameters.
    ///
    /// Without `variadic` the counts must match exactly. With it, the last
    /// parameter takes zero or more trailing arguments.
    pub fn check_args(&self, args: &Tuple) -> Result<(), ArgumentFault> {
        let params = self.params.len();
        let received = args.len();

        if self.variadic && params > 0 {
            let required = params - 1;

            if received < required {
                return Err(ArgumentFault {
                    index: received,
                    kind: ArgumentFaultKind::NotEnough {
                        expected: required,
                        received,
                    },
                });
            }
        } else if received > params {
            return Err(ArgumentFault {
                index: params.min(received),
                kind: ArgumentFaultKind::TooMany {
                    expected: params,
                    received,
                },
            });
        } else if received < params {
            return Err(ArgumentFault {
                index: params.min(received),
                kind: ArgumentFaultKind::NotEnough {
                    expected: params,
                    received,
                },
            });
        }

        for (i, actual) in args.types.iter().enumerate() {
            let Some(expected) = self.param_at(i) else {
                continue;
            };

            if !actual.equals(expected) {
                return Err(ArgumentFault {
                    index: i,
                    kind: ArgumentFaultKind::Mismatch {
                        expected: expected.clone(),
                        received: actual.clone(),
                    },
                });
            }
        }

        Ok(())
    }
}

impl Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func(")?;
        for (i, ty) in self.params.types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
            if self.variadic && i + 1 == self.params.len() {
                write!(f, "...")?;
            }
        }
        write!(f, ")")?;

        match self.result.len() {
            0 => Ok(()),
            1 => write!(f, " {}", self.result.types[0]),
            _ => write!(f, " {}", self.result),
        }
    }
}

pub fn ordinalize(num: usize) -> String {
    let suffix = match num % 100 {
        11..=13 => "th",
        _ => match num % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };

    format!("{}{}", num, suffix)
}
