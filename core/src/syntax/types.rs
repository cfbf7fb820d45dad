use core::fmt::{self, Display};

use crate::syntax::Symbol;

/// Static type of an expression as resolved by the checker.
///
/// Types are interned by [`TypeManager`](super::TypeManager), so two
/// references to equal types are the same pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type<'a> {
    // Top/bottom.
    Any,
    Unknown,
    Never,

    // Unit-like.
    Void,
    Undefined,
    Null,

    // Primitives.
    Boolean,
    Number,
    BigInt,
    String,

    // Collections.
    Array(&'a Type<'a>),

    /// A declared interface or class, identified by its declaration symbol.
    Interface { name: &'a str, symbol: Symbol<'a> },

    /// Anonymous object type (e.g. the type of an object literal).
    Object(&'a [(&'a str, &'a Type<'a>)]),

    Function {
        params: &'a [&'a Type<'a>],
        ret: &'a Type<'a>,
    },

    Union(&'a [&'a Type<'a>]), // Never empty.
}

impl<'a> Type<'a> {
    /// True when the type (or every union member) satisfies `pred`.
    fn all(&self, pred: impl Fn(&Type<'a>) -> bool) -> bool {
        match self {
            Type::Union(members) => !members.is_empty() && members.iter().all(|m| pred(*m)),
            other => pred(other),
        }
    }

    pub fn is_integer_like(&self) -> bool {
        self.all(|t| matches!(t, Type::Number | Type::BigInt))
    }

    pub fn is_boolean_like(&self) -> bool {
        self.all(|t| matches!(t, Type::Boolean))
    }

    pub fn is_string_like(&self) -> bool {
        self.all(|t| matches!(t, Type::String))
    }

    pub fn is_void_like(&self) -> bool {
        self.all(|t| matches!(t, Type::Void | Type::Undefined | Type::Never))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Type::Undefined)
    }

    /// Declaration symbol for interface types.
    pub fn interface_symbol(&self) -> Option<Symbol<'a>> {
        match self {
            Type::Interface { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    /// Return type when this is a function type.
    pub fn return_type(&self) -> Option<&'a Type<'a>> {
        match self {
            Type::Function { ret, .. } => Some(ret),
            _ => None,
        }
    }
}

impl Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "any"),
            Type::Unknown => write!(f, "unknown"),
            Type::Never => write!(f, "never"),
            Type::Void => write!(f, "void"),
            Type::Undefined => write!(f, "undefined"),
            Type::Null => write!(f, "null"),
            Type::Boolean => write!(f, "boolean"),
            Type::Number => write!(f, "number"),
            Type::BigInt => write!(f, "bigint"),
            Type::String => write!(f, "string"),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Interface { name, .. } => write!(f, "{}", name),
            Type::Object(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, " }}")
            }
            Type::Function { params, ret } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "arg{}: {}", i, param)?;
                }
                write!(f, ") => {}", ret)
            }
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}
