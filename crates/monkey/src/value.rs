//! Runtime value model shared by the evaluator and the virtual machine.
//!
//! Values are a tagged sum. Aggregates (strings, arrays, hashes, functions)
//! are held behind `Rc`, so cloning a value is cheap and `push`-style
//! builtins can return new collections without copying the old ones eagerly.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use strum::Display;

use crate::{
    ast::BlockStatement, builtins::Builtin, environment::Env, string_hash::shake128_32,
};

/// Runtime type tags, rendered uppercase in error messages
/// (`type mismatch: INTEGER + BOOLEAN`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Type {
    #[strum(serialize = "INTEGER")]
    Integer,
    #[strum(serialize = "BOOLEAN")]
    Boolean,
    #[strum(serialize = "NULL")]
    Null,
    #[strum(serialize = "RETURN_VALUE")]
    ReturnValue,
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "FUNCTION")]
    Function,
    #[strum(serialize = "STRING")]
    String,
    #[strum(serialize = "BUILTIN")]
    Builtin,
    #[strum(serialize = "ARRAY")]
    Array,
    #[strum(serialize = "HASH")]
    Hash,
}

/// A Monkey runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Null,
    String(Rc<str>),
    /// Wrapper carrying a value up to the nearest function boundary, where
    /// it is unwrapped exactly once. Never escapes a completed evaluation.
    Return(Box<Value>),
    /// A first-class error inside the evaluator; short-circuits every
    /// enclosing evaluation step.
    Error(String),
    Function(Rc<Function>),
    Builtin(Builtin),
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashPairs>),
}

/// Hash storage: digest key to stored pair, in insertion order.
pub type HashPairs = IndexMap<HashKey, HashPair>;

/// A user-defined function value closing over its defining environment.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    /// The environment in effect at the function literal's evaluation.
    pub env: Env,
}

// The captured environment may transitively contain this function, so the
// derived Debug would recurse; render the function head only.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A key/value pair stored in a hash.
///
/// The original key is kept alongside the value so lookups can confirm the
/// probe key matches and a digest collision cannot surface a foreign value.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// A hashable value reduced to `(type tag, 64-bit value)`.
///
/// Integers hash to their bits, booleans to 0/1, strings to the 32-bit
/// SHAKE-128 digest of their UTF-8 bytes. Only these three types are
/// hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    tag: Type,
    value: u64,
}

impl Value {
    /// The runtime type tag used in error messages.
    #[must_use]
    pub fn kind(&self) -> Type {
        match self {
            Self::Integer(_) => Type::Integer,
            Self::Boolean(_) => Type::Boolean,
            Self::Null => Type::Null,
            Self::Return(_) => Type::ReturnValue,
            Self::Error(_) => Type::Error,
            Self::Function(_) => Type::Function,
            Self::String(_) => Type::String,
            Self::Builtin(_) => Type::Builtin,
            Self::Array(_) => Type::Array,
            Self::Hash(_) => Type::Hash,
        }
    }

    /// A value is truthy unless it is `false` or `null`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Boolean(false) | Self::Null)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The hash key for this value, or `None` for unhashable types.
    #[must_use]
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Self::Integer(value) => Some(HashKey {
                tag: Type::Integer,
                value: u64::from_ne_bytes(value.to_ne_bytes()),
            }),
            Self::Boolean(value) => Some(HashKey {
                tag: Type::Boolean,
                value: u64::from(*value),
            }),
            Self::String(value) => Some(HashKey {
                tag: Type::String,
                value: shake128_32(value),
            }),
            _ => None,
        }
    }

    /// The user-facing rendering of this value (the `Display` form).
    #[must_use]
    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Return(a), Self::Return(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            // Functions have identity, not structure.
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Null => f.write_str("null"),
            Self::String(value) => f.write_str(value),
            Self::Return(value) => write!(f, "{value}"),
            Self::Error(message) => write!(f, "ERROR: {message}"),
            Self::Function(function) => {
                write!(f, "fn({}) {{\n{}\n}}", function.parameters.join(", "), function.body)
            }
            Self::Builtin(_) => f.write_str("built-in function"),
            Self::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Self::Hash(pairs) => {
                f.write_str("{")?;
                for (i, pair) in pairs.values().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                f.write_str("}")
            }
        }
    }
}
