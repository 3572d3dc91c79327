//! Built-in functions available in the global namespace.
//!
//! Builtins are a closed enum dispatched directly, not host closures. User
//! `let` bindings shadow them: the evaluator consults the environment chain
//! first and this table second.

use std::rc::Rc;

use strum::{Display, EnumString};

use crate::{io::PrintWriter, value::Value};

/// The built-in function table. The `Display` form is the source-level name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    /// Resolves a name to a builtin, if one exists.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Applies the builtin to already-evaluated arguments.
    ///
    /// Arity and argument types are validated here; failures come back as
    /// `Value::Error` like any other evaluator error.
    pub fn apply(self, args: &[Value], out: &mut dyn PrintWriter) -> Value {
        self.try_apply(args, out).unwrap_or_else(|error| error)
    }

    /// `Err` carries a `Value::Error`, letting validation helpers use `?`.
    fn try_apply(self, args: &[Value], out: &mut dyn PrintWriter) -> Result<Value, Value> {
        match self {
            Self::Len => {
                let [arg] = expect_args::<1>(args)?;
                match arg {
                    Value::String(s) => Ok(Value::Integer(count_chars(s))),
                    Value::Array(elements) => Ok(Value::Integer(as_i64(elements.len()))),
                    other => Err(Value::Error(format!(
                        "argument to `len` must be STRING, got {}",
                        other.kind()
                    ))),
                }
            }
            Self::First => {
                let [arg] = expect_args::<1>(args)?;
                let elements = expect_array(self, arg)?;
                Ok(elements.first().cloned().unwrap_or(Value::Null))
            }
            Self::Last => {
                let [arg] = expect_args::<1>(args)?;
                let elements = expect_array(self, arg)?;
                Ok(elements.last().cloned().unwrap_or(Value::Null))
            }
            Self::Rest => {
                let [arg] = expect_args::<1>(args)?;
                let elements = expect_array(self, arg)?;
                if elements.is_empty() {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Array(Rc::new(elements[1..].to_vec())))
                }
            }
            Self::Push => {
                let [arg, item] = expect_args::<2>(args)?;
                let elements = expect_array(self, arg)?;
                let mut pushed = elements.as_ref().clone();
                pushed.push(item.clone());
                Ok(Value::Array(Rc::new(pushed)))
            }
            Self::Puts => {
                for arg in args {
                    out.write_line(&arg.inspect());
                }
                Ok(Value::Null)
            }
        }
    }
}

/// Requires exactly `N` arguments, yielding them as a fixed-size view.
fn expect_args<const N: usize>(args: &[Value]) -> Result<&[Value; N], Value> {
    <&[Value; N]>::try_from(args).map_err(|_| {
        Value::Error(format!(
            "wrong number of arguments. got={}, want={N}",
            args.len()
        ))
    })
}

fn expect_array(builtin: Builtin, arg: &Value) -> Result<&Rc<Vec<Value>>, Value> {
    match arg {
        Value::Array(elements) => Ok(elements),
        other => Err(Value::Error(format!(
            "argument to `{builtin}` must be ARRAY, got {}",
            other.kind()
        ))),
    }
}

/// `len` counts Unicode characters, not bytes.
fn count_chars(s: &str) -> i64 {
    as_i64(s.chars().count())
}

fn as_i64(len: usize) -> i64 {
    i64::try_from(len).expect("collection length fits in i64")
}
