//! Value model tests: hash keys, equality semantics, and the environment
//! chain.

use std::rc::Rc;

use monkey::{Environment, Value};

fn string_value(s: &str) -> Value {
    Value::String(Rc::from(s))
}

/// Equal values produce equal hash keys; the type tag keeps equal numbers
/// under different types apart.
#[test]
fn hash_keys_follow_type_and_value() {
    assert_eq!(
        Value::Integer(1).hash_key(),
        Value::Integer(1).hash_key(),
        "equal integers share a key"
    );
    assert_ne!(Value::Integer(1).hash_key(), Value::Integer(2).hash_key());
    assert_ne!(
        Value::Integer(1).hash_key(),
        Value::Boolean(true).hash_key(),
        "integer 1 and true must not collide"
    );
    assert_eq!(
        string_value("Hello World").hash_key(),
        string_value("Hello World").hash_key(),
        "equal strings share a key"
    );
    assert_ne!(
        string_value("Hello World").hash_key(),
        string_value("My name is johnny").hash_key()
    );
}

/// Only integers, booleans, and strings are hashable.
#[test]
fn unhashable_types_have_no_key() {
    assert!(Value::Null.hash_key().is_none());
    assert!(Value::Array(Rc::new(vec![])).hash_key().is_none());
    assert!(Value::Error("boom".to_owned()).hash_key().is_none());
}

/// Aggregates compare by content, negative/zero integers included.
#[test]
fn value_equality_is_structural() {
    assert_eq!(Value::Integer(-5), Value::Integer(-5));
    assert_eq!(string_value("a"), string_value("a"));
    assert_ne!(string_value("a"), string_value("b"));
    assert_eq!(
        Value::Array(Rc::new(vec![Value::Integer(1), Value::Boolean(true)])),
        Value::Array(Rc::new(vec![Value::Integer(1), Value::Boolean(true)]))
    );
    assert_ne!(Value::Integer(0), Value::Boolean(false), "no cross-type equality");
    assert_ne!(Value::Null, Value::Boolean(false));
}

/// Lookup walks outer links; insertion stays local.
#[test]
fn environment_chain_lookup() {
    let outer = Environment::new();
    outer.borrow_mut().set("a", Value::Integer(1));
    outer.borrow_mut().set("b", Value::Integer(2));

    let inner = Environment::new_enclosed(&outer);
    inner.borrow_mut().set("b", Value::Integer(20));

    assert_eq!(inner.borrow().get("a"), Some(Value::Integer(1)), "falls through to outer");
    assert_eq!(inner.borrow().get("b"), Some(Value::Integer(20)), "inner shadows outer");
    assert_eq!(outer.borrow().get("b"), Some(Value::Integer(2)), "outer unchanged");
    assert_eq!(inner.borrow().get("missing"), None);
}

/// Inspect formats pinned by the interface table.
#[test]
fn inspect_table() {
    assert_eq!(Value::Integer(-7).inspect(), "-7");
    assert_eq!(Value::Boolean(true).inspect(), "true");
    assert_eq!(Value::Null.inspect(), "null");
    assert_eq!(string_value("raw text").inspect(), "raw text");
    assert_eq!(
        Value::Array(Rc::new(vec![Value::Integer(1), string_value("x")])).inspect(),
        "[1, x]"
    );
    assert_eq!(Value::Error("bad".to_owned()).inspect(), "ERROR: bad");
}
