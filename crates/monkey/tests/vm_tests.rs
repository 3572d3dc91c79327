//! Virtual machine tests: executing compiled bytecode and observing the
//! last popped stack element.

use monkey::{Compiler, Value, Vm, VmError, parse};

fn run(source: &str) -> Result<Value, VmError> {
    let program = parse(source).unwrap_or_else(|errors| panic!("parse failed:\n{errors}"));
    let mut compiler = Compiler::new();
    compiler
        .compile(&program)
        .unwrap_or_else(|error| panic!("compile failed for {source:?}: {error}"));
    let mut vm = Vm::new(compiler.bytecode());
    vm.run()?;
    Ok(vm.last_popped().clone())
}

fn run_ok(source: &str) -> Value {
    run(source).unwrap_or_else(|error| panic!("vm error for {source:?}: {error}"))
}

fn assert_integer(source: &str, expected: i64) {
    assert_eq!(
        run_ok(source),
        Value::Integer(expected),
        "for {source:?}"
    );
}

fn assert_boolean(source: &str, expected: bool) {
    assert_eq!(
        run_ok(source),
        Value::Boolean(expected),
        "for {source:?}"
    );
}

#[test]
fn integer_arithmetic() {
    let tests = [
        ("1", 1),
        ("2", 2),
        ("1 + 2", 3),
        ("1 - 2", -1),
        ("1 * 2", 2),
        ("4 / 2", 2),
        ("50 / 2 * 2 + 10 - 5", 55),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 * 2 * 2", 32),
        ("5 * 2 + 10", 20),
        ("5 + 2 * 10", 25),
        ("5 * (2 + 10)", 60),
        ("-5", -5),
        ("-10", -10),
        ("-50 + 100 + -50", 0),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
    ];
    for (source, expected) in tests {
        assert_integer(source, expected);
    }
}

#[test]
fn boolean_expressions() {
    let tests = [
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 < 1", false),
        ("1 > 1", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("1 == 2", false),
        ("1 != 2", true),
        ("true == true", true),
        ("false == false", true),
        ("true == false", false),
        ("true != false", true),
        ("false != true", true),
        ("(1 < 2) == true", true),
        ("(1 < 2) == false", false),
        ("(1 > 2) == true", false),
        ("(1 > 2) == false", true),
        ("!true", false),
        ("!false", true),
        ("!5", false),
        ("!!true", true),
        ("!!false", false),
        ("!!5", true),
        ("!(if (false) { 5; })", true),
    ];
    for (source, expected) in tests {
        assert_boolean(source, expected);
    }
}

#[test]
fn conditionals() {
    let tests = [
        ("if (true) { 10 }", 10),
        ("if (true) { 10 } else { 20 }", 10),
        ("if (false) { 10 } else { 20 }", 20),
        ("if (1) { 10 }", 10),
        ("if (1 < 2) { 10 }", 10),
        ("if (1 < 2) { 10 } else { 20 }", 10),
        ("if (1 > 2) { 10 } else { 20 }", 20),
        ("if ((if (false) { 10 })) { 10 } else { 20 }", 20),
        ("if (5 > 10) { 1 } else { if (6 > 4) { 2 } }", 2),
    ];
    for (source, expected) in tests {
        assert_integer(source, expected);
    }

    // A missing alternative that is not taken leaves null on the stack.
    assert_eq!(run_ok("if (1 > 2) { 10 }"), Value::Null);
    assert_eq!(run_ok("if (false) { 10 }"), Value::Null);

    // Branches without a final expression still leave exactly one value.
    assert_eq!(run_ok("if (true) { let x = 1; }"), Value::Null);
    assert_eq!(run_ok("if (true) {} else { 2 }"), Value::Null);
    assert_integer("if (true) { let x = 1; x + 1 }", 2);
}

#[test]
fn global_let_statements() {
    let tests = [
        ("let one = 1; one", 1),
        ("let one = 1; let two = 2; one + two", 3),
        ("let one = 1; let two = one + one; one + two", 3),
    ];
    for (source, expected) in tests {
        assert_integer(source, expected);
    }
}

/// Binary arithmetic requires two integers.
#[test]
fn binary_type_errors() {
    assert_eq!(
        run("5 + true;"),
        Err(VmError::UnsupportedBinaryTypes(
            monkey::Type::Integer,
            monkey::Type::Boolean
        ))
    );
    assert_eq!(
        run("5 + true;").unwrap_err().to_string(),
        "unsupported types for binary operation: INTEGER, BOOLEAN"
    );
}

#[test]
fn negation_type_error() {
    assert_eq!(
        run("-true").unwrap_err().to_string(),
        "unsupported type for negation: BOOLEAN"
    );
}

#[test]
fn comparison_type_error() {
    assert_eq!(
        run("true > false").unwrap_err().to_string(),
        "unknown operator: OpGreaterThan (BOOLEAN BOOLEAN)"
    );
}

/// Booleans and null compare by identity; equality across the singleton
/// types still works in the machine.
#[test]
fn singleton_comparisons() {
    assert_boolean("(if (false) { 1 }) == (if (false) { 2 })", true);
    assert_boolean("(if (false) { 1 }) != true", true);
}

#[test]
fn division_by_zero() {
    assert_eq!(run("1 / 0"), Err(VmError::DivisionByZero));
    assert_eq!(run("1 / 0").unwrap_err().to_string(), "division by zero");
}

/// Division truncates toward zero, matching the evaluator.
#[test]
fn division_truncates() {
    assert_integer("7 / 2", 3);
    assert_integer("-7 / 2", -3);
    assert_integer("7 / -2", -3);
}

/// `last_popped` observes the slot just vacated by the statement's `Pop`.
#[test]
fn last_popped_tracks_statements() {
    assert_integer("1; 2; 3", 3);
    // A let statement's SetGlobal pops the bound value last.
    assert_integer("let x = 42;", 42);
}

/// Globals persist across machines when the array is handed forward.
#[test]
fn globals_carry_across_runs() {
    let program = parse("let a = 7;").unwrap();
    let mut compiler = Compiler::new();
    compiler.compile(&program).unwrap();
    let bytecode = compiler.bytecode();
    let (symbols, constants) = compiler.into_state();
    let mut vm = Vm::new(bytecode);
    vm.run().unwrap();
    let globals = vm.into_globals();
    assert_eq!(globals, vec![Value::Integer(7)]);

    let program = parse("a * 6").unwrap();
    let mut compiler = Compiler::with_state(symbols, constants);
    compiler.compile(&program).unwrap();
    let mut vm = Vm::with_globals(compiler.bytecode(), globals);
    vm.run().unwrap();
    assert_eq!(vm.last_popped(), &Value::Integer(42));
}
