//! Compiler tests: lowering the AST to instruction sequences and constants.

use monkey::{
    Bytecode, CompileError, Compiler, Instructions, Opcode, Value,
    bytecode::make,
    parse,
};
use pretty_assertions::assert_eq;

fn compile(source: &str) -> Bytecode {
    try_compile(source).unwrap_or_else(|error| panic!("compile failed for {source:?}: {error}"))
}

fn try_compile(source: &str) -> Result<Bytecode, CompileError> {
    let program = parse(source).unwrap_or_else(|errors| panic!("parse failed:\n{errors}"));
    let mut compiler = Compiler::new();
    compiler.compile(&program)?;
    Ok(compiler.bytecode())
}

/// Concatenates expected instructions; comparing via the disassembly gives
/// readable failures.
fn concat(instructions: &[Vec<u8>]) -> Instructions {
    let mut all = Instructions::default();
    for instruction in instructions {
        all.push(instruction);
    }
    all
}

fn check(source: &str, expected_constants: &[i64], expected_instructions: &[Vec<u8>]) {
    let bytecode = compile(source);
    assert_eq!(
        bytecode.instructions.to_string(),
        concat(expected_instructions).to_string(),
        "instructions for {source:?}"
    );
    let constants: Vec<Value> = expected_constants
        .iter()
        .map(|value| Value::Integer(*value))
        .collect();
    assert_eq!(bytecode.constants, constants, "constants for {source:?}");
}

#[test]
fn integer_arithmetic() {
    check(
        "1 + 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Add, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "1; 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Pop, &[]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "1 - 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Sub, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "1 * 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Mul, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "2 / 1",
        &[2, 1],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Div, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "-1",
        &[1],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Minus, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
}

#[test]
fn boolean_expressions() {
    check("true", &[], &[make(Opcode::True, &[]), make(Opcode::Pop, &[])]);
    check("false", &[], &[make(Opcode::False, &[]), make(Opcode::Pop, &[])]);
    check(
        "1 > 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::GreaterThan, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "1 == 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Equal, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "1 != 2",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::NotEqual, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "true == false",
        &[],
        &[
            make(Opcode::True, &[]),
            make(Opcode::False, &[]),
            make(Opcode::Equal, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "!true",
        &[],
        &[
            make(Opcode::True, &[]),
            make(Opcode::Bang, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
}

/// There is no `LessThan` opcode: `1 < 2` compiles its operands in reverse
/// and emits `GreaterThan`.
#[test]
fn less_than_reverses_operands() {
    check(
        "1 < 2",
        &[2, 1],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::GreaterThan, &[]),
            make(Opcode::Pop, &[]),
        ],
    );
}

/// Jump operands are backpatched to the first byte after each branch; a
/// missing alternative compiles to an inserted `OpNull`.
#[test]
fn conditionals() {
    check(
        "if (true) { 10 }; 3333;",
        &[10, 3333],
        &[
            // 0000
            make(Opcode::True, &[]),
            // 0001
            make(Opcode::JumpNotTruthy, &[10]),
            // 0004
            make(Opcode::Constant, &[0]),
            // 0007
            make(Opcode::Jump, &[11]),
            // 0010
            make(Opcode::Null, &[]),
            // 0011
            make(Opcode::Pop, &[]),
            // 0012
            make(Opcode::Constant, &[1]),
            // 0015
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "if (true) { 10 } else { 20 }; 3333;",
        &[10, 20, 3333],
        &[
            // 0000
            make(Opcode::True, &[]),
            // 0001
            make(Opcode::JumpNotTruthy, &[10]),
            // 0004
            make(Opcode::Constant, &[0]),
            // 0007
            make(Opcode::Jump, &[13]),
            // 0010
            make(Opcode::Constant, &[1]),
            // 0013
            make(Opcode::Pop, &[]),
            // 0014
            make(Opcode::Constant, &[2]),
            // 0017
            make(Opcode::Pop, &[]),
        ],
    );
}

#[test]
fn global_let_statements() {
    check(
        "let one = 1; let two = 2;",
        &[1, 2],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::SetGlobal, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::SetGlobal, &[1]),
        ],
    );
    check(
        "let one = 1; one;",
        &[1],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::SetGlobal, &[0]),
            make(Opcode::GetGlobal, &[0]),
            make(Opcode::Pop, &[]),
        ],
    );
    check(
        "let one = 1; let two = one; two;",
        &[1],
        &[
            make(Opcode::Constant, &[0]),
            make(Opcode::SetGlobal, &[0]),
            make(Opcode::GetGlobal, &[0]),
            make(Opcode::SetGlobal, &[1]),
            make(Opcode::GetGlobal, &[1]),
            make(Opcode::Pop, &[]),
        ],
    );
}

/// Resolving a name that was never defined is a compile-time error.
#[test]
fn undefined_variable() {
    assert_eq!(
        try_compile("x"),
        Err(CompileError::UndefinedVariable("x".to_owned()))
    );
    assert_eq!(
        try_compile("x").unwrap_err().to_string(),
        "undefined variable x"
    );
}

/// Constructs outside the compiled subset are typed errors, not silent
/// no-ops that would desynchronize the stack.
#[test]
fn unsupported_constructs() {
    for source in ["\"hello\"", "[1]", "{1: 2}", "fn() { 1 }", "len(\"\")", "[1][0]", "return 1;"] {
        assert!(
            matches!(try_compile(source), Err(CompileError::Unsupported(_))),
            "expected unsupported-construct error for {source:?}"
        );
    }
}

/// Compiler state threads across lines: constants and symbols accumulate.
#[test]
fn state_carries_across_compilers() {
    let program1 = parse("let one = 1;").unwrap();
    let mut compiler = Compiler::new();
    compiler.compile(&program1).unwrap();
    assert_eq!(compiler.symbols().num_definitions(), 1);
    let (symbols, constants) = compiler.into_state();

    let program2 = parse("let two = one + 1; two").unwrap();
    let mut compiler = Compiler::with_state(symbols, constants);
    compiler.compile(&program2).unwrap();
    assert_eq!(compiler.symbols().num_definitions(), 2);
    let bytecode = compiler.bytecode();
    // Constant pool keeps the first line's constants: [1, 1].
    assert_eq!(
        bytecode.constants,
        vec![Value::Integer(1), Value::Integer(1)]
    );
}
