//! AST to bytecode lowering.
//!
//! The compiler walks the tree, appending encoded instructions and
//! collecting literals into the constant pool. Forward jumps are emitted
//! with a placeholder operand and backpatched once the target offset is
//! known. No folding or dead-code elimination happens here; observable
//! semantics must match the tree-walking evaluator exactly.

use std::fmt;

use super::{
    code::{Instructions, make},
    op::Opcode,
    symbols::SymbolTable,
};
use crate::{
    ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement},
    value::Value,
};

/// Placeholder operand for jumps that are backpatched later.
const BOGUS_JUMP_TARGET: usize = 9999;

/// Typed compile-time failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An identifier that was never defined with `let`.
    UndefinedVariable(String),
    /// An AST node outside the compiled subset of the language. Emitting
    /// nothing for it would desynchronize the operand stack.
    Unsupported(&'static str),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable(name) => write!(f, "undefined variable {name}"),
            Self::Unsupported(construct) => {
                write!(f, "compiling {construct} is not supported")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// The compiler's output: an instruction stream plus its constant pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

/// The opcode and starting offset of an emitted instruction. The last two
/// of these are tracked so a trailing `Pop` inside an `if` branch can be
/// elided.
#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Value>,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
    symbols: SymbolTable,
}

impl Compiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler continuing from an earlier line's symbol table and
    /// constant pool (REPL sessions).
    #[must_use]
    pub fn with_state(symbols: SymbolTable, constants: Vec<Value>) -> Self {
        Self {
            constants,
            symbols,
            ..Self::default()
        }
    }

    /// The symbol table after compilation; its definition count is the
    /// globals array size the program needs.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Releases the session state for reuse by the next line's compiler.
    #[must_use]
    pub fn into_state(self) -> (SymbolTable, Vec<Value>) {
        (self.symbols, self.constants)
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    /// A snapshot of the compiled instructions and constants.
    #[must_use]
    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Expression(expression) => {
                self.compile_expression(expression)?;
                // Expression statements discard their value.
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }
            Statement::Let { name, value } => {
                self.compile_expression(value)?;
                let index = self.symbols.define(name).index;
                self.emit(Opcode::SetGlobal, &[index]);
                Ok(())
            }
            Statement::Return(_) => Err(CompileError::Unsupported("return statements")),
        }
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        match expression {
            Expression::IntegerLiteral(value) => {
                let constant = self.add_constant(Value::Integer(*value));
                self.emit(Opcode::Constant, &[constant]);
                Ok(())
            }
            Expression::Boolean(true) => {
                self.emit(Opcode::True, &[]);
                Ok(())
            }
            Expression::Boolean(false) => {
                self.emit(Opcode::False, &[]);
                Ok(())
            }
            Expression::Identifier(name) => {
                let Some(symbol) = self.symbols.resolve(name) else {
                    return Err(CompileError::UndefinedVariable(name.clone()));
                };
                let index = symbol.index;
                self.emit(Opcode::GetGlobal, &[index]);
                Ok(())
            }
            Expression::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator {
                    PrefixOperator::Bang => self.emit(Opcode::Bang, &[]),
                    PrefixOperator::Minus => self.emit(Opcode::Minus, &[]),
                };
                Ok(())
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => self.compile_infix(*operator, left, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => self.compile_if(condition, consequence, alternative.as_ref()),
            Expression::StringLiteral(_) => Err(CompileError::Unsupported("string literals")),
            Expression::ArrayLiteral(_) => Err(CompileError::Unsupported("array literals")),
            Expression::HashLiteral(_) => Err(CompileError::Unsupported("hash literals")),
            Expression::FunctionLiteral { .. } => {
                Err(CompileError::Unsupported("function literals"))
            }
            Expression::Call { .. } => Err(CompileError::Unsupported("call expressions")),
            Expression::Index { .. } => Err(CompileError::Unsupported("index expressions")),
        }
    }

    fn compile_infix(
        &mut self,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
    ) -> Result<(), CompileError> {
        // `<` has no opcode: compile the operands in reverse and emit
        // `GreaterThan`.
        if operator == InfixOperator::Less {
            self.compile_expression(right)?;
            self.compile_expression(left)?;
            self.emit(Opcode::GreaterThan, &[]);
            return Ok(());
        }

        self.compile_expression(left)?;
        self.compile_expression(right)?;
        match operator {
            InfixOperator::Plus => self.emit(Opcode::Add, &[]),
            InfixOperator::Minus => self.emit(Opcode::Sub, &[]),
            InfixOperator::Star => self.emit(Opcode::Mul, &[]),
            InfixOperator::Slash => self.emit(Opcode::Div, &[]),
            InfixOperator::Greater => self.emit(Opcode::GreaterThan, &[]),
            InfixOperator::Eq => self.emit(Opcode::Equal, &[]),
            InfixOperator::NotEq => self.emit(Opcode::NotEqual, &[]),
            InfixOperator::Less => unreachable!("handled above"),
        };
        Ok(())
    }

    /// An `if` expression leaves exactly one value on the stack: the taken
    /// branch's value, or null when the alternative is absent.
    fn compile_if(
        &mut self,
        condition: &Expression,
        consequence: &BlockStatement,
        alternative: Option<&BlockStatement>,
    ) -> Result<(), CompileError> {
        self.compile_expression(condition)?;
        let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[BOGUS_JUMP_TARGET]);

        self.compile_branch(consequence)?;
        let jump = self.emit(Opcode::Jump, &[BOGUS_JUMP_TARGET]);

        self.change_operand(jump_not_truthy, self.instructions.len());

        match alternative {
            None => {
                self.emit(Opcode::Null, &[]);
            }
            Some(alternative) => self.compile_branch(alternative)?,
        }
        self.change_operand(jump, self.instructions.len());
        Ok(())
    }

    /// Compiles one `if` branch so it leaves exactly one value: either the
    /// branch's final expression (its statement `Pop` is elided) or null
    /// when the branch ends without a value (empty, or a trailing `let`).
    fn compile_branch(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        let start = self.instructions.len();
        self.compile_block(block)?;
        if self.last_instruction_is(Opcode::Pop) {
            self.remove_last_instruction();
        } else if self.instructions.len() == start || self.last_instruction_is(Opcode::SetGlobal) {
            self.emit(Opcode::Null, &[]);
        }
        Ok(())
    }

    fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let position = self.instructions.push(&make(op, operands));
        self.previous_instruction = self.last_instruction;
        self.last_instruction = Some(EmittedInstruction {
            opcode: op,
            position,
        });
        position
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        self.last_instruction
            .is_some_and(|instruction| instruction.opcode == op)
    }

    fn remove_last_instruction(&mut self) {
        let last = self
            .last_instruction
            .expect("remove_last_instruction follows an emit");
        self.instructions.truncate(last.position);
        self.last_instruction = self.previous_instruction;
    }

    /// Re-encodes the instruction at `position` with a new operand
    /// (jump backpatching).
    fn change_operand(&mut self, position: usize, operand: usize) {
        let op = Opcode::from_repr(self.instructions.bytes()[position])
            .expect("backpatch position holds an opcode");
        self.instructions.replace(position, &make(op, &[operand]));
    }
}
