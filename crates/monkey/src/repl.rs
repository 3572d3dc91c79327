//! Line-at-a-time execution sessions.
//!
//! A [`ReplSession`] runs the full pipeline on each source line and keeps
//! state alive between lines: the evaluator engine carries its environment,
//! the VM engine carries the symbol table, constant pool, and globals
//! array. Both execution strategies produce identical values for every
//! expression the VM subset supports.

use std::mem;

use crate::{
    bytecode::{Compiler, SymbolTable, Vm},
    environment::{Env, Environment},
    evaluator,
    io::PrintWriter,
    parser::parse,
    repl_error::ReplError,
    value::Value,
};

/// Which back end a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Tree-walking evaluator over the AST.
    #[default]
    Eval,
    /// Bytecode compiler plus stack virtual machine.
    Vm,
}

/// A persistent execution session for one engine.
pub struct ReplSession {
    engine: Engine,
    env: Env,
    symbols: SymbolTable,
    constants: Vec<Value>,
    globals: Vec<Value>,
}

impl ReplSession {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            env: Environment::new(),
            symbols: SymbolTable::new(),
            constants: Vec::new(),
            globals: Vec::new(),
        }
    }

    #[must_use]
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Runs one source line through the pipeline and returns its value.
    ///
    /// Evaluator errors come back as `Ok(Value::Error)` (they are values in
    /// that regime); parse, compile, and VM failures come back as
    /// [`ReplError`].
    pub fn execute(
        &mut self,
        source: &str,
        out: &mut dyn PrintWriter,
    ) -> Result<Value, ReplError> {
        let program = parse(source)?;
        match self.engine {
            Engine::Eval => Ok(evaluator::eval(&program, &self.env, out)),
            Engine::Vm => {
                let mut compiler = Compiler::with_state(
                    mem::take(&mut self.symbols),
                    mem::take(&mut self.constants),
                );
                let compiled = compiler.compile(&program);
                let bytecode = compiler.bytecode();
                (self.symbols, self.constants) = compiler.into_state();
                compiled?;

                let mut vm = Vm::with_globals(bytecode, mem::take(&mut self.globals));
                let outcome = vm.run();
                let value = vm.last_popped().clone();
                self.globals = vm.into_globals();
                outcome?;
                Ok(value)
            }
        }
    }
}
