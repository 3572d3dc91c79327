use std::fmt;

use crate::{
    bytecode::{CompileError, VmError},
    parser::ParseErrors,
};

/// Error type for REPL execution, separating failures by pipeline stage.
///
/// Keeping parse/compile/runtime failures distinct lets callers handle user
/// feedback and recovery accurately without string matching. Evaluator
/// errors are not represented here: they are first-class `Value::Error`s
/// and come back as the line's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplError {
    /// Parsing failed; downstream stages did not run.
    Parse(ParseErrors),
    /// Bytecode compilation failed after a clean parse.
    Compile(CompileError),
    /// The virtual machine failed while executing bytecode.
    Runtime(VmError),
}

impl fmt::Display for ReplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(errors) => {
                for (i, message) in errors.messages().iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "parser error: {message}")?;
                }
                Ok(())
            }
            Self::Compile(error) => write!(f, "compilation failed: {error}"),
            Self::Runtime(error) => write!(f, "executing bytecode failed: {error}"),
        }
    }
}

impl std::error::Error for ReplError {}

impl From<ParseErrors> for ReplError {
    fn from(errors: ParseErrors) -> Self {
        Self::Parse(errors)
    }
}

impl From<CompileError> for ReplError {
    fn from(error: CompileError) -> Self {
        Self::Compile(error)
    }
}

impl From<VmError> for ReplError {
    fn from(error: VmError) -> Self {
        Self::Runtime(error)
    }
}
