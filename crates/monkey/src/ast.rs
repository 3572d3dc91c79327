//! Abstract syntax tree produced by the parser.
//!
//! Statements and expressions are plain sum types matched exhaustively by the
//! evaluator and the compiler. Every node implements `Display`, rendering a
//! canonical, fully parenthesized form of the program; re-parsing that form
//! yields a tree that renders identically.

use std::fmt;

use strum::Display;

/// Root node: the ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let <name> = <value>;`
    Let { name: String, value: Expression },
    /// `return <value>?;`
    Return(Option<Expression>),
    /// A bare expression in statement position.
    Expression(Expression),
}

/// A braced sequence of statements (function bodies, `if` branches).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    IntegerLiteral(i64),
    Boolean(bool),
    StringLiteral(String),
    ArrayLiteral(Vec<Expression>),
    /// Key/value pairs in source order.
    HashLiteral(Vec<(Expression, Expression)>),
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        parameters: Vec<String>,
        body: BlockStatement,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PrefixOperator {
    #[strum(serialize = "!")]
    Bang,
    #[strum(serialize = "-")]
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InfixOperator {
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "*")]
    Star,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Statement]) -> fmt::Result {
    for (i, statement) in statements.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{statement}")?;
    }
    Ok(())
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let { name, value } => write!(f, "let {name} = {value};"),
            Self::Return(Some(value)) => write!(f, "return {value};"),
            Self::Return(None) => f.write_str("return;"),
            Self::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::IntegerLiteral(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::StringLiteral(value) => write!(f, "\"{value}\""),
            Self::ArrayLiteral(elements) => {
                f.write_str("[")?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Self::HashLiteral(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Self::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Self::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({condition}) {{ {consequence} }}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{ {alternative} }}")?;
                }
                Ok(())
            }
            Self::FunctionLiteral { parameters, body } => {
                write!(f, "fn({}) {{ {body} }}", parameters.join(", "))
            }
            Self::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                write_list(f, arguments)?;
                f.write_str(")")
            }
            Self::Index { left, index } => write!(f, "({left}[{index}])"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, expressions: &[Expression]) -> fmt::Result {
    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{expression}")?;
    }
    Ok(())
}
