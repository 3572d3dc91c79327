//! Tree-walking evaluator: AST plus environment to value.
//!
//! Errors are first-class `Value::Error`s. Every step checks its subresult
//! and returns errors unchanged, which propagates them to the top of
//! `eval_program` without unwinding.

use std::rc::Rc;

use crate::{
    ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement},
    builtins::Builtin,
    environment::{Env, Environment},
    io::PrintWriter,
    value::{Function, HashPair, HashPairs, Value},
};

/// Evaluates a program against an environment, writing `puts` output to
/// `out`.
pub fn eval(program: &Program, env: &Env, out: &mut dyn PrintWriter) -> Value {
    Evaluator::new(out).eval_program(program, env)
}

/// Recursive-descent evaluation over the AST.
///
/// The evaluator itself is stateless apart from the output writer; all
/// bindings live in the environment chain.
pub struct Evaluator<'a> {
    out: &'a mut dyn PrintWriter,
}

impl<'a> Evaluator<'a> {
    pub fn new(out: &'a mut dyn PrintWriter) -> Self {
        Self { out }
    }

    /// Evaluates top-level statements, unwrapping a `Return` produced by a
    /// top-level `return` statement.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Value {
        let mut result = Value::Null;
        for statement in &program.statements {
            match self.eval_statement(statement, env) {
                Value::Return(value) => return *value,
                error @ Value::Error(_) => return error,
                value => result = value,
            }
        }
        result
    }

    /// Evaluates a block. Unlike `eval_program` this does not unwrap
    /// `Return`, so it bubbles through nested blocks and is unwrapped
    /// exactly once at the function boundary.
    fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> Value {
        let mut result = Value::Null;
        for statement in &block.statements {
            result = self.eval_statement(statement, env);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }
        result
    }

    fn eval_statement(&mut self, statement: &Statement, env: &Env) -> Value {
        match statement {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                env.borrow_mut().set(name.clone(), value);
                Value::Null
            }
            Statement::Return(None) => Value::Return(Box::new(Value::Null)),
            Statement::Return(Some(value)) => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                Value::Return(Box::new(value))
            }
            Statement::Expression(expression) => self.eval_expression(expression, env),
        }
    }

    fn eval_expression(&mut self, expression: &Expression, env: &Env) -> Value {
        match expression {
            Expression::Identifier(name) => Self::eval_identifier(name, env),
            Expression::IntegerLiteral(value) => Value::Integer(*value),
            Expression::Boolean(value) => Value::Boolean(*value),
            Expression::StringLiteral(value) => Value::String(Rc::from(value.as_str())),
            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                Self::eval_prefix(*operator, &right)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                Self::eval_infix(*operator, &left, &right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_error() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Value::Null
                }
            }
            Expression::FunctionLiteral { parameters, body } => {
                Value::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: Rc::clone(env),
                }))
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, env);
                if function.is_error() {
                    return function;
                }
                match self.eval_expressions(arguments, env) {
                    Ok(args) => self.apply_function(&function, &args),
                    Err(error) => error,
                }
            }
            Expression::ArrayLiteral(elements) => match self.eval_expressions(elements, env) {
                Ok(elements) => Value::Array(Rc::new(elements)),
                Err(error) => error,
            },
            Expression::Index { left, index } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(index, env);
                if index.is_error() {
                    return index;
                }
                Self::eval_index(&left, &index)
            }
            Expression::HashLiteral(literal_pairs) => self.eval_hash_literal(literal_pairs, env),
        }
    }

    fn eval_identifier(name: &str, env: &Env) -> Value {
        if let Some(value) = env.borrow().get(name) {
            return value;
        }
        match Builtin::lookup(name) {
            Some(builtin) => Value::Builtin(builtin),
            None => Value::Error(format!("identifier not found: {name}")),
        }
    }

    /// Evaluates expressions left to right, short-circuiting on the first
    /// error.
    fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        env: &Env,
    ) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = self.eval_expression(expression, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn apply_function(&mut self, function: &Value, args: &[Value]) -> Value {
        match function {
            Value::Function(function) => {
                let env = Environment::new_enclosed(&function.env);
                // Positional binding: extra arguments are dropped, missing
                // parameters stay unbound.
                for (parameter, arg) in function.parameters.iter().zip(args) {
                    env.borrow_mut().set(parameter.clone(), arg.clone());
                }
                match self.eval_block(&function.body, &env) {
                    Value::Return(value) => *value,
                    value => value,
                }
            }
            Value::Builtin(builtin) => builtin.apply(args, self.out),
            other => Value::Error(format!("not a function: {}", other.kind())),
        }
    }

    fn eval_prefix(operator: PrefixOperator, right: &Value) -> Value {
        match operator {
            PrefixOperator::Bang => Value::Boolean(!right.is_truthy()),
            PrefixOperator::Minus => match right {
                Value::Integer(value) => Value::Integer(value.wrapping_neg()),
                other => Value::Error(format!("unknown operator: -{}", other.kind())),
            },
        }
    }

    fn eval_infix(operator: InfixOperator, left: &Value, right: &Value) -> Value {
        match (left, right) {
            (Value::Integer(left), Value::Integer(right)) => {
                Self::eval_integer_infix(operator, *left, *right)
            }
            (Value::String(left), Value::String(right)) => match operator {
                InfixOperator::Plus => {
                    Value::String(Rc::from(format!("{left}{right}").as_str()))
                }
                _ => Value::Error(format!("unknown operator: STRING {operator} STRING")),
            },
            (left, right) => match operator {
                InfixOperator::Eq => Value::Boolean(left == right),
                InfixOperator::NotEq => Value::Boolean(left != right),
                _ if left.kind() != right.kind() => Value::Error(format!(
                    "type mismatch: {} {operator} {}",
                    left.kind(),
                    right.kind()
                )),
                _ => Value::Error(format!(
                    "unknown operator: {} {operator} {}",
                    left.kind(),
                    right.kind()
                )),
            },
        }
    }

    fn eval_integer_infix(operator: InfixOperator, left: i64, right: i64) -> Value {
        match operator {
            InfixOperator::Plus => Value::Integer(left.wrapping_add(right)),
            InfixOperator::Minus => Value::Integer(left.wrapping_sub(right)),
            InfixOperator::Star => Value::Integer(left.wrapping_mul(right)),
            InfixOperator::Slash => {
                if right == 0 {
                    Value::Error("division by zero".to_owned())
                } else {
                    // i64 division truncates toward zero.
                    Value::Integer(left.wrapping_div(right))
                }
            }
            InfixOperator::Less => Value::Boolean(left < right),
            InfixOperator::Greater => Value::Boolean(left > right),
            InfixOperator::Eq => Value::Boolean(left == right),
            InfixOperator::NotEq => Value::Boolean(left != right),
        }
    }

    fn eval_index(left: &Value, index: &Value) -> Value {
        match (left, index) {
            (Value::Array(elements), Value::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| elements.get(i).cloned())
                .unwrap_or(Value::Null),
            (Value::Hash(pairs), key) => {
                let Some(hash_key) = key.hash_key() else {
                    return Value::Error(format!("unusable as hash key: {}", key.kind()));
                };
                match pairs.get(&hash_key) {
                    // Digest collisions resolve to a miss, never to a
                    // foreign key's value.
                    Some(pair) if pair.key == *key => pair.value.clone(),
                    _ => Value::Null,
                }
            }
            (other, _) => Value::Error(format!("index operator not supported: {}", other.kind())),
        }
    }

    fn eval_hash_literal(
        &mut self,
        literal_pairs: &[(Expression, Expression)],
        env: &Env,
    ) -> Value {
        let mut pairs = HashPairs::new();
        for (key_expression, value_expression) in literal_pairs {
            let key = self.eval_expression(key_expression, env);
            if key.is_error() {
                return key;
            }
            let Some(hash_key) = key.hash_key() else {
                return Value::Error(format!("unusable as hash key: {}", key.kind()));
            };
            let value = self.eval_expression(value_expression, env);
            if value.is_error() {
                return value;
            }
            pairs.insert(hash_key, HashPair { key, value });
        }
        Value::Hash(Rc::new(pairs))
    }
}
