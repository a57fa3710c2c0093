//! Tree‑walking evaluator.
//!
//! Statements return a [`Flow`] telling the caller whether control left the
//! statement normally or through `break`, `continue` or `return`. Loops
//! consume `Break`/`Continue`, calls consume `Return`; anything that reaches
//! the top level is reported as a runtime error.
//!
//! Variable references the resolver annotated are read from the frame exactly
//! that many hops out; everything else is read from the global frame.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{ClassDecl, Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{Callable, Function};
use crate::class::{Class, Instance, Member};
use crate::containers::{Map, MapKey, Tuple};
use crate::environment::{self, EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::natives;
use crate::reclaim::Reclaimer;
use crate::token::{Token, TokenType};
use crate::value::{format_number, Value};

/// How control left a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Break(Token),
    Continue(Token),
    Return(Token, Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
    input: Box<dyn BufRead>,
    reclaimer: Reclaimer,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter wired to the process's stdout and stdin.
    pub fn new() -> Self {
        // One‑byte buffer: lines not consumed by `input` stay in the
        // process‑wide stdin buffer for the REPL to read.
        let stdin = BufReader::with_capacity(1, io::stdin());

        Self::with_io(Box::new(io::stdout()), Box::new(stdin))
    }

    /// Interpreter writing program output to `out` and reading `input()`
    /// lines from `input`.
    pub fn with_io(out: Box<dyn Write>, input: Box<dyn BufRead>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        for (name, native) in natives::natives() {
            debug!("Defining native function '{}'", name);
            globals.borrow_mut().define(name, Some(native));
        }

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
            input,
            reclaimer: Reclaimer::new(),
        }
    }

    // ───────────────────────── resolver hooks ─────────────────────────

    /// Record that the reference `id` binds `depth` frames out.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("note_local {:?} -> {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Record that the reference `id` binds in the global frame.
    pub fn note_global(&mut self, id: ExprId) {
        self.locals.remove(&id);
    }

    /// Hop count recorded for `id`, if it was resolved as a local.
    pub fn local_depth(&self, id: ExprId) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    /// Registered runtime objects (captured frames, classes, instances)
    /// still alive.
    pub fn live_objects(&self) -> usize {
        self.reclaimer.live()
    }

    // ─────────────────────────── entry points ──────────────────────────

    /// Execute a program. Stops at the first runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                Flow::Break(keyword) => {
                    return Err(LoxError::runtime(&keyword, "break statement outside of loop."))
                }
                Flow::Continue(keyword) => {
                    return Err(LoxError::runtime(
                        &keyword,
                        "continue statement outside of loop.",
                    ))
                }
                Flow::Return(keyword, _) => {
                    return Err(LoxError::runtime(
                        &keyword,
                        "return statement outside of function.",
                    ))
                }
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Execute a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                debug!("Evaluating expression statement");
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.write_line(&value.to_string())?;
                info!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                debug!("Defining variable '{}'", name.lexeme);
                let value = match initializer {
                    Some(expr) => Some(self.evaluate(expr)?),
                    None => None,
                };
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                debug!("Entering block with {} statements", statements.len());
                let env = Environment::child_of(&self.environment);
                self.execute_block(statements, env)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break(_) => break,
                        Flow::Normal | Flow::Continue(_) => {}
                        flow @ Flow::Return(..) => return Ok(flow),
                    }
                }
                info!("Exited while loop");
                Ok(Flow::Normal)
            }

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => {
                let env = Environment::child_of(&self.environment);
                let previous = std::mem::replace(&mut self.environment, env);
                let result = self.execute_for(
                    initializer.as_deref(),
                    condition.as_ref(),
                    increment.as_ref(),
                    body,
                );
                self.environment = previous;
                result
            }

            Stmt::Break(keyword) => Ok(Flow::Break(keyword.clone())),

            Stmt::Continue(keyword) => Ok(Flow::Continue(keyword.clone())),

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);
                let function = self.make_function(Rc::clone(decl));
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Some(Value::Function(Rc::new(function))));
                Ok(Flow::Normal)
            }

            Stmt::Return { keyword, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(keyword.clone(), value))
            }

            Stmt::Class(decl) => {
                self.execute_class(decl)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` in `environment`, restoring the current frame
    /// afterwards even when a statement fails.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn execute_for(
        &mut self,
        initializer: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Stmt,
    ) -> Result<Flow> {
        debug!("Entering for loop");

        if let Some(init) = initializer {
            self.execute(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute(body)? {
                Flow::Break(_) => break,
                // The increment still runs after `continue`.
                Flow::Normal | Flow::Continue(_) => {}
                flow @ Flow::Return(..) => return Ok(flow),
            }

            if let Some(increment) = increment {
                self.evaluate(increment)?;
            }
        }

        info!("Exited for loop");
        Ok(Flow::Normal)
    }

    fn execute_class(&mut self, decl: &ClassDecl) -> Result<()> {
        debug!("Declaring class '{}'", decl.name.lexeme);

        let mut ancestors: Vec<Rc<Class>> = Vec::with_capacity(decl.ancestors.len());
        for ancestor in &decl.ancestors {
            match self.evaluate(ancestor)? {
                Value::Class(class) => ancestors.push(class),
                _ => {
                    let token = match ancestor {
                        Expr::Variable { name, .. } => name,
                        _ => &decl.name,
                    };
                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            }
        }

        self.environment
            .borrow_mut()
            .define(&decl.name.lexeme, None);

        let previous = Rc::clone(&self.environment);

        // Method closures see `super` one frame out from `this`.
        if !ancestors.is_empty() {
            let ancestry = Class::new("super", HashMap::new(), ancestors.clone());
            let env = Environment::child_of(&self.environment);
            env.borrow_mut()
                .define("super", Some(Value::Class(Rc::new(ancestry))));
            self.environment = env;
        }

        let mut methods: HashMap<String, Rc<Function>> = HashMap::new();
        for method in &decl.methods {
            let function = self.make_function(Rc::clone(method));
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        self.environment = previous;

        let class = Rc::new(Class::new(decl.name.lexeme.clone(), methods, ancestors));
        self.reclaimer.track_class(&class);

        self.environment
            .borrow_mut()
            .define(&decl.name.lexeme, Some(Value::Class(class)));

        info!("Class '{}' defined", decl.name.lexeme);
        Ok(())
    }

    // ─────────────────────────── expressions ───────────────────────────

    /// Evaluate an expression to a value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        let value = match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            },

            Expr::Grouping(inner) => self.evaluate(inner)?,

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right)?,

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right)?,

            Expr::Ternary {
                condition,
                operator,
                then_branch,
                else_branch,
            } => {
                let condition = self.evaluate(condition)?;
                check_truthy_operand(operator, &condition)?;

                if condition.is_truthy() {
                    self.evaluate(then_branch)?
                } else {
                    self.evaluate(else_branch)?
                }
            }

            Expr::Variable { id, name } => self.look_up(name, *id)?,

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                self.assign(name, *id, value.clone())?;
                value
            }

            Expr::Prefix { id, operator, name } => {
                let updated = self.step(operator, name, *id)?.1;
                Value::Number(updated)
            }

            Expr::Postfix { id, name, operator } => {
                let original = self.step(operator, name, *id)?.0;
                Value::Number(original)
            }

            Expr::Index {
                bracket,
                object,
                start,
                end,
            } => {
                let object = self.evaluate(object)?;
                let start = self.evaluate(start)?;
                let end = match end {
                    Some(end) => Some(self.evaluate(end)?),
                    None => None,
                };

                index_value(bracket, &object, &start, end.as_ref())?
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                debug!("Evaluating function call");
                let callee = self.evaluate(callee)?;

                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call_value(&callee, values, paren)?
            }

            Expr::Lambda(decl) => {
                Value::Function(Rc::new(self.make_function(Rc::clone(decl))))
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                self.get_property(object, name)?
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.borrow_mut().set(&name.lexeme, value.clone());
                        value
                    }
                    Value::Class(class) => {
                        let value = self.evaluate(value)?;
                        class.set_field(&name.lexeme, value.clone());
                        value
                    }
                    _ => return Err(LoxError::runtime(name, "Only instances have fields.")),
                }
            }

            Expr::This { id, keyword } => self.look_up(keyword, *id)?,

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method)?,

            Expr::List { elements, .. } => {
                let mut tuple = Tuple::new();
                for element in elements {
                    tuple.push(self.evaluate(element)?);
                }
                Value::Tuple(Rc::new(RefCell::new(tuple)))
            }

            Expr::Map { brace, entries } => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = self.evaluate(key)?;
                    let key = MapKey::from_value(&key).ok_or_else(|| {
                        LoxError::runtime(
                            brace,
                            "Map keys must be nil, booleans, numbers, or strings.",
                        )
                    })?;
                    let value = self.evaluate(value)?;
                    map.put(key, value);
                }
                Value::Map(Rc::new(RefCell::new(map)))
            }
        };

        Ok(value)
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        debug!("Evaluating unary operation: {}", operator.lexeme);

        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => {
                check_truthy_operand(operator, &right)?;
                Ok(Value::Bool(!right.is_truthy()))
            }
            TokenType::MINUS => Ok(Value::Number(-number_operand(operator, &right)?)),
            TokenType::BITWISE_NOT => {
                let n = number_operand(operator, &right)?;
                Ok(Value::Number(!(n as i32) as f64))
            }
            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        debug!("Evaluating binary operation: {}", operator.lexeme);

        // Short‑circuit forms yield a boolean, not an operand.
        match operator.token_type {
            TokenType::AND => {
                let result = self.evaluate(left)?.is_truthy() && self.evaluate(right)?.is_truthy();
                return Ok(Value::Bool(result));
            }
            TokenType::OR => {
                let result = self.evaluate(left)?.is_truthy() || self.evaluate(right)?.is_truthy();
                return Ok(Value::Bool(result));
            }
            TokenType::COMMA => {
                self.evaluate(left)?;
                return self.evaluate(right);
            }
            _ => {}
        }

        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        debug!("Left operand: {}, Right operand: {}", left, right);

        binary_op(operator, left, right)
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance = self
            .local_depth(id)
            .ok_or_else(|| LoxError::runtime(keyword, "Can't use 'super' outside of a class."))?;

        let ancestry = environment::get_at(&self.environment, distance, keyword)?;
        let this = Token::new(TokenType::THIS, "this", keyword.line);
        let receiver = environment::get_at(&self.environment, distance.saturating_sub(1), &this)?;

        let Value::Class(ancestry) = ancestry else {
            return Err(LoxError::runtime(keyword, "Superclass must be a class."));
        };

        match ancestry.find_member(&method.lexeme) {
            Some(Member::Field(value)) => Ok(value),
            Some(Member::Method(function)) => self.bind_method(&function, receiver, method),
            None => Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    fn get_property(&mut self, object: Value, name: &Token) -> Result<Value> {
        match object {
            Value::Instance(instance) => {
                if let Some(value) = instance.borrow().field(&name.lexeme) {
                    return Ok(value);
                }

                let class = Rc::clone(&instance.borrow().class);
                let receiver = Value::Instance(instance);

                match class.find_member(&name.lexeme) {
                    Some(Member::Field(value)) => Ok(value),
                    Some(Member::Method(method)) if method.is_static() => {
                        self.bind_method(&method, Value::Class(class), name)
                    }
                    Some(Member::Method(method)) => self.bind_method(&method, receiver, name),
                    None => Err(undefined_property(name, &receiver)),
                }
            }

            Value::Class(class) => match class.find_member(&name.lexeme) {
                Some(Member::Field(value)) => Ok(value),
                Some(Member::Method(method)) if method.is_static() => {
                    self.bind_method(&method, Value::Class(class), name)
                }
                Some(Member::Method(_)) => Err(LoxError::runtime(
                    name,
                    format!(
                        "Cannot access non-static method '{}' through class '{}'.",
                        name.lexeme, class.name
                    ),
                )),
                None => Err(undefined_property(name, &Value::Class(class))),
            },

            _ => Err(LoxError::runtime(name, "Only instances have properties.")),
        }
    }

    /// Bind `method` to `receiver`; getters run immediately.
    fn bind_method(&mut self, method: &Function, receiver: Value, name: &Token) -> Result<Value> {
        let bound = method.bind(receiver);

        if bound.is_getter() {
            debug!("Invoking getter '{}'", name.lexeme);
            return bound.call(self, Vec::new(), name);
        }

        Ok(Value::Function(Rc::new(bound)))
    }

    fn call_value(&mut self, callee: &Value, arguments: Vec<Value>, paren: &Token) -> Result<Value> {
        let callable: &dyn Callable = match callee {
            Value::NativeFunction(native) => native.as_ref(),
            Value::Function(function) => function.as_ref(),
            Value::Class(class) => class,
            _ => {
                return Err(LoxError::runtime(
                    paren,
                    "Can only call functions and classes.",
                ))
            }
        };

        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        callable.call(self, arguments, paren)
    }

    /// Apply `++`/`--` to the variable `name`; yields (old, new).
    fn step(&mut self, operator: &Token, name: &Token, id: ExprId) -> Result<(f64, f64)> {
        let original = number_operand(operator, &self.look_up(name, id)?)?;

        let updated = match operator.token_type {
            TokenType::PLUS_PLUS => original + 1.0,
            _ => original - 1.0,
        };

        self.assign(name, id, Value::Number(updated))?;

        Ok((original, updated))
    }

    // ───────────────────────────── helpers ─────────────────────────────

    fn look_up(&self, name: &Token, id: ExprId) -> Result<Value> {
        match self.locals.get(&id) {
            Some(distance) => environment::get_at(&self.environment, *distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn assign(&mut self, name: &Token, id: ExprId, value: Value) -> Result<()> {
        match self.locals.get(&id) {
            Some(distance) => environment::assign_at(&self.environment, *distance, name, value),
            None => self.globals.borrow_mut().update(name, value),
        }
    }

    /// Close `decl` over the current frame.
    fn make_function(&mut self, decl: Rc<FunctionDecl>) -> Function {
        self.reclaimer.track_frame(&self.environment);

        Function::new(decl, Rc::clone(&self.environment))
    }

    /// Allocate an instance and register it for reclamation.
    pub(crate) fn new_instance(&mut self, instance: Instance) -> Rc<RefCell<Instance>> {
        let instance = Rc::new(RefCell::new(instance));
        self.reclaimer.track_instance(&instance);
        instance
    }

    pub(crate) fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub(crate) fn write_str(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub(crate) fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}

// ───────────────────────── operator semantics ─────────────────────────

fn binary_op(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::PLUS => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::String(a), Value::Number(b)) => Ok(Value::String(a + &format_number(b))),
            (Value::Number(a), Value::String(b)) => Ok(Value::String(format_number(a) + &b)),
            _ => Err(LoxError::runtime(
                operator,
                "'+' operator only supports number and/or string types.",
            )),
        },

        TokenType::MINUS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a - b))
        }

        TokenType::STAR => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a * b))
        }

        TokenType::STAR_STAR => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a.powf(b)))
        }

        TokenType::SLASH => {
            let (a, b) = number_operands(operator, &left, &right)?;
            check_divisor(operator, b)?;
            Ok(Value::Number(a / b))
        }

        TokenType::MODULO => {
            let (a, b) = number_operands(operator, &left, &right)?;
            check_divisor(operator, b)?;
            Ok(Value::Number(a % b))
        }

        TokenType::BITWISE_AND
        | TokenType::BITWISE_OR
        | TokenType::BITWISE_XOR
        | TokenType::BITSHIFT_LEFT
        | TokenType::BITSHIFT_RIGHT => {
            let (a, b) = number_operands(operator, &left, &right)?;
            let (a, b) = (a as i32, b as i32);

            let result = match operator.token_type {
                TokenType::BITWISE_AND => a & b,
                TokenType::BITWISE_OR => a | b,
                TokenType::BITWISE_XOR => a ^ b,
                TokenType::BITSHIFT_LEFT => a.wrapping_shl(b as u32),
                _ => a.wrapping_shr(b as u32),
            };

            Ok(Value::Number(result as f64))
        }

        TokenType::EQUAL_EQUAL => {
            check_truthy_operands(operator, &left, &right)?;
            Ok(Value::Bool(left == right))
        }

        TokenType::BANG_EQUAL => {
            check_truthy_operands(operator, &left, &right)?;
            Ok(Value::Bool(left != right))
        }

        TokenType::GREATER => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a > b))
        }

        TokenType::GREATER_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a >= b))
        }

        TokenType::LESS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a < b))
        }

        TokenType::LESS_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a <= b))
        }

        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}

fn number_operand(operator: &Token, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}

fn check_divisor(operator: &Token, divisor: f64) -> Result<()> {
    if divisor == 0.0 {
        return Err(LoxError::runtime(operator, "Division by 0 not allowed."));
    }

    Ok(())
}

fn check_truthy_operand(operator: &Token, value: &Value) -> Result<()> {
    if value.is_truthy_type() {
        return Ok(());
    }

    Err(LoxError::runtime(operator, "Operand must be a truthy type."))
}

/// Equality needs both sides of one kind, or `nil` against a truthy type.
fn check_truthy_operands(operator: &Token, left: &Value, right: &Value) -> Result<()> {
    let compatible = match (left, right) {
        (Value::Bool(_), Value::Bool(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::String(_), Value::String(_))
        | (Value::Instance(_), Value::Instance(_))
        | (Value::Function(_), Value::Function(_))
        | (Value::Class(_), Value::Class(_)) => true,
        (other, Value::Nil) | (Value::Nil, other) => other.is_truthy_type(),
        _ => false,
    };

    if compatible {
        return Ok(());
    }

    Err(LoxError::runtime(
        operator,
        "Operands must be matching truthy types.",
    ))
}

fn undefined_property(name: &Token, receiver: &Value) -> LoxError {
    LoxError::runtime(
        name,
        format!("Undefined property '{}' on {}.", name.lexeme, receiver),
    )
}

// ────────────────────────────── indexing ──────────────────────────────

/// `s[i]` yields one character; `s[i:j]` a substring. Negative indices wrap,
/// indices past the end clamp to the length.
fn index_value(bracket: &Token, object: &Value, start: &Value, end: Option<&Value>) -> Result<Value> {
    let Value::String(s) = object else {
        return Err(LoxError::runtime(bracket, "Can only index strings."));
    };

    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();

    let start = string_index(bracket, start, len)?;

    match end {
        Some(end) => {
            let end = string_index(bracket, end, len)?;

            if start > end {
                return Err(LoxError::runtime(
                    bracket,
                    "Start index cannot be greater than end index.",
                ));
            }

            Ok(Value::String(chars[start..end].iter().collect()))
        }
        None => match chars.get(start) {
            Some(c) => Ok(Value::String(c.to_string())),
            None => Err(LoxError::runtime(bracket, "String index out of range.")),
        },
    }
}

fn string_index(bracket: &Token, index: &Value, len: usize) -> Result<usize> {
    let Value::Number(n) = index else {
        return Err(LoxError::runtime(bracket, "String indices must be integers."));
    };

    let index = *n as i64;
    let len_i = len as i64;

    let index = if index < 0 {
        if len_i == 0 {
            0
        } else {
            index.rem_euclid(len_i)
        }
    } else {
        index.min(len_i)
    };

    Ok(index as usize)
}
