//! Everything that can appear to the left of `(...)`.

use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{FunctionDecl, FunctionKind, Stmt};
use crate::class::{Class, Instance};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::{Token, TokenType};
use crate::value::Value;

pub trait Callable {
    /// Number of arguments the call site must supply.
    fn arity(&self) -> usize;

    /// Invoke with already‑evaluated arguments. `paren` is the call's closing
    /// parenthesis, used to anchor runtime errors.
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>, paren: &Token)
        -> Result<Value>;
}

// ───────────────────────── native functions ─────────────────────────

/// Host function signature. Natives get the interpreter so they can reach
/// its output and input streams.
pub type NativeFn = fn(&mut Interpreter, &[Value]) -> std::result::Result<Value, String>;

pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        let result = (self.func)(interpreter, &arguments)
            .map_err(|message| LoxError::runtime(paren, message))?;

        info!("Native function '{}' returned: {}", self.name, result);

        Ok(result)
    }
}

// ────────────────────────── user functions ──────────────────────────

/// A function value: a declaration plus the frame it closed over.
pub struct Function {
    pub decl: Rc<FunctionDecl>,
    pub closure: EnvRef,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(decl: Rc<FunctionDecl>, closure: EnvRef) -> Self {
        let is_initializer = decl.is_initializer();

        Self {
            decl,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name.lexeme
    }

    pub fn is_static(&self) -> bool {
        self.decl.is_static
    }

    pub fn is_getter(&self) -> bool {
        self.decl.is_getter
    }

    /// Copy of this function whose closure defines `this` as `receiver`.
    pub fn bind(&self, receiver: Value) -> Function {
        let env = Environment::child_of(&self.closure);
        env.borrow_mut().define("this", Some(receiver));

        Function {
            decl: Rc::clone(&self.decl),
            closure: env,
            is_initializer: self.is_initializer,
        }
    }

    fn receiver(&self, line: usize) -> Result<Value> {
        let this = Token::new(TokenType::THIS, "this", line);

        self.closure.borrow().get(&this)
    }

    fn body(&self) -> &[Stmt] {
        &self.decl.body
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.decl.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let env = Environment::child_of(&self.closure);
        {
            let mut frame = env.borrow_mut();
            for (param, argument) in self.decl.params.iter().zip(arguments) {
                debug!("Binding parameter '{}' to {}", param.lexeme, argument);
                frame.define(&param.lexeme, Some(argument));
            }
        }

        let flow = interpreter.execute_block(self.body(), env)?;

        let value = match flow {
            Flow::Normal | Flow::Return(_, _) if self.is_initializer => self.receiver(paren.line)?,
            Flow::Normal => Value::Nil,
            Flow::Return(_, value) => value,
            Flow::Break(keyword) => {
                return Err(LoxError::runtime(&keyword, "break statement outside of loop."))
            }
            Flow::Continue(keyword) => {
                return Err(LoxError::runtime(
                    &keyword,
                    "continue statement outside of loop.",
                ))
            }
        };

        info!("Function '{}' returned: {}", self.name(), value);

        Ok(value)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decl.kind {
            FunctionKind::Lambda => write!(f, "<fn: anonymous>"),
            _ => write!(f, "<fn: {}>", self.name()),
        }
    }
}

// ───────────────────────────── classes ─────────────────────────────

/// Calling a class constructs an instance and runs the nearest `init`.
impl Callable for Rc<Class> {
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Instantiating class '{}'", self.name);

        let instance = interpreter.new_instance(Instance::new(Rc::clone(self)));
        let receiver = Value::Instance(instance);

        if let Some(init) = self.find_method("init") {
            init.bind(receiver.clone())
                .call(interpreter, arguments, paren)?;
        }

        Ok(receiver)
    }
}
