//! One interpreter plus the glue that feeds it source text.
//!
//! A [`Session`] runs the whole pipeline (scan → parse → resolve → interpret)
//! on each input it is given, keeping global state between inputs. Expression
//! ids keep counting across inputs, so the interpreter's distance table never
//! confuses a node from one input with a node from another.

use log::{debug, info};
use thiserror::Error;

use crate::ast::Stmt;
use crate::error::{Diagnostic, LoxError};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;
use crate::value::Value;

/// Why an input did not run to completion.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Lexical, parse or resolve errors; nothing was executed.
    #[error("{}", join(.0))]
    Static(Vec<LoxError>),

    /// Execution started and stopped at this error.
    #[error("{0}")]
    Runtime(LoxError),
}

impl SessionError {
    /// Process exit status for a batch run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::Static(_) => 65,
            SessionError::Runtime(_) => 70,
        }
    }

    pub fn errors(&self) -> &[LoxError] {
        match self {
            SessionError::Static(errors) => errors,
            SessionError::Runtime(error) => std::slice::from_ref(error),
        }
    }
}

fn join(errors: &[LoxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct Session {
    interpreter: Interpreter,
    next_id: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session over an interpreter wired to stdout/stdin.
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
        }
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Scan and parse `source` as a program without running it.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Stmt>, SessionError> {
        let (tokens, mut errors) = scanner::tokenize(source.as_bytes());

        let mut parser = Parser::with_id_base(tokens, self.next_id);
        let parsed = parser.parse();
        self.next_id = parser.next_id();

        match parsed {
            Ok(statements) if errors.is_empty() => Ok(statements),
            Ok(_) => Err(SessionError::Static(errors)),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                Err(SessionError::Static(errors))
            }
        }
    }

    /// Run `source` as a program. Yields the resolver's warnings on success.
    pub fn run(&mut self, source: &str) -> Result<Vec<Diagnostic>, SessionError> {
        info!("Session run over {} byte(s)", source.len());

        let statements = self.parse(source)?;

        let mut resolver = Resolver::new(&mut self.interpreter);
        let resolved = resolver.resolve(&statements);
        let warnings = resolver.take_warnings();
        resolved.map_err(SessionError::Static)?;

        debug!("Resolved {} statement(s)", statements.len());

        self.interpreter
            .interpret(&statements)
            .map_err(SessionError::Runtime)?;

        Ok(warnings)
    }

    /// Evaluate `source` as one or more bare expressions and return their
    /// values in order.
    pub fn evaluate(&mut self, source: &str) -> Result<Vec<Value>, SessionError> {
        info!("Session evaluate over {} byte(s)", source.len());

        let (tokens, mut errors) = scanner::tokenize(source.as_bytes());

        let mut parser = Parser::with_id_base(tokens, self.next_id);
        let parsed = parser.parse_expressions();
        self.next_id = parser.next_id();

        let expressions = match parsed {
            Ok(expressions) => expressions,
            Err(parse_errors) => {
                errors.extend(parse_errors);
                Vec::new()
            }
        };

        if !errors.is_empty() {
            return Err(SessionError::Static(errors));
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        for expr in &expressions {
            if let Err(resolve_errors) = resolver.resolve_expression(expr) {
                errors.extend(resolve_errors);
            }
        }

        if !errors.is_empty() {
            return Err(SessionError::Static(errors));
        }

        let mut values = Vec::with_capacity(expressions.len());
        for expr in &expressions {
            let value = self
                .interpreter
                .evaluate(expr)
                .map_err(SessionError::Runtime)?;
            values.push(value);
        }

        Ok(values)
    }
}

/// A REPL line ending in neither `;` nor `}` is an expression to echo.
pub fn is_bare_expression(line: &str) -> bool {
    let line = line.trim_end();

    !line.is_empty() && !line.ends_with(';') && !line.ends_with('}')
}
