//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! failure modes into one of the variants defined here. Static stages report
//! a [`Diagnostic`] (line, location, severity, message); the runtime reports a
//! message plus the line of the offending token.
//!
//! The module **does not** print diagnostics itself.

use std::fmt;
use std::io;

use log::info;
use thiserror::Error;

use crate::token::{Token, TokenType};

/// How serious a reported condition is. Only errors block execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

/// A single reported condition from the lexer, parser or resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// 1‑based line where the condition was detected.
    pub line: usize,

    /// `""`, `" at end"` or `" at 'lexeme'"`.
    pub location: String,

    pub message: String,
}

impl Diagnostic {
    /// Diagnostic anchored at a line only (lexical errors).
    pub fn at_line<S: Into<String>>(severity: Severity, line: usize, message: S) -> Self {
        Self {
            severity,
            line,
            location: String::new(),
            message: message.into(),
        }
    }

    /// Diagnostic anchored at a token; the lexeme is quoted in the location.
    pub fn at_token<S: Into<String>>(severity: Severity, token: &Token, message: S) -> Self {
        let location = if token.token_type == TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        Self {
            severity,
            line: token.line,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] {}{}: {}",
            self.line, self.severity, self.location, self.message
        )
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error.
    #[error("{0}")]
    Lex(Diagnostic),

    /// Syntactic (parser) error.
    #[error("{0}")]
    Parse(Diagnostic),

    /// Static‑analysis failure (redeclaration, misuse of `this`, …).
    #[error("{0}")]
    Resolve(Diagnostic),

    /// Runtime evaluation error, carrying the line of the offending token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let diagnostic = Diagnostic::at_line(Severity::Error, line, msg);

        info!("Creating Lex error: {}", diagnostic);

        LoxError::Lex(diagnostic)
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let diagnostic = Diagnostic::at_token(Severity::Error, token, msg);

        info!("Creating Parse error: {}", diagnostic);

        LoxError::Parse(diagnostic)
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let diagnostic = Diagnostic::at_token(Severity::Error, token, msg);

        info!("Creating Resolve error: {}", diagnostic);

        LoxError::Resolve(diagnostic)
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// The static diagnostic behind this error, if it came from a static stage.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            LoxError::Lex(d) | LoxError::Parse(d) | LoxError::Resolve(d) => Some(d),
            _ => None,
        }
    }

    /// Source line this error refers to, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex(d) | LoxError::Parse(d) | LoxError::Resolve(d) => Some(d.line),
            LoxError::Runtime { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
