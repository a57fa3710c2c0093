//! Runtime values.
//!
//! Numbers, strings, booleans and `nil` compare by value. Callables,
//! instances and containers are reference types and compare by identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::{Function, NativeFunction};
use crate::class::{Class, Instance};
use crate::containers::{Map, Tuple};

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    NativeFunction(Rc<NativeFunction>),
    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<RefCell<Instance>>),
    Tuple(Rc<RefCell<Tuple>>),
    Map(Rc<RefCell<Map>>),
}

impl Value {
    /// Conditional truthiness: `nil`, `false`, `0` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Whether the value may appear as an operand of `!`, `?:`, `==` or `!=`.
    pub fn is_truthy_type(&self) -> bool {
        matches!(
            self,
            Value::Nil
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)
                | Value::Function(_)
                | Value::Class(_)
                | Value::Instance(_)
        )
    }

    /// Display form with strings single‑quoted, as echoed by the REPL and
    /// nested inside containers.
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }
}

/// Canonical number text: integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }

    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        return buf.format(n as i64).to_string();
    }

    n.to_string()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction(native) => write!(f, "<native fn: {}>", native.name),

            Value::Function(function) => write!(f, "{}", function),

            Value::Class(class) => write!(f, "<class: {}>", class.name),

            Value::Instance(instance) => write!(f, "<{} instance>", instance.borrow().class.name),

            Value::Tuple(tuple) => write!(f, "{}", tuple.borrow()),

            Value::Map(map) => write!(f, "{}", map.borrow()),
        }
    }
}

// Reference types can form cycles, so Debug never descends into them.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            other => write!(f, "{}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_canonically() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn zero_and_empty_string_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());

        assert!(Value::Number(-1.0).is_truthy());
        assert!(Value::String("0".into()).is_truthy());
    }

    #[test]
    fn repr_quotes_only_strings() {
        assert_eq!(Value::String("hi".into()).repr(), "'hi'");
        assert_eq!(Value::Number(4.0).repr(), "4");
        assert_eq!(Value::Nil.repr(), "nil");
    }

    #[test]
    fn containers_compare_by_identity() {
        let a = Value::Tuple(Rc::new(RefCell::new(Tuple::new())));
        let b = Value::Tuple(Rc::new(RefCell::new(Tuple::new())));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
