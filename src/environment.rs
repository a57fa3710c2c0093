//! Lexical scope frames.
//!
//! A frame maps names to bindings and links to its enclosing frame. Frames are
//! shared (`Rc<RefCell<_>>`): a closure keeps its defining frame alive, and
//! mutation through one holder is visible through every other.
//!
//! A binding holds `None` until it is initialized; reading it before then is
//! an error distinct from reading a name that was never declared.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to a frame.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Option<Value>>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a fresh frame chained to `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Insert or overwrite `name` in this frame. `None` declares the name
    /// without initializing it.
    pub fn define(&mut self, name: &str, value: Option<Value>) {
        debug!("define '{}' (initialized: {})", name, value.is_some());

        self.values.insert(name.to_string(), value);
    }

    /// Whether `name` is bound in this frame (not its ancestors).
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Look `name` up through the enclosing chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        match self.values.get(&name.lexeme) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(uninitialized(name)),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get(name),
                None => Err(undefined(name)),
            },
        }
    }

    /// Assign to an existing binding found through the enclosing chain.
    pub fn update(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = Some(value);
            return Ok(());
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().update(name, value),
            None => Err(undefined(name)),
        }
    }

    /// Drop every binding and the link to the enclosing frame, returning the
    /// values so the caller can release them outside the borrow.
    pub fn clear(&mut self) -> Vec<Value> {
        self.enclosing = None;

        self.values.drain().filter_map(|(_, v)| v).collect()
    }
}

/// Frame exactly `distance` hops outward from `env`.
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current = Rc::clone(env);

    for _ in 0..distance {
        let next = current.borrow().enclosing()?;
        current = next;
    }

    Some(current)
}

/// Read `name` from the frame `distance` hops out, without searching.
pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
    let frame = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let frame = frame.borrow();

    match frame.values.get(&name.lexeme) {
        Some(Some(value)) => Ok(value.clone()),
        Some(None) => Err(uninitialized(name)),
        None => Err(undefined(name)),
    }
}

/// Overwrite `name` in the frame `distance` hops out, without searching.
pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
    let frame = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let mut frame = frame.borrow_mut();

    match frame.values.get_mut(&name.lexeme) {
        Some(slot) => {
            *slot = Some(value);
            Ok(())
        }
        None => Err(undefined(name)),
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

fn uninitialized(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Uninitialized variable '{}'.", name.lexeme))
}
