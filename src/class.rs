//! Classes and their instances.
//!
//! A class has an ordered list of ancestors. Member lookup is
//! left‑to‑right depth‑first: a class's own fields, then its own methods,
//! then each ancestor in declaration order (recursively) before the next.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::callable::Function;
use crate::value::Value;

/// Result of a member lookup.
pub enum Member {
    Field(Value),
    Method(Rc<Function>),
}

pub struct Class {
    pub name: String,
    methods: HashMap<String, Rc<Function>>,
    ancestors: Vec<Rc<Class>>,

    /// Static fields set through the class object.
    fields: RefCell<HashMap<String, Value>>,
}

impl Class {
    pub fn new(
        name: impl Into<String>,
        methods: HashMap<String, Rc<Function>>,
        ancestors: Vec<Rc<Class>>,
    ) -> Self {
        Self {
            name: name.into(),
            methods,
            ancestors,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Nearest method called `name`, searching ancestors depth‑first.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.ancestors
            .iter()
            .find_map(|ancestor| ancestor.find_method(name))
    }

    /// Nearest field or method called `name`; fields win within one class.
    pub fn find_member(&self, name: &str) -> Option<Member> {
        if let Some(value) = self.fields.borrow().get(name) {
            debug!("'{}' found as static field of '{}'", name, self.name);
            return Some(Member::Field(value.clone()));
        }

        if let Some(method) = self.methods.get(name) {
            debug!("'{}' found as method of '{}'", name, self.name);
            return Some(Member::Method(Rc::clone(method)));
        }

        self.ancestors
            .iter()
            .find_map(|ancestor| ancestor.find_member(name))
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }

    /// Empty the static field table, returning the values.
    pub fn take_fields(&self) -> Vec<Value> {
        self.fields.borrow_mut().drain().map(|(_, v)| v).collect()
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    /// Empty the field table, returning the values.
    pub fn take_fields(&mut self) -> Vec<Value> {
        self.fields.drain().map(|(_, v)| v).collect()
    }
}
