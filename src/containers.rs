//! Runtime container values: the ordered [`Tuple`] and the associative [`Map`].
//!
//! Both render with the same quoting rules: strings single‑quoted, numbers in
//! canonical form (`1`, not `1.0`).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::value::{format_number, Value};

// ───────────────────────────── Tuple ─────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Tuple {
    items: Vec<Value>,
}

impl Tuple {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// New tuple holding `self`'s items followed by `other`'s.
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut items = Vec::with_capacity(self.items.len() + other.items.len());
        items.extend(self.items.iter().cloned());
        items.extend(other.items.iter().cloned());

        Tuple { items }
    }

    /// Items in `start..end`, clamped to the tuple's bounds.
    pub fn slice(&self, start: usize, end: usize) -> Tuple {
        let end = end.min(self.items.len());
        let start = start.min(end);

        Tuple {
            items: self.items[start..end].to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Release every element, returning them to the caller.
    pub fn take(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.items)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Tuple {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "()");
        }

        write!(f, "( ")?;
        for (i, value) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value.repr())?;
        }
        write!(f, " )")
    }
}

// ────────────────────────────── Map ──────────────────────────────

/// Hashable subset of [`Value`] usable as a map key.
#[derive(Debug, Clone)]
pub enum MapKey {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl MapKey {
    /// Convert a runtime value into a key. Reference types are rejected.
    pub fn from_value(value: &Value) -> Option<MapKey> {
        match value {
            Value::Nil => Some(MapKey::Nil),
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            // -0 and 0 are the same key.
            Value::Number(n) if *n == 0.0 => Some(MapKey::Number(0.0)),
            Value::Number(n) => Some(MapKey::Number(*n)),
            Value::String(s) => Some(MapKey::Str(s.clone())),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            MapKey::Nil => 0,
            MapKey::Bool(_) => 1,
            MapKey::Number(_) => 2,
            MapKey::Str(_) => 3,
        }
    }
}

impl Ord for MapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MapKey::Bool(a), MapKey::Bool(b)) => a.cmp(b),
            (MapKey::Number(a), MapKey::Number(b)) => a.total_cmp(b),
            (MapKey::Str(a), MapKey::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for MapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MapKey {}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Nil => write!(f, "nil"),
            MapKey::Bool(b) => write!(f, "{}", b),
            MapKey::Number(n) => write!(f, "{}", format_number(*n)),
            MapKey::Str(s) => write!(f, "'{}'", s),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: BTreeMap<MapKey, Value>,
}

impl Map {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite; yields the stored value.
    pub fn put(&mut self, key: MapKey, value: Value) -> Value {
        self.entries.insert(key, value.clone());
        value
    }

    pub fn remove(&mut self, key: &MapKey) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &MapKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn contains_value(&self, value: &Value) -> bool {
        self.entries.values().any(|v| v == value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at position `index` in display order.
    pub fn get_at(&self, index: usize) -> Option<(&MapKey, &Value)> {
        self.entries.iter().nth(index)
    }

    /// Release every value, returning them to the caller.
    pub fn take(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "{{}}");
        }

        write!(f, "{{ ")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value.repr())?;
        }
        write!(f, " }}")
    }
}
