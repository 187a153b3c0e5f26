//! Hashable wrapper for Value to enable use as table keys

use std::hash::{Hash, Hasher};

use thiserror::Error;

use super::Value;

/// Why a value was refused as a table key.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidKey {
    /// `nil` cannot index a table
    #[error("table index is nil")]
    Nil,

    /// NaN is never equal to itself, so it cannot index a table
    #[error("table index is NaN")]
    NaN,
}

/// A wrapper for Value that implements Hash and Eq.
///
/// Scalars and strings compare by value. Tables and the host-only kinds
/// compare by identity. `-0.0` is stored as `0.0` so both find the same slot.
#[derive(Debug, Clone)]
pub struct TableKey(Value);

impl TableKey {
    /// Wrap a value, refusing `nil` and NaN
    pub fn new(value: Value) -> Result<Self, InvalidKey> {
        match value {
            Value::Nil => Err(InvalidKey::Nil),
            Value::Number(n) if n.is_nan() => Err(InvalidKey::NaN),
            Value::Number(n) if n == 0.0 => Ok(TableKey(Value::Number(0.0))),
            other => Ok(TableKey(other)),
        }
    }

    /// Borrow the wrapped value
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the key value
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);

        match &self.0 {
            Value::Nil => {}
            Value::Boolean(b) => b.hash(state),
            Value::Number(n) => n.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Handle(h) => h.hash(state),
            Value::Table(t) => t.id().hash(state),
            Value::Function(f) => f.identity().hash(state),
            Value::Coroutine(c) => c.identity().hash(state),
            Value::Userdata(u) => u.identity().hash(state),
        }
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.identity() == b.identity(),
            (Value::Coroutine(a), Value::Coroutine(b)) => a.identity() == b.identity(),
            (Value::Userdata(a), Value::Userdata(b)) => a.identity() == b.identity(),
            _ => false,
        }
    }
}

impl Eq for TableKey {}
