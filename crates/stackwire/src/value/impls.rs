//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::collections::HashSet;
use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value from text or raw bytes
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        Value::String(Arc::from(s.as_ref()))
    }

    /// Create a table value
    pub fn table(t: Table) -> Self {
        Value::Table(TableRef::new(t))
    }

    /// Create a sequence table keyed `1..=n`
    pub fn sequence(items: Vec<Value>) -> Self {
        Value::table(Table::from_sequence(items))
    }

    /// Create a native function value
    pub fn function(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    ) -> Self {
        Value::Function(NativeFn::new(name, func))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════
    /// Check if value is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Name of the value's kind, as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Handle(_) => "lightuserdata",
            Value::Function(_) => "function",
            Value::Coroutine(_) => "thread",
            Value::Userdata(_) => "userdata",
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════
    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(&s[..]),
            _ => None,
        }
    }

    /// Extract string slice, if the bytes are UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Extract table reference
    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Extract opaque handle
    pub fn as_handle(&self) -> Option<OpaqueHandle> {
        match self {
            Value::Handle(h) => Some(*h),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

/// Numbers compare bitwise so a round trip can be checked exactly.
/// Tables compare structurally, independent of iteration order, using an
/// explicit work-stack so nesting depth does not matter. A pair of tables
/// already under comparison is assumed equal, so self-referential tables
/// compare without looping.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let mut work = vec![(self.clone(), other.clone())];
        let mut seen = HashSet::new();

        while let Some((a, b)) = work.pop() {
            let (a, b) = match (&a, &b) {
                (Value::Table(a), Value::Table(b)) => (a, b),
                _ => {
                    if !shallow_eq(&a, &b) {
                        return false;
                    }
                    continue;
                }
            };
            if a.ptr_eq(b) || !seen.insert((a.id(), b.id())) {
                continue;
            }
            if a.len() != b.len() {
                return false;
            }
            for (key, left) in a.pairs() {
                let Some(right) = b.get(&key) else {
                    return false;
                };
                work.push((left, right));
            }
        }

        true
    }
}

/// Equality for everything but table contents.
fn shallow_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Handle(a), Value::Handle(b)) => a == b,
        (Value::Table(a), Value::Table(b)) => a.ptr_eq(b),

        // Host-only kinds are equal if they are the same object
        (Value::Function(a), Value::Function(b)) => a.identity() == b.identity(),
        (Value::Coroutine(a), Value::Coroutine(b)) => a.identity() == b.identity(),
        (Value::Userdata(a), Value::Userdata(b)) => a.identity() == b.identity(),

        // Different types are never equal
        _ => false,
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::string(b)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::table(t)
    }
}

impl From<TableRef> for Value {
    fn from(t: TableRef) -> Self {
        Value::Table(t)
    }
}

impl From<OpaqueHandle> for Value {
    fn from(h: OpaqueHandle) -> Self {
        Value::Handle(h)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}
