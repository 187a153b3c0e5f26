//! Tables: the only container kind

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use super::{InvalidKey, TableKey, Value};

/// An associative array of key/value pairs.
///
/// Uses IndexMap so iteration follows insertion order, which keeps the
/// encoding of a given table stable. Assigning `nil` removes the key, so a
/// table never holds a `nil` value.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: IndexMap<TableKey, Value>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence table keyed `1..=n`
    pub fn from_sequence(items: impl IntoIterator<Item = Value>) -> Self {
        let mut table = Self::new();
        for (i, item) in items.into_iter().enumerate() {
            // Numeric keys are always valid
            let _ = table.set(Value::Number((i + 1) as f64), item);
        }
        table
    }

    /// Add a pair (builder pattern)
    ///
    /// # Panics
    ///
    /// Panics if `key` is `nil` or NaN.
    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        if let Err(err) = self.set(key.into(), value.into()) {
            panic!("Table::with: {err}");
        }
        self
    }

    /// Assign `value` to `key`. A `nil` value removes the key.
    pub fn set(&mut self, key: Value, value: Value) -> Result<(), InvalidKey> {
        self.insert(TableKey::new(key)?, value);
        Ok(())
    }

    /// Assign `value` to an already-validated key. A `nil` value removes it.
    pub fn insert(&mut self, key: TableKey, value: Value) {
        if value.is_nil() {
            self.entries.shift_remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    /// Look up a key. Invalid keys are simply absent.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let key = TableKey::new(key.clone()).ok()?;
        self.entries.get(&key)
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no pairs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &Value)> {
        self.entries.iter()
    }
}

/// Nested tables are released iteratively, so dropping a deeply nested
/// value does not recurse once per level.
impl Drop for Table {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut table) = pending.pop() {
            detach_children(&mut table, &mut pending);
        }
    }
}

/// Move out every child table that `table` holds the last reference to.
fn detach_children(table: &mut Table, pending: &mut Vec<Table>) {
    for (key, value) in table.entries.drain(..) {
        for child in [key.into_value(), value] {
            if let Value::Table(TableRef(shared)) = child {
                if let Ok(lock) = Arc::try_unwrap(shared) {
                    pending.push(lock.into_inner().unwrap_or_else(PoisonError::into_inner));
                }
            }
        }
    }
}

/// A shared, mutable reference to a table.
///
/// Clones alias the same table, so a table can be reachable from several
/// places, including from inside itself.
#[derive(Clone, Default)]
pub struct TableRef(Arc<RwLock<Table>>);

impl TableRef {
    /// Wrap a table
    pub fn new(table: Table) -> Self {
        Self(Arc::new(RwLock::new(table)))
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assign `value` to `key`. A `nil` value removes the key.
    pub fn set(&self, key: Value, value: Value) -> Result<(), InvalidKey> {
        self.write().set(key, value)
    }

    /// Look up a key, cloning the value out
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the table has no pairs
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of all pairs in iteration order.
    ///
    /// The lock is released before returning, so callers can walk nested
    /// tables (including this one) freely.
    pub fn pairs(&self) -> Vec<(Value, Value)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.value().clone(), v.clone()))
            .collect()
    }

    /// Check if both references name the same table
    pub fn ptr_eq(&self, other: &TableRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the referenced table
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl From<Table> for TableRef {
    fn from(table: Table) -> Self {
        TableRef::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut t = Table::new();
        t.set(Value::string("a"), Value::Number(1.0)).unwrap();
        assert_eq!(t.get(&Value::string("a")), Some(&Value::Number(1.0)));
        assert_eq!(t.get(&Value::string("b")), None);
        assert_eq!(t.get(&Value::Nil), None);
    }

    #[test]
    fn test_nil_value_removes_key() {
        let mut t = Table::new().with("a", 1.0).with("b", 2.0);
        t.set(Value::string("a"), Value::Nil).unwrap();
        assert_eq!(t.len(), 1);
        assert!(t.get(&Value::string("a")).is_none());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut t = Table::new();
        assert_eq!(t.set(Value::Nil, Value::Boolean(true)), Err(InvalidKey::Nil));
        assert_eq!(
            t.set(Value::Number(f64::NAN), Value::Boolean(true)),
            Err(InvalidKey::NaN)
        );
        assert!(t.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let t = Table::new().with("z", 1.0).with("a", 2.0).with("m", 3.0);
        let keys: Vec<_> = t
            .iter()
            .map(|(k, _)| k.value().as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_from_sequence() {
        let t = Table::from_sequence(vec![Value::string("x"), Value::string("y")]);
        assert_eq!(t.get(&Value::Number(1.0)), Some(&Value::string("x")));
        assert_eq!(t.get(&Value::Number(2.0)), Some(&Value::string("y")));
    }

    #[test]
    fn test_deep_nesting_drops_without_recursion() {
        let mut value = Value::table(Table::new());
        for _ in 0..200_000 {
            value = Value::table(Table::new().with(1.0, value));
        }
        drop(value);
    }

    #[test]
    fn test_table_ref_aliases() {
        let a = TableRef::new(Table::new());
        let b = a.clone();
        b.set(Value::Number(1.0), Value::Boolean(true)).unwrap();
        assert_eq!(a.get(&Value::Number(1.0)), Some(Value::Boolean(true)));
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_table_can_contain_itself() {
        let t = TableRef::new(Table::new());
        t.set(Value::string("self"), Value::Table(t.clone())).unwrap();
        let pairs = t.pairs();
        assert_eq!(pairs.len(), 1);
        match &pairs[0].1 {
            Value::Table(inner) => assert!(inner.ptr_eq(&t)),
            other => panic!("Expected Table, got {:?}", other),
        }
    }
}
