//! Evaluation stack the codec reads from and writes to

mod guard;

pub use guard::StackGuard;

use crate::value::Value;

/// A flat stack of runtime values.
///
/// Positions are addressed the way the host engine addresses them: a
/// non-negative index counts from the bottom (`0` is the first value), a
/// negative index counts from the top (`-1` is the last value pushed).
///
/// # Example
///
/// ```
/// use stackwire::{Value, ValueStack};
///
/// let mut stack = ValueStack::new();
/// stack.push(Value::Number(1.0));
/// stack.push(Value::string("two"));
///
/// assert_eq!(stack.get(0), Some(&Value::Number(1.0)));
/// assert_eq!(stack.get(-1), Some(&Value::string("two")));
/// assert_eq!(stack.abs_index(-2), Some(0));
/// assert_eq!(stack.get(2), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStack {
    values: Vec<Value>,
}

impl ValueStack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Push / Pop
    // ═══════════════════════════════════════════════════════════════════

    /// Push a value on top.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Pop the top value.
    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// Drop everything above `height`.
    pub fn truncate(&mut self, height: usize) {
        self.values.truncate(height);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Addressing
    // ═══════════════════════════════════════════════════════════════════

    /// Resolve an index to an absolute position.
    ///
    /// Returns `None` if the index falls outside the stack.
    pub fn abs_index(&self, index: isize) -> Option<usize> {
        let len = self.values.len();
        let pos = if index < 0 {
            len.checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        (pos < len).then_some(pos)
    }

    /// Look up a value by index.
    pub fn get(&self, index: isize) -> Option<&Value> {
        self.abs_index(index).map(|pos| &self.values[pos])
    }

    /// Values at absolute positions `range`.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Option<&[Value]> {
        self.values.get(range)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Number of values on the stack.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Take all values, bottom first, leaving the stack empty.
    pub fn drain(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.values)
    }
}

impl From<Vec<Value>> for ValueStack {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(n: usize) -> ValueStack {
        (0..n).map(|i| Value::Number(i as f64)).collect::<Vec<_>>().into()
    }

    #[test]
    fn test_abs_index_positive() {
        let stack = stack_of(3);
        assert_eq!(stack.abs_index(0), Some(0));
        assert_eq!(stack.abs_index(2), Some(2));
        assert_eq!(stack.abs_index(3), None);
    }

    #[test]
    fn test_abs_index_negative() {
        let stack = stack_of(3);
        assert_eq!(stack.abs_index(-1), Some(2));
        assert_eq!(stack.abs_index(-3), Some(0));
        assert_eq!(stack.abs_index(-4), None);
        assert_eq!(stack.abs_index(isize::MIN), None);
    }

    #[test]
    fn test_abs_index_empty() {
        let stack = ValueStack::new();
        assert_eq!(stack.abs_index(0), None);
        assert_eq!(stack.abs_index(-1), None);
    }

    #[test]
    fn test_push_pop() {
        let mut stack = ValueStack::new();
        stack.push(1.0);
        stack.push("x");
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(Value::string("x")));
        assert_eq!(stack.pop(), Some(Value::Number(1.0)));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_slice_and_drain() {
        let mut stack = stack_of(4);
        assert_eq!(
            stack.slice(1..3),
            Some(&[Value::Number(1.0), Value::Number(2.0)][..])
        );
        assert_eq!(stack.slice(3..5), None);
        assert_eq!(stack.drain().len(), 4);
        assert!(stack.is_empty());
    }
}
