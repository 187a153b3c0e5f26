//! RAII guard that rolls the stack back unless committed

use super::ValueStack;

/// RAII guard that restores the stack height when dropped.
///
/// Everything pushed through the guard is discarded on drop unless
/// [`commit`](StackGuard::commit) is called first. The decoder uses this so
/// a failed call leaves the destination stack as it found it.
///
/// # Example
///
/// ```
/// use stackwire::{Value, ValueStack};
///
/// let mut stack = ValueStack::new();
/// stack.push(Value::Number(1.0));
///
/// {
///     let mut guard = stack.guard();
///     guard.push(Value::Number(2.0));
///     // dropped without commit
/// }
/// assert_eq!(stack.len(), 1);
///
/// {
///     let mut guard = stack.guard();
///     guard.push(Value::Number(2.0));
///     guard.commit();
/// }
/// assert_eq!(stack.len(), 2);
/// ```
pub struct StackGuard<'a> {
    stack: &'a mut ValueStack,
    base: usize,
    committed: bool,
}

impl ValueStack {
    /// Create a guard that remembers the current height.
    pub fn guard(&mut self) -> StackGuard<'_> {
        let base = self.len();
        StackGuard {
            stack: self,
            base,
            committed: false,
        }
    }
}

impl StackGuard<'_> {
    /// Height of the stack when the guard was created.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of values pushed since the guard was created.
    pub fn pushed(&self) -> usize {
        self.stack.len().saturating_sub(self.base)
    }

    /// Keep everything pushed through the guard.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.stack.truncate(self.base);
        }
    }
}

impl std::ops::Deref for StackGuard<'_> {
    type Target = ValueStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl std::ops::DerefMut for StackGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}
