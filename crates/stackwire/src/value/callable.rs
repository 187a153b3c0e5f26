//! Host-only value kinds: functions, coroutines and full userdata
//!
//! These live in the evaluation stack like any other value but have no
//! wire representation. The encoder rejects them.

use std::any::Any;
use std::sync::Arc;

use super::Value;

/// Type alias for native function pointers to reduce complexity
pub type NativeFnPtr = Arc<dyn Fn(&[Value]) -> Result<Vec<Value>, String> + Send + Sync>;

/// A native function exposed to scripts.
#[derive(Clone)]
pub struct NativeFn {
    /// Function name (for display/debugging)
    pub name: String,

    /// The actual function pointer
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Wrap a closure as a native function
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>, String> {
        (self.func)(args)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.func) as *const () as usize
    }
}

impl std::fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

/// A coroutine handle.
///
/// Execution state is owned by the host; the value only carries identity.
#[derive(Debug, Clone)]
pub struct CoroutineValue {
    /// Label for display/debugging
    pub label: Arc<str>,
}

impl CoroutineValue {
    /// Create a new coroutine handle with a fresh identity
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.label) as *const u8 as usize
    }
}

/// A host object with its own type, such as a DOM element or a socket.
#[derive(Clone)]
pub struct UserdataValue {
    /// Host type name (for display/debugging)
    pub type_name: String,

    /// The wrapped object
    pub data: Arc<dyn Any + Send + Sync>,
}

impl UserdataValue {
    /// Wrap a host object
    pub fn new(type_name: impl Into<String>, data: impl Any + Send + Sync) -> Self {
        Self {
            type_name: type_name.into(),
            data: Arc::new(data),
        }
    }

    /// Borrow the wrapped object if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }
}

impl std::fmt::Debug for UserdataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserdataValue({})", self.type_name)
    }
}
