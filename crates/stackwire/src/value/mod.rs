//! Value representation for runtime values

mod callable;
mod display;
mod handle;
mod impls;
mod key;
mod table;

pub use callable::{CoroutineValue, NativeFn, NativeFnPtr, UserdataValue};
pub use handle::{OpaqueHandle, HANDLE_SIZE};
pub use key::{InvalidKey, TableKey};
pub use table::{Table, TableRef};

use std::sync::Arc;

/// Runtime value held by an evaluation stack.
///
/// Values are organized into two tiers:
/// - Tier 1: Wire values, which the codec can carry between processes
/// - Tier 2: Host-only values, which the encoder rejects
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Wire Values
    // ═══════════════════════════════════════════════════════════════════
    /// Absence of a value
    Nil,

    /// Boolean: `true` or `false`
    Boolean(bool),

    /// The engine's only numeric type
    Number(f64),

    /// Byte string; not necessarily UTF-8
    String(Arc<[u8]>),

    /// Shared associative array
    Table(TableRef),

    /// Identity token for an object in the sending process
    Handle(OpaqueHandle),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Host-Only Values
    // ═══════════════════════════════════════════════════════════════════
    /// Native function
    Function(NativeFn),

    /// Coroutine
    Coroutine(CoroutineValue),

    /// Host object with its own type
    Userdata(UserdataValue),
}
