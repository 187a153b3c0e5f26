//! # Stackwire
//!
//! A self-describing binary codec for the dynamic values of an embedded
//! scripting engine, used as the payload format between a controller
//! process and its sandboxed content processes.
//!
//! The encoder walks a range of an evaluation stack and writes each value
//! as a one-byte type tag followed by its payload; tables nest recursively
//! and end with a sentinel tag. The decoder reverses this, pushing the
//! values onto another stack. No schema travels with the bytes.
//!
//! ## Architecture
//!
//! - **Values**: `nil`, booleans, numbers, byte strings, tables and opaque
//!   handles cross the wire; functions, coroutines and userdata do not
//! - **Stack**: the evaluation context values are read from and pushed to
//! - **Codec**: work-stack encoder and bounds-checked decoder
//! - **IPC**: message envelope and per-type dispatch
//!
//! ## Example
//!
//! ```
//! use stackwire::{decode, encode, Table, Value, ValueStack};
//!
//! let mut sender = ValueStack::new();
//! sender.push(42.0);
//! sender.push("hi");
//! sender.push(true);
//! sender.push(Table::new().with(1.0, "a"));
//!
//! let bytes = encode(&sender, 0, -1).unwrap();
//!
//! let mut receiver = ValueStack::new();
//! assert_eq!(decode(&mut receiver, &bytes).unwrap(), 4);
//! assert_eq!(receiver, sender);
//! ```
//!
//! ## Portability
//!
//! Numbers, lengths and handles are written in native byte order and word
//! size. A payload is only valid for a peer running the same binary on the
//! same machine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod error;
pub mod ipc;
pub mod stack;
pub mod value;

// Re-export main types
pub use codec::{decode, decode_values, encode, encode_into, encode_values, Decoder, Encoder, Tag};
pub use config::CodecConfig;
pub use error::{CodecError, FrameError, IpcError, Result};
pub use stack::{StackGuard, ValueStack};
pub use value::{
    CoroutineValue, InvalidKey, NativeFn, NativeFnPtr, OpaqueHandle, Table, TableKey, TableRef,
    UserdataValue, Value, HANDLE_SIZE,
};

/// Stackwire version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
