//! Message envelope and dispatch
//!
//! A message is a fixed header followed by one encoded payload:
//!
//! ```text
//! kind(u32) | length(u32) | payload[length]
//! ```
//!
//! Header fields use native byte order, like the payload itself. Moving the
//! bytes between processes is left to the caller.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::codec::{Decoder, Encoder};
use crate::config::CodecConfig;
use crate::error::{FrameError, IpcError};
use crate::stack::ValueStack;
use crate::value::Value;

/// Size of a serialized [`MessageHeader`].
pub const HEADER_SIZE: usize = 8;

/// Message type tag, chosen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageType(pub u32);

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-size message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Message type
    pub kind: MessageType,
    /// Payload length in bytes
    pub length: u32,
}

impl MessageHeader {
    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.kind.0.to_ne_bytes());
        out[4..].copy_from_slice(&self.length.to_ne_bytes());
        out
    }

    /// Parse a header from the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(FrameError::TruncatedHeader { len: bytes.len() });
        };
        let mut kind = [0u8; 4];
        let mut length = [0u8; 4];
        kind.copy_from_slice(&header[..4]);
        length.copy_from_slice(&header[4..]);
        Ok(Self {
            kind: MessageType(u32::from_ne_bytes(kind)),
            length: u32::from_ne_bytes(length),
        })
    }
}

/// A typed message carrying one encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message type
    pub kind: MessageType,
    /// Encoded values
    pub payload: Vec<u8>,
}

impl Message {
    /// Create a message from an already-encoded payload.
    pub fn new(kind: MessageType, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// Encode stack positions `start..=end` as the payload.
    pub fn from_stack(
        kind: MessageType,
        stack: &ValueStack,
        start: isize,
        end: isize,
    ) -> Result<Self, IpcError> {
        let payload = Encoder::default().encode(stack, start, end)?;
        Ok(Self::new(kind, payload))
    }

    /// Encode `values` as the payload.
    pub fn from_values(kind: MessageType, values: &[Value]) -> Result<Self, IpcError> {
        let payload = Encoder::default().encode_values(values)?;
        Ok(Self::new(kind, payload))
    }

    /// Header describing this message.
    pub fn header(&self) -> Result<MessageHeader, FrameError> {
        let length = u32::try_from(self.payload.len()).map_err(|_| FrameError::PayloadTooLarge {
            len: self.payload.len(),
        })?;
        Ok(MessageHeader {
            kind: self.kind,
            length,
        })
    }

    /// Header followed by payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FrameError> {
        let header = self.header()?;
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Parse one complete message; `bytes` must hold exactly one.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let header = MessageHeader::from_bytes(bytes)?;
        let payload = &bytes[HEADER_SIZE..];
        let declared = header.length as usize;
        if payload.len() != declared {
            return Err(FrameError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }
        Ok(Self::new(header.kind, payload.to_vec()))
    }
}

/// Handler invoked with the stack and the number of values just pushed.
pub type Handler = Box<dyn FnMut(&mut ValueStack, usize) -> Result<(), String> + Send>;

/// Routes decoded payloads to handlers by message type.
///
/// # Example
///
/// ```
/// use stackwire::ipc::{Dispatcher, Message, MessageType};
/// use stackwire::{Value, ValueStack};
///
/// const PING: MessageType = MessageType(1);
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.register(PING, |stack, count| {
///     assert_eq!(count, 1);
///     assert_eq!(stack.pop(), Some(Value::string("hello")));
///     Ok(())
/// });
///
/// let message = Message::from_values(PING, &[Value::string("hello")]).unwrap();
/// let mut stack = ValueStack::new();
/// assert_eq!(dispatcher.dispatch(&message, &mut stack).unwrap(), 1);
/// ```
pub struct Dispatcher {
    handlers: HashMap<MessageType, Handler>,
    decoder: Decoder,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create a dispatcher with the default codec configuration.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Create a dispatcher whose decoder uses `config`.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            decoder: Decoder::new(config),
        }
    }

    /// Register the handler for `kind`, replacing any previous one.
    ///
    /// Returns true if a handler was replaced.
    pub fn register(
        &mut self,
        kind: MessageType,
        handler: impl FnMut(&mut ValueStack, usize) -> Result<(), String> + Send + 'static,
    ) -> bool {
        self.handlers.insert(kind, Box::new(handler)).is_some()
    }

    /// Check if a handler is registered for `kind`.
    pub fn handles(&self, kind: MessageType) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Decode the payload onto `stack` and run the handler for its type.
    ///
    /// Returns the number of values decoded. A payload that fails to decode
    /// never reaches the handler. On any failure, including one reported by
    /// the handler, `stack` is cut back to its height at entry.
    pub fn dispatch(&mut self, message: &Message, stack: &mut ValueStack) -> Result<usize, IpcError> {
        let Some(handler) = self.handlers.get_mut(&message.kind) else {
            warn!(kind = message.kind.0, "no handler for message");
            return Err(IpcError::UnknownMessageType(message.kind));
        };

        let mut guard = stack.guard();
        let count = self
            .decoder
            .decode(&mut *guard, &message.payload)
            .inspect_err(|err| warn!(kind = message.kind.0, "rejected payload: {err}"))?;

        debug!(kind = message.kind.0, values = count, "dispatching message");
        handler(&mut *guard, count)
            .map_err(IpcError::Handler)
            .inspect_err(|err| warn!(kind = message.kind.0, "{err}"))?;
        guard.commit();
        Ok(count)
    }

    /// Parse a framed message and dispatch it.
    pub fn dispatch_bytes(&mut self, bytes: &[u8], stack: &mut ValueStack) -> Result<usize, IpcError> {
        let message = Message::from_bytes(bytes)?;
        self.dispatch(&message, stack)
    }
}
