//! Error types for encoding and decoding

use thiserror::Error;

/// Main error type for codec operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The encoder met a value kind that has no wire representation
    #[error("cannot serialize variable of type {type_name}")]
    UnsupportedType {
        /// Name of the rejected kind (e.g. "function")
        type_name: &'static str,
    },

    /// The decoder met bytes that do not form a valid payload
    #[error("malformed payload at byte {offset}: {reason}")]
    MalformedPayload {
        /// Offset of the byte where decoding failed
        offset: usize,
        /// What was wrong
        reason: String,
    },

    /// The destination stack height does not match the values produced
    #[error("stack invariant violated: expected height {expected}, found {actual}")]
    StackInvariantViolation {
        /// Height the stack should have
        expected: usize,
        /// Height it actually has
        actual: usize,
    },

    /// A range endpoint resolved outside the stack
    #[error("stack index {index} out of range for stack of {len} values")]
    InvalidRange {
        /// Index as supplied by the caller
        index: isize,
        /// Stack height at the time of the call
        len: usize,
    },

    /// A table contains itself, directly or through a nested table
    #[error("cannot serialize a table that contains itself")]
    CyclicValue,

    /// Tables are nested deeper than the configured limit
    #[error("table nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep {
        /// Depth that was reached
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// The payload is larger than the configured limit
    #[error("payload of {len} bytes exceeds maximum {max}")]
    PayloadTooLarge {
        /// Payload length
        len: usize,
        /// Configured maximum
        max: usize,
    },
}

impl CodecError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedPayload {
            offset,
            reason: reason.into(),
        }
    }
}

/// Errors from the message envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than a header
    #[error("truncated message header: {len} bytes")]
    TruncatedHeader {
        /// Bytes available
        len: usize,
    },

    /// Header length disagrees with the bytes that follow it
    #[error("message declares {declared} payload bytes, {actual} present")]
    LengthMismatch {
        /// Length in the header
        declared: usize,
        /// Bytes actually following the header
        actual: usize,
    },

    /// Payload does not fit the header's length field
    #[error("payload of {len} bytes does not fit in a message")]
    PayloadTooLarge {
        /// Payload length
        len: usize,
    },
}

/// Errors from message dispatch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IpcError {
    /// Envelope could not be parsed or built
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// No handler is registered for the message type
    #[error("no handler for message type {0}")]
    UnknownMessageType(crate::ipc::MessageType),

    /// Payload could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The handler reported a failure
    #[error("handler failed: {0}")]
    Handler(String),
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_type_message() {
        let err = CodecError::UnsupportedType {
            type_name: "function",
        };
        assert_eq!(err.to_string(), "cannot serialize variable of type function");
    }

    #[test]
    fn test_malformed_message_includes_offset() {
        let err = CodecError::malformed(7, "truncated number");
        assert_eq!(
            err.to_string(),
            "malformed payload at byte 7: truncated number"
        );
    }

    #[test]
    fn test_ipc_error_wraps_codec_error() {
        let err: IpcError = CodecError::CyclicValue.into();
        assert_eq!(err.to_string(), "cannot serialize a table that contains itself");
    }

    #[test]
    fn test_nesting_message() {
        let err = CodecError::NestingTooDeep { depth: 5, max: 4 };
        assert!(err.to_string().contains("exceeds maximum 4"));
    }
}
