//! Binary encoding of value sequences
//!
//! ## Wire format
//!
//! ```text
//! payload   := value*
//! value     := tag(u8) body
//! Nil       := 0x00
//! Boolean   := 0x01 byte            (decoder: nonzero = true)
//! Handle    := 0x02 usize-bytes     (raw, native order)
//! Number    := 0x03 f64             (native order)
//! String    := 0x04 len(usize) bytes[len] 0x00
//! Table     := 0x05 (key value)* 0xFF
//! ```
//!
//! Tag numbers follow the host engine's type ids; `0xFF` is its "no value"
//! id (-1). Fixed-width fields use the native word size and byte order: a
//! payload is only meaningful to another process running the same binary on
//! the same machine.
//!
//! Both directions walk tables with an explicit work stack, so nesting depth
//! is limited by heap, not by the native call stack.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;

use crate::error::{CodecError, Result};
use crate::stack::ValueStack;
use crate::value::Value;

/// Size of a Number payload.
pub const NUMBER_SIZE: usize = std::mem::size_of::<f64>();

/// Size of a String length field.
pub const LENGTH_SIZE: usize = std::mem::size_of::<usize>();

/// One-byte type tag preceding every encoded value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Nil, no payload
    Nil = 0,
    /// Boolean, one byte
    Boolean = 1,
    /// Opaque handle, pointer-width bytes
    Handle = 2,
    /// Number, eight bytes
    Number = 3,
    /// String, length-prefixed and zero-terminated
    String = 4,
    /// Table, pairs then `End`
    Table = 5,
    /// End of a table's pairs
    End = 0xFF,
}

impl Tag {
    /// Parse a tag byte.
    pub fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            0 => Some(Tag::Nil),
            1 => Some(Tag::Boolean),
            2 => Some(Tag::Handle),
            3 => Some(Tag::Number),
            4 => Some(Tag::String),
            5 => Some(Tag::Table),
            0xFF => Some(Tag::End),
            _ => None,
        }
    }
}

/// Resolve an inclusive `start..=end` range of stack indices.
///
/// A range that is empty or inverted after resolution yields no values, even
/// on an empty stack. Otherwise both ends must name a value on the stack.
pub(crate) fn resolve_range(stack: &ValueStack, start: isize, end: isize) -> Result<&[Value]> {
    let len = stack.len();
    let position = |index: isize| {
        if index < 0 {
            (len as isize).saturating_add(index)
        } else {
            index
        }
    };

    if position(start) > position(end) {
        return Ok(&[]);
    }

    let out_of_range = |index| CodecError::InvalidRange { index, len };
    let first = stack.abs_index(start).ok_or_else(|| out_of_range(start))?;
    let last = stack.abs_index(end).ok_or_else(|| out_of_range(end))?;
    stack
        .slice(first..last + 1)
        .ok_or_else(|| out_of_range(end))
}

// ═══════════════════════════════════════════════════════════════════════
// Convenience Functions
// ═══════════════════════════════════════════════════════════════════════

/// Encode the values at stack positions `start..=end` (default config).
pub fn encode(stack: &ValueStack, start: isize, end: isize) -> Result<Vec<u8>> {
    Encoder::default().encode(stack, start, end)
}

/// Append the encoding of `start..=end` to `out` (default config).
///
/// On failure `out` is left exactly as it was.
pub fn encode_into(stack: &ValueStack, start: isize, end: isize, out: &mut Vec<u8>) -> Result<()> {
    Encoder::default().encode_into(stack, start, end, out)
}

/// Encode a slice of values (default config).
pub fn encode_values(values: &[Value]) -> Result<Vec<u8>> {
    Encoder::default().encode_values(values)
}

/// Decode `bytes` onto `stack`, returning how many values were pushed
/// (default config).
pub fn decode(stack: &mut ValueStack, bytes: &[u8]) -> Result<usize> {
    Decoder::default().decode(stack, bytes)
}

/// Decode `bytes` into a fresh vector (default config).
pub fn decode_values(bytes: &[u8]) -> Result<Vec<Value>> {
    Decoder::default().decode_values(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(n: usize) -> ValueStack {
        (0..n)
            .map(|i| Value::Number(i as f64))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_tag_bytes() {
        for tag in [
            Tag::Nil,
            Tag::Boolean,
            Tag::Handle,
            Tag::Number,
            Tag::String,
            Tag::Table,
            Tag::End,
        ] {
            assert_eq!(Tag::from_byte(tag as u8), Some(tag));
        }
        assert_eq!(Tag::from_byte(6), None);
        assert_eq!(Tag::End as u8 as i8, -1);
    }

    #[test]
    fn test_resolve_full_range() {
        let stack = stack_of(3);
        assert_eq!(resolve_range(&stack, 0, -1).unwrap().len(), 3);
        assert_eq!(resolve_range(&stack, -2, -1).unwrap().len(), 2);
        assert_eq!(resolve_range(&stack, 1, 1).unwrap(), &[Value::Number(1.0)]);
    }

    #[test]
    fn test_resolve_empty_and_inverted() {
        assert!(resolve_range(&ValueStack::new(), 0, -1).unwrap().is_empty());
        assert!(resolve_range(&stack_of(3), 2, 1).unwrap().is_empty());
        assert!(resolve_range(&stack_of(3), -1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_out_of_range() {
        let err = resolve_range(&stack_of(2), 0, 5).unwrap_err();
        assert_eq!(err, CodecError::InvalidRange { index: 5, len: 2 });

        let err = resolve_range(&stack_of(2), -5, 1).unwrap_err();
        assert_eq!(err, CodecError::InvalidRange { index: -5, len: 2 });
    }
}
