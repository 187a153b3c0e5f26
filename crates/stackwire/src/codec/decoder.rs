//! Decoder: bytes to values

use tracing::{debug, trace};

use super::Tag;
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::stack::ValueStack;
use crate::value::{OpaqueHandle, Table, TableKey, Value};

/// Bounds-checked cursor over a payload.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        let end = match self.pos.checked_add(n) {
            Some(end) if end <= self.data.len() => end,
            _ => {
                return Err(CodecError::malformed(
                    self.pos,
                    format!("truncated {what}: need {n} bytes, {} remain", self.remaining()),
                ))
            }
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }
}

/// A table whose pairs are still being read.
#[derive(Default)]
struct OpenTable {
    table: Table,
    key: Option<TableKey>,
}

/// Reads payloads written by [`Encoder`](super::Encoder).
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    /// Create a decoder with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Decode every value in `bytes` and push them onto `stack` in order.
    ///
    /// Returns the number of values pushed. On failure nothing is pushed:
    /// the stack is rolled back to its height at entry.
    pub fn decode(&self, stack: &mut ValueStack, bytes: &[u8]) -> Result<usize> {
        if let Some(max) = self.config.max_payload {
            if bytes.len() > max {
                return Err(CodecError::PayloadTooLarge {
                    len: bytes.len(),
                    max,
                });
            }
        }

        let mut guard = stack.guard();
        let mut reader = Reader::new(bytes);
        let mut count = 0;

        while !reader.is_at_end() {
            let value = self.read_value(&mut reader)?;
            guard.push(value);
            count += 1;
        }

        let expected = guard.base() + count;
        if guard.len() != expected {
            return Err(CodecError::StackInvariantViolation {
                expected,
                actual: guard.len(),
            });
        }
        guard.commit();

        debug!(values = count, bytes = bytes.len(), "decoded payload");
        Ok(count)
    }

    /// Decode every value in `bytes` into a vector.
    pub fn decode_values(&self, bytes: &[u8]) -> Result<Vec<Value>> {
        let mut stack = ValueStack::new();
        self.decode(&mut stack, bytes)?;
        Ok(stack.drain())
    }

    /// Read one complete top-level value.
    fn read_value(&self, reader: &mut Reader<'_>) -> Result<Value> {
        let mut open: Vec<OpenTable> = Vec::new();

        loop {
            let at = reader.offset();
            let byte = reader.u8("type tag")?;
            let tag = Tag::from_byte(byte)
                .ok_or_else(|| CodecError::malformed(at, format!("unknown type tag {byte:#04x}")))?;

            let value = match tag {
                Tag::Nil => Value::Nil,
                Tag::Boolean => Value::Boolean(reader.u8("boolean")? != 0),
                Tag::Number => Value::Number(f64::from_ne_bytes(reader.array("number")?)),
                Tag::String => {
                    let len = usize::from_ne_bytes(reader.array("string length")?);
                    let with_terminator = len.checked_add(1).ok_or_else(|| {
                        CodecError::malformed(reader.offset(), "string length overflows")
                    })?;
                    let bytes = reader.take(with_terminator, "string")?;
                    Value::string(&bytes[..len])
                }
                Tag::Handle => Value::Handle(OpaqueHandle::from_bytes(reader.array("handle")?)),
                Tag::Table => {
                    let depth = open.len() + 1;
                    if let Some(max) = self.config.max_depth {
                        if depth > max {
                            return Err(CodecError::NestingTooDeep { depth, max });
                        }
                    }
                    open.push(OpenTable::default());
                    continue;
                }
                Tag::End => match open.pop() {
                    None => {
                        return Err(CodecError::malformed(
                            at,
                            "end-of-table marker outside a table",
                        ))
                    }
                    Some(OpenTable { key: Some(_), .. }) => {
                        return Err(CodecError::malformed(
                            at,
                            "table ended between a key and its value",
                        ))
                    }
                    Some(OpenTable { table, .. }) => Value::table(table),
                },
            };

            if self.config.trace {
                trace!(kind = value.type_name(), offset = at, depth = open.len(), "decode value");
            }

            let Some(frame) = open.last_mut() else {
                return Ok(value);
            };
            match frame.key.take() {
                Some(key) => frame.table.insert(key, value),
                None => {
                    let key = TableKey::new(value)
                        .map_err(|err| CodecError::malformed(at, err.to_string()))?;
                    frame.key = Some(key);
                }
            }
        }
    }
}
