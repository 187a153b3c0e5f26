//! Encoder: values to bytes

use std::collections::HashSet;

use tracing::{debug, trace};

use super::{resolve_range, Tag};
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::stack::ValueStack;
use crate::value::Value;

/// Pending work while walking a value.
enum Step {
    /// Encode this value
    Value(Value),
    /// All pairs of the innermost open table are written
    CloseTable,
}

/// Tables currently being written, innermost last.
#[derive(Default)]
struct OpenTables {
    order: Vec<usize>,
    ids: HashSet<usize>,
}

impl OpenTables {
    fn depth(&self) -> usize {
        self.order.len()
    }

    /// Returns false if the table is already open, i.e. it contains itself.
    fn open(&mut self, id: usize) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    fn close(&mut self) {
        if let Some(id) = self.order.pop() {
            self.ids.remove(&id);
        }
    }
}

/// Writes values in the stackwire format.
///
/// Encoding only reads: the source stack and every table reached from it
/// are left untouched.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    /// Create an encoder with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Encode the values at stack positions `start..=end`.
    pub fn encode(&self, stack: &ValueStack, start: isize, end: isize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(stack, start, end, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of stack positions `start..=end` to `out`.
    ///
    /// On failure `out` is truncated back to its length at entry.
    pub fn encode_into(
        &self,
        stack: &ValueStack,
        start: isize,
        end: isize,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let values = resolve_range(stack, start, end)?;
        self.encode_values_into(values, out)
    }

    /// Encode a slice of values.
    pub fn encode_values(&self, values: &[Value]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_values_into(values, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of `values` to `out`.
    ///
    /// On failure `out` is truncated back to its length at entry.
    pub fn encode_values_into(&self, values: &[Value], out: &mut Vec<u8>) -> Result<()> {
        let mark = out.len();
        for value in values {
            if let Err(err) = self.encode_value(value, out) {
                out.truncate(mark);
                debug!("encode failed: {err}");
                return Err(err);
            }
        }
        debug!(
            values = values.len(),
            bytes = out.len() - mark,
            "encoded values"
        );
        Ok(())
    }

    fn encode_value(&self, root: &Value, out: &mut Vec<u8>) -> Result<()> {
        let mut work = vec![Step::Value(root.clone())];
        let mut open = OpenTables::default();

        while let Some(step) = work.pop() {
            let value = match step {
                Step::Value(value) => value,
                Step::CloseTable => {
                    open.close();
                    out.push(Tag::End as u8);
                    continue;
                }
            };

            if self.config.trace {
                trace!(kind = value.type_name(), depth = open.depth(), "encode value");
            }

            match &value {
                Value::Nil => out.push(Tag::Nil as u8),
                Value::Boolean(b) => {
                    out.push(Tag::Boolean as u8);
                    out.push(u8::from(*b));
                }
                Value::Number(n) => {
                    out.push(Tag::Number as u8);
                    out.extend_from_slice(&n.to_ne_bytes());
                }
                Value::String(s) => {
                    out.push(Tag::String as u8);
                    out.extend_from_slice(&s.len().to_ne_bytes());
                    out.extend_from_slice(s);
                    out.push(0);
                }
                Value::Handle(h) => {
                    out.push(Tag::Handle as u8);
                    out.extend_from_slice(h.as_bytes());
                }
                Value::Table(table) => {
                    let depth = open.depth() + 1;
                    if let Some(max) = self.config.max_depth {
                        if depth > max {
                            return Err(CodecError::NestingTooDeep { depth, max });
                        }
                    }
                    if !open.open(table.id()) {
                        return Err(CodecError::CyclicValue);
                    }

                    out.push(Tag::Table as u8);
                    work.push(Step::CloseTable);
                    // Reversed so the first key is popped first
                    for (k, v) in table.pairs().into_iter().rev() {
                        work.push(Step::Value(v));
                        work.push(Step::Value(k));
                    }
                }
                Value::Function(_) | Value::Coroutine(_) | Value::Userdata(_) => {
                    return Err(CodecError::UnsupportedType {
                        type_name: value.type_name(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CoroutineValue, OpaqueHandle, Table, TableRef, HANDLE_SIZE};
    use pretty_assertions::assert_eq;

    fn encode_one(value: Value) -> Result<Vec<u8>> {
        Encoder::default().encode_values(&[value])
    }

    #[test]
    fn test_scalar_layouts() {
        assert_eq!(encode_one(Value::Nil).unwrap(), vec![0]);
        assert_eq!(encode_one(Value::Boolean(true)).unwrap(), vec![1, 1]);
        assert_eq!(encode_one(Value::Boolean(false)).unwrap(), vec![1, 0]);

        let mut number = vec![3];
        number.extend_from_slice(&42.0f64.to_ne_bytes());
        assert_eq!(encode_one(Value::Number(42.0)).unwrap(), number);
    }

    #[test]
    fn test_string_layout_has_terminator() {
        let mut expected = vec![4];
        expected.extend_from_slice(&2usize.to_ne_bytes());
        expected.extend_from_slice(b"hi\0");
        assert_eq!(encode_one(Value::string("hi")).unwrap(), expected);
    }

    #[test]
    fn test_handle_layout() {
        let h = OpaqueHandle::from_addr(0x1234);
        let bytes = encode_one(Value::Handle(h)).unwrap();
        assert_eq!(bytes.len(), 1 + HANDLE_SIZE);
        assert_eq!(bytes[0], Tag::Handle as u8);
        assert_eq!(&bytes[1..], &0x1234usize.to_ne_bytes());
    }

    #[test]
    fn test_table_layout() {
        let t = Value::table(Table::new().with(true, false));
        assert_eq!(encode_one(t).unwrap(), vec![5, 1, 1, 1, 0, 0xFF]);
        assert_eq!(encode_one(Value::table(Table::new())).unwrap(), vec![5, 0xFF]);
    }

    #[test]
    fn test_nested_table_layout() {
        let inner = Table::new().with(true, true);
        let outer = Value::table(Table::new().with(false, inner).with(true, false));
        assert_eq!(
            encode_one(outer).unwrap(),
            vec![5, 1, 0, 5, 1, 1, 1, 1, 0xFF, 1, 1, 1, 0, 0xFF]
        );
    }

    #[test]
    fn test_rejects_host_only_kinds() {
        let err = encode_one(Value::function("print", |_| Ok(vec![]))).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnsupportedType {
                type_name: "function"
            }
        );

        let err = encode_one(Value::Coroutine(CoroutineValue::new("co"))).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnsupportedType {
                type_name: "thread"
            }
        );
    }

    #[test]
    fn test_failure_leaves_buffer_untouched() {
        let mut out = vec![0xAA];
        let values = [
            Value::Number(1.0),
            Value::table(Table::new().with("f", Value::function("f", |_| Ok(vec![])))),
        ];
        assert!(Encoder::default()
            .encode_values_into(&values, &mut out)
            .is_err());
        assert_eq!(out, vec![0xAA]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let t = TableRef::new(Table::new());
        let inner = TableRef::new(Table::new());
        inner.set(Value::string("up"), Value::Table(t.clone())).unwrap();
        t.set(Value::string("down"), Value::Table(inner)).unwrap();

        assert_eq!(
            encode_one(Value::Table(t)).unwrap_err(),
            CodecError::CyclicValue
        );
    }

    #[test]
    fn test_shared_table_is_not_a_cycle() {
        let shared = TableRef::new(Table::new().with(1.0, "x"));
        let t = Table::new()
            .with("a", Value::Table(shared.clone()))
            .with("b", Value::Table(shared));
        assert!(encode_one(Value::table(t)).is_ok());
    }

    #[test]
    fn test_max_depth() {
        let nested = Value::table(Table::new().with(1.0, Table::new().with(1.0, Table::new())));
        let encoder = Encoder::new(CodecConfig::with_max_depth(2));
        assert_eq!(
            encoder.encode_values(&[nested.clone()]).unwrap_err(),
            CodecError::NestingTooDeep { depth: 3, max: 2 }
        );
        assert!(Encoder::new(CodecConfig::with_max_depth(3))
            .encode_values(&[nested])
            .is_ok());
    }

    #[test]
    fn test_encode_range_does_not_touch_stack() {
        let mut stack = ValueStack::new();
        stack.push(1.0);
        stack.push(Value::table(Table::new().with("k", "v")));
        let before = stack.clone();

        let bytes = Encoder::default().encode(&stack, 0, -1).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(stack, before);
        assert_eq!(stack.len(), 2);
    }
}
