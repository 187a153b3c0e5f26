//! Display and Debug implementations for Value

use std::collections::HashSet;
use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self)
    }
}

impl fmt::Debug for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, &Value::Table(self.clone()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", String::from_utf8_lossy(s)), // No quotes for Display
            Value::Table(t) => write!(f, "table: {:#x}", t.id()),
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

/// Pending output while printing a value.
enum Piece {
    Value(Value),
    Text(&'static str),
    /// Closing brace of the table with this id
    Close(usize),
}

/// Print `root` without recursing per table level. A table that is already
/// being printed further out shows as `<cycle>`.
fn write_value(f: &mut fmt::Formatter<'_>, root: &Value) -> fmt::Result {
    let mut work = vec![Piece::Value(root.clone())];
    let mut open = HashSet::new();

    while let Some(piece) = work.pop() {
        let value = match piece {
            Piece::Value(value) => value,
            Piece::Text(text) => {
                f.write_str(text)?;
                continue;
            }
            Piece::Close(id) => {
                open.remove(&id);
                f.write_str("}")?;
                continue;
            }
        };

        match &value {
            Value::Nil => write!(f, "nil")?,
            Value::Boolean(b) => write!(f, "{}", b)?,
            Value::Number(n) => write!(f, "{}", n)?,
            Value::String(s) => write!(f, "{:?}", String::from_utf8_lossy(s))?,
            Value::Handle(h) => write!(f, "{:?}", h)?,
            Value::Function(func) => write!(f, "<function {}>", func.name)?,
            Value::Coroutine(co) => write!(f, "<thread {}>", co.label)?,
            Value::Userdata(ud) => write!(f, "<userdata {}>", ud.type_name)?,
            Value::Table(t) => {
                let id = t.id();
                if !open.insert(id) {
                    f.write_str("<cycle>")?;
                    continue;
                }
                f.write_str("{")?;
                work.push(Piece::Close(id));
                // Reversed so the first pair is printed first
                let pairs = t.pairs();
                let last = pairs.len().saturating_sub(1);
                for (i, (k, v)) in pairs.into_iter().enumerate().rev() {
                    if i < last {
                        work.push(Piece::Text(", "));
                    }
                    work.push(Piece::Value(v));
                    work.push(Piece::Text("] = "));
                    work.push(Piece::Value(k));
                    work.push(Piece::Text("["));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_scalars() {
        assert_eq!(format!("{:?}", Value::Nil), "nil");
        assert_eq!(format!("{:?}", Value::Boolean(false)), "false");
        assert_eq!(format!("{:?}", Value::Number(42.0)), "42");
        assert_eq!(format!("{:?}", Value::string("hi")), "\"hi\"");
    }

    #[test]
    fn test_display_string_has_no_quotes() {
        assert_eq!(Value::string("hi").to_string(), "hi");
    }

    #[test]
    fn test_debug_table() {
        let t = Value::table(Table::new().with(1.0, "a"));
        assert_eq!(format!("{:?}", t), "{[1] = \"a\"}");
    }

    #[test]
    fn test_debug_cycle_terminates() {
        let t = TableRef::new(Table::new());
        t.set(Value::string("me"), Value::Table(t.clone())).unwrap();
        assert_eq!(format!("{:?}", t), "{[\"me\"] = <cycle>}");
    }

    #[test]
    fn test_debug_pairs_in_order() {
        let t = Value::table(Table::new().with(1.0, "a").with("k", Table::new().with(true, false)));
        assert_eq!(format!("{:?}", t), "{[1] = \"a\", [\"k\"] = {[true] = false}}");
    }

    #[test]
    fn test_debug_shared_table_is_not_a_cycle() {
        let shared = TableRef::new(Table::new());
        let t = Value::table(
            Table::new()
                .with(1.0, Value::Table(shared.clone()))
                .with(2.0, Value::Table(shared)),
        );
        assert_eq!(format!("{:?}", t), "{[1] = {}, [2] = {}}");
    }

    #[test]
    fn test_debug_deep_table() {
        let mut value = Value::table(Table::new());
        for _ in 1..100_000 {
            value = Value::table(Table::new().with(true, value));
        }
        let text = format!("{:?}", value);
        assert!(text.starts_with("{[true] = {[true] = "));
        assert_eq!(text.matches('{').count(), 100_000);
        assert_eq!(text.matches('}').count(), 100_000);
    }
}
