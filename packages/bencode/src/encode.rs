//! Bencode encoding.
use crate::value::Value;

/// Encodes a [`Value`] into its bencoded byte form.
///
/// Dictionary keys are emitted in ascending byte order; the `BTreeMap` inside
/// [`Value::Dict`] guarantees that ordering regardless of insertion order, so
/// encoding is infallible.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut output = Vec::new();
    write_value(value, &mut output);
    output
}

fn write_value(value: &Value, output: &mut Vec<u8>) {
    match value {
        Value::Integer(n) => {
            output.push(b'i');
            output.extend_from_slice(n.to_string().as_bytes());
            output.push(b'e');
        }
        Value::Bytes(bytes) => {
            output.extend_from_slice(bytes.len().to_string().as_bytes());
            output.push(b':');
            output.extend_from_slice(bytes);
        }
        Value::List(values) => {
            output.push(b'l');
            for item in values {
                write_value(item, output);
            }
            output.push(b'e');
        }
        Value::Dict(entries) => {
            output.push(b'd');
            for (key, item) in entries {
                output.extend_from_slice(key.len().to_string().as_bytes());
                output.push(b':');
                output.extend_from_slice(key);
                write_value(item, output);
            }
            output.push(b'e');
        }
    }
}
