//! Strict bencode decoding.
//!
//! The decoder accepts exactly the canonical form: every decoded value
//! re-encodes to the input bytes. It rejects non-minimal integers (`i03e`,
//! `i-0e`), truncated input, trailing bytes, string lengths that run past the
//! end of the buffer and dictionaries whose keys are unsorted or duplicated.
use std::collections::BTreeMap;

use thiserror::Error;

use crate::value::Value;

/// A decoding failure, with the byte offset where it was detected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("unexpected end of input at byte {pos}")]
    UnexpectedEnd { pos: usize },
    #[error("invalid byte {byte:#04x} at {pos}")]
    InvalidByte { byte: u8, pos: usize },
    #[error("integer with no digits at {pos}")]
    EmptyInteger { pos: usize },
    #[error("integer has leading zeros at {pos}")]
    LeadingZeros { pos: usize },
    #[error("`-0` is not a valid integer at {pos}")]
    NegativeZero { pos: usize },
    #[error("integer out of range at {pos}")]
    IntegerOverflow { pos: usize },
    #[error("string length runs past the end of the input at {pos}")]
    LengthOverflow { pos: usize },
    #[error("dictionary keys out of order at {pos}")]
    UnsortedKeys { pos: usize },
    #[error("duplicate dictionary key at {pos}")]
    DuplicateKey { pos: usize },
    #[error("trailing bytes after the value at {pos}")]
    TrailingBytes { pos: usize },
}

/// Decodes a complete bencoded value from `bytes`.
///
/// # Errors
///
/// Returns an [`enum@Error`] if the input is not a single, canonically
/// encoded value.
pub fn decode(bytes: &[u8]) -> Result<Value, Error> {
    let mut decoder = Decoder { bytes, pos: 0 };
    let value = decoder.value()?;
    if decoder.pos != bytes.len() {
        return Err(Error::TrailingBytes { pos: decoder.pos });
    }
    Ok(value)
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn peek(&self) -> Result<u8, Error> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(Error::UnexpectedEnd { pos: self.pos })
    }

    fn value(&mut self) -> Result<Value, Error> {
        match self.peek()? {
            b'i' => self.integer(),
            b'0'..=b'9' => self.byte_string().map(Value::Bytes),
            b'l' => self.list(),
            b'd' => self.dict(),
            byte => Err(Error::InvalidByte { byte, pos: self.pos }),
        }
    }

    fn integer(&mut self) -> Result<Value, Error> {
        let start = self.pos;
        self.pos += 1; // consume 'i'

        let negative = if self.peek()? == b'-' {
            self.pos += 1;
            true
        } else {
            false
        };

        let digits_start = self.pos;
        while self.peek()? != b'e' {
            let byte = self.bytes[self.pos];
            if !byte.is_ascii_digit() {
                return Err(Error::InvalidByte { byte, pos: self.pos });
            }
            self.pos += 1;
        }

        let digits = &self.bytes[digits_start..self.pos];
        if digits.is_empty() {
            return Err(Error::EmptyInteger { pos: start });
        }
        if digits[0] == b'0' && digits.len() > 1 {
            return Err(Error::LeadingZeros { pos: digits_start });
        }
        if negative && digits == b"0" {
            return Err(Error::NegativeZero { pos: start });
        }
        self.pos += 1; // consume 'e'

        let text = std::str::from_utf8(digits).expect("digits are ASCII");
        let magnitude: i64 = if negative {
            format!("-{text}")
                .parse()
                .map_err(|_| Error::IntegerOverflow { pos: start })?
        } else {
            text.parse().map_err(|_| Error::IntegerOverflow { pos: start })?
        };

        Ok(Value::Integer(magnitude))
    }

    fn byte_string(&mut self) -> Result<Vec<u8>, Error> {
        let length_start = self.pos;
        while self.peek()? != b':' {
            let byte = self.bytes[self.pos];
            if !byte.is_ascii_digit() {
                return Err(Error::InvalidByte { byte, pos: self.pos });
            }
            self.pos += 1;
        }

        let digits = &self.bytes[length_start..self.pos];
        if digits[0] == b'0' && digits.len() > 1 {
            return Err(Error::LeadingZeros { pos: length_start });
        }
        let text = std::str::from_utf8(digits).expect("digits are ASCII");
        let length: usize = text
            .parse()
            .map_err(|_| Error::LengthOverflow { pos: length_start })?;
        self.pos += 1; // consume ':'

        if length > self.bytes.len() - self.pos {
            return Err(Error::LengthOverflow { pos: length_start });
        }

        let bytes = self.bytes[self.pos..self.pos + length].to_vec();
        self.pos += length;
        Ok(bytes)
    }

    fn list(&mut self) -> Result<Value, Error> {
        self.pos += 1; // consume 'l'
        let mut values = Vec::new();
        while self.peek()? != b'e' {
            values.push(self.value()?);
        }
        self.pos += 1; // consume 'e'
        Ok(Value::List(values))
    }

    fn dict(&mut self) -> Result<Value, Error> {
        self.pos += 1; // consume 'd'
        let mut entries = BTreeMap::new();
        let mut last_key: Option<Vec<u8>> = None;

        while self.peek()? != b'e' {
            let key_pos = self.pos;
            let key = match self.peek()? {
                b'0'..=b'9' => self.byte_string()?,
                byte => return Err(Error::InvalidByte { byte, pos: key_pos }),
            };

            if let Some(previous) = &last_key {
                if key == *previous {
                    return Err(Error::DuplicateKey { pos: key_pos });
                }
                if key < *previous {
                    return Err(Error::UnsortedKeys { pos: key_pos });
                }
            }

            let value = self.value()?;
            last_key = Some(key.clone());
            entries.insert(key, value);
        }
        self.pos += 1; // consume 'e'
        Ok(Value::Dict(entries))
    }
}

#[cfg(test)]
mod tests {
    use crate::{decode, encode, Error, Value};

    #[test]
    fn it_should_decode_the_four_value_kinds() {
        assert_eq!(decode(b"i-42e").unwrap(), Value::Integer(-42));
        assert_eq!(decode(b"4:spam").unwrap(), Value::from("spam"));
        assert_eq!(
            decode(b"l4:spami7ee").unwrap(),
            ben_list!(ben_bytes!("spam"), ben_int!(7))
        );
        assert_eq!(
            decode(b"d3:cow3:moo4:spam4:eggse").unwrap(),
            ben_map! {
                "cow" => ben_bytes!("moo"),
                "spam" => ben_bytes!("eggs"),
            }
        );
    }

    #[test]
    fn it_should_round_trip_every_kind_of_value() {
        let values = [
            Value::Integer(0),
            Value::Integer(i64::MIN),
            Value::from(vec![0x00_u8, 0xff, 0x20]),
            ben_list!(ben_list!(), ben_int!(-1)),
            ben_map! {
                "nested" => ben_map! { "k" => ben_bytes!("v") },
                "list" => ben_list!(ben_int!(1), ben_int!(2)),
            },
        ];

        for value in values {
            assert_eq!(decode(&encode(&value)).unwrap(), value);
        }
    }

    #[test]
    fn it_should_reject_non_minimal_integers() {
        assert_eq!(decode(b"i03e").unwrap_err(), Error::LeadingZeros { pos: 1 });
        assert_eq!(decode(b"i-0e").unwrap_err(), Error::NegativeZero { pos: 0 });
        assert_eq!(decode(b"i00e").unwrap_err(), Error::LeadingZeros { pos: 1 });
    }

    #[test]
    fn it_should_accept_a_plain_zero_integer() {
        assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
    }

    #[test]
    fn it_should_reject_an_empty_or_unterminated_integer() {
        assert_eq!(decode(b"ie").unwrap_err(), Error::EmptyInteger { pos: 0 });
        assert_eq!(decode(b"i-e").unwrap_err(), Error::EmptyInteger { pos: 0 });
        assert_eq!(decode(b"i42").unwrap_err(), Error::UnexpectedEnd { pos: 3 });
    }

    #[test]
    fn it_should_reject_truncated_input() {
        assert_eq!(decode(b"5:spam").unwrap_err(), Error::LengthOverflow { pos: 0 });
        assert_eq!(decode(b"l4:spam").unwrap_err(), Error::UnexpectedEnd { pos: 7 });
        assert_eq!(decode(b"d3:cow").unwrap_err(), Error::UnexpectedEnd { pos: 6 });
    }

    #[test]
    fn it_should_reject_trailing_bytes() {
        assert_eq!(decode(b"i1ei2e").unwrap_err(), Error::TrailingBytes { pos: 3 });
        assert_eq!(decode(b"4:spamX").unwrap_err(), Error::TrailingBytes { pos: 6 });
    }

    #[test]
    fn it_should_reject_unsorted_dictionary_keys() {
        assert_eq!(
            decode(b"d2:bb1:x2:aa1:ye").unwrap_err(),
            Error::UnsortedKeys { pos: 8 }
        );
    }

    #[test]
    fn it_should_reject_duplicate_dictionary_keys() {
        assert_eq!(
            decode(b"d1:a1:x1:a1:ye").unwrap_err(),
            Error::DuplicateKey { pos: 6 }
        );
    }

    #[test]
    fn it_should_reject_dictionary_keys_that_are_not_byte_strings() {
        assert_eq!(
            decode(b"di1e1:xe").unwrap_err(),
            Error::InvalidByte { byte: b'i', pos: 1 }
        );
    }

    #[test]
    fn it_should_reject_string_lengths_with_leading_zeros() {
        assert_eq!(decode(b"04:spam").unwrap_err(), Error::LeadingZeros { pos: 0 });
    }

    #[test]
    fn it_should_reject_garbage() {
        assert_eq!(decode(b"").unwrap_err(), Error::UnexpectedEnd { pos: 0 });
        assert_eq!(decode(b"x").unwrap_err(), Error::InvalidByte { byte: b'x', pos: 0 });
    }
}
