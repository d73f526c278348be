use core::{fmt, str::FromStr};

use crate::{
    base32,
    id::RecordId,
    page::{Error, Record, Result, Value, ValueKind},
};

const CURSOR_VERSION: u8 = 1;
const HEADER_LEN: usize = 2;
const ID_LEN: usize = 8;

/// Position of the last row of a page: its sort-field value plus its
/// identifier.
///
/// A cursor is self-contained. Resuming from it only needs these two values,
/// so it stays valid after the row it was taken from is deleted.
///
/// On the wire it is an opaque Crockford base32 token over
/// `[version][kind tag][payload][id: u64 BE]`:
///
/// ```
/// use keyflake::{Cursor, RecordId, Value};
///
/// let cursor = Cursor::new(Value::Timestamp(1_700_000_000_123), RecordId::from(42, 2, 0));
/// let token = cursor.encode();
/// assert_eq!(Cursor::decode(&token).unwrap(), cursor);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor {
    pub value: Value,
    pub id: RecordId,
}

impl Cursor {
    pub const fn new(value: Value, id: RecordId) -> Self {
        Self { value, id }
    }

    /// Cursor positioned at `record`, or `None` if it has no `sort_field`.
    pub fn from_record<R: Record + ?Sized>(record: &R, sort_field: &str) -> Option<Self> {
        record
            .value(sort_field)
            .map(|value| Self::new(value, record.id()))
    }

    /// Encodes the cursor as an opaque token.
    pub fn encode(&self) -> String {
        let mut buf = Vec::with_capacity(HEADER_LEN + 8 + ID_LEN);
        buf.push(CURSOR_VERSION);
        buf.push(self.value.kind().tag());
        match &self.value {
            Value::Integer(v) | Value::Timestamp(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Value::Float(v) => buf.extend_from_slice(&v.to_bits().to_be_bytes()),
            Value::Text(v) => buf.extend_from_slice(v.as_bytes()),
            Value::Bool(v) => buf.push(u8::from(*v)),
            Value::Id(v) => buf.extend_from_slice(&v.to_u64().to_be_bytes()),
        }
        buf.extend_from_slice(&self.id.to_u64().to_be_bytes());
        base32::encode(&buf)
    }

    /// Decodes a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// - [`Error::CursorEncoding`] if the token is not valid base32
    /// - [`Error::CursorTruncated`] if it is too short to hold a cursor
    /// - [`Error::CursorVersion`] or [`Error::CursorValueTag`] for layouts
    ///   this version does not know
    /// - [`Error::CursorPayload`] if the payload does not fit its tag
    /// - [`Error::CursorId`] if an identifier sets the reserved bit
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = base32::decode(token.trim())?;
        if bytes.len() < HEADER_LEN + ID_LEN {
            return Err(Error::CursorTruncated { len: bytes.len() });
        }
        let (header, rest) = bytes.split_at(HEADER_LEN);
        let (payload, id) = rest.split_at(rest.len() - ID_LEN);

        if header[0] != CURSOR_VERSION {
            return Err(Error::CursorVersion { version: header[0] });
        }
        let kind = ValueKind::from_tag(header[1]).ok_or(Error::CursorValueTag { tag: header[1] })?;

        let value = match kind {
            ValueKind::Integer => Value::Integer(i64::from_be_bytes(fixed(payload)?)),
            ValueKind::Timestamp => Value::Timestamp(i64::from_be_bytes(fixed(payload)?)),
            ValueKind::Float => Value::Float(f64::from_bits(u64::from_be_bytes(fixed(payload)?))),
            ValueKind::Text => Value::Text(
                String::from_utf8(payload.to_vec()).map_err(|_| Error::CursorPayload)?,
            ),
            ValueKind::Bool => match payload {
                [0] => Value::Bool(false),
                [1] => Value::Bool(true),
                _ => return Err(Error::CursorPayload),
            },
            ValueKind::Id => Value::Id(record_id(fixed(payload)?)?),
        };

        Ok(Self::new(value, record_id(fixed(id)?)?))
    }
}

fn fixed(bytes: &[u8]) -> Result<[u8; 8]> {
    bytes.try_into().map_err(|_| Error::CursorPayload)
}

fn record_id(bytes: [u8; 8]) -> Result<RecordId> {
    let raw = u64::from_be_bytes(bytes);
    RecordId::try_from(raw).map_err(|_| Error::CursorId { raw })
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    use super::Cursor;

    impl Serialize for Cursor {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.encode())
        }
    }

    impl<'de> Deserialize<'de> for Cursor {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let token = String::deserialize(deserializer)?;
            Cursor::decode(&token).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(ts: u64) -> RecordId {
        RecordId::from(ts, 2, 7)
    }

    #[test]
    fn every_kind_round_trips() {
        let values = [
            Value::Integer(-42),
            Value::Integer(i64::MAX),
            Value::Float(-0.0),
            Value::Float(f64::NAN),
            Value::Timestamp(1_700_000_000_000),
            Value::Text(String::new()),
            Value::Text("naïve café".into()),
            Value::Bool(true),
            Value::Id(id(99)),
        ];
        for value in values {
            let kind = value.kind();
            let cursor = Cursor::new(value, id(5));
            let token = cursor.encode();
            let decoded = Cursor::decode(&token).unwrap();
            assert_eq!(decoded, cursor, "token {token}");
            assert_eq!(decoded.value.kind(), kind, "token {token}");
            assert_eq!(token.parse::<Cursor>().unwrap(), cursor);
        }
    }

    #[test]
    fn tokens_are_case_insensitive() {
        let cursor = Cursor::new(Value::Integer(7), id(1));
        let token = cursor.encode().to_ascii_lowercase();
        assert_eq!(Cursor::decode(&token).unwrap(), cursor);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Cursor::decode("not a cursor!"),
            Err(Error::CursorEncoding(_))
        ));
        assert_eq!(
            Cursor::decode(&base32::encode(&[1, 0, 0])).unwrap_err(),
            Error::CursorTruncated { len: 3 }
        );
    }

    #[test]
    fn rejects_unknown_version_and_tag() {
        let mut bytes = vec![9, 0];
        bytes.extend_from_slice(&[0; 16]);
        assert_eq!(
            Cursor::decode(&base32::encode(&bytes)).unwrap_err(),
            Error::CursorVersion { version: 9 }
        );
        bytes[0] = 1;
        bytes[1] = 77;
        assert_eq!(
            Cursor::decode(&base32::encode(&bytes)).unwrap_err(),
            Error::CursorValueTag { tag: 77 }
        );
    }

    #[test]
    fn rejects_malformed_payloads() {
        // Integer with a 3-byte payload.
        let mut bytes = vec![1, ValueKind::Integer.tag(), 1, 2, 3];
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(
            Cursor::decode(&base32::encode(&bytes)).unwrap_err(),
            Error::CursorPayload
        );

        // Bool that is neither 0 nor 1.
        let mut bytes = vec![1, ValueKind::Bool.tag(), 2];
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(
            Cursor::decode(&base32::encode(&bytes)).unwrap_err(),
            Error::CursorPayload
        );

        // Text that is not UTF-8.
        let mut bytes = vec![1, ValueKind::Text.tag(), 0xFF, 0xFE];
        bytes.extend_from_slice(&[0; 8]);
        assert_eq!(
            Cursor::decode(&base32::encode(&bytes)).unwrap_err(),
            Error::CursorPayload
        );
    }

    #[test]
    fn rejects_reserved_bit_in_id() {
        let mut bytes = vec![1, ValueKind::Bool.tag(), 1];
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(
            Cursor::decode(&base32::encode(&bytes)).unwrap_err(),
            Error::CursorId { raw: u64::MAX }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_token() {
        let cursor = Cursor::new(Value::Text("x".into()), id(3));
        let json = serde_json::to_string(&cursor).unwrap();
        assert_eq!(json, format!("\"{}\"", cursor.encode()));
        let back: Cursor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cursor);
        assert!(serde_json::from_str::<Cursor>("\"###\"").is_err());
    }
}
