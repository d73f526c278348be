use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value as Json};

use crate::{
    id::RecordId,
    page::{Error, ID_FIELD, Record, Value},
};

/// A [`Record`] backed by a JSON object, as returned by a document store.
///
/// The identifier is read from `_id` (or `id`), as a decimal string or a
/// non-negative integer. Other fields map by JSON kind: integers become
/// [`Value::Integer`], other numbers [`Value::Float`], strings
/// [`Value::Text`], booleans [`Value::Bool`]. Timestamps are expected as
/// integer milliseconds. Nulls, arrays and objects are not scalar fields.
///
/// ```
/// use keyflake::{Record, Value, page::JsonRecord};
///
/// let row: JsonRecord = serde_json::from_str(
///     r#"{ "_id": "7340032", "title": "Dune", "created_at": 1700000000000 }"#,
/// )
/// .unwrap();
/// assert_eq!(row.id().to_u64(), 7_340_032);
/// assert_eq!(row.field("created_at"), Some(Value::Integer(1_700_000_000_000)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct JsonRecord {
    id: RecordId,
    object: Map<String, Json>,
}

impl JsonRecord {
    /// The underlying document, identifier field included.
    pub fn as_object(&self) -> &Map<String, Json> {
        &self.object
    }

    pub fn into_object(self) -> Map<String, Json> {
        self.object
    }
}

fn parse_id(raw: &Json) -> Result<RecordId, Error> {
    let invalid = |reason: String| Error::InvalidRecord { reason };
    match raw {
        Json::String(s) => s.parse().map_err(|e| invalid(format!("identifier: {e}"))),
        Json::Number(n) => {
            let raw = n
                .as_u64()
                .ok_or_else(|| invalid(format!("identifier {n} is not a u64")))?;
            RecordId::try_from(raw).map_err(|e| invalid(format!("identifier: {e}")))
        }
        other => Err(invalid(format!("identifier must be a string or integer, got {other}"))),
    }
}

impl TryFrom<Map<String, Json>> for JsonRecord {
    type Error = Error;

    fn try_from(object: Map<String, Json>) -> Result<Self, Self::Error> {
        let raw = object
            .get(ID_FIELD)
            .or_else(|| object.get("id"))
            .ok_or_else(|| Error::InvalidRecord {
                reason: "missing `_id` field".to_owned(),
            })?;
        let id = parse_id(raw)?;
        Ok(Self { id, object })
    }
}

impl TryFrom<Json> for JsonRecord {
    type Error = Error;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        match json {
            Json::Object(object) => Self::try_from(object),
            other => Err(Error::InvalidRecord {
                reason: format!("expected an object, got {other}"),
            }),
        }
    }
}

impl Record for JsonRecord {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match self.object.get(name)? {
            Json::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float)),
            Json::String(s) => Some(Value::Text(s.clone())),
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Null | Json::Array(_) | Json::Object(_) => None,
        }
    }
}

impl Serialize for JsonRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.object.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::deserialize(deserializer)?;
        Self::try_from(object).map_err(de::Error::custom)
    }
}
