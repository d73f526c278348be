use core::{cmp::Ordering, fmt, str::FromStr};

use crate::page::{Error, Filter, Value};

/// Order of a keyset scan.
///
/// The same direction applies to the sort field and to the identifier
/// tie-break, which is what makes the composite key a total order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Filter for rows whose `field` lies past `boundary` in scan order:
    /// `>` when ascending, `<` when descending.
    pub fn beyond(self, field: impl Into<String>, boundary: impl Into<Value>) -> Filter {
        match self {
            Self::Ascending => Filter::gt(field, boundary),
            Self::Descending => Filter::lt(field, boundary),
        }
    }

    /// Maps an ascending comparison into scan order.
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    /// Integer form used on the wire: `1` or `-1`.
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }

    pub const fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Ascending),
            "-1" => Ok(Self::Descending),
            t if t.eq_ignore_ascii_case("asc") || t.eq_ignore_ascii_case("ascending") => {
                Ok(Self::Ascending)
            }
            t if t.eq_ignore_ascii_case("desc") || t.eq_ignore_ascii_case("descending") => {
                Ok(Self::Descending)
            }
            _ => Err(Error::InvalidDirection {
                input: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<i64> for SortDirection {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Ascending),
            -1 => Ok(Self::Descending),
            other => Err(Error::InvalidDirection {
                input: other.to_string(),
            }),
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use core::fmt;

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{self, Visitor},
    };

    use super::SortDirection;

    impl Serialize for SortDirection {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_i8(self.as_i8())
        }
    }

    struct DirectionVisitor;

    impl Visitor<'_> for DirectionVisitor {
        type Value = SortDirection;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("1, -1, \"asc\" or \"desc\"")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            SortDirection::try_from(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            match v {
                1 => Ok(SortDirection::Ascending),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for SortDirection {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(DirectionVisitor)
        }
    }
}
