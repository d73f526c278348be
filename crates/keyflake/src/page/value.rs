use core::{cmp::Ordering, fmt, str::FromStr};

use crate::{id::RecordId, page::Error};

/// A storage-neutral scalar: the value of a sort field or a filter operand.
///
/// `Ord` is total. Numbers (integers, floats, timestamps) order by value
/// across kinds and come first, then text, booleans and identifiers.
/// Filters use [`Value::compare`], which is the same order restricted to
/// comparable kinds.
#[derive(Clone, Debug)]
pub enum Value {
    Integer(i64),
    Float(f64),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Text(String),
    Bool(bool),
    Id(RecordId),
}

/// The kind of a [`Value`], also its tag in an encoded cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Integer = 0,
    Float = 1,
    Timestamp = 2,
    Text = 3,
    Bool = 4,
    Id = 5,
}

impl ValueKind {
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Integer,
            1 => Self::Float,
            2 => Self::Timestamp,
            3 => Self::Text,
            4 => Self::Bool,
            5 => Self::Id,
            _ => return None,
        })
    }

    /// Parses `raw` as a value of this kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValueKind`] if `raw` is not a valid literal
    /// for the kind.
    pub fn parse_value(self, raw: &str) -> Result<Value, Error> {
        let invalid = || Error::InvalidValueKind {
            input: format!("{raw:?} as {self}"),
        };
        Ok(match self {
            Self::Integer => Value::Integer(raw.trim().parse().map_err(|_| invalid())?),
            Self::Float => Value::Float(raw.trim().parse().map_err(|_| invalid())?),
            Self::Timestamp => Value::Timestamp(raw.trim().parse().map_err(|_| invalid())?),
            Self::Text => Value::Text(raw.to_owned()),
            Self::Bool => Value::Bool(raw.trim().parse().map_err(|_| invalid())?),
            Self::Id => Value::Id(raw.parse().map_err(|_| invalid())?),
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Timestamp => "timestamp",
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Id => "id",
        })
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Self::Integer,
            "float" | "number" => Self::Float,
            "timestamp" | "date" => Self::Timestamp,
            "text" | "string" => Self::Text,
            "bool" | "boolean" => Self::Bool,
            "id" => Self::Id,
            _ => {
                return Err(Error::InvalidValueKind {
                    input: s.to_owned(),
                });
            }
        })
    }
}

impl Value {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Text(_) => ValueKind::Text,
            Self::Bool(_) => ValueKind::Bool,
            Self::Id(_) => ValueKind::Id,
        }
    }

    /// Compares two values for filtering.
    ///
    /// Returns `None` when the kinds are not comparable. Integers, floats and
    /// timestamps share one number line, since documents mix `4` with `4.5`
    /// and store dates as integer milliseconds. Whenever this returns
    /// `Some`, it agrees with [`Ord`].
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        (self.rank() == other.rank()).then(|| self.cmp(other))
    }

    /// Kind order used by [`Ord`]; every numeric kind shares rank 0.
    const fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Float(_) | Self::Timestamp(_) => 0,
            Self::Text(_) => 1,
            Self::Bool(_) => 2,
            Self::Id(_) => 3,
        }
    }
}

/// Numeric order over floats: `-0.0 == 0.0`, NaNs sit past the infinities
/// on the side of their sign bit.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Exact comparison of an integer with a float, consistent with
/// [`cmp_floats`].
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, the first float past i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    // `f` is in [-2^63, 2^63), so its integral part converts exactly.
    let whole = f.trunc();
    #[allow(clippy::cast_possible_truncation)]
    let whole_int = whole as i64;
    i.cmp(&whole_int).then_with(|| cmp_floats(whole, f))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Self::Integer(a) | Self::Timestamp(a),
                Self::Integer(b) | Self::Timestamp(b),
            ) => a.cmp(b),
            (Self::Integer(a) | Self::Timestamp(a), Self::Float(b)) => cmp_int_float(*a, *b),
            (Self::Float(a), Self::Integer(b) | Self::Timestamp(b)) => {
                cmp_int_float(*b, *a).reverse()
            }
            (Self::Float(a), Self::Float(b)) => cmp_floats(*a, *b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Id(a), Self::Id(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Id(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<RecordId> for Value {
    fn from(v: RecordId) -> Self {
        Self::Id(v)
    }
}
