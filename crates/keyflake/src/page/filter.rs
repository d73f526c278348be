use core::{cmp::Ordering, fmt};

use crate::page::{Record, Value};

/// A storage-neutral filter expression.
///
/// The paginator produces these and the storage collaborator translates them
/// into its own query language. [`Filter::matches`] evaluates one in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    /// Matches every row.
    #[default]
    All,
    Eq { field: String, value: Value },
    Gt { field: String, value: Value },
    Gte { field: String, value: Value },
    Lt { field: String, value: Value },
    Lte { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lte {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Conjunction of `self` and `other`.
    ///
    /// `All` is the identity and nested `And`s are flattened, so repeated
    /// augmentation does not build a deep tree.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, f) | (f, Self::All) => f,
            (Self::And(mut a), Self::And(b)) => {
                a.extend(b);
                Self::And(a)
            }
            (Self::And(mut a), f) => {
                a.push(f);
                Self::And(a)
            }
            (f, Self::And(mut b)) => {
                b.insert(0, f);
                Self::And(b)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Disjunction of `self` and `other`. Nested `Or`s are flattened.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Or(mut a), Self::Or(b)) => {
                a.extend(b);
                Self::Or(a)
            }
            (Self::Or(mut a), f) => {
                a.push(f);
                Self::Or(a)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    /// Evaluates the filter against `record`.
    ///
    /// A comparison on a field the record lacks, or against a value of an
    /// incomparable kind, does not match.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let cmp = |field: &str, value: &Value| {
            record.value(field).and_then(|v| v.compare(value))
        };
        match self {
            Self::All => true,
            Self::Eq { field, value } => cmp(field, value) == Some(Ordering::Equal),
            Self::Gt { field, value } => cmp(field, value) == Some(Ordering::Greater),
            Self::Gte { field, value } => {
                matches!(cmp(field, value), Some(Ordering::Greater | Ordering::Equal))
            }
            Self::Lt { field, value } => cmp(field, value) == Some(Ordering::Less),
            Self::Lte { field, value } => {
                matches!(cmp(field, value), Some(Ordering::Less | Ordering::Equal))
            }
            Self::In { field, values } => values
                .iter()
                .any(|value| cmp(field, value) == Some(Ordering::Equal)),
            Self::And(filters) => filters.iter().all(|f| f.matches(record)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(record)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, filters: &[Filter], op: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, filter) in filters.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{filter}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::All => f.write_str("true"),
            Self::Eq { field, value } => write!(f, "{field} = {value}"),
            Self::Gt { field, value } => write!(f, "{field} > {value}"),
            Self::Gte { field, value } => write!(f, "{field} >= {value}"),
            Self::Lt { field, value } => write!(f, "{field} < {value}"),
            Self::Lte { field, value } => write!(f, "{field} <= {value}"),
            Self::In { field, values } => {
                write!(f, "{field} in [")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::And(filters) => join(f, filters, "AND"),
            Self::Or(filters) => join(f, filters, "OR"),
        }
    }
}
