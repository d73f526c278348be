use crate::{id::RecordId, page::Value};

/// Field name under which a record's identifier is addressed in filters and
/// sort keys.
pub const ID_FIELD: &str = "_id";

/// A row as seen by the paginator: an identifier plus named scalar fields.
///
/// This is the paginator's only dependency on the row schema. It reads the
/// sort field and the identifier, and nothing else.
pub trait Record {
    /// The row's primary identifier, the tie-break key.
    fn id(&self) -> RecordId;

    /// Value of the named field, or `None` if the row has no such field or
    /// it holds something that is not a scalar.
    fn field(&self, name: &str) -> Option<Value>;

    /// Like [`Record::field`], but resolves [`ID_FIELD`] to [`Record::id`].
    fn value(&self, name: &str) -> Option<Value> {
        if name == ID_FIELD {
            Some(Value::Id(self.id()))
        } else {
            self.field(name)
        }
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn id(&self) -> RecordId {
        (**self).id()
    }

    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}
