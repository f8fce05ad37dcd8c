use super::Fields;

/// A document read from or written to the store.
///
/// The id is kept apart from the field map; the portable JSON form carries
/// it inline as the first key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Builder-style helper for setting a single field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<super::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
