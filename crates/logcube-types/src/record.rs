use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::{KEY_SEPARATOR, Schema};

/// One extracted tuple of field values.
///
/// Two records are equal when their values are equal; frequency and the
/// schema they were produced under are not part of equality.
#[derive(Clone, Debug)]
pub struct Record {
    /// Extracted values by field title
    values: HashMap<String, String>,

    /// Number of source occurrences merged into this record
    frequency: u64,

    /// Producing schema
    schema: Arc<Schema>,
}

impl Record {
    /// Create a record with frequency 1.
    ///
    /// Every title must be declared by `schema` and every key field must have
    /// a value.
    pub fn new<K, V>(schema: Arc<Schema>, values: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values: HashMap<String, String> = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if let Some(title) = values.keys().find(|title| !schema.has_field(title)) {
            return Err(Error::UnknownField(title.clone()));
        }
        if let Some(key) = schema.key_order().iter().find(|k| !values.contains_key(*k)) {
            return Err(Error::MissingKeyField(key.clone()));
        }

        Ok(Self {
            values,
            frequency: 1,
            schema,
        })
    }

    pub fn with_frequency(mut self, frequency: u64) -> Self {
        self.frequency = frequency.max(1);
        self
    }

    /// Composite key: key-field values in key order joined by `#`
    pub fn key(&self) -> String {
        self.schema
            .key_order()
            .iter()
            .map(|title| self.get(title).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR)
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.values.get(title).map(String::as_str)
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Fold `by` more occurrences into this record
    pub fn increment_frequency(&mut self, by: u64) {
        self.frequency = self.frequency.saturating_add(by);
    }

    /// Overwrite a non-key value in place; frequency is unchanged
    pub fn set(&mut self, title: &str, value: impl Into<String>) -> Result<()> {
        self.schema.require_field(title)?;
        if self.schema.is_key_field(title) {
            return Err(Error::KeyFieldImmutable(title.to_string()));
        }
        self.values.insert(title.to_string(), value.into());
        Ok(())
    }

    /// Re-express this record under a projected schema.
    ///
    /// Fields missing from this record take the empty string so the result
    /// always carries every key field of `schema`. Frequency is kept.
    pub fn project(&self, schema: &Arc<Schema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| {
                let value = self.get(&field.title).unwrap_or_default().to_string();
                (field.title.clone(), value)
            })
            .collect();

        Self {
            values,
            frequency: self.frequency,
            schema: Arc::clone(schema),
        }
    }

    /// Check a value against a field title; undeclared titles never match
    pub fn has_value(&self, title: &str, value: &str) -> bool {
        self.get(title) == Some(value)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Record {}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.schema.fields() {
            write!(f, "{} | ", self.get(&field.title).unwrap_or_default())?;
        }
        write!(f, "{}", self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FieldExtractor;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder("tmp")
                .field(FieldExtractor::new("AAZ"))
                .field(FieldExtractor::new("ZZZ"))
                .field(FieldExtractor::new("BAU"))
                .field(FieldExtractor::new("DAT"))
                .key("AAZ")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_key_and_equality() {
        let schema = schema();
        let a = Record::new(schema.clone(), [("AAZ", "12"), ("ZZZ", "14")]).unwrap();
        let b = Record::new(schema, [("AAZ", "12"), ("ZZZ", "14")])
            .unwrap()
            .with_frequency(5);
        assert_eq!(a.key(), "12");
        assert_eq!(a, b);
        assert_eq!(b.frequency(), 5);
    }

    #[test]
    fn test_composite_key_order() {
        let schema = Arc::new(
            Schema::builder("acc")
                .field(FieldExtractor::between("path", "HEADER ACTION ", "#"))
                .field(FieldExtractor::after("verb", "#"))
                .build()
                .unwrap(),
        );
        let record = Record::new(schema, [("verb", "PrepareFromId"), ("path", "nms:delivery")]).unwrap();
        assert_eq!(record.key(), "nms:delivery#PrepareFromId");
    }

    #[test]
    fn test_new_validates_titles_and_keys() {
        let schema = schema();
        assert!(matches!(
            Record::new(schema.clone(), [("ZZZ", "14")]),
            Err(Error::MissingKeyField(key)) if key == "AAZ"
        ));
        assert!(matches!(
            Record::new(schema, [("AAZ", "12"), ("NONo", "1")]),
            Err(Error::UnknownField(title)) if title == "NONo"
        ));
    }

    #[test]
    fn test_set_rejects_key_and_unknown_fields() {
        let mut record = Record::new(schema(), [("AAZ", "12"), ("ZZZ", "14")]).unwrap();
        record.set("ZZZ", "14,5").unwrap();
        assert_eq!(record.get("ZZZ"), Some("14,5"));
        assert!(matches!(record.set("AAZ", "13"), Err(Error::KeyFieldImmutable(_))));
        assert!(matches!(record.set("PPP", "1"), Err(Error::UnknownField(_))));
    }

    #[test]
    fn test_project_fills_missing_values() {
        let schema = schema();
        let record = Record::new(schema.clone(), [("AAZ", "12"), ("BAU", "13")])
            .unwrap()
            .with_frequency(3);
        let projected_schema = Arc::new(schema.project(&["BAU", "DAT"]).unwrap());
        let projected = record.project(&projected_schema);
        assert_eq!(projected.key(), "13#");
        assert_eq!(projected.values().len(), 2);
        assert_eq!(projected.frequency(), 3);
    }

    #[test]
    fn test_display_lists_values_then_frequency() {
        let record = Record::new(schema(), [("AAZ", "12"), ("ZZZ", "14"), ("BAU", "13"), ("DAT", "AA")])
            .unwrap();
        assert_eq!(record.to_string(), "12 | 14 | 13 | AA | 1");
    }
}
