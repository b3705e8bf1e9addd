use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::extractor::FieldExtractor;

/// Separator placed between key-field values in a composite key.
///
/// Values are joined without escaping, so key values that themselves contain
/// `#` can collide: `("a#b", "c")` and `("a", "b#c")` both give `a#b#c`. A cube
/// treats such records as the same entry.
pub const KEY_SEPARATOR: &str = "#";

/// Ordered field extractors plus the key fields defining record identity.
///
/// A schema is validated once by [`SchemaBuilder::build`] and is immutable
/// afterwards; records and cubes share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldExtractor>,
    key_order: Vec<String>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Build a schema keyed on all fields, in declaration order
    pub fn with_fields(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldExtractor>,
    ) -> Result<Self> {
        SchemaBuilder::new(name).fields(fields).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldExtractor] {
        &self.fields
    }

    /// Key field titles, in composite key order
    pub fn key_order(&self) -> &[String] {
        &self.key_order
    }

    pub fn field(&self, title: &str) -> Option<&FieldExtractor> {
        self.fields.iter().find(|f| f.title == title)
    }

    pub fn has_field(&self, title: &str) -> bool {
        self.field(title).is_some()
    }

    pub fn is_key_field(&self, title: &str) -> bool {
        self.key_order.iter().any(|k| k == title)
    }

    /// Fail with `UnknownField` unless `title` is declared
    pub fn require_field(&self, title: &str) -> Result<&FieldExtractor> {
        self.field(title)
            .ok_or_else(|| Error::UnknownField(title.to_string()))
    }

    /// Derive a schema reduced to `titles`.
    ///
    /// The given order becomes both the field order and the key order of the
    /// projection. Every title is checked before anything is built.
    pub fn project<S: AsRef<str>>(&self, titles: &[S]) -> Result<Self> {
        if titles.is_empty() {
            return Err(Error::Configuration(
                "at least one field is required to group by".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(titles.len());
        for title in titles {
            let field = self.require_field(title.as_ref())?;
            if seen.insert(field.title.as_str()) {
                fields.push(field.clone());
            }
        }

        let key_order = fields.iter().map(|f| f.title.clone()).collect();
        Ok(Self {
            name: self.name.clone(),
            fields,
            key_order,
        })
    }
}

/// Incremental construction of a [`Schema`].
///
/// An empty builder is a valid transient state; validation happens in
/// [`SchemaBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldExtractor>,
    keys: Vec<String>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldExtractor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldExtractor>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Append a key field; keys keep the order they are added in
    pub fn key(mut self, title: impl Into<String>) -> Self {
        self.keys.push(title.into());
        self
    }

    pub fn keys<S: Into<String>>(mut self, titles: impl IntoIterator<Item = S>) -> Self {
        self.keys.extend(titles.into_iter().map(Into::into));
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Without explicit keys every field is a key field, in declaration order.
    pub fn build(self) -> Result<Schema> {
        if self.fields.is_empty() {
            return Err(Error::Configuration(format!(
                "schema '{}' declares no fields",
                self.name
            )));
        }

        let mut titles = HashSet::new();
        for field in &self.fields {
            if field.title.is_empty() {
                return Err(Error::Configuration(format!(
                    "schema '{}' has a field without a title",
                    self.name
                )));
            }
            if !titles.insert(field.title.as_str()) {
                return Err(Error::Configuration(format!(
                    "field '{}' is declared twice in schema '{}'",
                    field.title, self.name
                )));
            }
        }

        let key_order = if self.keys.is_empty() {
            self.fields.iter().map(|f| f.title.clone()).collect()
        } else {
            let mut seen = HashSet::new();
            for key in &self.keys {
                if !titles.contains(key.as_str()) {
                    return Err(Error::Configuration(format!(
                        "key field '{}' is not declared in schema '{}'",
                        key, self.name
                    )));
                }
                if !seen.insert(key.as_str()) {
                    return Err(Error::Configuration(format!(
                        "key field '{}' is listed twice in schema '{}'",
                        key, self.name
                    )));
                }
            }
            self.keys
        };

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            key_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::builder("tmp")
            .field(FieldExtractor::new("AAZ"))
            .field(FieldExtractor::new("ZZZ"))
            .field(FieldExtractor::new("BAU"))
            .field(FieldExtractor::new("DAT"))
            .key("AAZ")
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_key_order_is_declaration_order() {
        let schema = Schema::with_fields(
            "acc",
            [
                FieldExtractor::between("path", "HEADER ACTION ", "#"),
                FieldExtractor::after("verb", "#"),
            ],
        )
        .unwrap();
        assert_eq!(schema.key_order(), ["path", "verb"]);
    }

    #[test]
    fn test_explicit_keys() {
        let schema = sample();
        assert_eq!(schema.key_order(), ["AAZ"]);
        assert!(schema.is_key_field("AAZ"));
        assert!(!schema.is_key_field("ZZZ"));
    }

    #[test]
    fn test_undefined_key_is_rejected() {
        let err = Schema::builder("tmp")
            .field(FieldExtractor::new("AAZ"))
            .key("KAU")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_and_duplicate_fields_are_rejected() {
        assert!(matches!(
            Schema::builder("empty").build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Schema::builder("dup")
                .field(FieldExtractor::new("a"))
                .field(FieldExtractor::new("a"))
                .build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Schema::builder("untitled")
                .field(FieldExtractor::new(""))
                .build(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_project_uses_requested_order() {
        let projected = sample().project(&["DAT", "BAU"]).unwrap();
        let titles: Vec<_> = projected.fields().iter().map(|f| f.title()).collect();
        assert_eq!(titles, ["DAT", "BAU"]);
        assert_eq!(projected.key_order(), ["DAT", "BAU"]);
    }

    #[test]
    fn test_project_unknown_field() {
        let err = sample().project(&["BAU", "KAU"]).unwrap_err();
        assert!(matches!(err, Error::UnknownField(title) if title == "KAU"));
    }

    #[test]
    fn test_project_requires_a_field() {
        let err = sample().project::<&str>(&[]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_project_collapses_repeated_titles() {
        let projected = sample().project(&["BAU", "BAU"]).unwrap();
        assert_eq!(projected.fields().len(), 1);
    }
}
