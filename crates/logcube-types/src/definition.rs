//! Schema interchange with JSON and TOML definition files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extractor::FieldExtractor;
use crate::schema::Schema;

/// On-disk form of a [`Schema`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub fields: Vec<FieldExtractor>,

    /// Key field titles; empty means every field in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

impl SchemaDefinition {
    /// Validate into a schema
    pub fn into_schema(self) -> Result<Schema> {
        Schema::builder(self.title)
            .fields(self.fields)
            .keys(self.keys)
            .build()
    }
}

impl From<&Schema> for SchemaDefinition {
    fn from(schema: &Schema) -> Self {
        let declaration_order = schema
            .fields()
            .iter()
            .map(|f| f.title.as_str())
            .eq(schema.key_order().iter().map(String::as_str));

        Self {
            title: schema.name().to_string(),
            fields: schema.fields().to_vec(),
            keys: if declaration_order {
                Vec::new()
            } else {
                schema.key_order().to_vec()
            },
        }
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl Schema {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str::<SchemaDefinition>(content)?.into_schema()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<SchemaDefinition>(content)?.into_schema()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SchemaDefinition::from(self))?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&SchemaDefinition::from(self))?)
    }

    /// Load a definition file, picking the format from its extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match format {
            Format::Json => Self::from_json_str(&content),
            Format::Toml => Self::from_toml_str(&content),
        }
    }

    /// Save a definition file, picking the format from its extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = match Format::from_path(path)? {
            Format::Json => self.to_json_string()?,
            Format::Toml => self.to_toml_string()?,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACC_JSON: &str = r##"{
        "title": "ACC Coverage",
        "fields": [
            { "title": "path", "start": "HEADER ACTION ", "end": "#" },
            { "title": "verb", "start": "#" }
        ]
    }"##;

    #[test]
    fn test_parse_json_definition() {
        let schema = Schema::from_json_str(ACC_JSON).unwrap();
        assert_eq!(schema.name(), "ACC Coverage");
        assert_eq!(schema.key_order(), ["path", "verb"]);
        assert_eq!(schema.field("verb").unwrap().end_marker(), None);
        assert!(!schema.field("path").unwrap().numeric);
    }

    #[test]
    fn test_parse_toml_definition_with_keys() {
        let content = r##"
title = "durations"
keys = ["path"]

[[fields]]
title = "path"
start = "HEADER ACTION "
end = "#"

[[fields]]
title = "duration"
start = "took "
end = "ms"
numeric = true
"##;
        let schema = Schema::from_toml_str(content).unwrap();
        assert_eq!(schema.key_order(), ["path"]);
        assert!(schema.field("duration").unwrap().numeric);
    }

    #[test]
    fn test_undefined_key_fails_at_load() {
        let content = r#"{ "title": "bad", "fields": [{ "title": "a", "start": "a=" }], "keys": ["b"] }"#;
        assert!(matches!(
            Schema::from_json_str(content),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_save_and_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Schema::builder("acc")
            .field(FieldExtractor::between("path", "HEADER ACTION ", "#"))
            .field(FieldExtractor::after("verb", "#").multi_value())
            .key("verb")
            .build()
            .unwrap();

        for name in ["acc.json", "nested/acc.toml"] {
            let path = dir.path().join(name);
            schema.save(&path).unwrap();
            assert_eq!(Schema::load(&path).unwrap(), schema);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Schema::load("definition.yaml").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(Schema::load(&path), Err(Error::Read { path: p, .. }) if p == path));
    }
}
