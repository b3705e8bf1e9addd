use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by schema construction, cube queries and ingestion.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema is unusable: undefined key field, duplicate title, no fields
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Field title not declared in the active schema
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// No record stored under the given key
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// Record is missing a value for one of its key fields
    #[error("record has no value for key field '{0}'")]
    MissingKeyField(String),

    /// Key fields define the record identity and cannot be rewritten in place
    #[error("key field '{0}' cannot be modified in place")]
    KeyFieldImmutable(String),

    /// Failed to read an input file
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Definition file extension is neither json nor toml
    #[error("unsupported definition format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON definition error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML definition error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
