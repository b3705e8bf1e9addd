//! Shared types for logcube
//!
//! This crate contains the extraction schema, the records it produces and
//! the error type used across the logcube crates.

mod definition;
mod error;
mod extractor;
mod record;
mod schema;

pub use definition::SchemaDefinition;
pub use error::{Error, Result};
pub use extractor::FieldExtractor;
pub use record::Record;
pub use schema::{KEY_SEPARATOR, Schema, SchemaBuilder};
