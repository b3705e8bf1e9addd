//! Extraction and cube engine for logcube
//!
//! This crate turns raw log lines into records using a [`Schema`], stores
//! them in a [`Cube`] and derives grouped, filtered and searched cubes.

pub mod assertions;
mod cube;
mod extract;
mod filter;
mod ingest;

pub use cube::Cube;
pub use extract::ExtractionEngine;
pub use filter::Criteria;
pub use ingest::{cube_from_lines, generate_cube, generate_cube_from_definition, read_lines};

// Re-export types used in our public API
pub use logcube_types::{Error, FieldExtractor, Record, Result, Schema, SchemaBuilder};
