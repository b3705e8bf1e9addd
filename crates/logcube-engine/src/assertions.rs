//! Test helpers that turn cube lookups into assertion failures.

use std::path::Path;
use std::sync::Arc;

use logcube_types::Schema;

use crate::cube::Cube;
use crate::ingest::generate_cube;

/// Panic unless some record of `cube` has `field` equal to `value`
#[track_caller]
pub fn assert_log_contains(cube: &Cube, field: &str, value: &str) {
    assert_log_contains_msg("", cube, field, value);
}

/// Panic with `message` unless some record of `cube` has `field` equal to `value`
#[track_caller]
pub fn assert_log_contains_msg(message: &str, cube: &Cube, field: &str, value: &str) {
    if !cube.is_entry_present(field, value) {
        panic!(
            "{}no entry with {field} = '{value}' found among {} entries",
            prefix(message),
            cube.len()
        );
    }
}

/// Ingest `paths` with `schema`, then assert as [`assert_log_contains_msg`].
///
/// An ingestion failure is reported as an assertion failure as well.
#[track_caller]
pub fn assert_files_contain<P: AsRef<Path>>(
    message: &str,
    paths: &[P],
    schema: Arc<Schema>,
    field: &str,
    value: &str,
) {
    match generate_cube(paths, schema) {
        Ok(cube) => assert_log_contains_msg(message, &cube, field, value),
        Err(e) => panic!(
            "{}could not build log data while looking for {field} = '{value}': {e}",
            prefix(message)
        ),
    }
}

fn prefix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!("{message}: ")
    }
}
