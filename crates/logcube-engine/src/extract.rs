use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use logcube_types::{FieldExtractor, Record, Schema};

/// Schema-driven extraction of records from raw log lines
#[derive(Clone, Debug)]
pub struct ExtractionEngine {
    schema: Arc<Schema>,
}

impl ExtractionEngine {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Extract records from every line, in input order
    pub fn extract<I, S>(&self, lines: I) -> Vec<Record>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        let mut line_count = 0usize;
        for line in lines {
            line_count += 1;
            records.extend(self.extract_line(line.as_ref()));
        }
        debug!(
            schema = self.schema.name(),
            lines = line_count,
            records = records.len(),
            "extraction finished"
        );
        records
    }

    /// Extract the records found on a single line.
    ///
    /// Single-value fields contribute their first match. Each match of a
    /// multi-value field starts a separate record sharing the single-value
    /// fields of the line. Lines where a key field has no value yield nothing.
    pub fn extract_line(&self, line: &str) -> Vec<Record> {
        let line = line.trim_end_matches(['\r', '\n']);

        let mut rows: Vec<HashMap<&str, String>> = vec![HashMap::new()];
        for field in self.schema.fields() {
            let mut values = Self::field_values(field, line);
            match values.len() {
                0 => {}
                1 => {
                    let value = values.remove(0);
                    for row in &mut rows {
                        row.insert(field.title(), value.clone());
                    }
                }
                _ => {
                    rows = rows
                        .into_iter()
                        .flat_map(|row| {
                            values.iter().map(move |value| {
                                let mut row = row.clone();
                                row.insert(field.title(), value.clone());
                                row
                            })
                        })
                        .collect();
                }
            }
        }

        let missing_key = self
            .schema
            .key_order()
            .iter()
            .find(|key| !rows[0].contains_key(key.as_str()));
        if let Some(key) = missing_key {
            trace!(key = key.as_str(), line, "line skipped, key field not found");
            return Vec::new();
        }

        rows.into_iter()
            .filter_map(|row| Record::new(Arc::clone(&self.schema), row).ok())
            .collect()
    }

    /// Values of one field on a line, honouring the multi-value and numeric flags
    fn field_values(field: &FieldExtractor, line: &str) -> Vec<String> {
        let mut values = Vec::new();
        let mut cursor = 0;

        while let Some((value, next)) = scan(field, line, cursor) {
            if field.accepts(value) {
                values.push(value.to_string());
            } else {
                trace!(field = field.title(), value, "non-numeric value dropped");
            }
            if !field.multi_value || next <= cursor || next >= line.len() {
                break;
            }
            cursor = next;
        }

        values
    }
}

/// Locate one value of `field` at or after byte offset `from`.
///
/// Returns the value and the offset where the next search may resume. A
/// start marker without a following end marker yields nothing.
fn scan<'a>(field: &FieldExtractor, line: &'a str, from: usize) -> Option<(&'a str, usize)> {
    let rest = line.get(from..)?;
    let value_start = from + rest.find(field.start.as_str())? + field.start.len();

    match field.end_marker() {
        Some(end) => {
            let length = line[value_start..].find(end)?;
            let value_end = value_start + length;
            Some((&line[value_start..value_end], value_end + end.len()))
        }
        None => Some((&line[value_start..], line.len())),
    }
}
