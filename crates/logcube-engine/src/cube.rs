use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use tracing::{debug, warn};

use logcube_types::{Error, Record, Result, Schema};

use crate::filter::Criteria;

/// Records stored under their composite key, with duplicates merged.
///
/// Every stored record satisfies `record.key() == key`. Derived cubes from
/// [`Cube::group_by`], [`Cube::filter_by`] and the search methods are new
/// values; the source cube is never modified by them.
#[derive(Clone, Debug)]
pub struct Cube {
    /// Schema used to key records and validate field names
    schema: Arc<Schema>,

    /// Records by composite key
    entries: BTreeMap<String, Record>,
}

impl Cube {
    /// Create an empty cube
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            entries: BTreeMap::new(),
        }
    }

    /// Create a cube holding a single record, under the record's schema
    pub fn from_record(record: Record) -> Self {
        let mut cube = Self::new(Arc::clone(record.schema()));
        cube.entries.insert(record.key(), record);
        cube
    }

    /// Create a cube from an existing key to record mapping.
    ///
    /// Each key must be the record's composite key under `schema`.
    pub fn from_entries(schema: Arc<Schema>, entries: impl IntoIterator<Item = (String, Record)>) -> Result<Self> {
        let mut cube = Self::new(schema);
        for (key, record) in entries {
            let record = cube.adopt(record)?;
            let actual = record.key();
            if actual != key {
                return Err(Error::Configuration(format!(
                    "entry stored under '{key}' has key '{actual}'"
                )));
            }
            cube.merge(key, record);
        }
        Ok(cube)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Insert a record, merging it into an existing entry with the same key.
    ///
    /// A merged record adds its frequency to the stored one. When the stored
    /// record holds different values under the same key, the first-seen
    /// values are kept.
    pub fn add_entry(&mut self, record: Record) -> Result<()> {
        let record = self.adopt(record)?;
        let key = record.key();
        self.merge(key, record);
        Ok(())
    }

    /// Insert many records in order
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) -> Result<()> {
        records.into_iter().try_for_each(|record| self.add_entry(record))
    }

    /// Merge-on-key reducer shared by insertion and grouping
    fn merge(&mut self, key: String, record: Record) {
        match self.entries.entry(key) {
            Entry::Occupied(mut existing) => {
                if existing.get() != &record {
                    warn!(
                        key = existing.key().as_str(),
                        "records share a key but differ in values, keeping the first"
                    );
                }
                existing.get_mut().increment_frequency(record.frequency());
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    /// Re-express a record produced under another schema instance
    fn adopt(&self, record: Record) -> Result<Record> {
        if Arc::ptr_eq(record.schema(), &self.schema) || **record.schema() == *self.schema {
            return Ok(record);
        }
        let frequency = record.frequency();
        Ok(Record::new(Arc::clone(&self.schema), record.values().clone())?.with_frequency(frequency))
    }

    /// Look up the record stored under `key`
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.entries.get(key)
    }

    /// Look up one value of the record stored under `key`.
    ///
    /// Fails with `UnknownField` when `field` is not declared, whether or not
    /// the key exists.
    pub fn get_value(&self, key: &str, field: &str) -> Result<Option<&str>> {
        self.schema.require_field(field)?;
        Ok(self.entries.get(key).and_then(|record| record.get(field)))
    }

    /// Overwrite one non-key value of an existing record.
    ///
    /// Fails with `UnknownKey` when nothing is stored under `key`,
    /// `UnknownField` when `field` is not declared, and `KeyFieldImmutable`
    /// when `field` is a key field, since changing it would move the record
    /// to another key.
    pub fn put(&mut self, key: &str, field: &str, value: impl Into<String>) -> Result<()> {
        let record = self
            .entries
            .get_mut(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))?;
        record.set(field, value)
    }

    /// Aggregate records onto a subset of fields.
    ///
    /// The requested order becomes the key order of the result. Records that
    /// agree on the requested fields collapse into one entry whose frequency
    /// is the sum of theirs.
    pub fn group_by<S: AsRef<str>>(&self, fields: &[S]) -> Result<Cube> {
        let schema = Arc::new(self.schema.project(fields)?);
        let mut grouped = Cube::new(Arc::clone(&schema));
        for record in self.entries.values() {
            let projected = record.project(&schema);
            grouped.merge(projected.key(), projected);
        }
        debug!(
            keys = ?schema.key_order(),
            source = self.len(),
            grouped = grouped.len(),
            "grouped cube"
        );
        Ok(grouped)
    }

    /// Keep only the records satisfying `criteria`
    pub fn filter_by(&self, criteria: &Criteria) -> Cube {
        let entries = self
            .entries
            .iter()
            .filter(|(_, record)| criteria.matches(record))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        Cube {
            schema: Arc::clone(&self.schema),
            entries,
        }
    }

    /// Records whose `field` equals `value`
    pub fn search_entries(&self, field: &str, value: &str) -> Cube {
        self.filter_by(&Criteria::new().with(field, value))
    }

    /// Records satisfying every condition in `criteria`
    pub fn search_matching(&self, criteria: &Criteria) -> Cube {
        self.filter_by(criteria)
    }

    /// Check if any record has `field` equal to `value`
    pub fn is_entry_present(&self, field: &str, value: &str) -> bool {
        self.entries.values().any(|r| r.has_value(field, value))
    }

    /// Check if any record satisfies `criteria`
    pub fn is_entry_present_matching(&self, criteria: &Criteria) -> bool {
        self.entries.values().any(|r| criteria.matches(r))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stored keys, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Stored records, ordered by key
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.values()
    }

    pub fn entries(&self) -> &BTreeMap<String, Record> {
        &self.entries
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all frequencies (number of source occurrences)
    pub fn total_frequency(&self) -> u64 {
        self.entries.values().map(Record::frequency).sum()
    }
}

impl PartialEq for Cube {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
