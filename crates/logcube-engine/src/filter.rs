use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use logcube_types::Record;

/// Conjunction of field conditions used to select records
#[derive(Clone, Default)]
pub struct Criteria {
    /// Exact value per field title
    exact: BTreeMap<String, String>,

    /// Regex patterns per field title
    patterns: Vec<(String, Regex)>,
}

impl Criteria {
    /// Criteria matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value` exactly
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.exact.insert(field.into(), value.into());
        self
    }

    /// Require `field` to match a regex pattern
    pub fn with_pattern(mut self, field: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        self.patterns.push((field.into(), Regex::new(pattern)?));
        Ok(self)
    }

    /// Drop the exact condition on `field`, if any
    pub fn without(mut self, field: &str) -> Self {
        self.exact.remove(field);
        self
    }

    /// Check if a record satisfies every condition.
    ///
    /// A field the record has no value for never matches, which also covers
    /// titles the schema does not declare.
    pub fn matches(&self, record: &Record) -> bool {
        self.exact
            .iter()
            .all(|(field, value)| record.has_value(field, value))
            && self
                .patterns
                .iter()
                .all(|(field, re)| record.get(field).is_some_and(|v| re.is_match(v)))
    }

    /// Check if criteria is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }
}

impl std::fmt::Debug for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let patterns: Vec<_> = self
            .patterns
            .iter()
            .map(|(field, re)| (field.as_str(), re.as_str()))
            .collect();
        f.debug_struct("Criteria")
            .field("exact", &self.exact)
            .field("patterns", &patterns)
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Criteria
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |criteria, (k, v)| criteria.with(k, v))
    }
}

impl From<HashMap<String, String>> for Criteria {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}
