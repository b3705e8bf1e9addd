use serde::{Deserialize, Serialize};

/// A named rule locating one value inside a line of text.
///
/// The value starts right after `start` and stops before `end`. Without an
/// `end` marker the value runs to the end of the line.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldExtractor {
    /// Unique title within the owning schema
    pub title: String,

    /// Literal marker preceding the value
    #[serde(default)]
    pub start: String,

    /// Literal marker following the value (none = end of line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Value must parse as a number to be kept
    #[serde(default)]
    pub numeric: bool,

    /// A single line may yield several values for this field
    #[serde(default)]
    pub multi_value: bool,
}

impl FieldExtractor {
    /// Create an extractor that has no markers yet
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            start: String::new(),
            end: None,
            numeric: false,
            multi_value: false,
        }
    }

    /// Create an extractor with both markers set
    pub fn between(title: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::new(title).with_start(start).with_end(end)
    }

    /// Create an extractor capturing everything after `start`
    pub fn after(title: impl Into<String>, start: impl Into<String>) -> Self {
        Self::new(title).with_start(start)
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        let end = end.into();
        self.end = (!end.is_empty()).then_some(end);
        self
    }

    /// Only keep values that parse as numbers
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    /// Allow several matches on the same line
    pub fn multi_value(mut self) -> Self {
        self.multi_value = true;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// End marker, treating an empty string as absent
    pub fn end_marker(&self) -> Option<&str> {
        self.end.as_deref().filter(|end| !end.is_empty())
    }

    /// Check whether an extracted value satisfies the numeric flag.
    ///
    /// `NaN` and the infinities parse as `f64` but are not accepted.
    pub fn accepts(&self, value: &str) -> bool {
        !self.numeric || value.trim().parse::<f64>().is_ok_and(f64::is_finite)
    }
}
