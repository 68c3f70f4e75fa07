//! Cell type
//!
//! A cell holds zero or more string values. More than one value means the
//! source attribute was multivalued; all values share one logical column and
//! are stacked inside a single spreadsheet cell when rendered.

/// One column slot of a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    values: Vec<String>,
}

impl Cell {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell holding a single value
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Check if the cell holds no value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of stacked values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the cell holds more than one value
    pub fn is_multivalue(&self) -> bool {
        self.values.len() > 1
    }

    /// The first value, if any
    pub fn primary(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// The single value, if the cell holds exactly one
    pub fn single(&self) -> Option<&str> {
        match self.values.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// All values in insertion order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterate over all values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Replace the content with a single value
    pub(crate) fn set(&mut self, value: String) {
        self.values.clear();
        self.values.push(value);
    }

    /// Replace the content with a prepared sequence
    pub(crate) fn replace(&mut self, values: Vec<String>) {
        self.values = values;
    }

    /// Remove every value
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
