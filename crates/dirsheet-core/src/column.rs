//! Column metadata
//!
//! Columns describe how each slot of a [`Row`](crate::Row) is presented:
//! whether it is shown at all, how wide it is, whether it holds numbers and
//! whether its values should be turned into links.
//!
//! ## Example
//!
//! ```rust
//! use dirsheet_core::{ColumnDescriptor, ColumnLayout, ColumnProvider, HyperlinkKind};
//!
//! let layout = ColumnLayout::new(vec![
//!     ColumnDescriptor::new("cn"),
//!     ColumnDescriptor::new("mail").with_hyperlink(HyperlinkKind::Email),
//!     ColumnDescriptor::new("uidNumber").with_numeric(true),
//! ]);
//!
//! assert_eq!(layout.column_count(), 3);
//! assert_eq!(layout.visible_count(), 3);
//! ```

/// Default column width used when a column does not override it
pub const DEFAULT_COLUMN_WIDTH: &str = "2.258cm";

/// How the values of a column are linked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum HyperlinkKind {
    /// Plain text
    #[default]
    None,
    /// `mailto:` link
    Email,
    /// `http://` link
    Http,
    /// Link resolved through an image URL formatter
    Image,
}

impl HyperlinkKind {
    /// Check if this kind produces a link
    pub fn is_link(self) -> bool {
        !matches!(self, HyperlinkKind::None)
    }
}

/// Metadata for one column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ColumnDescriptor {
    /// Display name (used for header rows)
    pub name: String,
    /// Column is rendered
    pub visible: bool,
    /// Column holds numeric values
    pub numeric: bool,
    /// Column width as an OpenDocument length (None = default width)
    pub width: Option<String>,
    /// Link kind applied to every value
    pub hyperlink: HyperlinkKind,
    /// Source attribute may carry more than one value
    pub multivalue: bool,
}

impl ColumnDescriptor {
    /// Create a visible, string-typed column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set numeric flag
    pub fn with_numeric(mut self, numeric: bool) -> Self {
        self.numeric = numeric;
        self
    }

    /// Set width
    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set hyperlink kind
    pub fn with_hyperlink(mut self, kind: HyperlinkKind) -> Self {
        self.hyperlink = kind;
        self
    }

    /// Set multivalue flag
    pub fn with_multivalue(mut self, multivalue: bool) -> Self {
        self.multivalue = multivalue;
        self
    }

    /// Effective width, falling back to [`DEFAULT_COLUMN_WIDTH`]
    pub fn width_or_default(&self) -> &str {
        self.width.as_deref().unwrap_or(DEFAULT_COLUMN_WIDTH)
    }
}

impl Default for ColumnDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            numeric: false,
            width: None,
            hyperlink: HyperlinkKind::None,
            multivalue: false,
        }
    }
}

/// Source of column metadata for one document
///
/// Column order must not change while a document is being generated.
pub trait ColumnProvider {
    /// All columns in order
    fn columns(&self) -> &[ColumnDescriptor];

    /// Flat/organizational rendering mode (disables row alternation)
    fn is_flat(&self) -> bool {
        false
    }

    /// Number of columns
    fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Get a column by index
    fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns().get(index)
    }

    /// Number of visible columns
    fn visible_count(&self) -> usize {
        self.columns().iter().filter(|c| c.visible).count()
    }
}

/// An owned, ordered set of columns
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ColumnLayout {
    /// Columns in order
    pub columns: Vec<ColumnDescriptor>,
    /// Flat/organizational rendering mode
    pub flat: bool,
}

impl ColumnLayout {
    /// Create a layout from columns
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            flat: false,
        }
    }

    /// Create a layout of plain visible columns from names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(ColumnDescriptor::new).collect())
    }

    /// Set flat mode
    pub fn with_flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    /// Find a column index by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get a mutable column by name
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDescriptor> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

impl ColumnProvider for ColumnLayout {
    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn is_flat(&self) -> bool {
        self.flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let col = ColumnDescriptor::new("cn");
        assert!(col.visible);
        assert!(!col.numeric);
        assert_eq!(col.hyperlink, HyperlinkKind::None);
        assert_eq!(col.width_or_default(), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_visible_count_skips_hidden() {
        let layout = ColumnLayout::new(vec![
            ColumnDescriptor::new("a"),
            ColumnDescriptor::new("b").with_visible(false),
            ColumnDescriptor::new("c"),
        ]);
        assert_eq!(layout.column_count(), 3);
        assert_eq!(layout.visible_count(), 2);
    }

    #[test]
    fn test_position_and_column_mut() {
        let mut layout = ColumnLayout::from_names(["cn", "mail"]);
        assert_eq!(layout.position("mail"), Some(1));
        assert_eq!(layout.position("sn"), None);

        layout.column_mut("mail").unwrap().hyperlink = HyperlinkKind::Email;
        assert!(layout.column(1).unwrap().hyperlink.is_link());
    }
}
