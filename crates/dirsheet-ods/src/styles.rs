//! Automatic styles emitted into the content part
//!
//! Every generated table, row and cell references one of the styles built
//! here. Names are deterministic so the output does not depend on the
//! template; template automatic styles with the same name are replaced.

use crate::options::RenderOptions;
use crate::xml::XmlElement;

/// Table style name
pub const TABLE_STYLE: &str = "ta1";

/// Row style name
pub const ROW_STYLE: &str = "ro1";

/// Namespace declarations the generated content relies on
pub(crate) const NAMESPACES: &[(&str, &str)] = &[
    (
        "xmlns:office",
        "urn:oasis:names:tc:opendocument:xmlns:office:1.0",
    ),
    (
        "xmlns:style",
        "urn:oasis:names:tc:opendocument:xmlns:style:1.0",
    ),
    (
        "xmlns:text",
        "urn:oasis:names:tc:opendocument:xmlns:text:1.0",
    ),
    (
        "xmlns:table",
        "urn:oasis:names:tc:opendocument:xmlns:table:1.0",
    ),
    (
        "xmlns:fo",
        "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0",
    ),
    ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
];

/// Cell style of a rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Header row
    Header,
    /// Data row without alternation
    Flat,
    /// Even data row (0, 2, 4, ...)
    Even,
    /// Odd data row (1, 3, 5, ...)
    Odd,
}

impl CellStyle {
    /// All cell styles
    pub const ALL: [CellStyle; 4] = [
        CellStyle::Header,
        CellStyle::Flat,
        CellStyle::Even,
        CellStyle::Odd,
    ];

    /// Pick the style for a row
    ///
    /// Header rows never take part in alternation; `row_index` only counts
    /// data rows.
    pub fn select(is_header: bool, row_index: usize, alternate: bool) -> Self {
        match (is_header, alternate) {
            (true, _) => CellStyle::Header,
            (false, false) => CellStyle::Flat,
            (false, true) if row_index % 2 == 0 => CellStyle::Even,
            (false, true) => CellStyle::Odd,
        }
    }

    /// Style name
    pub fn name(self) -> &'static str {
        match self {
            CellStyle::Header => "ce1",
            CellStyle::Flat => "ce2",
            CellStyle::Even => "ce3",
            CellStyle::Odd => "ce4",
        }
    }

    fn element(self, options: &RenderOptions) -> XmlElement {
        let style = XmlElement::new("style:style")
            .with_attr("style:name", self.name())
            .with_attr("style:family", "table-cell");

        match self {
            CellStyle::Header => style
                .with_child(
                    XmlElement::new("style:table-cell-properties")
                        .with_attr("fo:background-color", &options.header_background),
                )
                .with_child(
                    XmlElement::new("style:text-properties").with_attr("fo:font-weight", "bold"),
                ),
            CellStyle::Flat => style.with_child(
                XmlElement::new("style:table-cell-properties")
                    .with_attr("fo:background-color", "transparent"),
            ),
            CellStyle::Even => style.with_child(
                XmlElement::new("style:table-cell-properties")
                    .with_attr("fo:background-color", &options.even_background),
            ),
            CellStyle::Odd => style.with_child(
                XmlElement::new("style:table-cell-properties")
                    .with_attr("fo:background-color", &options.odd_background),
            ),
        }
    }
}

/// Column style name for a 1-based column index
pub fn column_style_name(index: usize) -> String {
    format!("co{}", index)
}

/// Style for one column; the width is only written when it differs from the
/// default width
pub fn column_style(index: usize, width: Option<&str>, default_width: &str) -> XmlElement {
    let mut props =
        XmlElement::new("style:table-column-properties").with_attr("fo:break-before", "auto");
    if let Some(width) = width.filter(|w| *w != default_width) {
        props.set_attr("style:column-width", width);
    }

    XmlElement::new("style:style")
        .with_attr("style:name", column_style_name(index))
        .with_attr("style:family", "table-column")
        .with_child(props)
}

/// Style shared by every generated row
pub fn row_style() -> XmlElement {
    XmlElement::new("style:style")
        .with_attr("style:name", ROW_STYLE)
        .with_attr("style:family", "table-row")
        .with_child(
            XmlElement::new("style:table-row-properties")
                .with_attr("fo:break-before", "auto")
                .with_attr("style:use-optimal-row-height", "true"),
        )
}

/// Style shared by every generated table
pub fn table_style() -> XmlElement {
    XmlElement::new("style:style")
        .with_attr("style:name", TABLE_STYLE)
        .with_attr("style:family", "table")
        .with_child(
            XmlElement::new("style:table-properties")
                .with_attr("table:display", "true")
                .with_attr("style:writing-mode", "lr-tb"),
        )
}

/// Table, row and cell styles
pub fn fixed_styles(options: &RenderOptions) -> Vec<XmlElement> {
    let mut styles = vec![table_style(), row_style()];
    styles.extend(CellStyle::ALL.iter().map(|s| s.element(options)));
    styles
}

/// Add styles to an `office:automatic-styles` element
///
/// Existing styles with the same name are removed first. Returns the number of
/// replaced template styles.
pub fn install(automatic_styles: &mut XmlElement, styles: Vec<XmlElement>) -> usize {
    let mut replaced = 0;
    for style in styles {
        if let Some(name) = style.attr("style:name") {
            let name = name.to_string();
            replaced +=
                automatic_styles.remove_elements(|el| el.attr("style:name") == Some(name.as_str()));
        }
        automatic_styles.push(style);
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_header_ignores_index() {
        for idx in 0..4 {
            assert_eq!(CellStyle::select(true, idx, true), CellStyle::Header);
            assert_eq!(CellStyle::select(true, idx, false), CellStyle::Header);
        }
    }

    #[test]
    fn test_select_alternation() {
        assert_eq!(CellStyle::select(false, 0, true), CellStyle::Even);
        assert_eq!(CellStyle::select(false, 1, true), CellStyle::Odd);
        assert_eq!(CellStyle::select(false, 2, true), CellStyle::Even);
        assert_eq!(CellStyle::select(false, 1, false), CellStyle::Flat);
    }

    #[test]
    fn test_column_style_width_only_when_not_default() {
        let style = column_style(2, Some("2cm"), "2cm");
        assert_eq!(style.attr("style:name"), Some("co2"));
        let props = style.child("style:table-column-properties").unwrap();
        assert_eq!(props.attr("fo:break-before"), Some("auto"));
        assert_eq!(props.attr("style:column-width"), None);

        let style = column_style(3, Some("5cm"), "2cm");
        let props = style.child("style:table-column-properties").unwrap();
        assert_eq!(props.attr("style:column-width"), Some("5cm"));
    }

    #[test]
    fn test_install_replaces_same_name() {
        let mut auto = XmlElement::new("office:automatic-styles")
            .with_child(XmlElement::new("style:style").with_attr("style:name", "co1"))
            .with_child(XmlElement::new("style:style").with_attr("style:name", "P1"));

        let replaced = install(&mut auto, vec![column_style(1, None, "2cm")]);
        assert_eq!(replaced, 1);

        let names: Vec<_> = auto
            .elements()
            .filter_map(|el| el.attr("style:name"))
            .collect();
        assert_eq!(names, vec!["P1", "co1"]);
    }
}
