//! Sheet, row and cell rendering
//!
//! [`SheetRenderer`] owns the content document while an ODS is generated. It
//! strips the template's tables, installs the automatic styles and then
//! appends one `table:table` per sheet and one `table:table-row` per rendered
//! row.

use dirsheet_core::{Cell, ColumnDescriptor, ColumnProvider, HyperlinkKind, Row};

use crate::error::{OdsError, OdsResult};
use crate::options::RenderOptions;
use crate::styles::{self, CellStyle, NAMESPACES, ROW_STYLE, TABLE_STYLE};
use crate::xml::{XmlDocument, XmlElement, XmlNode};

/// Path from the content root to the spreadsheet element
const SPREADSHEET_PATH: &[&str] = &["office:body", "office:spreadsheet"];

/// Spreadsheet children that must follow all tables
const TRAILING_ELEMENTS: &[&str] = &[
    "table:named-expressions",
    "table:database-ranges",
    "table:data-pilot-tables",
    "table:consolidation",
    "table:dde-links",
];

/// Resolves the link target of a value in an image column
pub trait ImageUrlFormatter {
    /// Link target for `value`, or None to render plain text
    fn image_url(&self, column: &ColumnDescriptor, value: &str) -> Option<String>;
}

impl<F> ImageUrlFormatter for F
where
    F: Fn(&ColumnDescriptor, &str) -> Option<String>,
{
    fn image_url(&self, column: &ColumnDescriptor, value: &str) -> Option<String> {
        self(column, value)
    }
}

/// Collaborators consulted while rendering
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Column metadata
    pub columns: &'a dyn ColumnProvider,
    /// Image link resolution
    pub images: Option<&'a dyn ImageUrlFormatter>,
}

impl<'a> RenderContext<'a> {
    /// Context without an image formatter
    pub fn new(columns: &'a dyn ColumnProvider) -> Self {
        Self {
            columns,
            images: None,
        }
    }

    /// Set the image formatter
    pub fn with_images(mut self, images: &'a dyn ImageUrlFormatter) -> Self {
        self.images = Some(images);
        self
    }

    fn visible_columns(&self) -> Vec<(usize, &'a ColumnDescriptor)> {
        self.columns
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.visible)
            .collect()
    }

    fn alternate(&self, options: &RenderOptions) -> bool {
        options.alternate_rows && !self.columns.is_flat()
    }
}

/// Builds spreadsheet content on top of a template content document
#[derive(Debug)]
pub struct SheetRenderer {
    document: XmlDocument,
    options: RenderOptions,
    /// Index in the spreadsheet's children where the next table goes
    insert_at: usize,
    /// Index in the spreadsheet's children of the current table
    current: Option<usize>,
    sheet_count: usize,
}

impl SheetRenderer {
    /// Prepare a template content document for rendering
    ///
    /// Fails with [`OdsError::MalformedTemplate`] when the document is not an
    /// `office:document-content` with automatic styles and a spreadsheet body.
    pub fn new(
        mut document: XmlDocument,
        ctx: RenderContext<'_>,
        options: RenderOptions,
    ) -> OdsResult<Self> {
        let root = &mut document.root;
        if root.name != "office:document-content" {
            return Err(OdsError::MalformedTemplate(format!(
                "unexpected content root <{}>",
                root.name
            )));
        }
        for (key, value) in NAMESPACES {
            if root.attr(key).is_none() {
                log::debug!("declaring missing namespace {}", key);
                root.set_attr(*key, *value);
            }
        }

        let spreadsheet = root.find_path_mut(SPREADSHEET_PATH).ok_or_else(|| {
            OdsError::MalformedTemplate("missing office:body/office:spreadsheet".into())
        })?;
        let first_table = spreadsheet.position(|el| el.name == "table:table");
        let removed = spreadsheet.remove_elements(|el| el.name == "table:table");
        let insert_at = first_table
            .or_else(|| spreadsheet.position(|el| TRAILING_ELEMENTS.contains(&el.name.as_str())))
            .unwrap_or(spreadsheet.children.len());
        log::debug!("removed {} template table(s)", removed);

        let mut generated: Vec<XmlElement> = ctx
            .visible_columns()
            .into_iter()
            .map(|(col, desc)| {
                styles::column_style(
                    col + 1,
                    desc.width.as_deref(),
                    &options.default_column_width,
                )
            })
            .collect();
        generated.extend(styles::fixed_styles(&options));

        let automatic = root.child_mut("office:automatic-styles").ok_or_else(|| {
            OdsError::MalformedTemplate("missing office:automatic-styles".into())
        })?;
        let replaced = styles::install(automatic, generated);
        if replaced > 0 {
            log::debug!("replaced {} template automatic style(s)", replaced);
        }

        Ok(Self {
            document,
            options,
            insert_at,
            current: None,
            sheet_count: 0,
        })
    }

    /// Number of sheets created so far
    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }

    /// The content document as rendered so far
    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Append a new sheet and make it current
    ///
    /// With `size_columns`, one column declaration referencing `co{n}` is
    /// emitted per visible column. With `with_header`, a header row built from
    /// the column names follows immediately.
    pub fn create_sheet(
        &mut self,
        name: &str,
        with_header: bool,
        size_columns: bool,
        ctx: RenderContext<'_>,
    ) -> OdsResult<()> {
        let name = if name.trim().is_empty() {
            format!("Sheet{}", self.sheet_count + 1)
        } else {
            name.to_string()
        };

        let visible = ctx.visible_columns();
        let mut table = XmlElement::new("table:table")
            .with_attr("table:name", name.as_str())
            .with_attr("table:style-name", TABLE_STYLE);
        if size_columns {
            for (col, _) in &visible {
                table.push(
                    XmlElement::new("table:table-column")
                        .with_attr("table:style-name", styles::column_style_name(col + 1)),
                );
            }
        }
        if !size_columns || visible.is_empty() {
            let mut decl = XmlElement::new("table:table-column");
            if visible.len() > 1 {
                decl.set_attr("table:number-columns-repeated", visible.len().to_string());
            }
            table.push(decl);
        }

        let insert_at = self.insert_at;
        self.spreadsheet_mut()?.insert(insert_at, table);
        self.current = Some(insert_at);
        self.insert_at += 1;
        self.sheet_count += 1;
        log::debug!("created sheet {:?}", name);

        if with_header {
            let header = Self::header_row(ctx.columns)?;
            self.render_row(&header, true, 0, ctx)?;
        }
        Ok(())
    }

    /// Append a row to the current sheet
    ///
    /// Only visible columns are rendered. Runs of more than one empty visible
    /// column collapse into a single repeated cell.
    pub fn render_row(
        &mut self,
        row: &Row,
        is_header: bool,
        row_index: usize,
        ctx: RenderContext<'_>,
    ) -> OdsResult<()> {
        let style = CellStyle::select(is_header, row_index, ctx.alternate(&self.options));
        let visible = ctx.visible_columns();
        let is_blank = |col: usize| row.cell(col).map_or(true, Cell::is_empty);

        let mut tr = XmlElement::new("table:table-row").with_attr("table:style-name", ROW_STYLE);
        if visible.is_empty() {
            // A row needs at least one cell even when every column is hidden.
            tr.push(
                XmlElement::new("table:table-cell").with_attr("table:style-name", style.name()),
            );
        }
        let mut i = 0;
        while i < visible.len() {
            let (col, desc) = visible[i];
            match row.cell(col).filter(|c| !c.is_empty()) {
                Some(cell) => {
                    tr.push(Self::cell_element(cell, desc, is_header, style, ctx));
                    i += 1;
                }
                None => {
                    let run = visible[i..]
                        .iter()
                        .take_while(|(c, _)| is_blank(*c))
                        .count();
                    let mut empty = XmlElement::new("table:table-cell")
                        .with_attr("table:style-name", style.name());
                    if run > 1 {
                        empty.set_attr("table:number-columns-repeated", run.to_string());
                    }
                    tr.push(empty);
                    i += run;
                }
            }
        }

        self.current_sheet_mut()?.push(tr);
        Ok(())
    }

    /// Finish rendering and hand back the document
    ///
    /// A document without any sheet gets one empty sheet so the result is
    /// still a valid spreadsheet.
    pub fn finish(mut self, ctx: RenderContext<'_>) -> OdsResult<XmlDocument> {
        if self.sheet_count == 0 {
            log::debug!("no sheet was created; adding an empty one");
            self.create_sheet("", false, true, ctx)?;
        }
        Ok(self.document)
    }

    fn header_row(columns: &dyn ColumnProvider) -> OdsResult<Row> {
        let mut row = Row::new(columns.column_count())?;
        for (col, desc) in columns.columns().iter().enumerate() {
            if !desc.name.is_empty() {
                row.set_value(col, desc.name.as_str())?;
            }
        }
        Ok(row)
    }

    fn cell_element(
        cell: &Cell,
        column: &ColumnDescriptor,
        is_header: bool,
        style: CellStyle,
        ctx: RenderContext<'_>,
    ) -> XmlElement {
        let mut el =
            XmlElement::new("table:table-cell").with_attr("table:style-name", style.name());

        let number = if !is_header && column.numeric {
            cell.single().and_then(numeric_value)
        } else {
            None
        };
        match number {
            Some(value) => {
                el.set_attr("office:value-type", "float");
                el.set_attr("office:value", value);
            }
            None => el.set_attr("office:value-type", "string"),
        }

        let kind = if is_header {
            HyperlinkKind::None
        } else {
            column.hyperlink
        };
        for value in cell.iter().filter(|v| !v.is_empty()) {
            el.push(Self::paragraph(value, column, kind, ctx));
        }
        el
    }

    fn paragraph(
        value: &str,
        column: &ColumnDescriptor,
        kind: HyperlinkKind,
        ctx: RenderContext<'_>,
    ) -> XmlElement {
        let target = match kind {
            HyperlinkKind::None => None,
            HyperlinkKind::Email => Some(format!("mailto:{}", value)),
            HyperlinkKind::Http if value.contains("://") => Some(value.to_string()),
            HyperlinkKind::Http => Some(format!("http://{}", value)),
            HyperlinkKind::Image => ctx.images.and_then(|f| f.image_url(column, value)),
        };

        let mut p = XmlElement::new("text:p");
        match target {
            Some(href) => {
                let mut a = XmlElement::new("text:a")
                    .with_attr("xlink:type", "simple")
                    .with_attr("xlink:href", href);
                push_spaced_text(&mut a, value);
                p.push(a);
            }
            None => push_spaced_text(&mut p, value),
        }
        p
    }

    fn spreadsheet_mut(&mut self) -> OdsResult<&mut XmlElement> {
        self.document
            .root
            .find_path_mut(SPREADSHEET_PATH)
            .ok_or_else(|| {
                OdsError::MalformedTemplate("missing office:body/office:spreadsheet".into())
            })
    }

    fn current_sheet_mut(&mut self) -> OdsResult<&mut XmlElement> {
        let index = self
            .current
            .ok_or_else(|| OdsError::Render("no active sheet; create a sheet first".into()))?;
        match self.spreadsheet_mut()?.children.get_mut(index) {
            Some(XmlNode::Element(table)) if table.name == "table:table" => Ok(table),
            _ => Err(OdsError::Render(format!(
                "current sheet at position {} is gone",
                index
            ))),
        }
    }
}

/// Normalized numeric text, if `value` parses as a finite number
fn numeric_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(trimmed.to_string()),
        _ => None,
    }
}

/// Append `value` to a text element, keeping the whitespace ODF would collapse
///
/// Space runs become `text:s`, tabs `text:tab` and line ends `text:line-break`.
/// A lone space between two words stays literal.
fn push_spaced_text(el: &mut XmlElement, value: &str) {
    fn flush(el: &mut XmlElement, buf: &mut String) {
        if !buf.is_empty() {
            el.push_text(std::mem::take(buf));
        }
    }
    fn spaces(count: usize) -> XmlElement {
        let s = XmlElement::new("text:s");
        if count > 1 {
            s.with_attr("text:c", count.to_string())
        } else {
            s
        }
    }

    let mut buf = String::new();
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' => {
                let mut run = 1;
                while chars.next_if_eq(&' ').is_some() {
                    run += 1;
                }
                let word_follows = chars
                    .peek()
                    .map_or(false, |n| !matches!(n, '\t' | '\n' | '\r'));
                if !buf.is_empty() && word_follows {
                    buf.push(' ');
                    run -= 1;
                }
                if run > 0 {
                    flush(el, &mut buf);
                    el.push(spaces(run));
                }
            }
            '\t' => {
                flush(el, &mut buf);
                el.push(XmlElement::new("text:tab"));
            }
            '\r' | '\n' => {
                if c == '\r' {
                    chars.next_if_eq(&'\n');
                }
                flush(el, &mut buf);
                el.push(XmlElement::new("text:line-break"));
            }
            _ => buf.push(c),
        }
    }
    flush(el, &mut buf);
}
