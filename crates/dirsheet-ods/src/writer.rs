//! Templated ODS writer
//!
//! [`OdsFormat`] plugs the archive pipeline and the [`SheetRenderer`] into
//! the generic [`RowWriter`] lifecycle:
//!
//! - `begin` stages the template, extracts `content.xml` and prepares it
//! - `render_row` appends to the current sheet
//! - `end` serializes the content, folds it back into the archive and
//!   finalizes it
//!
//! [`OdsWriter`] is the public face: the row API of [`RowWriter`] plus
//! sheet creation.

use std::fmt;
use std::path::Path;

use dirsheet_core::{ColumnProvider, DocumentState, Row, RowFormat, RowWriter};

use crate::archive::{self, ArchiveSession};
use crate::error::{OdsError, OdsResult};
use crate::options::OdsOptions;
use crate::renderer::{ImageUrlFormatter, RenderContext, SheetRenderer};
use crate::xml::XmlDocument;

fn context<'a>(
    columns: &'a dyn ColumnProvider,
    images: &'a Option<Box<dyn ImageUrlFormatter>>,
) -> RenderContext<'a> {
    let ctx = RenderContext::new(columns);
    match images {
        Some(images) => ctx.with_images(&**images),
        None => ctx,
    }
}

/// ODS output format driven by [`RowWriter`]
pub struct OdsFormat {
    options: OdsOptions,
    columns: Box<dyn ColumnProvider>,
    images: Option<Box<dyn ImageUrlFormatter>>,
    session: Option<ArchiveSession>,
    renderer: Option<SheetRenderer>,
}

impl OdsFormat {
    /// Create a format for the given options and columns
    pub fn new(options: OdsOptions, columns: impl ColumnProvider + 'static) -> Self {
        Self {
            options,
            columns: Box::new(columns),
            images: None,
            session: None,
            renderer: None,
        }
    }

    /// Set the formatter resolving image column links
    pub fn set_image_formatter(&mut self, images: impl ImageUrlFormatter + 'static) {
        self.images = Some(Box::new(images));
    }

    /// Generation options
    pub fn options(&self) -> &OdsOptions {
        &self.options
    }

    /// Column metadata
    pub fn columns(&self) -> &dyn ColumnProvider {
        self.columns.as_ref()
    }

    /// Number of sheets created so far
    pub fn sheet_count(&self) -> usize {
        self.renderer.as_ref().map_or(0, SheetRenderer::sheet_count)
    }

    /// Append a new sheet and make it current
    pub fn create_sheet(
        &mut self,
        name: &str,
        with_header: bool,
        size_columns: bool,
    ) -> OdsResult<()> {
        let ctx = context(self.columns.as_ref(), &self.images);
        let renderer = self
            .renderer
            .as_mut()
            .ok_or_else(|| OdsError::Render("document is not open".into()))?;
        renderer.create_sheet(name, with_header, size_columns, ctx)
    }

    fn try_begin(&mut self) -> OdsResult<()> {
        let backend = archive::backend_for(&self.options);
        let mut session = ArchiveSession::stage(
            &self.options.template,
            &self.options.destination,
            &self.options.content_entry,
            backend,
            self.options.scratch_parent.as_deref(),
            self.options.retain_scratch,
        )?;

        let document = XmlDocument::read_file(session.extract()?)?;
        let ctx = context(self.columns.as_ref(), &self.images);
        let renderer = SheetRenderer::new(document, ctx, self.options.render.clone())?;

        self.session = Some(session);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn try_end(&mut self) -> OdsResult<()> {
        let renderer = self
            .renderer
            .take()
            .ok_or_else(|| OdsError::Render("document is not open".into()))?;
        let mut session = self
            .session
            .take()
            .ok_or_else(|| OdsError::Render("document is not open".into()))?;

        let ctx = context(self.columns.as_ref(), &self.images);
        let document = renderer.finish(ctx)?;
        document.write_file(session.content_path())?;
        session.reinsert()?;
        session.close()
    }
}

impl RowFormat for OdsFormat {
    type Error = OdsError;

    fn template(&self) -> Option<&Path> {
        Some(self.options.template.as_path())
    }

    fn column_count(&self) -> usize {
        self.columns.column_count()
    }

    fn begin(&mut self) -> OdsResult<()> {
        self.try_begin().map_err(|e| {
            log::error!(
                "cannot start {} from {}: {}",
                self.options.destination.display(),
                self.options.template.display(),
                e
            );
            e
        })?;
        log::info!(
            "writing {} from template {}",
            self.options.destination.display(),
            self.options.template.display()
        );
        Ok(())
    }

    fn render_row(&mut self, row: &Row, is_header: bool, row_index: usize) -> OdsResult<()> {
        let ctx = context(self.columns.as_ref(), &self.images);
        let renderer = self
            .renderer
            .as_mut()
            .ok_or_else(|| OdsError::Render("document is not open".into()))?;
        renderer.render_row(row, is_header, row_index, ctx)
    }

    fn end(&mut self) -> OdsResult<()> {
        self.try_end().map_err(|e| {
            log::error!("cannot finish {}: {}", self.options.destination.display(), e);
            e
        })?;
        log::info!("wrote {}", self.options.destination.display());
        Ok(())
    }
}

impl fmt::Debug for OdsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdsFormat")
            .field("options", &self.options)
            .field("columns", &self.columns.column_count())
            .field("images", &self.images.is_some())
            .field("session", &self.session)
            .field("renderer", &self.renderer)
            .finish()
    }
}

/// Writes rows into a copy of an ODS template
///
/// # Example
///
/// ```rust,no_run
/// use dirsheet_core::{ColumnDescriptor, ColumnLayout};
/// use dirsheet_ods::{OdsOptions, OdsWriter};
///
/// let columns = ColumnLayout::new(vec![
///     ColumnDescriptor::new("Name"),
///     ColumnDescriptor::new("Age").with_numeric(true),
/// ]);
/// let mut writer = OdsWriter::new(OdsOptions::new("template.ods", "staff.ods"), columns);
/// writer.open()?;
/// writer.create_sheet("Staff", true, true)?;
/// writer.add_value("Ada")?;
/// writer.add_value("36")?;
/// writer.render_row(false)?;
/// writer.close()?;
/// # Ok::<(), dirsheet_ods::OdsError>(())
/// ```
#[derive(Debug)]
pub struct OdsWriter {
    inner: RowWriter<OdsFormat>,
}

impl OdsWriter {
    /// Create an unopened writer
    pub fn new(options: OdsOptions, columns: impl ColumnProvider + 'static) -> Self {
        Self {
            inner: RowWriter::new(OdsFormat::new(options, columns)),
        }
    }

    /// Set the formatter resolving image column links
    pub fn with_image_formatter(mut self, images: impl ImageUrlFormatter + 'static) -> Self {
        self.inner.format_mut().set_image_formatter(images);
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> DocumentState {
        self.inner.state()
    }

    /// Destination archive
    pub fn destination(&self) -> &Path {
        &self.inner.format().options().destination
    }

    /// Column metadata
    pub fn columns(&self) -> &dyn ColumnProvider {
        self.inner.format().columns()
    }

    /// Number of sheets created so far
    pub fn sheet_count(&self) -> usize {
        self.inner.format().sheet_count()
    }

    /// The staged row
    pub fn row(&self) -> Option<&Row> {
        self.inner.row()
    }

    /// Stage the template and prepare its content
    pub fn open(&mut self) -> OdsResult<()> {
        self.inner.open()
    }

    /// Append a sheet; subsequent rows go into it
    ///
    /// Row alternation restarts with every sheet.
    pub fn create_sheet(
        &mut self,
        name: &str,
        with_header: bool,
        size_columns: bool,
    ) -> OdsResult<()> {
        let state = self.inner.state();
        if state != DocumentState::Opened {
            return Err(dirsheet_core::Error::InvalidState {
                expected: DocumentState::Opened.as_str(),
                actual: state.as_str(),
            }
            .into());
        }
        self.inner
            .format_mut()
            .create_sheet(name, with_header, size_columns)?;
        self.inner.reset_row_index();
        Ok(())
    }

    /// Write a value at the cursor column and advance the cursor
    pub fn add_value(&mut self, value: impl Into<String>) -> OdsResult<()> {
        Ok(self.inner.add_value(value)?)
    }

    /// Write a multivalue at the cursor column and advance the cursor
    pub fn add_values<I, S>(&mut self, values: I) -> OdsResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.inner.add_values(values)?)
    }

    /// Leave the cursor column blank and advance the cursor
    pub fn add_empty(&mut self) -> OdsResult<()> {
        Ok(self.inner.add_empty()?)
    }

    /// Blank a column regardless of the cursor
    pub fn remove_value_at(&mut self, col: usize) -> OdsResult<()> {
        Ok(self.inner.remove_value_at(col)?)
    }

    /// Render the staged row into the current sheet and clear it
    pub fn render_row(&mut self, is_header: bool) -> OdsResult<()> {
        self.inner.render_row(is_header)
    }

    /// Write the content back and finalize the destination archive
    pub fn close(&mut self) -> OdsResult<()> {
        self.inner.close()
    }
}
