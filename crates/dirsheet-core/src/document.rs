//! Output document lifecycle
//!
//! [`RowWriter`] owns the staged [`Row`] and drives a format through its
//! hooks. Every concrete output format implements [`RowFormat`]; the writer
//! enforces the state machine
//! `Uninitialized -> Opened -> Closed` and the per-row cursor rules.
//!
//! ```text
//! open()  ─┬─ add_value / add_values / add_empty / remove_value_at
//!          ├─ render_row(is_header)     (row cleared afterwards)
//!          └─ close()                   (format end hook)
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::row::Row;

/// Format-specific hooks driven by [`RowWriter`]
pub trait RowFormat {
    /// Error type of the format; core errors convert into it
    type Error: From<Error>;

    /// Template the format is built from, if any
    fn template(&self) -> Option<&Path> {
        None
    }

    /// Number of column slots per row
    fn column_count(&self) -> usize;

    /// Prepare the output (called once by [`RowWriter::open`])
    fn begin(&mut self) -> std::result::Result<(), Self::Error>;

    /// Turn a staged row into output
    ///
    /// `row_index` counts data rows rendered so far in the current section
    /// and is what alternating styles key off.
    fn render_row(
        &mut self,
        row: &Row,
        is_header: bool,
        row_index: usize,
    ) -> std::result::Result<(), Self::Error>;

    /// Produce the final artifact (called once by [`RowWriter::close`])
    fn end(&mut self) -> std::result::Result<(), Self::Error>;
}

/// Lifecycle state of a [`RowWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Not opened yet (or opening failed)
    Uninitialized,
    /// Accepting values and rows
    Opened,
    /// Closed; no further emission allowed
    Closed,
}

impl DocumentState {
    /// Name used in error messages
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentState::Uninitialized => "uninitialized",
            DocumentState::Opened => "opened",
            DocumentState::Closed => "closed",
        }
    }
}

/// Row-oriented document writer
#[derive(Debug)]
pub struct RowWriter<F: RowFormat> {
    format: F,
    row: Option<Row>,
    state: DocumentState,
    row_index: usize,
}

impl<F: RowFormat> RowWriter<F> {
    /// Wrap a format; the writer starts uninitialized
    pub fn new(format: F) -> Self {
        Self {
            format,
            row: None,
            state: DocumentState::Uninitialized,
            row_index: 0,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Borrow the format
    pub fn format(&self) -> &F {
        &self.format
    }

    /// Mutably borrow the format
    pub fn format_mut(&mut self) -> &mut F {
        &mut self.format
    }

    /// Consume the writer and return the format
    pub fn into_format(self) -> F {
        self.format
    }

    /// The staged row (None until opened)
    pub fn row(&self) -> Option<&Row> {
        self.row.as_ref()
    }

    /// Number of data rows rendered since the last reset
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Restart row alternation (e.g. at the start of a new sheet)
    pub fn reset_row_index(&mut self) {
        self.row_index = 0;
    }

    /// Validate the template, allocate the row and run the format's `begin` hook
    ///
    /// On failure the writer stays [`DocumentState::Uninitialized`].
    pub fn open(&mut self) -> std::result::Result<(), F::Error> {
        self.expect_state(DocumentState::Uninitialized)?;

        if let Some(template) = self.format.template() {
            if !template.exists() {
                log::error!("template {} does not exist", template.display());
                return Err(Error::TemplateMissing(template.to_path_buf()).into());
            }
        }

        let row = Row::new(self.format.column_count())?;
        self.format.begin()?;

        self.row = Some(row);
        self.row_index = 0;
        self.state = DocumentState::Opened;
        Ok(())
    }

    /// Write a value at the cursor column and advance the cursor
    pub fn add_value(&mut self, value: impl Into<String>) -> Result<()> {
        self.staged_row()?.push_value(value)
    }

    /// Write a multivalue at the cursor column and advance the cursor by one
    pub fn add_values<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.staged_row()?.push_values(values)
    }

    /// Leave the cursor column blank and advance the cursor
    pub fn add_empty(&mut self) -> Result<()> {
        self.staged_row()?.skip()
    }

    /// Blank a column regardless of the cursor position
    pub fn remove_value_at(&mut self, col: usize) -> Result<()> {
        self.staged_row()?.clear(col)
    }

    /// Render the staged row, then clear it for reuse
    pub fn render_row(&mut self, is_header: bool) -> std::result::Result<(), F::Error> {
        self.expect_state(DocumentState::Opened)?;
        let row = self
            .row
            .as_mut()
            .ok_or_else(|| Error::other("opened document has no staged row"))?;

        let result = self.format.render_row(row, is_header, self.row_index);
        row.clear_all();
        result?;

        if !is_header {
            self.row_index += 1;
        }
        Ok(())
    }

    /// Run the format's `end` hook and mark the document closed
    ///
    /// The document is closed even when the hook fails; a failed export has to
    /// be redone from scratch.
    pub fn close(&mut self) -> std::result::Result<(), F::Error> {
        self.expect_state(DocumentState::Opened)?;
        let result = self.format.end();
        self.row = None;
        self.state = DocumentState::Closed;
        result
    }

    fn staged_row(&mut self) -> Result<&mut Row> {
        self.expect_state(DocumentState::Opened)?;
        self.row
            .as_mut()
            .ok_or_else(|| Error::other("opened document has no staged row"))
    }

    fn expect_state(&self, expected: DocumentState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    /// Records every rendered row as `(is_header, row_index, values)`
    #[derive(Default)]
    struct Recorder {
        columns: usize,
        template: Option<PathBuf>,
        fail_begin: bool,
        began: bool,
        ended: bool,
        rows: Vec<(bool, usize, Vec<Vec<String>>)>,
    }

    impl RowFormat for Recorder {
        type Error = Error;

        fn template(&self) -> Option<&Path> {
            self.template.as_deref()
        }

        fn column_count(&self) -> usize {
            self.columns
        }

        fn begin(&mut self) -> Result<()> {
            if self.fail_begin {
                return Err(Error::other("begin failed"));
            }
            self.began = true;
            Ok(())
        }

        fn render_row(&mut self, row: &Row, is_header: bool, row_index: usize) -> Result<()> {
            let values = row.cells().map(|c| c.values().to_vec()).collect();
            self.rows.push((is_header, row_index, values));
            Ok(())
        }

        fn end(&mut self) -> Result<()> {
            self.ended = true;
            Ok(())
        }
    }

    fn recorder(columns: usize) -> Recorder {
        Recorder {
            columns,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let mut writer = RowWriter::new(recorder(2));
        assert_eq!(writer.state(), DocumentState::Uninitialized);

        writer.open().unwrap();
        assert!(writer.format().began);

        writer.add_value("Name").unwrap();
        writer.add_value("Mail").unwrap();
        writer.render_row(true).unwrap();

        writer.add_value("Ada").unwrap();
        writer.add_values(["a@x", "b@x"]).unwrap();
        writer.render_row(false).unwrap();

        writer.add_value("Bob").unwrap();
        writer.render_row(false).unwrap();

        writer.close().unwrap();
        assert_eq!(writer.state(), DocumentState::Closed);

        let format = writer.into_format();
        assert!(format.ended);
        let indices: Vec<_> = format.rows.iter().map(|(h, i, _)| (*h, *i)).collect();
        assert_eq!(indices, vec![(true, 0), (false, 0), (false, 1)]);
        assert_eq!(
            format.rows[1].2,
            vec![vec!["Ada".to_string()], vec!["a@x".into(), "b@x".into()]]
        );
        assert_eq!(format.rows[2].2[1], Vec::<String>::new());
    }

    #[test]
    fn test_row_is_cleared_after_render() {
        let mut writer = RowWriter::new(recorder(2));
        writer.open().unwrap();
        writer.add_value("x").unwrap();
        writer.render_row(false).unwrap();

        let row = writer.row().unwrap();
        assert_eq!(row.cursor(), 0);
        assert!(row.is_blank());
        assert_eq!(writer.row_index(), 1);
    }

    #[test]
    fn test_remove_value_at_ignores_cursor() {
        let mut writer = RowWriter::new(recorder(3));
        writer.open().unwrap();
        writer.add_value("a").unwrap();
        writer.add_value("b").unwrap();
        writer.remove_value_at(0).unwrap();
        assert_eq!(writer.row().unwrap().cursor(), 2);
        assert!(writer.row().unwrap().cell(0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_template_keeps_uninitialized() {
        let mut format = recorder(1);
        format.template = Some(PathBuf::from("/nonexistent/dirsheet/template.ods"));
        let mut writer = RowWriter::new(format);

        assert!(matches!(writer.open(), Err(Error::TemplateMissing(_))));
        assert_eq!(writer.state(), DocumentState::Uninitialized);
        assert!(!writer.format().began);
    }

    #[test]
    fn test_failed_begin_keeps_uninitialized() {
        let mut format = recorder(1);
        format.fail_begin = true;
        let mut writer = RowWriter::new(format);

        assert!(writer.open().is_err());
        assert_eq!(writer.state(), DocumentState::Uninitialized);
        assert!(writer.add_value("x").is_err());
    }

    #[test]
    fn test_emission_after_close_is_rejected() {
        let mut writer = RowWriter::new(recorder(1));
        writer.open().unwrap();
        writer.close().unwrap();

        assert!(matches!(
            writer.add_value("x"),
            Err(Error::InvalidState { .. })
        ));
        assert!(writer.render_row(false).is_err());
        assert!(writer.close().is_err());
        assert!(writer.open().is_err());
    }

    #[test]
    fn test_reset_row_index() {
        let mut writer = RowWriter::new(recorder(1));
        writer.open().unwrap();
        writer.render_row(false).unwrap();
        writer.render_row(false).unwrap();
        assert_eq!(writer.row_index(), 2);
        writer.reset_row_index();
        assert_eq!(writer.row_index(), 0);
    }
}
