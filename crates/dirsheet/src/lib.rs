//! # dirsheet
//!
//! Export directory listings into spreadsheets built from an ODS template.
//!
//! The heavy lifting lives in two crates re-exported here:
//! - `dirsheet-core`: column metadata, the staged row and the writer lifecycle
//! - `dirsheet-ods`: the template pipeline and the ODS renderer
//!
//! Rows usually come from a directory query; [`CsvImporter`] feeds them from
//! CSV instead.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dirsheet::prelude::*;
//!
//! let columns = ColumnLayout::new(vec![
//!     ColumnDescriptor::new("Name"),
//!     ColumnDescriptor::new("Email").with_hyperlink(HyperlinkKind::Email),
//! ]);
//!
//! let mut writer = OdsWriter::new(OdsOptions::new("staff-template.ods", "staff.ods"), columns);
//! writer.open()?;
//! writer.create_sheet("Staff", true, true)?;
//! writer.add_value("Ada Lovelace")?;
//! writer.add_values(["ada@example.org", "countess@example.org"])?;
//! writer.render_row(false)?;
//! writer.close()?;
//! # Ok::<(), OdsError>(())
//! ```

pub mod import;
pub mod prelude;

pub use import::{CsvImportOptions, CsvImporter, ImportError, ImportResult};

// Re-export core types
pub use dirsheet_core::{
    Cell, ColumnDescriptor, ColumnLayout, ColumnProvider, DocumentState, Error, HyperlinkKind,
    Result, Row, RowFormat, RowWriter, DEFAULT_COLUMN_WIDTH,
};

// Re-export ODS types
pub use dirsheet_ods::{
    inspect, ArchiveBackend, ArchiveSession, BackendKind, CellStyle, CommandBackend,
    CommandOptions, EntryLookup, ImageUrlFormatter, NativeZipBackend, OdsError, OdsOptions,
    OdsResult, OdsWriter, RenderOptions, CONTENT_ENTRY,
};
