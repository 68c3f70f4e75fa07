//! Prelude module - common imports for dirsheet users
//!
//! ```rust
//! use dirsheet::prelude::*;
//! ```

pub use crate::{
    // Columns
    ColumnDescriptor,
    ColumnLayout,
    ColumnProvider,
    HyperlinkKind,

    // Import
    CsvImportOptions,
    CsvImporter,

    // Lifecycle
    DocumentState,

    // Error types
    Error,
    ImportError,
    OdsError,
    OdsResult,

    // ODS output
    BackendKind,
    ImageUrlFormatter,
    OdsOptions,
    OdsWriter,
    Result,
};
