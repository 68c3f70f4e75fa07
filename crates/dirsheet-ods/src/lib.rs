//! # dirsheet-ods
//!
//! Templated OpenDocument Spreadsheet writer for dirsheet.
//!
//! A template `.ods` is copied to the destination, its `content.xml` is
//! extracted and stripped of its tables, sheets and rows are rendered into
//! it, and the result is folded back into the archive. Every other entry of
//! the template (styles, images, metadata) is carried over untouched.

pub mod archive;
pub mod error;
pub mod inspect;
pub mod options;
pub mod renderer;
pub mod styles;
pub mod writer;
pub mod xml;

pub use archive::{ArchiveBackend, ArchiveSession, CommandBackend, EntryLookup, NativeZipBackend};
pub use error::{OdsError, OdsResult};
pub use options::{BackendKind, CommandOptions, OdsOptions, RenderOptions, CONTENT_ENTRY};
pub use renderer::{ImageUrlFormatter, RenderContext, SheetRenderer};
pub use styles::CellStyle;
pub use writer::{OdsFormat, OdsWriter};
pub use xml::{XmlDocument, XmlElement, XmlNode};
