//! Read-only helpers for looking into generated archives

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{OdsError, OdsResult};
use crate::options::CONTENT_ENTRY;
use crate::xml::XmlDocument;

fn open(path: &Path) -> OdsResult<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| OdsError::archive_open(path, e))?;
    ZipArchive::new(file).map_err(|e| OdsError::archive_open(path, e))
}

/// Names of all entries, in archive order
pub fn list_entries(path: impl AsRef<Path>) -> OdsResult<Vec<String>> {
    let archive = open(path.as_ref())?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Raw bytes of one entry
pub fn read_entry(path: impl AsRef<Path>, entry: &str) -> OdsResult<Vec<u8>> {
    let path = path.as_ref();
    let mut archive = open(path)?;
    let mut file = match archive.by_name(entry) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(OdsError::ContentEntryMissing {
                archive: path.to_path_buf(),
                entry: entry.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Parsed `content.xml` of an ODS archive
pub fn read_content(path: impl AsRef<Path>) -> OdsResult<XmlDocument> {
    let bytes = read_entry(path, CONTENT_ENTRY)?;
    let xml = String::from_utf8(bytes)
        .map_err(|e| OdsError::MalformedTemplate(format!("content is not UTF-8: {}", e)))?;
    XmlDocument::parse(&xml)
}

/// Names of the sheets of an ODS archive, in document order
pub fn sheet_names(path: impl AsRef<Path>) -> OdsResult<Vec<String>> {
    let content = read_content(path)?;
    let names = content
        .root
        .find_path(&["office:body", "office:spreadsheet"])
        .map(|spreadsheet| {
            spreadsheet
                .children_named("table:table")
                .filter_map(|table| table.attr("table:name"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(names)
}
