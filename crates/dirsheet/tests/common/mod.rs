//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use dirsheet::{ColumnDescriptor, ColumnLayout, HyperlinkKind};
use dirsheet_ods::{XmlDocument, XmlElement};

pub const MIMETYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";

pub const CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" office:version="1.2">
  <office:scripts/>
  <office:font-face-decls><style:font-face style:name="Liberation Sans" svg:font-family="'Liberation Sans'"/></office:font-face-decls>
  <office:automatic-styles>
    <style:style style:name="co1" style:family="table-column"><style:table-column-properties style:column-width="9cm"/></style:style>
    <style:style style:name="P1" style:family="paragraph"/>
  </office:automatic-styles>
  <office:body>
    <office:spreadsheet>
      <table:calculation-settings table:automatic-find-labels="false"/>
      <table:table table:name="Template"><table:table-row><table:table-cell office:value-type="string"><text:p>placeholder</text:p></table:table-cell></table:table-row></table:table>
      <table:named-expressions/>
    </office:spreadsheet>
  </office:body>
</office:document-content>"#;

pub const MANIFEST: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0"><manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/></manifest:manifest>"#;

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

/// Write a zip archive with the given entries; `mimetype` is stored
pub fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, data) in entries {
        let method = if *name == "mimetype" {
            zip::CompressionMethod::Stored
        } else {
            zip::CompressionMethod::Deflated
        };
        let options = zip::write::SimpleFileOptions::default().compression_method(method);
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// A staff template with styles and pictures next to the content
pub fn staff_template(dir: &Path) -> PathBuf {
    let path = dir.join("staff-template.ods");
    write_archive(
        &path,
        &[
            ("mimetype", MIMETYPE),
            ("META-INF/manifest.xml", MANIFEST),
            ("content.xml", CONTENT.as_bytes()),
            ("styles.xml", b"<office:document-styles/>"),
            ("styles/main.css", b"table { border: 1px solid; }"),
            ("Pictures/logo.png", PNG),
        ],
    );
    path
}

/// Every entry of an archive, directory entries included
pub fn entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut map = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        map.insert(file.name().to_string(), buf);
    }
    map
}

/// Raw entry names of an archive in sorted order
pub fn entry_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// The columns of the staff export
pub fn staff_columns() -> ColumnLayout {
    ColumnLayout::new(vec![
        ColumnDescriptor::new("Name").with_width("5cm"),
        ColumnDescriptor::new("Age").with_numeric(true),
        ColumnDescriptor::new("Email")
            .with_hyperlink(HyperlinkKind::Email)
            .with_multivalue(true),
        ColumnDescriptor::new("Homepage").with_hyperlink(HyperlinkKind::Http),
        ColumnDescriptor::new("Internal").with_visible(false),
        ColumnDescriptor::new("Room"),
    ])
}

/// Tables of the generated content
pub fn tables(path: &Path) -> Vec<XmlElement> {
    let content: XmlDocument = dirsheet::inspect::read_content(path).unwrap();
    content
        .root
        .find_path(&["office:body", "office:spreadsheet"])
        .unwrap()
        .children_named("table:table")
        .cloned()
        .collect()
}

pub fn rows(table: &XmlElement) -> Vec<&XmlElement> {
    table.children_named("table:table-row").collect()
}

pub fn cells(row: &XmlElement) -> Vec<&XmlElement> {
    row.children_named("table:table-cell").collect()
}

/// Paragraph texts of a cell
pub fn paragraphs(cell: &XmlElement) -> Vec<String> {
    cell.children_named("text:p").map(XmlElement::text).collect()
}
