//! In-process archive backend built on the `zip` crate
//!
//! Zip archives cannot drop an entry in place, so removals and additions
//! are recorded and applied on [`close`](ArchiveBackend::close) by
//! rebuilding the archive next to the original. Untouched entries are
//! copied raw, without recompression, in their original order; this keeps
//! an ODS `mimetype` entry first and stored.

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{ArchiveBackend, EntryLookup};
use crate::error::{OdsError, OdsResult};

/// Archive backend that rewrites the archive with the `zip` crate
#[derive(Debug, Default)]
pub struct NativeZipBackend {
    path: Option<PathBuf>,
    archive: Option<ZipArchive<File>>,
    removed: BTreeSet<String>,
    added: Vec<(String, PathBuf)>,
}

impl NativeZipBackend {
    /// Create a backend with no archive open
    pub fn new() -> Self {
        Self::default()
    }

    fn opened(&mut self) -> OdsResult<(&Path, &mut ZipArchive<File>)> {
        match (&self.path, &mut self.archive) {
            (Some(path), Some(archive)) => Ok((path.as_path(), archive)),
            _ => Err(OdsError::Render("no archive is open".into())),
        }
    }

    fn rebuild(
        path: &Path,
        archive: &mut ZipArchive<File>,
        removed: &BTreeSet<String>,
        added: &[(String, PathBuf)],
    ) -> OdsResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;

        {
            let mut writer = ZipWriter::new(staged.as_file_mut());
            for i in 0..archive.len() {
                let file = archive.by_index_raw(i)?;
                let name = file.name();
                let skip = removed.contains(name) || added.iter().any(|(n, _)| n == name);
                if skip {
                    continue;
                }
                writer.raw_copy_file(file)?;
            }

            for (name, source) in added {
                let method = if name == "mimetype" {
                    CompressionMethod::Stored
                } else {
                    CompressionMethod::Deflated
                };
                let options = SimpleFileOptions::default().compression_method(method);
                writer.start_file(name.as_str(), options)?;
                io::copy(&mut File::open(source)?, &mut writer)?;
            }
            writer.finish()?;
        }

        staged
            .persist(path)
            .map_err(|e| OdsError::archive_write(path, e.error))?;
        Ok(())
    }
}

impl ArchiveBackend for NativeZipBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn open(&mut self, archive: &Path, _scratch: &Path) -> OdsResult<()> {
        let file = File::open(archive).map_err(|e| OdsError::archive_open(archive, e))?;
        let zip = ZipArchive::new(file).map_err(|e| OdsError::archive_open(archive, e))?;
        log::trace!("{}: {} entries", archive.display(), zip.len());

        self.path = Some(archive.to_path_buf());
        self.archive = Some(zip);
        self.removed.clear();
        self.added.clear();
        Ok(())
    }

    fn lookup(&mut self, entry: &str) -> EntryLookup {
        if self.added.iter().any(|(n, _)| n == entry) {
            return EntryLookup::Found;
        }
        if self.removed.contains(entry) {
            return EntryLookup::Missing;
        }
        match &self.archive {
            Some(archive) if archive.file_names().any(|n| n == entry) => EntryLookup::Found,
            Some(_) => EntryLookup::Missing,
            None => EntryLookup::Unreadable("no archive is open".into()),
        }
    }

    fn extract_entry(&mut self, entry: &str, dest: &Path) -> OdsResult<()> {
        let (path, archive) = self.opened()?;
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
        let mut out = File::create(dest)?;
        io::copy(&mut file, &mut out)?;
        Ok(())
    }

    fn remove_entry(&mut self, entry: &str) -> OdsResult<bool> {
        match self.lookup(entry) {
            EntryLookup::Found => {
                self.added.retain(|(n, _)| n != entry);
                self.removed.insert(entry.to_string());
                Ok(true)
            }
            EntryLookup::Missing => Ok(false),
            EntryLookup::Unreadable(reason) => {
                let path = self.path.clone().unwrap_or_default();
                Err(OdsError::archive_open(path, reason))
            }
        }
    }

    fn add_entry(&mut self, entry: &str, source: &Path) -> OdsResult<()> {
        self.opened()?;
        if !source.is_file() {
            return Err(OdsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", source.display()),
            )));
        }
        self.added.retain(|(n, _)| n != entry);
        self.added.push((entry.to_string(), source.to_path_buf()));
        Ok(())
    }

    fn close(&mut self) -> OdsResult<()> {
        let path = self
            .path
            .take()
            .ok_or_else(|| OdsError::Render("no archive is open".into()))?;
        let mut archive = self
            .archive
            .take()
            .ok_or_else(|| OdsError::Render("no archive is open".into()))?;

        let removed = std::mem::take(&mut self.removed);
        let added = std::mem::take(&mut self.added);
        if removed.is_empty() && added.is_empty() {
            return Ok(());
        }

        Self::rebuild(&path, &mut archive, &removed, &added).map_err(|e| match e {
            OdsError::Zip(z) => OdsError::archive_write(&path, z),
            other => other,
        })?;
        log::debug!(
            "rewrote {} (-{} +{} entries)",
            path.display(),
            removed.len(),
            added.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{read_archive, write_archive};
    use super::*;
    use pretty_assertions::assert_eq;

    fn open(dir: &Path) -> (PathBuf, NativeZipBackend) {
        let path = dir.join("a.ods");
        write_archive(
            &path,
            &[
                ("mimetype", b"application/vnd.oasis.opendocument.spreadsheet"),
                ("content.xml", b"old"),
                ("meta.xml", b"meta"),
            ],
        );
        let mut backend = NativeZipBackend::new();
        backend.open(&path, dir).unwrap();
        (path, backend)
    }

    #[test]
    fn test_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut backend) = open(dir.path());
        assert_eq!(backend.lookup("content.xml"), EntryLookup::Found);
        assert_eq!(backend.lookup("nope.xml"), EntryLookup::Missing);

        assert!(matches!(
            NativeZipBackend::new().lookup("content.xml"),
            EntryLookup::Unreadable(_)
        ));
    }

    #[test]
    fn test_replace_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (path, mut backend) = open(dir.path());
        let source = dir.path().join("new.xml");
        std::fs::write(&source, b"new").unwrap();

        assert!(backend.remove_entry("content.xml").unwrap());
        assert_eq!(backend.lookup("content.xml"), EntryLookup::Missing);
        backend.add_entry("content.xml", &source).unwrap();
        assert_eq!(backend.lookup("content.xml"), EntryLookup::Found);
        backend.close().unwrap();

        let entries = read_archive(&path);
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["mimetype", "meta.xml", "content.xml"]);
        assert_eq!(entries[2].1, b"new");

        let mut zip = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(zip.by_index(0).unwrap().compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_remove_missing_entry_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (path, mut backend) = open(dir.path());
        assert!(!backend.remove_entry("nope.xml").unwrap());
        backend.close().unwrap();
        assert_eq!(read_archive(&path).len(), 3);
    }

    #[test]
    fn test_extract_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut backend) = open(dir.path());
        let dest = dir.path().join("out.xml");
        backend.extract_entry("content.xml", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"old");

        let err = backend.extract_entry("nope.xml", &dest).unwrap_err();
        assert!(matches!(err, OdsError::ContentEntryMissing { .. }));
    }

    #[test]
    fn test_close_without_open() {
        assert!(NativeZipBackend::new().close().is_err());
    }
}
