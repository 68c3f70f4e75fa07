//! Archive-backed content pipeline
//!
//! An [`ArchiveSession`] turns a template archive into a deliverable one in
//! four phases:
//!
//! 1. **stage** - copy the template to the destination and open the copy
//! 2. **extract** - pull the content entry out into a scratch file
//! 3. *(the caller rewrites the scratch file)*
//! 4. **reinsert & close** - replace the entry with the scratch file and
//!    finalize the archive
//!
//! The archive itself is manipulated through an [`ArchiveBackend`]; see
//! [`NativeZipBackend`] and [`CommandBackend`].
//!
//! A session that is dropped before a successful [`ArchiveSession::close`]
//! deletes the destination, so a failed run never leaves an archive behind
//! that looks valid. The scratch directory is removed in every case unless
//! the session was asked to retain it.

mod command;
mod native;

pub use command::CommandBackend;
pub use native::NativeZipBackend;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{OdsError, OdsResult};
use crate::options::{BackendKind, OdsOptions};

/// Result of looking up an entry by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLookup {
    /// The entry exists
    Found,
    /// The archive is readable but has no such entry
    Missing,
    /// The archive could not be read
    Unreadable(String),
}

/// Entry-level operations on an archive file
pub trait ArchiveBackend {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Open `archive`; `scratch` is a private directory the backend may use
    fn open(&mut self, archive: &Path, scratch: &Path) -> OdsResult<()>;

    /// Look up an entry by name
    fn lookup(&mut self, entry: &str) -> EntryLookup;

    /// Write the content of `entry` to `dest`
    fn extract_entry(&mut self, entry: &str, dest: &Path) -> OdsResult<()>;

    /// Remove `entry`; returns false when there was no such entry
    fn remove_entry(&mut self, entry: &str) -> OdsResult<bool>;

    /// Add `entry` with the content of the file at `source`
    fn add_entry(&mut self, entry: &str, source: &Path) -> OdsResult<()>;

    /// Write all pending changes to the archive file
    fn close(&mut self) -> OdsResult<()>;
}

/// Create the backend selected in `options`
pub fn backend_for(options: &OdsOptions) -> Box<dyn ArchiveBackend> {
    match options.backend {
        BackendKind::Native => Box::new(NativeZipBackend::new()),
        BackendKind::Command => Box::new(CommandBackend::new(options.commands.clone())),
    }
}

/// Phase of an [`ArchiveSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Destination staged and opened
    Open,
    /// Content entry available as a scratch file
    ContentExtracted,
    /// Scratch file put back into the archive
    ContentReplaced,
    /// Archive finalized
    Closed,
}

/// One template-to-destination archive run
pub struct ArchiveSession {
    backend: Box<dyn ArchiveBackend>,
    destination: PathBuf,
    entry: String,
    content: PathBuf,
    scratch: Option<TempDir>,
    retain_scratch: bool,
    state: SessionState,
}

impl ArchiveSession {
    /// Copy `template` to `destination` and open the copy
    pub fn stage(
        template: &Path,
        destination: &Path,
        entry: &str,
        backend: Box<dyn ArchiveBackend>,
        scratch_parent: Option<&Path>,
        retain_scratch: bool,
    ) -> OdsResult<Self> {
        if !template.is_file() {
            return Err(dirsheet_core::Error::TemplateMissing(template.to_path_buf()).into());
        }
        if same_file(template, destination) {
            return Err(OdsError::archive_write(
                destination,
                "destination is the template itself",
            ));
        }

        let scratch = match scratch_parent {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                tempfile::Builder::new().prefix("dirsheet-").tempdir_in(parent)?
            }
            None => tempfile::Builder::new().prefix("dirsheet-").tempdir()?,
        };

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if let Err(e) = fs::copy(template, destination) {
            let _ = fs::remove_file(destination);
            return Err(OdsError::archive_write(destination, e));
        }
        log::debug!(
            "staged {} -> {} ({} backend)",
            template.display(),
            destination.display(),
            backend.name()
        );

        let content_name = Path::new(entry)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "content.xml".into());
        let content = scratch.path().join(content_name);

        let mut session = Self {
            backend,
            destination: destination.to_path_buf(),
            entry: entry.to_string(),
            content,
            scratch: Some(scratch),
            retain_scratch,
            state: SessionState::Open,
        };

        // Once the session exists, dropping it on error removes the copy.
        let scratch_path = session.scratch_path().to_path_buf();
        session.backend.open(destination, &scratch_path)?;
        Ok(session)
    }

    /// Current phase
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Destination archive
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Scratch file holding the content entry
    pub fn content_path(&self) -> &Path {
        &self.content
    }

    /// Scratch directory of this session
    pub fn scratch_path(&self) -> &Path {
        self.scratch
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Extract the content entry into the scratch file
    ///
    /// A missing entry means the template is malformed and fails with
    /// [`OdsError::ContentEntryMissing`].
    pub fn extract(&mut self) -> OdsResult<&Path> {
        self.expect_state(SessionState::Open)?;
        match self.backend.lookup(&self.entry) {
            EntryLookup::Found => {}
            EntryLookup::Missing => {
                return Err(OdsError::ContentEntryMissing {
                    archive: self.destination.clone(),
                    entry: self.entry.clone(),
                })
            }
            EntryLookup::Unreadable(reason) => {
                return Err(OdsError::archive_open(&self.destination, reason))
            }
        }

        self.backend.extract_entry(&self.entry, &self.content)?;
        self.state = SessionState::ContentExtracted;
        log::debug!("extracted {} to {}", self.entry, self.content.display());
        Ok(&self.content)
    }

    /// Replace the content entry with the scratch file
    pub fn reinsert(&mut self) -> OdsResult<()> {
        self.expect_state(SessionState::ContentExtracted)?;
        if !self.backend.remove_entry(&self.entry)? {
            log::debug!("{} was already absent before reinsertion", self.entry);
        }
        self.backend.add_entry(&self.entry, &self.content)?;
        self.state = SessionState::ContentReplaced;
        Ok(())
    }

    /// Finalize the archive
    ///
    /// On failure the destination is removed.
    pub fn close(mut self) -> OdsResult<()> {
        self.expect_state(SessionState::ContentReplaced)?;
        self.backend.close()?;
        self.state = SessionState::Closed;
        log::debug!("closed {}", self.destination.display());
        Ok(())
    }

    fn expect_state(&self, expected: SessionState) -> OdsResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(OdsError::Render(format!(
                "archive session is {:?}, expected {:?}",
                self.state, expected
            )))
        }
    }
}

impl Drop for ArchiveSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            match fs::remove_file(&self.destination) {
                Ok(()) => log::error!(
                    "discarded incomplete archive {}",
                    self.destination.display()
                ),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::error!(
                    "failed to discard incomplete archive {}: {}",
                    self.destination.display(),
                    e
                ),
            }
        }

        if let Some(scratch) = self.scratch.take() {
            if self.retain_scratch {
                let path = scratch.keep();
                log::info!("scratch directory retained at {}", path.display());
            }
        }
    }
}

impl std::fmt::Debug for ArchiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSession")
            .field("backend", &self.backend.name())
            .field("destination", &self.destination)
            .field("entry", &self.entry)
            .field("state", &self.state)
            .finish()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
