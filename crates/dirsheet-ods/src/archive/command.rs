//! Archive backend driving the external `zip` and `unzip` programs
//!
//! The whole archive is unpacked into a `tree/` directory under the session
//! scratch directory. Entry operations are plain file operations on that
//! tree, and closing repacks it: `mimetype` first and stored, then
//! everything else.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{ArchiveBackend, EntryLookup};
use crate::error::{OdsError, OdsResult};
use crate::options::CommandOptions;

/// `zip` exit status for "nothing to do"
const ZIP_NOTHING_TO_DO: i32 = 12;

/// Archive backend that shells out to `zip`/`unzip`
#[derive(Debug)]
pub struct CommandBackend {
    options: CommandOptions,
    archive: Option<PathBuf>,
    tree: Option<PathBuf>,
}

impl CommandBackend {
    /// Create a backend using the given programs
    pub fn new(options: CommandOptions) -> Self {
        Self {
            options,
            archive: None,
            tree: None,
        }
    }

    /// Whether both programs can be started
    pub fn available(options: &CommandOptions) -> bool {
        [&options.zip_program, &options.unzip_program]
            .iter()
            .all(|program| Command::new(program).arg("-v").output().is_ok())
    }

    fn tree(&self) -> OdsResult<&Path> {
        self.tree
            .as_deref()
            .ok_or_else(|| OdsError::Render("no archive is open".into()))
    }

    fn entry_path(&self, entry: &str) -> OdsResult<PathBuf> {
        Ok(self.tree()?.join(entry))
    }
}

impl ArchiveBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    fn open(&mut self, archive: &Path, scratch: &Path) -> OdsResult<()> {
        let archive = absolute(archive)?;
        let tree = scratch.join("tree");
        fs::create_dir_all(&tree)?;

        let mut unzip = Command::new(&self.options.unzip_program);
        unzip.arg("-q").arg("-o").arg(&archive).arg("-d").arg(&tree);
        run(unzip, &[]).map_err(|e| OdsError::archive_open(&archive, e))?;

        self.archive = Some(archive);
        self.tree = Some(tree);
        Ok(())
    }

    fn lookup(&mut self, entry: &str) -> EntryLookup {
        match &self.tree {
            Some(tree) if tree.join(entry).is_file() => EntryLookup::Found,
            Some(_) => EntryLookup::Missing,
            None => EntryLookup::Unreadable("no archive is open".into()),
        }
    }

    fn extract_entry(&mut self, entry: &str, dest: &Path) -> OdsResult<()> {
        let source = self.entry_path(entry)?;
        match fs::copy(&source, dest) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OdsError::ContentEntryMissing {
                archive: self.archive.clone().unwrap_or_default(),
                entry: entry.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_entry(&mut self, entry: &str) -> OdsResult<bool> {
        match fs::remove_file(self.entry_path(entry)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn add_entry(&mut self, entry: &str, source: &Path) -> OdsResult<()> {
        let target = self.entry_path(entry)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &target)?;
        Ok(())
    }

    fn close(&mut self) -> OdsResult<()> {
        let tree = self.tree()?.to_path_buf();
        let archive = self
            .archive
            .take()
            .ok_or_else(|| OdsError::Render("no archive is open".into()))?;

        match fs::remove_file(&archive) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(OdsError::archive_write(&archive, e)),
        }

        if tree.join("mimetype").is_file() {
            let mut zip = Command::new(&self.options.zip_program);
            zip.current_dir(&tree)
                .args(["-X", "-0", "-q"])
                .arg(&archive)
                .arg("mimetype");
            run(zip, &[]).map_err(|e| OdsError::archive_write(&archive, e))?;
        }

        let mut zip = Command::new(&self.options.zip_program);
        zip.current_dir(&tree)
            .args(["-X", "-D", "-r", "-q"])
            .arg(&archive)
            .args([".", "-x", "mimetype"]);
        run(zip, &[ZIP_NOTHING_TO_DO]).map_err(|e| OdsError::archive_write(&archive, e))?;

        self.tree = None;
        log::debug!("repacked {}", archive.display());
        Ok(())
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Run `command`, treating the exit codes in `tolerated` as success
fn run(mut command: Command, tolerated: &[i32]) -> OdsResult<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::trace!("running {:?}", command);

    let output = command.output().map_err(|e| OdsError::Command {
        program: program.clone(),
        status: "not started".into(),
        stderr: e.to_string(),
    })?;

    let ok = output.status.success()
        || output
            .status
            .code()
            .is_some_and(|code| tolerated.contains(&code));
    if ok {
        return Ok(());
    }

    Err(OdsError::Command {
        program,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{read_archive, write_archive};
    use super::super::ArchiveSession;
    use super::*;
    use pretty_assertions::assert_eq;

    fn tools() -> Option<CommandOptions> {
        let options = CommandOptions::default();
        if CommandBackend::available(&options) {
            Some(options)
        } else {
            eprintln!("zip/unzip not installed; skipping");
            None
        }
    }

    #[test]
    fn test_session_roundtrip() {
        let Some(options) = tools() else { return };
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.ods");
        write_archive(
            &template,
            &[
                ("mimetype", b"application/vnd.oasis.opendocument.spreadsheet"),
                ("content.xml", b"old"),
                ("styles/main.css", b"body {}"),
            ],
        );

        let destination = dir.path().join("out.ods");
        let mut session = ArchiveSession::stage(
            &template,
            &destination,
            "content.xml",
            Box::new(CommandBackend::new(options)),
            Some(dir.path()),
            false,
        )
        .unwrap();
        let content = session.extract().unwrap().to_path_buf();
        std::fs::write(&content, b"new").unwrap();
        session.reinsert().unwrap();
        session.close().unwrap();

        let mut entries = read_archive(&destination);
        assert_eq!(entries[0].0, "mimetype");
        let mut zip = zip::ZipArchive::new(std::fs::File::open(&destination).unwrap()).unwrap();
        assert_eq!(
            zip.by_index(0).unwrap().compression(),
            zip::CompressionMethod::Stored
        );

        // No directory entries for the folders of the unpacked tree
        let mut names: Vec<_> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["content.xml", "mimetype", "styles/main.css"]);

        entries.sort();
        assert_eq!(entries[0], ("content.xml".to_string(), b"new".to_vec()));
    }

    #[test]
    fn test_remove_missing_entry() {
        let Some(options) = tools() else { return };
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_archive(&archive, &[("a.txt", b"a")]);

        let mut backend = CommandBackend::new(options);
        backend.open(&archive, dir.path()).unwrap();
        assert_eq!(backend.lookup("a.txt"), EntryLookup::Found);
        assert!(!backend.remove_entry("b.txt").unwrap());
        assert!(backend.remove_entry("a.txt").unwrap());
        assert_eq!(backend.lookup("a.txt"), EntryLookup::Missing);
    }

    #[test]
    fn test_missing_program() {
        let options = CommandOptions {
            zip_program: "dirsheet-no-such-zip".into(),
            unzip_program: "dirsheet-no-such-unzip".into(),
        };
        assert!(!CommandBackend::available(&options));

        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_archive(&archive, &[("a.txt", b"a")]);
        let err = CommandBackend::new(options)
            .open(&archive, dir.path())
            .unwrap_err();
        assert!(matches!(err, OdsError::ArchiveOpen { .. }));
    }
}
