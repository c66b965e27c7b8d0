//! Disk I/O: create, read and rewrite the backing file.
//!
//! Every write replaces the whole file. [`WriteMode::Atomic`] (the default)
//! writes `<path>.tmp` and renames it over the target, so readers see either
//! the old document or the new one; on FAT32 or network shares the rename has
//! no hard guarantees. With [`WriteMode::Overwrite`] the file is truncated and
//! rewritten in place: a crash mid-write can leave a truncated document
//! behind, and a reader racing the write can see a partial file.

use crate::entry::Document;
use crate::error::{Error, Result};
use crate::serializer::{JsonSerializer, Serializer};
use std::path::{Path, PathBuf};

/// How [`DocumentFile::write`] puts bytes on disk.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and rewrite in place. Concurrent reads may fail with
    /// [`CorruptDocument`](crate::Error::CorruptDocument) mid-write.
    Overwrite,
    /// Write a sibling temp file, then rename over the target.
    #[default]
    Atomic,
}

/// The backing file plus the codec used to read and write it.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
    serializer: JsonSerializer,
    mode: WriteMode,
}

impl DocumentFile {
    /// Describe a file without touching the disk.
    pub fn new(path: impl AsRef<Path>, serializer: JsonSerializer, mode: WriteMode) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            serializer,
            mode,
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write mode in use.
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Codec used for reads and writes.
    #[must_use]
    pub fn serializer(&self) -> &JsonSerializer {
        &self.serializer
    }

    /// Write an empty document (`{}`) if nothing exists at the path yet,
    /// creating missing parent directories. Returns `true` if it created the
    /// file. An existing file is left alone, even if it's corrupt.
    pub fn create_if_absent(&self) -> Result<bool> {
        if self.path.try_exists()? {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.write(&Document::new())?;
        Ok(true)
    }

    /// Read the whole file and decode it.
    pub fn read(&self) -> Result<Document> {
        let bytes = std::fs::read(&self.path)?;
        self.serializer.decode(&bytes)
    }

    /// Encode `doc` and replace the file's contents with it.
    pub fn write(&self, doc: &Document) -> Result<()> {
        let bytes = self.serializer.encode(doc)?;
        match self.mode {
            WriteMode::Overwrite => std::fs::write(&self.path, &bytes).map_err(Error::from),
            WriteMode::Atomic => atomic_write(&self.path, &bytes),
        }
    }
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    fn file_at(path: impl AsRef<Path>, mode: WriteMode) -> DocumentFile {
        DocumentFile::new(path, JsonSerializer::new(), mode)
    }

    #[test]
    fn create_if_absent_writes_empty_object_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_at(dir.path().join("d.json"), WriteMode::Overwrite);

        assert!(file.create_if_absent().unwrap());
        assert_eq!(std::fs::read(file.path()).unwrap(), b"{}");

        std::fs::write(file.path(), b"garbage").unwrap();
        assert!(!file.create_if_absent().unwrap());
        assert_eq!(std::fs::read(file.path()).unwrap(), b"garbage");
    }

    #[test]
    fn create_if_absent_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("d.json");
        let file = file_at(&path, WriteMode::Overwrite);
        assert!(file.create_if_absent().unwrap());
        assert!(path.exists());
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_at(dir.path().join("gone.json"), WriteMode::Overwrite);
        match file.read().unwrap_err() {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn atomic_mode_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        let file = file_at(&path, WriteMode::Atomic);

        let mut doc = Document::new();
        doc.insert("k".into(), Entry::new("v"));
        file.write(&doc).unwrap();

        assert_eq!(file.read().unwrap(), doc);
        assert!(!dir.path().join("d.json.tmp").exists());
    }

    #[test]
    fn default_mode_is_atomic() {
        assert_eq!(WriteMode::default(), WriteMode::Atomic);
    }

    #[test]
    fn write_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("d.json");
        for mode in [WriteMode::Overwrite, WriteMode::Atomic] {
            let file = file_at(&path, mode);
            assert!(matches!(file.write(&Document::new()), Err(Error::Io(_))));
        }
    }
}
