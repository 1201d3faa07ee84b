use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use thiserror::Error;
use tracing::{debug, warn};

use super::dto::{Submission, CSV_HEADER};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file {path} cannot be opened for append: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to lock store file {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write store file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode csv row: {0}")]
    Encode(#[from] csv::Error),
    #[error("store task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Append-only CSV log of accepted submissions.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    path: PathBuf,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with its header row if it is missing or empty.
    /// Safe to call any number of times.
    pub fn init(&self) -> Result<(), StoreError> {
        let mut locked = self.lock()?;
        locked.ensure_header()
    }

    pub fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        let row = encode_row(&submission.as_record())?;
        let mut locked = self.lock()?;
        locked.ensure_header()?;
        locked.write_all(&row)?;
        debug!(path = %self.path.display(), bytes = row.len(), "row appended");
        Ok(())
    }

    fn lock(&self) -> Result<LockedFile<'_>, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Unwritable {
                path: self.path.clone(),
                source,
            })?;
        LockedFile::acquire(file, &self.path)
    }
}

/// Exclusive lock over the store file, released when dropped.
struct LockedFile<'a> {
    file: File,
    path: &'a Path,
}

impl<'a> LockedFile<'a> {
    fn acquire(file: File, path: &'a Path) -> Result<Self, StoreError> {
        FileExt::lock_exclusive(&file).map_err(|source| StoreError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file, path })
    }

    fn ensure_header(&mut self) -> Result<(), StoreError> {
        let len = self.len()?;
        if len > 0 {
            return Ok(());
        }
        let header = encode_row(&CSV_HEADER)?;
        self.write_all(&header)
    }

    fn len(&self) -> Result<u64, StoreError> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|source| self.write_error(source))
    }

    /// Writes `bytes` in one go; on failure the file is cut back to its
    /// previous length so no partial row survives.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        let before = self.len()?;
        let written = self
            .file
            .write_all(bytes)
            .and_then(|_| self.file.flush());
        if let Err(source) = written {
            if let Err(e) = self.file.set_len(before) {
                warn!(error = %e, path = %self.path.display(), "failed to roll back partial row");
            }
            return Err(self.write_error(source));
        }
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.to_path_buf(),
            source,
        }
    }
}

impl Drop for LockedFile<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, path = %self.path.display(), "failed to unlock store file");
        }
    }
}

fn encode_row(record: &[&str]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod store_tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::validation::FormValues;

    fn submission(name: &str) -> Submission {
        Submission::from_validated(&FormValues::new(name, "5551234567", "jo@x.com"))
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).expect("open csv");
        let header = reader
            .headers()
            .expect("header")
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.expect("valid row").iter().map(str::to_string).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn first_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubmissionStore::new(dir.path().join("form_submissions.csv"));

        store.append(&submission("Jo")).unwrap();
        store.append(&submission("Al")).unwrap();

        let (header, rows) = read_rows(store.path());
        assert_eq!(header, CSV_HEADER);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "Jo");
        assert_eq!(rows[1][1], "Al");
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubmissionStore::new(dir.path().join("form_submissions.csv"));

        store.init().unwrap();
        let first = std::fs::read_to_string(store.path()).unwrap();
        store.init().unwrap();
        store.init().unwrap();
        let again = std::fs::read_to_string(store.path()).unwrap();

        assert_eq!(first, "Timestamp,Name,Phone,Email\n");
        assert_eq!(first, again);
    }

    #[test]
    fn init_leaves_existing_rows_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubmissionStore::new(dir.path().join("form_submissions.csv"));
        store.append(&submission("Jo")).unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        store.init().unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubmissionStore::new(dir.path().join("form_submissions.csv"));
        let s = Submission {
            timestamp: "2024-01-01 00:00:00".into(),
            name: "Smith, \"Jo\"".into(),
            phone: "5551234567".into(),
            email: "line\nbreak@x.com".into(),
        };
        store.append(&s).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(r#""Smith, ""Jo""""#));

        let (_, rows) = read_rows(store.path());
        assert_eq!(rows, vec![s.as_record().map(str::to_string).to_vec()]);
    }

    #[test]
    fn concurrent_appends_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SubmissionStore::new(dir.path().join("form_submissions.csv")));
        const WRITERS: usize = 16;
        const PER_WRITER: usize = 25;

        let handles: Vec<_> = (0..WRITERS)
            .map(|w| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..PER_WRITER {
                        store.append(&submission(&format!("writer{w}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let (header, rows) = read_rows(store.path());
        assert_eq!(header, CSV_HEADER);
        assert_eq!(rows.len(), WRITERS * PER_WRITER);
        assert!(rows.iter().all(|r| r.len() == 4 && r[1].starts_with("writer")));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.matches("Timestamp,Name,Phone,Email").count(), 1);
    }

    #[test]
    fn missing_directory_is_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SubmissionStore::new(dir.path().join("missing").join("form_submissions.csv"));

        let err = store.append(&submission("Jo")).unwrap_err();
        assert!(matches!(err, StoreError::Unwritable { .. }));
        assert!(!store.path().exists());
    }
}
