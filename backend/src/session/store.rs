//! File-backed session storage.
//!
//! Each session owns up to three files under the data directory:
//! `<session>_original.csv`, `<session>_view.csv` and `<session>.md5`.
//! Datasets are written through a temp file in the same directory and
//! persisted over the target, so concurrent readers see either the old or
//! the new file. Concurrent writers race; the last one wins.

use super::SessionId;
use crate::tabular::{flat, TabularError};
use common::model::Dataset;
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage I/O: {0}")]
    Io(#[from] io::Error),
    #[error("session storage write: {0}")]
    Csv(#[from] csv::Error),
    #[error("stored dataset is unreadable: {0}")]
    Corrupt(#[from] TabularError),
}

impl From<tempfile::PersistError> for StoreError {
    fn from(e: tempfile::PersistError) -> Self {
        StoreError::Io(e.error)
    }
}

/// The two datasets a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The uploaded file, as ingested.
    Original,
    /// The last computed view; labels are rendered from it.
    View,
}

impl Slot {
    fn suffix(self) -> &'static str {
        match self {
            Slot::Original => "original",
            Slot::View => "view",
        }
    }
}

/// Session-keyed dataset storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, session: &SessionId, slot: Slot) -> Result<Option<Dataset>, StoreError>;
    fn set(&self, session: &SessionId, slot: Slot, data: &Dataset) -> Result<(), StoreError>;
    /// Returns whether anything was removed.
    fn delete(&self, session: &SessionId, slot: Slot) -> Result<bool, StoreError>;
    /// MD5 of the last upload, if any.
    fn digest(&self, session: &SessionId) -> Result<Option<String>, StoreError>;
    fn set_digest(&self, session: &SessionId, md5: &str) -> Result<(), StoreError>;
    /// Removes every artifact of `session` and returns how many files went.
    fn clear(&self, session: &SessionId) -> Result<usize, StoreError>;
}

pub struct FsSessionStore {
    root: PathBuf,
}

impl FsSessionStore {
    /// Uses `root` as the data directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_path(&self, session: &SessionId, slot: Slot) -> PathBuf {
        self.root.join(format!("{}_{}.csv", session, slot.suffix()))
    }

    fn digest_path(&self, session: &SessionId) -> PathBuf {
        self.root.join(format!("{session}.md5"))
    }

    fn write_atomic<F>(&self, target: &Path, write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut NamedTempFile) -> Result<(), StoreError>,
    {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        write(&mut tmp)?;
        tmp.as_file().sync_all()?;
        tmp.persist(target)?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl SessionStore for FsSessionStore {
    fn get(&self, session: &SessionId, slot: Slot) -> Result<Option<Dataset>, StoreError> {
        let file = match File::open(self.dataset_path(session, slot)) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(flat::read_csv(BufReader::new(file), b',')?))
    }

    fn set(&self, session: &SessionId, slot: Slot, data: &Dataset) -> Result<(), StoreError> {
        let target = self.dataset_path(session, slot);
        self.write_atomic(&target, |tmp| Ok(flat::write_csv(data, tmp)?))?;
        debug!(
            "stored {} rows for session {} ({})",
            data.len(),
            session,
            slot.suffix()
        );
        Ok(())
    }

    fn delete(&self, session: &SessionId, slot: Slot) -> Result<bool, StoreError> {
        Ok(remove_if_present(&self.dataset_path(session, slot))?)
    }

    fn digest(&self, session: &SessionId) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.digest_path(session)) {
            Ok(s) => Ok(Some(s.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_digest(&self, session: &SessionId, md5: &str) -> Result<(), StoreError> {
        self.write_atomic(&self.digest_path(session), |tmp| {
            Ok(tmp.write_all(md5.as_bytes())?)
        })
    }

    fn clear(&self, session: &SessionId) -> Result<usize, StoreError> {
        let mut removed = 0;
        for path in [
            self.dataset_path(session, Slot::Original),
            self.dataset_path(session, Slot::View),
            self.digest_path(session),
        ] {
            if remove_if_present(&path)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
