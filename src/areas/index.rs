//! Staging area
//!
//! The index tracks which files go into the next commit. It is an ordered
//! map of repository-relative paths to the blobs staged for them, plus the
//! file metadata captured when they were staged.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: signature, version and entry count
//! - Entries: sorted by path, each padded to a multiple of 8 bytes
//! - Checksum: SHA-1 of everything before it
//!
//! ## Data Structures
//!
//! - `entries`: maps file paths to their index entries
//! - `children`: maps directory paths to the entries below them, so that a
//!   file can replace a directory (and vice versa) without a full scan
//!
//! The index holds no lock of its own; callers serialize access.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    entries: BTreeMap<String, IndexEntry>,
    children: BTreeMap<String, BTreeSet<String>>,
    /// Set when the in-memory state diverges from the file
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    /// Read the index stored at `path`
    ///
    /// A missing file is an empty index, not an error.
    pub fn load(path: Box<Path>) -> Result<Self> {
        let mut index = Index::new(path);
        index.rehydrate()?;

        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Whether `path` is staged as a file or is a directory holding staged files
    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path) || self.children.contains_key(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn into_entries(self) -> impl Iterator<Item = IndexEntry> {
        self.entries.into_values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Drop every entry; the file is only touched by [`Index::write_updates`]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = true;
    }

    /// Replace the in-memory state with what is on disk
    pub fn rehydrate(&mut self) -> Result<()> {
        let data = match std::fs::read(self.path()) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no index file, starting empty");
                self.entries.clear();
                self.children.clear();
                self.changed = false;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let entries = Self::deserialize(&data)?;

        self.entries.clear();
        self.children.clear();
        for entry in entries {
            self.store_entry(entry);
        }
        self.changed = false;

        debug!(path = %self.path.display(), entries = self.entries.len(), "loaded index");
        Ok(())
    }

    /// Decode a complete index file
    ///
    /// The checksum is verified before anything else is trusted, and the
    /// declared entries must account for every byte in front of it.
    pub fn deserialize(data: &[u8]) -> Result<Vec<IndexEntry>> {
        if data.len() < HEADER_SIZE {
            return Err(Error::corrupt_index("file is shorter than the index header"));
        }

        let content = if data.len() >= HEADER_SIZE + CHECKSUM_SIZE {
            Checksum::verify(data)?
        } else if data.len() == HEADER_SIZE {
            data
        } else {
            return Err(Error::corrupt_index("file is too short to hold a checksum"));
        };

        let header = IndexHeader::parse(content)?;
        if &header.marker != SIGNATURE {
            return Err(Error::corrupt_index("invalid index file signature"));
        }
        if header.version != VERSION {
            return Err(Error::UnsupportedVersion(header.version));
        }

        let mut reader = Cursor::new(&content[HEADER_SIZE..]);
        let mut entries = Vec::new();
        for _ in 0..header.entries_count {
            entries.push(IndexEntry::deserialize(&mut reader)?);
        }

        let consumed = reader.position() as usize;
        let declared = content.len() - HEADER_SIZE;
        if consumed != declared {
            return Err(Error::corrupt_index(format!(
                "{} trailing bytes after {} entries",
                declared - consumed,
                header.entries_count
            )));
        }

        Ok(entries)
    }

    /// Encode the whole index, checksum included
    pub fn serialize(&self) -> Result<Bytes> {
        let mut writer = Checksum::new();

        let header = IndexHeader::with_entries(self.entries.len() as u32);
        writer.write(&header.serialize()?);

        for entry in self.entries() {
            writer.write(&entry.serialize()?);
        }

        Ok(writer.write_checksum())
    }

    /// Persist the index with a write-to-temp-then-rename
    pub fn write_updates(&mut self) -> Result<()> {
        let data = self.serialize()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file = tempfile::Builder::new()
            .prefix("tmp-index-")
            .tempfile_in(dir)?;
        temp_file.write_all(&data)?;
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(self.path())
            .map_err(|err| Error::Io(err.error))?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "wrote index");
        self.changed = false;
        Ok(())
    }

    /// Stage an entry, replacing any entry with the same path
    ///
    /// Entries that would clash with it in a tree (a file where the new
    /// entry needs a directory, or files below the new entry's path) are
    /// dropped.
    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;
    }

    /// Unstage `path` and everything below it
    pub fn remove(&mut self, path: &str) {
        self.remove_entry(path);
        self.remove_children(path);
        self.changed = true;
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_string())
                .or_default()
                .insert(entry.name.clone());
        }

        self.entries.insert(entry.name.clone(), entry);
    }

    fn remove_children(&mut self, path: &str) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &str) {
        let Some(entry) = self.entries.remove(path) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }
}
