//! Index entry representation
//!
//! Each entry in the index represents a staged file with:
//! - File path, relative to the repository root and `/`-separated
//! - Content hash (object ID of the staged blob)
//! - File metadata (mode, size, timestamps)
//! - Packed flags: merge stage in bits 12-13, path length in the low 12 bits
//!
//! ## Entry Format
//!
//! Entries are stored in a binary format padded with zero bytes so that each
//! entry occupies a multiple of 8 bytes. The stat metadata is informational
//! only; nothing validates it against the filesystem.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use is_executable::IsExecutable;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::Path;

/// Maximum path length representable in the flags field
pub const MAX_PATH_SIZE: usize = 0xFFF;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed part of an entry: stat fields, object id and flags
pub const ENTRY_FIXED_SIZE: usize = 62;

const STAGE_MASK: u16 = 0x3;
const STAGE_SHIFT: u16 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: String,
    /// Hash of the staged blob
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
    pub flags: u16,
}

impl IndexEntry {
    /// Create a stage-0 entry; flags are derived from the path length
    pub fn new(name: String, oid: ObjectId, metadata: EntryMetadata) -> Self {
        let flags = Self::pack_flags(0, name.len());
        IndexEntry {
            name,
            oid,
            metadata,
            flags,
        }
    }

    pub fn pack_flags(stage: u8, path_len: usize) -> u16 {
        ((stage as u16 & STAGE_MASK) << STAGE_SHIFT) | path_len.min(MAX_PATH_SIZE) as u16
    }

    pub fn stage(&self) -> u8 {
        ((self.flags >> STAGE_SHIFT) & STAGE_MASK) as u8
    }

    pub fn path_len(&self) -> usize {
        (self.flags & MAX_PATH_SIZE as u16) as usize
    }

    pub fn mode(&self) -> EntryMode {
        self.metadata.mode
    }

    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Every proper ancestor directory of the entry, outermost first
    ///
    /// `a/b/c` yields `["a", "a/b"]`.
    pub fn parent_dirs(&self) -> Vec<&str> {
        self.name
            .match_indices('/')
            .map(|(position, _)| &self.name[..position])
            .collect()
    }

    /// Number of zero bytes that follow the path on disk
    pub fn padding_len(path_len: usize) -> usize {
        (ENTRY_BLOCK - (ENTRY_FIXED_SIZE + path_len) % ENTRY_BLOCK) % ENTRY_BLOCK
    }
}

/// File metadata stored in index entries
///
/// All fields are truncated to 32 bits, as the on-disk layout demands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Change time (seconds since Unix epoch)
    pub ctime: u32,
    pub ctime_nsec: u32,
    /// Modification time (seconds since Unix epoch)
    pub mtime: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        if self.name.len() > MAX_PATH_SIZE {
            return Err(Error::PathTooLong(self.name.clone()));
        }

        let metadata = &self.metadata;
        let mut entry_bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + self.name.len() + ENTRY_BLOCK);
        entry_bytes.write_u32::<NetworkEndian>(metadata.ctime)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.ctime_nsec)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.mtime)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.mtime_nsec)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.dev)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.ino)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.mode.as_u32())?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.uid)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.gid)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.size)?;
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<NetworkEndian>(self.flags)?;
        entry_bytes.write_all(self.name.as_bytes())?;
        entry_bytes.resize(entry_bytes.len() + Self::padding_len(self.name.len()), 0);

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    /// Read exactly one entry, padding included, from the reader
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::corrupt_index("entry runs past the end of the index data");

        let ctime = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let ctime_nsec = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let mtime = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let mtime_nsec = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let dev = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let ino = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let mode = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let uid = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let gid = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let size = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        let oid = ObjectId::read_h40_from(&mut reader).map_err(truncated)?;
        let flags = reader.read_u16::<NetworkEndian>().map_err(truncated)?;

        let path_len = (flags & MAX_PATH_SIZE as u16) as usize;
        let mut name_bytes = vec![0u8; path_len + Self::padding_len(path_len)];
        reader.read_exact(&mut name_bytes).map_err(truncated)?;
        name_bytes.truncate(path_len);

        let name = String::from_utf8(name_bytes)
            .map_err(|_| Error::corrupt_index("entry path is not valid UTF-8"))?;
        let mode = EntryMode::try_from(mode)
            .map_err(|_| Error::corrupt_index(format!("entry {name} has unsupported mode {mode:o}")))?;

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            flags,
        })
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = Error;

    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self> {
        if !metadata.is_file() {
            return Err(Error::UnsupportedFile {
                path: file_path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let mode = match file_path.is_executable() {
            true => EntryMode::File(FileMode::Executable),
            false => EntryMode::File(FileMode::Regular),
        };

        Ok(Self {
            ctime: metadata.ctime() as u32,
            ctime_nsec: metadata.ctime_nsec() as u32,
            mtime: metadata.mtime() as u32,
            mtime_nsec: metadata.mtime_nsec() as u32,
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        })
    }
}
