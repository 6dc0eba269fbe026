use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::Packable;
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub marker: [u8; 4],
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    pub fn empty() -> Self {
        IndexHeader::new(*SIGNATURE, VERSION, 0)
    }

    pub fn with_entries(entries_count: u32) -> Self {
        IndexHeader {
            entries_count,
            ..Self::empty()
        }
    }

    /// Decode the first [`HEADER_SIZE`] bytes of an index file
    ///
    /// Only the size is checked here; signature and version are validated
    /// by the index itself.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::corrupt_index("file is shorter than the index header"));
        }

        let mut marker = [0u8; 4];
        marker.copy_from_slice(&bytes[0..4]);
        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(&self.marker);
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout_is_big_endian() {
        let bytes = IndexHeader::with_entries(3).serialize().unwrap();

        pretty_assertions::assert_eq!(bytes.as_ref(), b"DIRC\0\0\0\x02\0\0\0\x03");
        pretty_assertions::assert_eq!(IndexHeader::parse(&bytes).unwrap(), IndexHeader::with_entries(3));
    }

    #[test]
    fn short_header_is_corrupt() {
        assert!(IndexHeader::parse(b"DIRC\0\0").is_err());
    }
}
