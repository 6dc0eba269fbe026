use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{Error, Result};
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// Buffer that hashes everything written to it
///
/// The index is assembled in memory and flushed to disk in one go, with the
/// digest of the whole buffer appended at the end.
#[derive(Debug, Default)]
pub struct Checksum {
    buffer: Vec<u8>,
    digest: Sha1,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        self.digest.update(data);
    }

    /// Append the digest and hand back the finished file content
    pub fn write_checksum(mut self) -> Bytes {
        let checksum = self.digest.finalize();
        self.buffer.extend_from_slice(checksum.as_slice());

        Bytes::from(self.buffer)
    }

    /// Check the trailing digest and return the bytes it covers
    pub fn verify(data: &[u8]) -> Result<&[u8]> {
        if data.len() < CHECKSUM_SIZE {
            return Err(Error::corrupt_index("file is too short to hold a checksum"));
        }

        let (content, expected_checksum) = data.split_at(data.len() - CHECKSUM_SIZE);
        let actual_checksum = Sha1::digest(content);

        if expected_checksum != actual_checksum.as_slice() {
            return Err(Error::ChecksumMismatch);
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn written_checksum_verifies() {
        let mut writer = Checksum::new();
        writer.write(b"DIRC");
        writer.write(&[0, 0, 0, 2]);
        let data = writer.write_checksum();

        pretty_assertions::assert_eq!(data.len(), 8 + CHECKSUM_SIZE);
        pretty_assertions::assert_eq!(Checksum::verify(&data).unwrap(), b"DIRC\0\0\0\x02");
    }

    #[test]
    fn any_flipped_byte_is_detected() {
        let mut writer = Checksum::new();
        writer.write(b"some index content");
        let data = writer.write_checksum().to_vec();

        for position in 0..data.len() {
            let mut tampered = data.clone();
            tampered[position] ^= 0x01;

            let err = Checksum::verify(&tampered).unwrap_err();
            pretty_assertions::assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
        }
    }
}
