//! Object database
//!
//! Content-addressed, zlib-compressed storage of blobs, trees and commits.
//! Every object lives at `objects/<2 hex>/<38 hex>` and holds the compressed
//! `"<kind> <length>\0<payload>"` bytes whose SHA-1 is its name.
//!
//! Writes go to a temporary file in the destination directory and are renamed
//! into place, so readers never observe a partially written object. Writing
//! an object that already exists is a no-op.

use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{
    Object, ObjectBox, RawObject, Unpackable, hash_framed,
};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

const TEMP_OBJECT_PREFIX: &str = "tmp-obj-";

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Store an object and return its ID
    ///
    /// Idempotent: if the object is already present nothing is rewritten.
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_content = object.framed()?;
        let object_id = hash_framed(&object_content);
        let object_path = self.object_path(&object_id);

        if object_path.exists() {
            tracing::debug!(oid = %object_id, kind = %object.object_type(), "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path.parent().ok_or_else(|| {
            Error::Corrupt(format!("invalid object path {}", object_path.display()))
        })?;
        std::fs::create_dir_all(object_dir)?;

        self.write_object(object_dir, &object_path, &object_content)?;
        tracing::debug!(
            oid = %object_id,
            kind = %object.object_type(),
            size = object_content.len(),
            "stored object"
        );

        Ok(object_id)
    }

    /// Read an object back, validating its framing and its hash
    pub fn load(&self, object_id: &ObjectId) -> Result<RawObject> {
        let object_content = self.read_object(object_id)?;
        let mut object_reader = Cursor::new(object_content.as_ref());

        let header = ObjectType::parse_object_header(&mut object_reader)
            .map_err(|reason| Error::corrupt_object(object_id, reason))?;
        let payload = object_content.slice(object_reader.position() as usize..);

        if payload.len() != header.size {
            return Err(Error::corrupt_object(
                object_id,
                format!(
                    "header declares {} bytes but the payload has {}",
                    header.size,
                    payload.len()
                ),
            ));
        }

        let actual_id = hash_framed(&object_content);
        if actual_id != *object_id {
            return Err(Error::corrupt_object(
                object_id,
                format!("content hashes to {actual_id}"),
            ));
        }

        tracing::debug!(oid = %object_id, kind = %header.object_type, "loaded object");
        Ok(RawObject::from_parts(
            object_id.clone(),
            header.object_type,
            payload,
        ))
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let raw = self.load(object_id)?;

        match raw.object_type() {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Self::unpack(&raw)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Self::unpack(&raw)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Self::unpack(&raw)?))),
            ObjectType::Tag => Err(Error::corrupt_object(
                object_id,
                "tag objects cannot be decoded",
            )),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Tree> {
        self.parse_object_as(object_id, ObjectType::Tree)
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        self.parse_object_as(object_id, ObjectType::Commit)
    }

    fn parse_object_as<T: Unpackable>(
        &self,
        object_id: &ObjectId,
        expected: ObjectType,
    ) -> Result<T> {
        let raw = self.load(object_id)?;

        if raw.object_type() != expected {
            return Err(Error::corrupt_object(
                object_id,
                format!("expected a {expected}, found a {}", raw.object_type()),
            ));
        }

        Self::unpack(&raw)
    }

    fn unpack<T: Unpackable>(raw: &RawObject) -> Result<T> {
        T::deserialize(Cursor::new(raw.payload().as_ref())).map_err(|err| match err {
            Error::Corrupt(reason) => Error::corrupt_object(raw.oid(), reason),
            Error::InvalidHash(hash) => {
                Error::corrupt_object(raw.oid(), format!("invalid object reference {hash:?}"))
            }
            other => other,
        })
    }

    fn read_object(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(object_id);

        let object_content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ObjectNotFound(object_id.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        Self::decompress(&object_content)
            .map_err(|err| Error::corrupt_object(object_id, format!("cannot decompress: {err}")))
    }

    fn write_object(&self, object_dir: &Path, object_path: &Path, content: &[u8]) -> Result<()> {
        let compressed = Self::compress(content)?;

        let mut temp_file = tempfile::Builder::new()
            .prefix(TEMP_OBJECT_PREFIX)
            .tempfile_in(object_dir)?;
        temp_file.write_all(&compressed)?;
        temp_file.as_file().sync_all()?;

        // rename the temp file to the object file to make it atomic
        temp_file
            .persist(object_path)
            .map_err(|err| Error::Io(err.error))?;

        Ok(())
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }
}
