use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::BufRead;
use std::path::PathBuf;

/// Serialize the payload of an object (everything after the header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Canonical `"<kind> <length>\0<payload>"` encoding, the hash input
    fn framed(&self) -> Result<Bytes> {
        let payload = self.serialize()?;
        Ok(frame(self.object_type(), &payload))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(hash_framed(&self.framed()?))
    }

    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

pub fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), payload.len());

    let mut framed = Vec::with_capacity(header.len() + payload.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(payload);

    Bytes::from(framed)
}

pub fn hash_framed(framed: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(framed);

    ObjectId::from_bytes(hasher.finalize().into())
}

/// An object as read back from the store: kind plus undecoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    oid: ObjectId,
    object_type: ObjectType,
    payload: Bytes,
}

impl RawObject {
    pub fn new(object_type: ObjectType, payload: Bytes) -> Self {
        let oid = hash_framed(&frame(object_type, &payload));
        RawObject {
            oid,
            object_type,
            payload,
        }
    }

    /// Assemble an object whose ID is already known to match its content
    pub(crate) fn from_parts(oid: ObjectId, object_type: ObjectType, payload: Bytes) -> Self {
        RawObject {
            oid,
            object_type,
            payload,
        }
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

impl Packable for RawObject {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.payload.clone())
    }
}

impl Object for RawObject {
    fn object_type(&self) -> ObjectType {
        self.object_type
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(self.oid.clone())
    }
}

pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }
}
