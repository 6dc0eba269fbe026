//! Git object types and operations
//!
//! Git stores all content as objects identified by SHA-1 hashes. There are four main types:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Directory listing (names, modes, and object IDs)
//! - **Commit**: Snapshot with metadata (author, message, parent commits, tree)
//! - **Tag**: reserved; recognized when reading but never written
//!
//! All objects implement serialization/deserialization for the object format
//! `<type> <size>\0<content>`; `tree_builder` turns the index into trees.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;
pub mod tree_builder;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Size of a raw SHA-1 digest in bytes
pub const OBJECT_ID_SIZE: usize = 20;
