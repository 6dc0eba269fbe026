//! Repository data structures and algorithms
//!
//! - `index`: binary layout of the staging area (header, entries, modes,
//!   checksum)
//! - `log`: commit history traversal
//! - `objects`: object types (blob, tree, commit), hashing and tree building

pub mod index;
pub mod log;
pub mod objects;
