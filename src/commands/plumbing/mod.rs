//! Plumbing commands (low-level operations)
//!
//! ## Commands
//!
//! - `cat-file`: print an object's payload, kind or size
//! - `hash-object`: compute a file's blob ID and optionally store it
//! - `ls-files`: list the paths staged in the index

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
