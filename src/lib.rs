//! A minimal content-addressable version control store
//!
//! - [`areas`]: the on-disk parts of a repository (object database, index,
//!   refs, working tree)
//! - [`artifacts`]: the data they hold and the algorithms over it (objects,
//!   index entries, tree building, history traversal)
//! - [`commands`]: the operations exposed by the `nib` binary
//! - [`config`]: per-invocation identity settings
//! - [`errors`]: the error type shared by the core

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;
