//! Command implementations
//!
//! Commands are organized into two categories following Git's architecture:
//!
//! - `plumbing`: low-level commands that expose the object store and the
//!   index directly (cat-file, hash-object, ls-files)
//! - `porcelain`: user-facing workflow commands (init, add, commit, log)
//!
//! Every command is an `impl Repository` block returning `anyhow::Result`;
//! core errors are wrapped with context describing what was being done.

pub mod plumbing;
pub mod porcelain;
