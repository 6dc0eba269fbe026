//! Core repository components
//!
//! - `database`: object database for storing blobs, trees, and commits
//! - `index`: staging area tracking the files of the next commit
//! - `refs`: HEAD and branch references
//! - `repository`: root discovery, locking and wiring of the other areas
//! - `workspace`: working tree file access and path containment

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
