//! Porcelain commands (user-facing operations)
//!
//! ## Commands
//!
//! - `init`: create an empty repository
//! - `add`: stage files
//! - `commit`: record the staged files as a new commit
//! - `log`: show commit history

pub mod add;
pub mod commit;
pub mod init;
pub mod log;
