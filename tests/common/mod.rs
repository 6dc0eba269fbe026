#![allow(dead_code)]

pub mod command;
pub mod file;

/// Matches a full lowercase object ID
pub const OID_PATTERN: &str = r"^[0-9a-f]{40}$";

/// `printf hello | git hash-object --stdin`
pub const HELLO_BLOB: &str = "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0";
