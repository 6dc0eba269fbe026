//! Commit history traversal
//!
//! - `history`: breadth-first walk from a starting commit through its
//!   ancestors, with a visited set so every commit is reported once and
//!   malformed (cyclic) ref data cannot loop forever
//!
//! The callback drives the walk: it receives each commit in visitation
//! order and may end the traversal early.

pub mod history;
