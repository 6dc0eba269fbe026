use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::collections::{HashSet, VecDeque};
use std::ops::ControlFlow;
use tracing::debug;

/// Breadth-first walk over the commit graph
///
/// Every reachable commit is handed to the callback exactly once, even when
/// the same commit is referenced more than once. A missing or unreadable
/// commit aborts the walk; history is never silently truncated.
pub struct HistoryWalker<'d> {
    database: &'d Database,
}

impl<'d> HistoryWalker<'d> {
    pub fn new(database: &'d Database) -> Self {
        HistoryWalker { database }
    }

    /// Visit `start` and its ancestors
    ///
    /// Returning [`ControlFlow::Break`] from the callback ends the walk
    /// successfully.
    pub fn walk<F>(&self, start: ObjectId, visit: F) -> Result<()>
    where
        F: FnMut(&ObjectId, &Commit) -> Result<ControlFlow<()>>,
    {
        self.walk_from([start], visit)
    }

    /// Visit several starting points and everything reachable from them
    pub fn walk_from<F>(&self, starts: impl IntoIterator<Item = ObjectId>, mut visit: F) -> Result<()>
    where
        F: FnMut(&ObjectId, &Commit) -> Result<ControlFlow<()>>,
    {
        let mut queue = starts.into_iter().collect::<VecDeque<_>>();
        let mut visited = HashSet::new();

        while let Some(oid) = queue.pop_front() {
            if !visited.insert(oid.clone()) {
                continue;
            }

            let commit = self
                .database
                .parse_object_as_commit(&oid)
                .map_err(|source| Error::HistoryWalk {
                    oid: oid.clone(),
                    source: Box::new(source),
                })?;
            debug!(%oid, "visiting commit");

            let flow = visit(&oid, &commit).map_err(|source| Error::HistoryWalk {
                oid: oid.clone(),
                source: Box::new(source),
            })?;
            if flow.is_break() {
                debug!(%oid, visited = visited.len(), "history walk stopped early");
                return Ok(());
            }

            queue.extend(
                commit
                    .parents()
                    .filter(|parent| !visited.contains(*parent))
                    .cloned(),
            );
        }

        Ok(())
    }
}
