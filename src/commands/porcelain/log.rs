use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::log::history::HistoryWalker;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use anyhow::Context;
use colored::Colorize;
use file_guard::Lock;
use std::ops::ControlFlow;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Starting commit: a full hash or `HEAD`; defaults to `HEAD`
    pub revision: Option<String>,
    pub max_count: Option<usize>,
}

impl Repository {
    pub fn log(&self, opts: &LogOptions) -> anyhow::Result<()> {
        let _lock = self
            .lock(Lock::Shared)
            .context("failed to lock the repository")?;

        let start = self.resolve_revision(opts.revision.as_deref())?;
        if opts.max_count == Some(0) {
            return Ok(());
        }

        let mut shown = 0;
        HistoryWalker::new(self.database()).walk(start, |oid, commit| {
            self.show_commit_medium(oid, commit)?;
            shown += 1;

            Ok(match opts.max_count {
                Some(max_count) if shown >= max_count => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            })
        })?;

        Ok(())
    }

    fn resolve_revision(&self, revision: Option<&str>) -> anyhow::Result<ObjectId> {
        match revision {
            None | Some(HEAD_REF_NAME) => self
                .refs()
                .resolve_head()
                .context("your current branch does not have any commits yet"),
            Some(revision) => Ok(ObjectId::try_parse(revision)?),
        }
    }

    fn show_commit_medium(&self, oid: &ObjectId, commit: &Commit) -> Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "{}", format!("commit {oid}").yellow())?;
        writeln!(writer, "Author: {}", commit.author().display_name())?;
        writeln!(writer, "Date:   {}", commit.author().readable_timestamp())?;
        writeln!(writer)?;
        for message_line in commit.message().lines() {
            writeln!(writer, "    {message_line}")?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
