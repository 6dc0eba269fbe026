use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::tree_builder::TreeBuilder;
use crate::config::Config;
use crate::errors::Error;
use anyhow::Context;
use file_guard::Lock;
use tracing::debug;

impl Repository {
    /// Record the staged files as a new commit on top of HEAD
    ///
    /// The message is stored as given. The index is emptied once the commit
    /// is in place.
    pub fn commit(&self, message: &str, config: &Config) -> anyhow::Result<()> {
        if message.trim().is_empty() {
            anyhow::bail!("Aborting commit due to empty commit message");
        }

        let _lock = self
            .lock(Lock::Exclusive)
            .context("failed to lock the repository")?;
        let mut index = self.load_index().context("failed to read the index")?;

        if index.is_empty() {
            return Err(Error::EmptyStaging.into());
        }

        let tree_oid = TreeBuilder::new(self.database())
            .build(index.entries())
            .context("failed to write the tree")?;

        let parent = self.refs().read_head().context("failed to read HEAD")?;
        let is_root = match parent {
            Some(_) => "",
            None => " (root-commit)",
        };

        let commit = Commit::new(
            parent,
            tree_oid,
            config.author.clone(),
            config.committer.clone(),
            message.to_string(),
        );
        let commit_id = self
            .database()
            .store(&commit)
            .context("failed to write the commit")?;
        self.refs()
            .update_head(&commit_id)
            .context("failed to update HEAD")?;
        debug!(oid = %commit_id, tree = %commit.tree_oid(), "created commit");

        index.clear();
        index
            .write_updates()
            .context("failed to clear the index")?;

        let branch = self
            .refs()
            .current_branch()?
            .unwrap_or_else(|| "detached HEAD".to_string());
        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            branch,
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
