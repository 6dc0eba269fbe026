use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::{IndexEntry, MAX_PATH_SIZE};
use crate::errors::{Error, Result};
use anyhow::Context;
use file_guard::Lock;
use std::path::Path;
use tracing::{debug, warn};

impl Repository {
    /// Stage each of `paths`, resolved against `cwd`
    ///
    /// A path that cannot be staged is reported on stderr and skipped; the
    /// others are still written to the index. The command fails if any path
    /// was skipped.
    pub fn add(&self, cwd: &Path, paths: &[String]) -> anyhow::Result<()> {
        let _lock = self
            .lock(Lock::Exclusive)
            .context("failed to lock the repository")?;
        let mut index = self.load_index().context("failed to read the index")?;

        let mut failed = Vec::new();
        for path in paths {
            match self.stage_file(&mut index, cwd, Path::new(path)) {
                Ok(name) => debug!(path = %name, "staged file"),
                Err(err) => {
                    warn!(path = %path, error = %err, "cannot stage path");
                    eprintln!("error: {path}: {err}");
                    failed.push(path.as_str());
                }
            }
        }

        if index.is_changed() {
            index
                .write_updates()
                .context("failed to write the index")?;
        }

        if !failed.is_empty() {
            anyhow::bail!("could not stage {}", failed.join(", "));
        }

        Ok(())
    }

    fn stage_file(&self, index: &mut Index, cwd: &Path, path: &Path) -> Result<String> {
        let name = self.workspace().normalize_path(cwd, path)?;
        if name.len() > MAX_PATH_SIZE {
            return Err(Error::PathTooLong(name));
        }

        let blob = self.workspace().parse_blob(&name)?;
        let stat = self.workspace().stat_file(&name)?;
        let blob_id = self.database().store(&blob)?;

        index.add(IndexEntry::new(name.clone(), blob_id, stat));

        Ok(name)
    }
}
