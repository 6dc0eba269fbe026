use crate::areas::repository::Repository;
use anyhow::Context;
use file_guard::Lock;

impl Repository {
    /// List staged paths in index order
    ///
    /// With `stage`, each line reads `<mode> <oid> <stage>\t<path>`.
    pub fn ls_files(&self, stage: bool) -> anyhow::Result<()> {
        let _lock = self
            .lock(Lock::Shared)
            .context("failed to lock the repository")?;
        let index = self.load_index().context("failed to read the index")?;

        let mut writer = self.writer();
        for entry in index.entries() {
            if stage {
                writeln!(
                    writer,
                    "{} {} {}\t{}",
                    entry.mode(),
                    entry.oid,
                    entry.stage(),
                    entry.name
                )?;
            } else {
                writeln!(writer, "{}", entry.name)?;
            }
        }

        Ok(())
    }
}
