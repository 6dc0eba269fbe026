use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

impl Repository {
    /// Print the blob ID of `object_path`, storing the blob when `write` is set
    pub fn hash_object(&self, cwd: &Path, object_path: &str, write: bool) -> anyhow::Result<()> {
        let data = std::fs::read(cwd.join(object_path))
            .with_context(|| format!("cannot read {object_path}"))?;
        let object = Blob::new(Bytes::from(data));

        let object_id = match write {
            true => self.database().store(&object)?,
            false => object.object_id()?,
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
