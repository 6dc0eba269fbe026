use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;

/// What `cat-file` prints about an object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatFileMode {
    /// The payload exactly as stored
    #[default]
    Raw,
    Type,
    Size,
    /// Human-readable rendering, trees listed one entry per line
    Pretty,
}

impl Repository {
    pub fn cat_file(&self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id)?;
        let object = self
            .database()
            .load(&object_id)
            .with_context(|| format!("failed to read object {object_id}"))?;

        match mode {
            CatFileMode::Raw => self.writer().write_all(object.payload())?,
            CatFileMode::Type => writeln!(self.writer(), "{}", object.object_type())?,
            CatFileMode::Size => writeln!(self.writer(), "{}", object.size())?,
            CatFileMode::Pretty => match object.object_type() {
                ObjectType::Tag => self.writer().write_all(object.payload())?,
                _ => match self.database().parse_object(&object_id)? {
                    ObjectBox::Blob(_) => self.writer().write_all(object.payload())?,
                    ObjectBox::Tree(tree) => {
                        for line in tree.display().lines() {
                            writeln!(self.writer(), "{line}")?;
                        }
                    }
                    ObjectBox::Commit(commit) => write!(self.writer(), "{}", commit.display())?,
                },
            },
        }

        Ok(())
    }
}
