//! References (HEAD and branches)
//!
//! References are text files naming a commit, either directly or through one
//! level of indirection:
//! - Direct: a 40-character hash followed by a newline
//! - Symbolic: `ref: <path>`, where `<path>` is relative to the `.git`
//!   directory (e.g. `ref: refs/heads/master`)
//!
//! HEAD is normally symbolic. A symbolic target that does not exist yet (or
//! is empty) means the branch has no commits. Chained symbolic refs are not
//! followed.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (\S+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Branch HEAD points to in a fresh repository
pub const DEFAULT_BRANCH: &str = "master";

const HEADS_PREFIX: &str = "refs/heads/";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    /// `None` when the file is absent or blank
    fn read(path: &Path) -> Result<Option<SymRefOrOid>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_regex = regex::Regex::new(SYMREF_REGEX)
            .map_err(|err| Error::Corrupt(format!("invalid ref pattern: {err}")))?;
        if let Some(symref_match) = symref_regex.captures(content) {
            return Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string())));
        }

        let oid = ObjectId::try_parse(content).map_err(|_| {
            Error::Corrupt(format!(
                "ref {} holds neither a hash nor a symbolic ref",
                path.display()
            ))
        })?;
        Ok(Some(SymRefOrOid::Oid(oid)))
    }
}

/// Reference store rooted at the `.git` directory
#[derive(Debug, new)]
pub struct Refs {
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    /// Point HEAD at the default branch unless HEAD already exists
    pub fn init_head(&self) -> Result<()> {
        if self.head_path().exists() {
            return Ok(());
        }

        self.write_ref_file(
            &self.head_path(),
            &format!("ref: {HEADS_PREFIX}{DEFAULT_BRANCH}\n"),
        )
    }

    /// Commit HEAD resolves to, `None` before the first commit
    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        match SymRefOrOid::read(&self.head_path())? {
            Some(SymRefOrOid::SymRef(target)) => match SymRefOrOid::read(&self.ref_path(&target)?)? {
                Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
                Some(SymRefOrOid::SymRef(_)) => Err(Error::Corrupt(format!(
                    "{target} is a symbolic ref to another symbolic ref"
                ))),
                None => Ok(None),
            },
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Like [`Refs::read_head`], but an unborn HEAD is an error
    pub fn resolve_head(&self) -> Result<ObjectId> {
        self.read_head()?
            .ok_or_else(|| Error::RefNotFound(HEAD_REF_NAME.to_string()))
    }

    /// Branch HEAD points to, `None` when HEAD is detached
    pub fn current_branch(&self) -> Result<Option<String>> {
        match SymRefOrOid::read(&self.head_path())? {
            Some(SymRefOrOid::SymRef(target)) => Ok(Some(
                target
                    .strip_prefix(HEADS_PREFIX)
                    .unwrap_or(&target)
                    .to_string(),
            )),
            Some(SymRefOrOid::Oid(_)) | None => Ok(None),
        }
    }

    /// Move HEAD, or the branch it points to, to `oid`
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        let head_path = self.head_path();

        let target_path = match SymRefOrOid::read(&head_path)? {
            Some(SymRefOrOid::SymRef(target)) => {
                let target_path = self.ref_path(&target)?;
                if let Some(SymRefOrOid::SymRef(_)) = SymRefOrOid::read(&target_path)? {
                    return Err(Error::Corrupt(format!(
                        "{target} is a symbolic ref to another symbolic ref"
                    )));
                }
                target_path
            }
            Some(SymRefOrOid::Oid(_)) | None => head_path,
        };

        debug!(path = %target_path.display(), %oid, "updating ref");
        self.write_ref_file(&target_path, &format!("{oid}\n"))
    }

    /// Resolve a symbolic target, refusing anything that leaves `.git`
    fn ref_path(&self, target: &str) -> Result<PathBuf> {
        let relative = Path::new(target);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));

        if escapes {
            return Err(Error::Corrupt(format!("symbolic ref target {target} is not a ref path")));
        }

        Ok(self.path.join(relative))
    }

    /// Replace a ref file with a write-to-temp-then-rename
    fn write_ref_file(&self, path: &Path, content: &str) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::Corrupt(format!("invalid ref path {}", path.display())))?;
        std::fs::create_dir_all(dir)?;

        let mut temp_file = tempfile::Builder::new().prefix("tmp-ref-").tempfile_in(dir)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|err| Error::Io(err.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use assert_fs::TempDir;
    use rstest::{fixture, rstest};

    const OID: &str = "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0";

    #[fixture]
    fn git_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn refs(dir: &TempDir) -> Refs {
        Refs::new(dir.path().into())
    }

    #[rstest]
    fn fresh_head_is_unborn_on_master(git_dir: TempDir) {
        let refs = refs(&git_dir);
        refs.init_head().unwrap();

        pretty_assertions::assert_eq!(
            std::fs::read_to_string(refs.head_path()).unwrap(),
            "ref: refs/heads/master\n"
        );
        pretty_assertions::assert_eq!(refs.read_head().unwrap(), None);
        pretty_assertions::assert_eq!(refs.current_branch().unwrap().as_deref(), Some("master"));
        pretty_assertions::assert_eq!(refs.resolve_head().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[rstest]
    fn updating_head_moves_the_branch(git_dir: TempDir) {
        let refs = refs(&git_dir);
        refs.init_head().unwrap();
        let oid = ObjectId::try_parse(OID).unwrap();

        refs.update_head(&oid).unwrap();

        pretty_assertions::assert_eq!(
            std::fs::read_to_string(refs.heads_path().join("master")).unwrap(),
            format!("{OID}\n")
        );
        pretty_assertions::assert_eq!(
            std::fs::read_to_string(refs.head_path()).unwrap(),
            "ref: refs/heads/master\n"
        );
        pretty_assertions::assert_eq!(refs.read_head().unwrap(), Some(oid));
    }

    #[rstest]
    fn detached_head_is_updated_in_place(git_dir: TempDir) {
        let refs = refs(&git_dir);
        std::fs::write(refs.head_path(), format!("{}\n", "a".repeat(40))).unwrap();
        let oid = ObjectId::try_parse(OID).unwrap();

        refs.update_head(&oid).unwrap();

        pretty_assertions::assert_eq!(refs.read_head().unwrap(), Some(oid));
        pretty_assertions::assert_eq!(refs.current_branch().unwrap(), None);
    }

    #[rstest]
    fn chained_symbolic_refs_are_corrupt(git_dir: TempDir) {
        let refs = refs(&git_dir);
        refs.init_head().unwrap();
        std::fs::create_dir_all(refs.heads_path()).unwrap();
        std::fs::write(refs.heads_path().join("master"), "ref: refs/heads/other\n").unwrap();

        pretty_assertions::assert_eq!(refs.read_head().unwrap_err().kind(), ErrorKind::Corrupt);
        let oid = ObjectId::try_parse(OID).unwrap();
        pretty_assertions::assert_eq!(refs.update_head(&oid).unwrap_err().kind(), ErrorKind::Corrupt);
    }

    #[rstest]
    #[case("ref: ../outside\n")]
    #[case("ref: /etc/passwd\n")]
    #[case("not a hash\n")]
    fn malformed_head_is_corrupt(git_dir: TempDir, #[case] content: &str) {
        let refs = refs(&git_dir);
        std::fs::write(refs.head_path(), content).unwrap();

        pretty_assertions::assert_eq!(refs.read_head().unwrap_err().kind(), ErrorKind::Corrupt);
    }
}
