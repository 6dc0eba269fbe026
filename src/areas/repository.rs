use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{GIT_DIR, Workspace};
use crate::errors::{Error, Result};
use file_guard::{FileGuard, Lock};
use std::cell::{RefCell, RefMut};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Advisory lock file serializing commands that touch the index
const LOCK_FILE: &str = "nib.lock";

const INDEX_FILE: &str = "index";

const OBJECTS_DIR: &str = "objects";

/// Held for the duration of a command; released on drop
pub type RepositoryLock = FileGuard<Box<File>>;

/// A repository on disk and the areas it is made of
///
/// Built fresh for every command. Output goes through `writer` so that
/// callers (and tests) decide where it ends up.
pub struct Repository {
    path: Box<Path>,
    git_path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository whose working tree is `path`
    ///
    /// The directory does not need to be initialized yet.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let path = path.canonicalize()?;
        let git_path = path.join(GIT_DIR);

        Ok(Repository {
            database: Database::new(git_path.join(OBJECTS_DIR).into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(git_path.clone().into_boxed_path()),
            writer: RefCell::new(writer),
            git_path: git_path.into_boxed_path(),
            path: path.into_boxed_path(),
        })
    }

    /// Find the repository containing `start` by walking up its ancestors
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let start = start.canonicalize()?;

        let root = start
            .ancestors()
            .find(|candidate| candidate.join(GIT_DIR).is_dir())
            .ok_or_else(|| Error::NotARepository(start.clone()))?;
        debug!(root = %root.display(), "discovered repository");

        Self::new(root, writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn index_path(&self) -> Box<Path> {
        self.git_path.join(INDEX_FILE).into_boxed_path()
    }

    /// Read the index from disk; every call yields an independent copy
    pub fn load_index(&self) -> Result<Index> {
        Index::load(self.index_path())
    }

    /// Take the repository-wide advisory lock
    ///
    /// Commands that write the index take it exclusively, commands that only
    /// read take it shared. Blocks until the lock is available.
    pub fn lock(&self, lock: Lock) -> Result<RepositoryLock> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.git_path.join(LOCK_FILE))?;

        Ok(file_guard::lock(Box::new(file), lock, 0, 1)?)
    }
}
