use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};

/// Name of the repository metadata directory
pub const GIT_DIR: &str = ".git";

/// Working tree: the files under the repository root
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    /// `path` must already be canonical for containment checks to hold
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn a user-supplied path into a `/`-separated path relative to the root
    ///
    /// Relative paths are resolved against `cwd`. Only existing regular files
    /// inside the working tree (and outside `.git`) are accepted.
    pub fn normalize_path(&self, cwd: &Path, path: &Path) -> Result<String> {
        let absolute = cwd.join(path);

        let metadata = std::fs::symlink_metadata(&absolute)?;
        if metadata.file_type().is_symlink() {
            return Err(unsupported(path, "symbolic links are not supported"));
        }

        let canonical = absolute.canonicalize()?;
        let relative = canonical
            .strip_prefix(&self.path)
            .map_err(|_| Error::PathEscape(path.to_path_buf()))?;

        if metadata.is_dir() {
            return Err(unsupported(path, "is a directory"));
        }
        if !metadata.is_file() {
            return Err(unsupported(path, "not a regular file"));
        }

        let mut components = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| unsupported(path, "path is not valid UTF-8"))?;
                    components.push(name);
                }
                _ => return Err(Error::PathEscape(path.to_path_buf())),
            }
        }

        if components.first() == Some(&GIT_DIR) {
            return Err(unsupported(path, "is inside the repository metadata directory"));
        }
        if components.is_empty() {
            return Err(unsupported(path, "is the repository root"));
        }

        Ok(components.join("/"))
    }

    pub fn absolute_path(&self, file_path: &str) -> PathBuf {
        self.path.join(file_path)
    }

    pub fn read_file(&self, file_path: &str) -> Result<Bytes> {
        let content = std::fs::read(self.absolute_path(file_path))?;

        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, file_path: &str) -> Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    pub fn stat_file(&self, file_path: &str) -> Result<EntryMetadata> {
        let absolute = self.absolute_path(file_path);
        let metadata = std::fs::metadata(&absolute)?;

        (absolute.as_path(), metadata).try_into()
    }
}

fn unsupported(path: &Path, reason: &str) -> Error {
    Error::UnsupportedFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
