//! Building tree objects from the index
//!
//! The index is a flat, sorted list of paths. The builder folds those paths
//! into a nested directory structure, then writes it bottom-up: every
//! subdirectory's tree is stored first so that its ID can be recorded in the
//! parent.
//!
//! The result only depends on the set of staged `(path, mode, oid)` triples,
//! never on the order they are fed in.

use crate::areas::database::Database;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::{Error, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Path shown in error context for the repository root
const ROOT_PATH: &str = ".";

#[derive(Debug)]
enum Node {
    File { mode: EntryMode, oid: ObjectId },
    Directory(BTreeMap<String, Node>),
}

pub struct TreeBuilder<'d> {
    database: &'d Database,
}

impl<'d> TreeBuilder<'d> {
    pub fn new(database: &'d Database) -> Self {
        TreeBuilder { database }
    }

    /// Store the trees for `entries` and return the root tree ID
    ///
    /// An empty set of entries yields the empty tree.
    pub fn build<'e>(&self, entries: impl IntoIterator<Item = &'e IndexEntry>) -> Result<ObjectId> {
        let mut root = BTreeMap::new();

        for entry in entries {
            Self::insert(&mut root, entry).map_err(|source| Error::TreeBuild {
                path: entry.name.clone(),
                source: Box::new(source),
            })?;
        }

        self.write_directory(ROOT_PATH, root)
    }

    fn insert(root: &mut BTreeMap<String, Node>, entry: &IndexEntry) -> Result<()> {
        if entry.mode().is_tree() {
            return Err(Error::Corrupt(format!(
                "index entry {} has a directory mode",
                entry.name
            )));
        }

        let mut components = entry.name.split('/').peekable();
        let mut directory = root;

        while let Some(component) = components.next() {
            if component.is_empty() || component == "." || component == ".." {
                return Err(Error::Corrupt(format!(
                    "invalid path component {component:?}"
                )));
            }

            if components.peek().is_none() {
                if directory.contains_key(component) {
                    return Err(Error::Corrupt(format!(
                        "{component} is staged both as a file and a directory"
                    )));
                }
                directory.insert(
                    component.to_string(),
                    Node::File {
                        mode: entry.mode(),
                        oid: entry.oid.clone(),
                    },
                );
                return Ok(());
            }

            let node = directory
                .entry(component.to_string())
                .or_insert_with(|| Node::Directory(BTreeMap::new()));
            directory = match node {
                Node::Directory(children) => children,
                Node::File { .. } => {
                    return Err(Error::Corrupt(format!(
                        "{component} is staged both as a file and a directory"
                    )));
                }
            };
        }

        Ok(())
    }

    /// Post-order: children are stored before the tree that names them
    fn write_directory(&self, path: &str, children: BTreeMap<String, Node>) -> Result<ObjectId> {
        let mut tree_entries = Vec::with_capacity(children.len());

        for (name, node) in children {
            let tree_entry = match node {
                Node::File { mode, oid } => TreeEntry::new(mode, name, oid),
                Node::Directory(grandchildren) => {
                    let child_path = match path {
                        ROOT_PATH => name.clone(),
                        _ => format!("{path}/{name}"),
                    };
                    let oid = self.write_directory(&child_path, grandchildren)?;
                    TreeEntry::new(EntryMode::Directory, name, oid)
                }
            };
            tree_entries.push(tree_entry);
        }

        let tree = Tree::new(tree_entries);
        let oid = self
            .database
            .store(&tree)
            .map_err(|source| Error::TreeBuild {
                path: path.to_string(),
                source: Box::new(source),
            })?;

        debug!(path, entries = tree.len(), %oid, "stored tree");
        Ok(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::index::index_entry::EntryMetadata;
    use crate::artifacts::objects::blob::Blob;
    use crate::errors::ErrorKind;
    use assert_fs::TempDir;
    use bytes::Bytes;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    fn staged(database: &Database, name: &str, content: &str, mode: FileMode) -> IndexEntry {
        let oid = database
            .store(&Blob::new(Bytes::from(content.to_string())))
            .unwrap();
        IndexEntry::new(
            name.to_string(),
            oid,
            EntryMetadata {
                mode: EntryMode::File(mode),
                ..EntryMetadata::default()
            },
        )
    }

    #[rstest]
    fn empty_index_builds_the_empty_tree(temp_dir: TempDir) {
        let database = database(&temp_dir);

        let oid = TreeBuilder::new(&database)
            .build(Vec::<IndexEntry>::new().iter())
            .unwrap();

        pretty_assertions::assert_eq!(oid.to_string(), EMPTY_TREE);
        assert!(database.exists(&oid));
    }

    #[rstest]
    fn flat_files_land_in_the_root_tree(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let entries = vec![
            staged(&database, "file1.txt", "hello", FileMode::Regular),
            staged(&database, "file2.txt", "world", FileMode::Executable),
        ];

        let oid = TreeBuilder::new(&database).build(&entries).unwrap();
        let tree = database.parse_object_as_tree(&oid).unwrap();

        let listing = tree
            .entries()
            .map(|entry| (entry.mode.as_str(), entry.name.as_str(), entry.oid.clone()))
            .collect::<Vec<_>>();
        pretty_assertions::assert_eq!(
            listing,
            vec![
                ("100644", "file1.txt", entries[0].oid.clone()),
                ("100755", "file2.txt", entries[1].oid.clone()),
            ]
        );
    }

    #[rstest]
    fn nested_directories_become_subtrees(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let entries = vec![
            staged(&database, "a/b/c.txt", "deep", FileMode::Regular),
            staged(&database, "a/d.txt", "shallow", FileMode::Regular),
            staged(&database, "e.txt", "top", FileMode::Regular),
        ];

        let root_oid = TreeBuilder::new(&database).build(&entries).unwrap();

        let root = database.parse_object_as_tree(&root_oid).unwrap();
        let names = root.entries().map(|e| e.name.as_str()).collect::<Vec<_>>();
        pretty_assertions::assert_eq!(names, vec!["a", "e.txt"]);

        let a = root.entry("a").unwrap();
        pretty_assertions::assert_eq!(a.mode, EntryMode::Directory);
        let a_tree = database.parse_object_as_tree(&a.oid).unwrap();
        let names = a_tree.entries().map(|e| e.name.as_str()).collect::<Vec<_>>();
        pretty_assertions::assert_eq!(names, vec!["b", "d.txt"]);

        let b_tree = database
            .parse_object_as_tree(&a_tree.entry("b").unwrap().oid)
            .unwrap();
        let leaf = b_tree.entry("c.txt").unwrap();
        pretty_assertions::assert_eq!(leaf.mode, EntryMode::File(FileMode::Regular));
        pretty_assertions::assert_eq!(leaf.oid, entries[0].oid);
        pretty_assertions::assert_eq!(b_tree.len(), 1);
    }

    #[rstest]
    #[case("a//b.txt")]
    #[case("/a.txt")]
    #[case("a/../b.txt")]
    #[case("./a.txt")]
    #[case("dir/")]
    fn invalid_components_are_rejected(temp_dir: TempDir, #[case] name: &str) {
        let database = database(&temp_dir);
        let entries = vec![staged(&database, name, "x", FileMode::Regular)];

        let err = TreeBuilder::new(&database).build(&entries).unwrap_err();

        pretty_assertions::assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert!(err.to_string().contains(name));
    }

    #[rstest]
    fn file_and_directory_with_the_same_name_conflict(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let entries = vec![
            staged(&database, "a", "file", FileMode::Regular),
            staged(&database, "a/b.txt", "nested", FileMode::Regular),
        ];

        let err = TreeBuilder::new(&database).build(&entries).unwrap_err();

        pretty_assertions::assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[rstest]
    fn directory_mode_entries_are_rejected(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let mut entry = staged(&database, "dir", "x", FileMode::Regular);
        entry.metadata.mode = EntryMode::Directory;

        let err = TreeBuilder::new(&database).build([&entry]).unwrap_err();

        pretty_assertions::assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[rstest]
    fn store_failures_name_the_directory(temp_dir: TempDir) {
        // a plain file where the objects directory should be
        std::fs::write(temp_dir.path().join("objects"), b"").unwrap();
        let database = database(&temp_dir);
        let entry = IndexEntry::new(
            "src/lib.rs".to_string(),
            ObjectId::from_bytes([1; 20]),
            EntryMetadata::default(),
        );

        let err = TreeBuilder::new(&database).build([&entry]).unwrap_err();

        assert!(matches!(&err, Error::TreeBuild { path, .. } if path == "src"));
        pretty_assertions::assert_eq!(err.kind(), ErrorKind::Io);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn root_id_ignores_insertion_order(
            names in proptest::collection::btree_set("[a-c]{1,3}/[a-c]{1,3}\\.txt|[d-f]{1,3}", 1..10),
            rotation in 0usize..10,
        ) {
            let temp_dir = TempDir::new().unwrap();
            let database = database(&temp_dir);
            let mut entries = names
                .iter()
                .map(|name| staged(&database, name, name, FileMode::Regular))
                .collect::<Vec<_>>();

            let sorted_oid = TreeBuilder::new(&database).build(&entries).unwrap();
            let len = entries.len();
            entries.rotate_left(rotation % len);
            entries.reverse();
            let shuffled_oid = TreeBuilder::new(&database).build(&entries).unwrap();

            prop_assert_eq!(sorted_oid, shuffled_oid);
        }
    }
}
