use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::HELLO_BLOB;
use common::command::{
    get_commit_tree_sha, get_head_commit_sha, init_repository_dir, nib_commit, run_nib_command,
};
use predicates::prelude::predicate;
use rstest::{fixture, rstest};

mod common;

/// Repository with `hello.txt` stored as a blob
#[fixture]
fn repository_with_blob(init_repository_dir: TempDir) -> TempDir {
    init_repository_dir.child("hello.txt").write_str("hello").unwrap();
    run_nib_command(init_repository_dir.path(), &["hash-object", "-w", "hello.txt"])
        .assert()
        .success();

    init_repository_dir
}

#[rstest]
#[case(&[], "hello")]
#[case(&["-t"], "blob\n")]
#[case(&["-s"], "5\n")]
#[case(&["-p"], "hello")]
fn cat_file_prints_blob_details(
    repository_with_blob: TempDir,
    #[case] flags: &[&str],
    #[case] expected: &str,
) {
    let mut args = vec!["cat-file"];
    args.extend_from_slice(flags);
    args.push(HELLO_BLOB);

    run_nib_command(repository_with_blob.path(), &args)
        .assert()
        .success()
        .stdout(expected.to_string());
}

#[rstest]
fn cat_file_pretty_prints_trees_and_commits(repository_with_blob: TempDir) {
    let dir = repository_with_blob.path();
    run_nib_command(dir, &["add", "hello.txt"]).assert().success();
    nib_commit(dir, "Add hello").assert().success();
    let head = get_head_commit_sha(dir).unwrap();
    let tree = get_commit_tree_sha(dir, &head);

    run_nib_command(dir, &["cat-file", "-t", &head])
        .assert()
        .success()
        .stdout("commit\n");
    run_nib_command(dir, &["cat-file", "-t", &tree])
        .assert()
        .success()
        .stdout("tree\n");
    run_nib_command(dir, &["cat-file", "-p", &tree])
        .assert()
        .success()
        .stdout(format!("100644 blob {HELLO_BLOB}\thello.txt\n"));
    run_nib_command(dir, &["cat-file", "-p", &head])
        .assert()
        .success()
        .stdout(format!(
            "tree {tree}\n\
             author fake_user <fake_email@email.com> 1672574400 +0000\n\
             committer fake_user <fake_email@email.com> 1672574400 +0000\n\
             \nAdd hello\n"
        ));
}

#[rstest]
fn cat_file_rejects_conflicting_flags(repository_with_blob: TempDir) {
    run_nib_command(repository_with_blob.path(), &["cat-file", "-t", "-s", HELLO_BLOB])
        .assert()
        .failure();
}

#[rstest]
#[case("b6fc4c")]
#[case("zzfc4c620b67d95f953a5c1c1230aaab5db5a1b0")]
fn cat_file_rejects_invalid_hashes(repository_with_blob: TempDir, #[case] object: &str) {
    run_nib_command(repository_with_blob.path(), &["cat-file", "-p", object])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid object hash"));
}

#[rstest]
fn cat_file_of_a_missing_object_fails(init_repository_dir: TempDir) {
    run_nib_command(init_repository_dir.path(), &["cat-file", "-p", HELLO_BLOB])
        .assert()
        .failure()
        .stderr(predicate::str::contains("object not found"));
}

#[rstest]
fn cat_file_of_a_corrupt_object_fails(repository_with_blob: TempDir) {
    let object_path = repository_with_blob
        .path()
        .join(".git/objects")
        .join(&HELLO_BLOB[..2])
        .join(&HELLO_BLOB[2..]);
    std::fs::write(&object_path, b"definitely not zlib").unwrap();

    run_nib_command(repository_with_blob.path(), &["cat-file", "-p", HELLO_BLOB])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt object"));
}
