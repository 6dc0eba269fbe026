use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{repository_dir, run_nib_command};
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn init_repository_successfully(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_nib_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty Git repository in .+\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    repository_dir
        .child(".git/HEAD")
        .assert("ref: refs/heads/master\n");
    repository_dir
        .child(".git/objects")
        .assert(predicate::path::is_dir());
    repository_dir
        .child(".git/refs/heads")
        .assert(predicate::path::is_dir());
    repository_dir
        .child(".git/index")
        .assert(predicate::path::missing());

    Ok(())
}

#[rstest]
fn init_at_a_new_path_creates_it(repository_dir: TempDir) {
    run_nib_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nested/project"));

    repository_dir
        .child("nested/project/.git/HEAD")
        .assert(predicate::path::is_file());
}

#[rstest]
fn init_twice_keeps_head(repository_dir: TempDir) {
    run_nib_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    std::fs::write(
        repository_dir.path().join(".git/HEAD"),
        "ref: refs/heads/main\n",
    )
    .unwrap();

    run_nib_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
        .child(".git/HEAD")
        .assert("ref: refs/heads/main\n");
}
