use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::command::{
    get_head_commit_sha, init_repository_dir, nib_commit, repository_with_multiple_commits,
    run_nib_command, stdout_of,
};
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

fn commit_subjects(log: &str) -> Vec<&str> {
    log.lines()
        .filter_map(|line| line.strip_prefix("    "))
        .collect()
}

#[rstest]
fn log_lists_commits_newest_first(repository_with_multiple_commits: TempDir) {
    let log = stdout_of(run_nib_command(
        repository_with_multiple_commits.path(),
        &["log"],
    ));

    pretty_assertions::assert_eq!(
        commit_subjects(&log),
        vec!["Third commit", "Second commit", "First commit"]
    );
}

#[rstest]
fn log_prints_the_medium_format(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    init_repository_dir.child("a.txt").write_str("a").unwrap();
    run_nib_command(dir, &["add", "a.txt"]).assert().success();
    nib_commit(dir, "First commit")
        .assert()
        .success();
    let head = get_head_commit_sha(dir).unwrap();

    run_nib_command(dir, &["log"])
        .assert()
        .success()
        .stdout(format!(
            "commit {head}\n\
             Author: fake_user <fake_email@email.com>\n\
             Date:   Sun Jan 1 12:00:00 2023 +0000\n\
             \n    First commit\n\n"
        ));
}

#[rstest]
#[case("1", vec!["Third commit"])]
#[case("2", vec!["Third commit", "Second commit"])]
#[case("10", vec!["Third commit", "Second commit", "First commit"])]
fn log_limits_the_number_of_commits(
    repository_with_multiple_commits: TempDir,
    #[case] max_count: &str,
    #[case] expected: Vec<&str>,
) {
    let log = stdout_of(run_nib_command(
        repository_with_multiple_commits.path(),
        &["log", "-n", max_count],
    ));

    pretty_assertions::assert_eq!(commit_subjects(&log), expected);
}

#[rstest]
fn log_with_zero_max_count_prints_nothing(repository_with_multiple_commits: TempDir) {
    run_nib_command(repository_with_multiple_commits.path(), &["log", "-n", "0"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn log_starts_from_an_explicit_commit(repository_with_multiple_commits: TempDir) {
    let dir = repository_with_multiple_commits.path();
    let head = get_head_commit_sha(dir).unwrap();
    let parent = stdout_of(run_nib_command(dir, &["cat-file", "-p", &head]))
        .lines()
        .find_map(|line| line.strip_prefix("parent ").map(str::to_string))
        .unwrap();

    let log = stdout_of(run_nib_command(dir, &["log", &parent]));

    pretty_assertions::assert_eq!(
        commit_subjects(&log),
        vec!["Second commit", "First commit"]
    );
    assert!(log.starts_with(&format!("commit {parent}\n")));
}

#[rstest]
fn log_accepts_head_explicitly(repository_with_multiple_commits: TempDir) {
    let dir = repository_with_multiple_commits.path();

    let implicit = stdout_of(run_nib_command(dir, &["log"]));
    let explicit = stdout_of(run_nib_command(dir, &["log", "HEAD"]));

    pretty_assertions::assert_eq!(implicit, explicit);
}

#[rstest]
fn log_without_commits_fails(init_repository_dir: TempDir) {
    run_nib_command(init_repository_dir.path(), &["log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not have any commits"));
}

#[rstest]
#[case("abc123")]
#[case("not-a-hash-not-a-hash-not-a-hash-not-a-h")]
fn log_rejects_invalid_hashes(repository_with_multiple_commits: TempDir, #[case] revision: &str) {
    run_nib_command(repository_with_multiple_commits.path(), &["log", revision])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid object hash"));
}

#[rstest]
fn log_from_a_missing_commit_fails(repository_with_multiple_commits: TempDir) {
    run_nib_command(
        repository_with_multiple_commits.path(),
        &["log", &"0".repeat(40)],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("object not found"));
}

#[rstest]
fn log_from_a_blob_fails(repository_with_multiple_commits: TempDir) {
    let dir = repository_with_multiple_commits.path();
    let blob = stdout_of(run_nib_command(dir, &["hash-object", "file1.txt"]));

    run_nib_command(dir, &["log", blob.trim()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("history walk failed"));
}
