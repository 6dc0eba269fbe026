use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_nib_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// Repository holding three commits, each adding one file
#[fixture]
pub fn repository_with_multiple_commits(init_repository_dir: TempDir) -> TempDir {
    for (index, message) in ["First commit", "Second commit", "Third commit"]
        .into_iter()
        .enumerate()
    {
        let file_name = format!("file{}.txt", index + 1);
        let file = FileSpec::new(
            init_repository_dir.path().join(&file_name),
            format!("content {}", index + 1),
        );
        write_file(file);

        run_nib_command(init_repository_dir.path(), &["add", &file_name])
            .assert()
            .success();
        nib_commit(init_repository_dir.path(), message)
            .assert()
            .success();
    }

    init_repository_dir
}

pub fn run_nib_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("nib").expect("Failed to find nib binary");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn nib_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_nib_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", AUTHOR_NAME),
        ("GIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd.env_remove("GIT_COMMITTER_NAME")
        .env_remove("GIT_COMMITTER_EMAIL")
        .env_remove("GIT_COMMITTER_DATE");
    cmd
}

/// Stdout of a successful command, as a string
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout is not valid UTF-8")
}

/// Get the current HEAD commit SHA
pub fn get_head_commit_sha(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let head_path = dir.join(".git").join("HEAD");
    let head_content = std::fs::read_to_string(head_path)?;

    // HEAD file contains either a commit SHA or a ref like "ref: refs/heads/master"
    if let Some(ref_path) = head_content.strip_prefix("ref: ") {
        let ref_file = dir.join(".git").join(ref_path.trim());
        let commit_sha = std::fs::read_to_string(ref_file)?;
        Ok(commit_sha.trim().to_string())
    } else {
        Ok(head_content.trim().to_string())
    }
}

/// Tree ID recorded in a commit, read back through `cat-file -p`
pub fn get_commit_tree_sha(dir: &Path, commit_id: &str) -> String {
    stdout_of(run_nib_command(dir, &["cat-file", "-p", commit_id]))
        .lines()
        .find_map(|line| line.strip_prefix("tree ").map(str::to_string))
        .expect("commit has no tree line")
}
