use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use nib::areas::repository::Repository;
use nib::commands::plumbing::cat_file::CatFileMode;
use nib::commands::porcelain::log::LogOptions;
use nib::config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nib",
    version = "0.1.0",
    about = "A minimal content-addressable version control store",
    long_about = "nib records file contents as hash-identified objects, \
    snapshots the staged files into trees and commits, and replays the \
    resulting history. Repositories use the familiar .git on-disk layout.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "add",
        about = "Add file contents to the index",
        long_about = "This command stores the content of each given file as a blob \
        and stages it in the index. Directories and symbolic links are rejected."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "log",
        about = "Show commit logs",
        long_about = "This command lists the commits reachable from the given revision, \
        newest first. The revision is a full commit hash or HEAD (the default)."
    )]
    Log {
        #[arg(index = 1, help = "The commit to start from")]
        revision: Option<String>,
        #[arg(short = 'n', long, help = "Limit the number of commits to output")]
        max_count: Option<usize>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the SHA of the object to be specified."
    )]
    CatFile {
        #[arg(short = 't', conflicts_with_all = ["size", "pretty"], help = "Show the object type")]
        kind: bool,
        #[arg(short = 's', conflicts_with = "pretty", help = "Show the object size")]
        size: bool,
        #[arg(short = 'p', help = "Pretty-print the object content")]
        pretty: bool,
        #[arg(index = 1, help = "The object SHA to print")]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database",
        long_about = "This command hashes an object file and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "ls-files",
        about = "Show the files staged in the index",
        long_about = "This command lists the paths staged in the index in sorted order."
    )]
    LsFiles {
        #[arg(short, long, help = "Show mode, object name and stage number")]
        stage: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let pwd = std::env::current_dir().context("cannot determine the current directory")?;

    match cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => pwd.join(path),
                None => pwd,
            };
            std::fs::create_dir_all(&path)
                .with_context(|| format!("cannot create {}", path.display()))?;

            Repository::new(&path, Box::new(std::io::stdout()))?.init()?
        }
        Commands::Add { paths } => open_repository(&pwd)?.add(&pwd, &paths)?,
        Commands::Commit { message } => {
            let config = Config::from_env()?;
            open_repository(&pwd)?.commit(&message, &config)?
        }
        Commands::Log {
            revision,
            max_count,
        } => open_repository(&pwd)?.log(&LogOptions {
            revision,
            max_count,
        })?,
        Commands::CatFile {
            kind,
            size,
            pretty,
            object,
        } => {
            let mode = match (kind, size, pretty) {
                (true, _, _) => CatFileMode::Type,
                (_, true, _) => CatFileMode::Size,
                (_, _, true) => CatFileMode::Pretty,
                _ => CatFileMode::Raw,
            };

            open_repository(&pwd)?.cat_file(&object, mode)?
        }
        Commands::HashObject { write, file } => {
            open_repository(&pwd)?.hash_object(&pwd, &file, write)?
        }
        Commands::LsFiles { stage } => open_repository(&pwd)?.ls_files(stage)?,
    }

    Ok(())
}

fn open_repository(pwd: &Path) -> Result<Repository> {
    Ok(Repository::discover(pwd, Box::new(std::io::stdout()))?)
}
