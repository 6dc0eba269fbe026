//! Per-invocation configuration
//!
//! Identity comes from the environment, the same variables git reads:
//!
//! - `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL` (required to commit)
//! - `GIT_AUTHOR_DATE` (optional, RFC 2822 or `YYYY-MM-DD HH:MM:SS +ZZZZ`)
//! - `GIT_COMMITTER_NAME`, `GIT_COMMITTER_EMAIL`, `GIT_COMMITTER_DATE`
//!   (optional, default to the author values)
//!
//! A `Config` is built for each command and passed down; nothing is cached
//! between invocations.

use crate::artifacts::objects::commit::Author;
use anyhow::Context;
use chrono::{DateTime, FixedOffset};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Characters that would break an `author`/`committer` header line
const FORBIDDEN_IDENTITY_CHARS: &[char] = &['<', '>', '\n', '\r', '\0'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub author: Author,
    pub committer: Author,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let name = lookup("GIT_AUTHOR_NAME").context("GIT_AUTHOR_NAME not set")?;
        let name = check_identity("GIT_AUTHOR_NAME", name)?;
        let email = lookup("GIT_AUTHOR_EMAIL").context("GIT_AUTHOR_EMAIL not set")?;
        let email = check_identity("GIT_AUTHOR_EMAIL", email)?;
        let timestamp = lookup("GIT_AUTHOR_DATE")
            .map(|date| parse_date(&date).context("GIT_AUTHOR_DATE is not a valid date"))
            .transpose()?
            .unwrap_or_else(|| chrono::Local::now().fixed_offset());

        let author = Author::new_with_timestamp(name, email, timestamp);

        let committer_timestamp = lookup("GIT_COMMITTER_DATE")
            .map(|date| parse_date(&date).context("GIT_COMMITTER_DATE is not a valid date"))
            .transpose()?
            .unwrap_or(timestamp);
        let committer_name = lookup("GIT_COMMITTER_NAME")
            .map(|name| check_identity("GIT_COMMITTER_NAME", name))
            .transpose()?
            .unwrap_or_else(|| author.name().to_string());
        let committer_email = lookup("GIT_COMMITTER_EMAIL")
            .map(|email| check_identity("GIT_COMMITTER_EMAIL", email))
            .transpose()?
            .unwrap_or_else(|| author.email().to_string());
        let committer =
            Author::new_with_timestamp(committer_name, committer_email, committer_timestamp);

        Ok(Config { author, committer })
    }
}

/// Identity values end up verbatim in the commit header
fn check_identity(key: &str, value: String) -> anyhow::Result<String> {
    if value.trim().is_empty() {
        anyhow::bail!("{key} is empty");
    }
    if let Some(forbidden) = value.chars().find(|c| FORBIDDEN_IDENTITY_CHARS.contains(c)) {
        anyhow::bail!("{key} must not contain {forbidden:?}");
    }

    Ok(value)
}

fn parse_date(date: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(date)
        .or_else(|_| DateTime::parse_from_str(date, DATE_FORMAT))
        .with_context(|| format!("cannot parse date {date:?}"))
}
