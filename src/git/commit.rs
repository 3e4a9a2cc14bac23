//! Converts `git2::Commit` values into the wire-schema `CommitRef`.

use chrono::{DateTime, Utc};
use git2::{Commit, Signature, Time};

use crate::error::MinerError;
use crate::record::{CommitRef, Identity};

/// Builds a [`CommitRef`] from a `git2::Commit`.
///
/// `committer` falls back to `author` when the committer signature carries
/// neither a usable name nor email (practically unreachable for well-formed
/// Git objects, but cheap to guard against).
pub fn commit_ref(commit: &Commit<'_>) -> Result<CommitRef, MinerError> {
    let author = identity(&commit.author());
    let mut committer = identity(&commit.committer());
    if committer.name.is_empty() && committer.email.is_empty() {
        committer = author.clone();
    }

    let parent_hash = commit
        .parent_id(0)
        .map(|oid| oid.to_string())
        .unwrap_or_default();

    Ok(CommitRef {
        hash: commit.id().to_string(),
        parent_hash,
        authored_at: to_utc(commit, commit.author().when())?,
        committed_at: to_utc(commit, commit.committer().when())?,
        author,
        committer,
        is_merge: commit.parent_count() > 1,
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    })
}

fn identity(sig: &Signature<'_>) -> Identity {
    Identity {
        name: sig.name().unwrap_or_default().to_string(),
        email: sig.email().unwrap_or_default().to_string(),
    }
}

fn to_utc(commit: &Commit<'_>, time: Time) -> Result<DateTime<Utc>, MinerError> {
    DateTime::from_timestamp(time.seconds(), 0)
        .ok_or_else(|| MinerError::InvalidTimestamp(commit.id().to_string()))
}
