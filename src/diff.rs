//! The Diff Normalizer: turns a Gateway `FilePatch` into a wire-schema
//! `FileChange`, or a decision to drop the file.

use git2::Delta;
use tracing::warn;

use crate::git::FilePatch;
use crate::record::{FileChange, FileStats, FileStatus, Hunk};

/// Converts one Gateway patch into a [`FileChange`].
///
/// Returns `None` when the patch's line content is not valid UTF-8 anywhere
/// in the file; the caller is expected to log why via [`normalize_or_warn`].
pub fn normalize(patch: &FilePatch) -> Option<FileChange> {
    let status = status_of(patch.status);

    if patch.is_binary {
        return Some(FileChange {
            path: patch.path.clone(),
            previous_path: patch.previous_path.clone(),
            status,
            extension: extension_of(&patch.path),
            language: None,
            hunks: Vec::new(),
            stats: FileStats::default(),
        });
    }

    let mut hunks = Vec::with_capacity(patch.hunks.len());
    let mut stats = FileStats::default();

    for raw in &patch.hunks {
        let mut hunk = Hunk {
            header: raw.header.clone(),
            ..Hunk::default()
        };

        for line in &raw.lines {
            let text = String::from_utf8(line.content.clone()).ok()?;
            let mut rendered = String::with_capacity(text.len() + 1);
            rendered.push(line.origin);
            rendered.push_str(&text);

            match line.origin {
                '+' => {
                    hunk.added.push(rendered);
                    stats.additions += 1;
                }
                '-' => {
                    hunk.removed.push(rendered);
                    stats.deletions += 1;
                }
                _ => hunk.context.push(rendered),
            }
        }

        hunks.push(hunk);
    }

    Some(FileChange {
        path: patch.path.clone(),
        previous_path: patch.previous_path.clone(),
        status,
        extension: extension_of(&patch.path),
        language: None,
        hunks,
        stats,
    })
}

/// Like [`normalize`], but logs a warning and returns `None` when the file
/// is dropped for undecodable content, naming `commit_hash` for diagnosis.
pub fn normalize_or_warn(patch: &FilePatch, commit_hash: &str) -> Option<FileChange> {
    let change = normalize(patch);
    if change.is_none() {
        warn!(
            commit = commit_hash,
            path = %patch.path,
            "skipping file with undecodable patch content"
        );
    }
    change
}

/// Lowercase suffix of `path` including the leading dot, or empty if `path`
/// has no extension.
pub fn extension_of(path: &str) -> String {
    path.rsplit('/')
        .next()
        .and_then(|name| name.rfind('.').map(|idx| name[idx..].to_lowercase()))
        .unwrap_or_default()
}

fn status_of(delta: Delta) -> FileStatus {
    match delta {
        Delta::Added | Delta::Copied | Delta::Untracked => FileStatus::Added,
        Delta::Deleted => FileStatus::Deleted,
        Delta::Renamed => FileStatus::Renamed,
        _ => FileStatus::Modified,
    }
}
