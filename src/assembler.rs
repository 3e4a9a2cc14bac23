//! The Record Assembler: orchestrates per-commit work into a `Record`, or a
//! decision to skip the commit.

use std::collections::BTreeSet;

use chrono::Utc;
use git2::Oid;
use tracing::{info, warn};

use crate::context;
use crate::diff::{extension_of, normalize_or_warn};
use crate::git::GitRepository;
use crate::record::{FileChange, FileStats, Intent, IntentSource, Record};

/// Builds a [`Record`] for the ADL-touching commit `child`, or `None` if the
/// commit should be skipped per the empty-diff or root-commit rules.
pub fn assemble(
    repo: &GitRepository,
    child: Oid,
    adl_file_path: &str,
    code_exts: &BTreeSet<String>,
    context_days: u32,
) -> Result<Option<Record>, crate::error::MinerError> {
    let Some(patches) = repo.diff_against_first_parent(child)? else {
        info!(commit = %child, "root commit skipped");
        return Ok(None);
    };

    let commit = repo.commit_at(child)?;

    let mut adl_candidates: Vec<FileChange> = Vec::new();
    let mut code_diffs = Vec::new();

    for patch in &patches {
        let matches_adl = crate::adl::is_adl_path(&patch.path, adl_file_path)
            || patch
                .previous_path
                .as_deref()
                .is_some_and(|p| crate::adl::is_adl_path(p, adl_file_path));

        if matches_adl {
            if let Some(change) = normalize_or_warn(patch, &commit.hash) {
                adl_candidates.push(change);
            }
            continue;
        }

        if code_exts.contains(&extension_of(&patch.path)) {
            if let Some(change) = normalize_or_warn(patch, &commit.hash) {
                code_diffs.push(change);
            }
        }
    }

    if adl_candidates.len() > 1 {
        adl_candidates.sort_by(|a, b| a.path.cmp(&b.path));
        warn!(
            commit = %commit.hash,
            count = adl_candidates.len(),
            "multiple ADL-matching patches in one commit, keeping the first by path"
        );
    }

    let Some(adl_diff) = adl_candidates.into_iter().next() else {
        warn!(
            commit = %commit.hash,
            "commit touches the ADL path but its patch yielded no ADL content, skipping"
        );
        return Ok(None);
    };

    if adl_diff.stats == FileStats::default() && code_diffs.is_empty() {
        warn!(
            commit = %commit.hash,
            path = %adl_diff.path,
            "ADL diff carried no content (e.g. binary) and no code diffs survived, skipping"
        );
        return Ok(None);
    }

    let mut files_analyzed = Vec::new();
    for change in &code_diffs {
        if !files_analyzed.contains(&change.path) {
            files_analyzed.push(change.path.clone());
        }
    }

    let (parent_oid, parent_ref) = repo
        .first_parent(child)?
        .expect("diff_against_first_parent already confirmed a parent exists");

    let context_signals = context::mine(
        repo,
        parent_oid,
        &parent_ref.hash,
        parent_ref.committed_at,
        context_days,
        &files_analyzed,
    );

    Ok(Some(Record {
        commit: commit.clone(),
        intent: Intent {
            message: commit.message.clone(),
            source: IntentSource::CommitMessage,
        },
        adl_diff,
        code_diffs,
        context_signals,
        metadata: crate::record::Metadata::new(Utc::now()),
    }))
}
