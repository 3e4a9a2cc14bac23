//! The Context Miner: derives per-file and aggregate churn/authorship
//! statistics for a set of code paths, anchored at a reference commit.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::git::GitRepository;
use crate::record::{AggregateStats, ContextSignals, PerFileStats, TOP_AUTHORS_CAP};

/// Computes [`ContextSignals`] for `files` as seen from `parent_hash` at
/// `parent_committed_at`, over a `timespan_days`-day look-back window.
pub fn mine(
    repo: &GitRepository,
    parent_oid: git2::Oid,
    parent_hash: &str,
    parent_committed_at: DateTime<Utc>,
    timespan_days: u32,
    files: &[String],
) -> ContextSignals {
    let until = parent_committed_at;
    let since = until - Duration::days(i64::from(timespan_days));

    let mut per_file_stats = Vec::with_capacity(files.len());
    let mut all_authors: HashSet<String> = HashSet::new();
    let mut most_recent: Option<f64> = None;

    for path in files {
        let stats = match repo.history_for_path(parent_oid, path, since, until) {
            Ok(history) => {
                all_authors.extend(history.iter().map(|c| c.author.email.clone()));
                build_stats(path, &history, until)
            }
            Err(err) => {
                warn!(path = %path, error = %err, "context analysis failed for path, recording zeros");
                PerFileStats {
                    path: path.clone(),
                    churn_count: 0,
                    unique_authors: 0,
                    last_modified_days_ago: 0.0,
                    top_authors: Vec::new(),
                }
            }
        };

        if stats.churn_count > 0 {
            most_recent = Some(most_recent.map_or(stats.last_modified_days_ago, |m| {
                m.min(stats.last_modified_days_ago)
            }));
        }
        per_file_stats.push(stats);
    }

    let aggregate_stats = AggregateStats {
        total_commits: per_file_stats.iter().map(|s| s.churn_count).sum(),
        total_unique_authors: all_authors.len() as u32,
        most_recent_change_days_ago: most_recent.unwrap_or(0.0),
    };

    ContextSignals {
        analysis_parent_hash: parent_hash.to_string(),
        analysis_timespan_days: timespan_days,
        files_analyzed: files.to_vec(),
        per_file_stats,
        aggregate_stats,
    }
}

fn build_stats(
    path: &str,
    history: &[crate::record::CommitRef],
    until: DateTime<Utc>,
) -> PerFileStats {
    if history.is_empty() {
        return PerFileStats {
            path: path.to_string(),
            churn_count: 0,
            unique_authors: 0,
            last_modified_days_ago: 0.0,
            top_authors: Vec::new(),
        };
    }

    let unique_authors: HashSet<&str> =
        history.iter().map(|c| c.author.email.as_str()).collect();

    let most_recent = history.iter().map(|c| c.committed_at).max().expect("non-empty history");
    let last_modified_days_ago =
        (until - most_recent).num_seconds() as f64 / 86_400.0;

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for commit in history {
        *counts.entry(commit.author.email.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_authors = ranked
        .into_iter()
        .take(TOP_AUTHORS_CAP)
        .map(|(email, _)| email.to_string())
        .collect();

    PerFileStats {
        path: path.to_string(),
        churn_count: history.len() as u32,
        unique_authors: unique_authors.len() as u32,
        last_modified_days_ago,
        top_authors,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::record::{CommitRef, Identity};
    use chrono::TimeZone;

    fn commit(email: &str, days_ago: i64, now: DateTime<Utc>) -> CommitRef {
        CommitRef {
            hash: format!("hash-{email}-{days_ago}"),
            parent_hash: String::new(),
            authored_at: now - Duration::days(days_ago),
            committed_at: now - Duration::days(days_ago),
            author: Identity {
                name: email.to_string(),
                email: email.to_string(),
            },
            committer: Identity {
                name: email.to_string(),
                email: email.to_string(),
            },
            is_merge: false,
            message: "msg\n".to_string(),
        }
    }

    #[test]
    fn empty_history_yields_zeroed_stats() {
        let until = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let stats = build_stats("a.py", &[], until);
        assert_eq!(stats.churn_count, 0);
        assert_eq!(stats.unique_authors, 0);
        assert_eq!(stats.last_modified_days_ago, 0.0);
        assert!(stats.top_authors.is_empty());
    }

    #[test]
    fn top_authors_ranked_by_count_then_email() {
        let until = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let history = vec![
            commit("a@example.com", 1, until),
            commit("a@example.com", 2, until),
            commit("b@example.com", 3, until),
        ];
        let stats = build_stats("a.py", &history, until);
        assert_eq!(stats.churn_count, 3);
        assert_eq!(stats.unique_authors, 2);
        assert_eq!(stats.top_authors[0], "a@example.com");
        assert_eq!(stats.last_modified_days_ago, 1.0);
    }
}
