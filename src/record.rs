//! The wire schema for emitted training records.
//!
//! Field order within every struct here is the JSON key order on the wire;
//! `serde_json`'s struct serialization preserves declaration order, so the
//! schema is defined purely by how these structs are written.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Pinned schema version stamped into every emitted record's `metadata`.
pub const DATASET_VERSION: &str = "adl-diff-miner-schema-v2.0";

/// Maximum number of authors retained in a `ContextSignals` per-file entry.
pub const TOP_AUTHORS_CAP: usize = 5;

/// RFC 3339 timestamps with integer-second precision and a trailing `Z`,
/// regardless of the `DateTime`'s sub-second component.
mod rfc3339 {
    use super::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// A commit author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name as recorded in the commit.
    pub name: String,
    /// Email address as recorded in the commit.
    pub email: String,
}

/// Identity of one commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full hex SHA of the commit.
    pub hash: String,
    /// Full hex SHA of the first parent, or an empty string for a root commit.
    pub parent_hash: String,
    /// Author timestamp, UTC.
    #[serde(with = "rfc3339")]
    pub authored_at: DateTime<Utc>,
    /// Committer timestamp, UTC.
    #[serde(with = "rfc3339")]
    pub committed_at: DateTime<Utc>,
    /// Commit author.
    pub author: Identity,
    /// Commit committer.
    pub committer: Identity,
    /// True iff the commit has more than one parent.
    pub is_merge: bool,
    /// Full commit message, verbatim (including any trailing newlines as stored).
    pub message: String,
}

/// Status of one file within a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// File did not exist in the parent tree.
    Added,
    /// File exists in both trees with changed content.
    Modified,
    /// File existed in the parent tree and does not exist in the child tree.
    Deleted,
    /// File was renamed (and possibly also modified).
    Renamed,
}

/// One contiguous region of a unified patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hunk {
    /// The `@@ -a,b +c,d @@ ...` header line, verbatim.
    pub header: String,
    /// Lines that appear with a leading `+`, in patch order, prefix retained.
    pub added: Vec<String>,
    /// Lines that appear with a leading `-`, in patch order, prefix retained.
    pub removed: Vec<String>,
    /// Context lines (leading space or empty), in patch order.
    pub context: Vec<String>,
}

/// Added/deleted line counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Total added lines across all hunks.
    pub additions: u32,
    /// Total removed lines across all hunks.
    pub deletions: u32,
}

/// One file's normalized patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    /// Post-image path.
    pub path: String,
    /// Pre-image path; populated only when `status == Renamed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    /// How this file changed relative to the parent commit.
    pub status: FileStatus,
    /// Lowercase suffix of `path` including the leading dot, or empty.
    pub extension: String,
    /// Reserved for a future language classifier; always `null` in v1.
    pub language: Option<String>,
    /// Hunks in patch order; empty for binary files.
    pub hunks: Vec<Hunk>,
    /// Added/deleted line counts, summed across `hunks`.
    pub stats: FileStats,
}

/// Tagged source of a change's stated intent. Only `CommitMessage` exists
/// in v1; `PrBody` and `IssueThread` are reserved for future schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentSource {
    /// Intent was read from the commit message.
    CommitMessage,
}

/// The human-authored statement of why a change was made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Full commit message.
    pub message: String,
    /// Where `message` came from.
    pub source: IntentSource,
}

/// Churn/authorship/recency statistics for one code file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerFileStats {
    /// Post-image path this entry describes.
    pub path: String,
    /// Number of commits that touched this file within the look-back window.
    pub churn_count: u32,
    /// Number of distinct author emails among those commits.
    pub unique_authors: u32,
    /// Fractional days between the anchor commit and this file's most recent
    /// prior change; `0` when there was no history.
    pub last_modified_days_ago: f64,
    /// Most frequent author emails, ties broken by email ascending, capped
    /// at `TOP_AUTHORS_CAP`. Omitted entirely when there is no history.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_authors: Vec<String>,
}

/// Aggregate statistics over all analyzed files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Sum of `churn_count` across all files.
    pub total_commits: u32,
    /// Size of the union of author-email sets across all files.
    pub total_unique_authors: u32,
    /// Minimum `last_modified_days_ago` among files with any history, or `0`.
    pub most_recent_change_days_ago: f64,
}

/// History-derived context anchored at a commit's first parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSignals {
    /// The ancestor commit used as the time anchor; equals `CommitRef.parent_hash`.
    pub analysis_parent_hash: String,
    /// The configured look-back window, in days.
    pub analysis_timespan_days: u32,
    /// Code paths this context was computed over, in `code_diffs` order, deduplicated.
    pub files_analyzed: Vec<String>,
    /// One entry per `files_analyzed`, in the same order.
    pub per_file_stats: Vec<PerFileStats>,
    /// Statistics aggregated across `per_file_stats`.
    pub aggregate_stats: AggregateStats,
}

/// Schema version and generation timestamp stamped onto every record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Pinned dataset schema version; see [`DATASET_VERSION`].
    pub dataset_version: String,
    /// UTC instant at which this record was composed.
    #[serde(with = "rfc3339")]
    pub generated_at: DateTime<Utc>,
}

/// One self-contained training record: a commit that changed the ADL file,
/// paired with its co-changed source diffs and history-derived context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Identity of the commit this record describes.
    pub commit: CommitRef,
    /// The author's stated intent for the change.
    pub intent: Intent,
    /// The ADL file's normalized diff. Always present.
    pub adl_diff: FileChange,
    /// Co-changed source file diffs, filtered by extension.
    pub code_diffs: Vec<FileChange>,
    /// History-derived churn/authorship/recency signals for `code_diffs`.
    pub context_signals: ContextSignals,
    /// Schema version and generation timestamp.
    pub metadata: Metadata,
}

impl Metadata {
    /// Builds metadata stamped with the given generation instant.
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            dataset_version: DATASET_VERSION.to_string(),
            generated_at,
        }
    }
}
