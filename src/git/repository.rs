//! The Repo Gateway: a thin, typed wrapper around `git2::Repository`.
//!
//! No `git2` type crosses this module's public boundary. Patch text is
//! extracted into owned, undecoded byte buffers before the underlying
//! `git2::Diff` is dropped; the Diff Normalizer decodes and classifies it.

use chrono::{DateTime, Utc};
use git2::{Delta, DiffFindOptions, Oid, Repository, Sort};

use crate::error::MinerError;
use crate::record::CommitRef;

use super::commit::commit_ref;

/// Similarity threshold (percent) used for rename detection, matching
/// Git's own default.
const RENAME_SIMILARITY: u16 = 50;

/// One line of a hunk, still undecoded: the origin byte (`+`, `-`, or a
/// space/empty for context) plus the raw line content, no newline.
pub struct RawLine {
    /// `git2::DiffLine::origin()` — `'+'`, `'-'`, `' '`, or similar.
    pub origin: char,
    /// Raw line bytes, exactly as stored in the patch, not yet decoded.
    pub content: Vec<u8>,
}

/// One contiguous hunk, still undecoded.
pub struct RawHunk {
    /// The `@@ -a,b +c,d @@ …` header line, verbatim (lossily decoded; hunk
    /// headers are git2-generated and always ASCII in practice).
    pub header: String,
    /// Lines in patch order.
    pub lines: Vec<RawLine>,
}

/// One file's patch against its parent, with enough pre-normalization
/// metadata for the Diff Normalizer to classify and convert it.
pub struct FilePatch {
    /// Post-image path, or the pre-image path for a pure deletion.
    pub path: String,
    /// Pre-image path, present only when the delta is a rename.
    pub previous_path: Option<String>,
    /// The raw delta classification from `git2`.
    pub status: Delta,
    /// `true` when `git2` could not produce a textual patch (binary content).
    pub is_binary: bool,
    /// Hunks in patch order; always empty when `is_binary` is `true`.
    pub hunks: Vec<RawHunk>,
}

/// Opens and wraps a Git repository for the mining engine.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Opens the repository rooted at `path`.
    pub fn open(path: &str) -> Result<Self, MinerError> {
        let repo = Repository::open(path).map_err(|source| MinerError::RepoOpen {
            path: path.to_string(),
            source,
        })?;
        Ok(Self { repo })
    }

    /// Enumerates commits reachable from `HEAD`, topologically sorted.
    /// Reachability from `HEAD` is all that is guaranteed here; the Driver
    /// imposes the final deterministic emission order.
    pub fn head_commits(&self) -> Result<Vec<CommitRef>, MinerError> {
        let mut walk = self.repo.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in walk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(commit_ref(&commit)?);
        }
        Ok(commits)
    }

    /// Looks up a single commit by `Oid`.
    pub fn commit_at(&self, oid: Oid) -> Result<CommitRef, MinerError> {
        let commit = self.repo.find_commit(oid)?;
        commit_ref(&commit)
    }

    /// Looks up `child` and returns its first parent's identity and `Oid`,
    /// or `None` for a root commit.
    pub fn first_parent(&self, child: Oid) -> Result<Option<(Oid, CommitRef)>, MinerError> {
        let commit = self.repo.find_commit(child)?;
        if commit.parent_count() == 0 {
            return Ok(None);
        }
        let parent = commit.parent(0)?;
        let parent_ref = commit_ref(&parent)?;
        Ok(Some((parent.id(), parent_ref)))
    }

    /// Produces the per-file patches between `child`'s first parent and
    /// `child` itself, with rename detection enabled. Returns `None` for a
    /// root commit (no parent to diff against).
    pub fn diff_against_first_parent(
        &self,
        child: Oid,
    ) -> Result<Option<Vec<FilePatch>>, MinerError> {
        let commit = self.repo.find_commit(child)?;
        if commit.parent_count() == 0 {
            return Ok(None);
        }
        let parent = commit.parent(0)?;

        let parent_tree = parent.tree()?;
        let child_tree = commit.tree()?;

        let mut diff =
            self.repo
                .diff_tree_to_tree(Some(&parent_tree), Some(&child_tree), None)?;
        let mut find_opts = DiffFindOptions::new();
        find_opts.rename_threshold(RENAME_SIMILARITY);
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        Ok(Some(file_patches(&diff)?))
    }

    /// Walks history backward from `anchor`, following renames, collecting
    /// commits whose diff against their first parent touched `path` and
    /// whose committer time falls in `[since, until]`.
    pub fn history_for_path(
        &self,
        anchor: Oid,
        path: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CommitRef>, MinerError> {
        let mut walk = self.repo.revwalk()?;
        walk.push(anchor)?;
        walk.set_sorting(Sort::TIME)?;

        let mut results = Vec::new();
        let mut current_path = path.to_string();

        for oid in walk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            let committed_at = DateTime::from_timestamp(commit.committer().when().seconds(), 0)
                .ok_or_else(|| MinerError::InvalidTimestamp(commit.id().to_string()))?;
            if committed_at < since {
                break;
            }
            if committed_at > until {
                continue;
            }
            if commit.parent_count() == 0 {
                continue;
            }

            let parent = commit.parent(0)?;
            let parent_tree = parent.tree()?;
            let child_tree = commit.tree()?;

            // No pathspec here: restricting the diff to `current_path` before
            // `find_similar` runs would exclude the old-name tree entry on a
            // not-yet-renamed file from one side of the diff, so the rename
            // pair could never form and `Delta::Renamed` would never surface.
            // Diff the full tree, detect renames, then filter by path below.
            let mut diff =
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&child_tree), None)?;
            let mut find_opts = DiffFindOptions::new();
            find_opts.rename_threshold(RENAME_SIMILARITY);
            find_opts.renames(true);
            diff.find_similar(Some(&mut find_opts))?;

            let mut touched = false;
            for idx in 0..diff.deltas().len() {
                let delta = diff.get_delta(idx).expect("delta index in range");
                let new_path = delta.new_file().path().and_then(|p| p.to_str());
                let old_path = delta.old_file().path().and_then(|p| p.to_str());

                if new_path == Some(current_path.as_str()) || old_path == Some(current_path.as_str())
                {
                    touched = true;
                    if delta.status() == Delta::Renamed {
                        if let Some(old) = old_path {
                            current_path = old.to_string();
                        }
                    }
                }
            }

            if touched {
                results.push(commit_ref(&commit)?);
            }
        }

        Ok(results)
    }
}

fn file_patches(diff: &git2::Diff<'_>) -> Result<Vec<FilePatch>, MinerError> {
    let mut out = Vec::with_capacity(diff.deltas().len());
    for idx in 0..diff.deltas().len() {
        let delta = diff.get_delta(idx).expect("delta index in range");
        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().into_owned());

        let path = new_path.clone().or_else(|| old_path.clone()).unwrap_or_default();
        let previous_path = if delta.status() == Delta::Renamed {
            old_path.filter(|p| Some(p) != new_path.as_ref())
        } else {
            None
        };

        let patch = git2::Patch::from_diff(diff, idx)?;
        let (is_binary, hunks) = match patch {
            Some(mut patch) => (false, raw_hunks(&mut patch)?),
            None => (true, Vec::new()),
        };

        out.push(FilePatch {
            path,
            previous_path,
            status: delta.status(),
            is_binary,
            hunks,
        });
    }
    Ok(out)
}

fn raw_hunks(patch: &mut git2::Patch<'_>) -> Result<Vec<RawHunk>, MinerError> {
    let mut hunks = Vec::with_capacity(patch.num_hunks());
    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, line_count) = patch.hunk(hunk_idx)?;
        let header = String::from_utf8_lossy(hunk.header()).trim_end().to_string();

        let mut lines = Vec::with_capacity(line_count);
        for line_idx in 0..line_count {
            let line = patch.line_in_hunk(hunk_idx, line_idx)?;
            let mut content = line.content().to_vec();
            while matches!(content.last(), Some(b'\n' | b'\r')) {
                content.pop();
            }
            lines.push(RawLine {
                origin: line.origin(),
                content,
            });
        }

        hunks.push(RawHunk { header, lines });
    }
    Ok(hunks)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::git::test_support::TestRepo;
    use chrono::Duration;

    #[test]
    fn root_commit_has_no_parent_diff() {
        let mut fixture = TestRepo::new();
        let oid = fixture.commit("root", &[("adl.yaml", "a: 1\n")], &[]);
        fixture.tip(oid);
        let gateway = GitRepository::open(fixture.path().to_str().unwrap()).unwrap();
        assert!(gateway.diff_against_first_parent(oid).unwrap().is_none());
    }

    #[test]
    fn diff_detects_rename() {
        let mut fixture = TestRepo::new();
        let base = fixture.commit("base", &[("old.py", "print(1)\nprint(2)\nprint(3)\n")], &[]);
        let renamed = fixture.commit(
            "rename",
            &[("new.py", "print(1)\nprint(2)\nprint(3)\n")],
            &[base],
        );
        fixture.tip(renamed);

        let gateway = GitRepository::open(fixture.path().to_str().unwrap()).unwrap();
        let patches = gateway.diff_against_first_parent(renamed).unwrap().unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].status, Delta::Renamed);
        assert_eq!(patches[0].path, "new.py");
        assert_eq!(patches[0].previous_path.as_deref(), Some("old.py"));
    }

    #[test]
    fn diff_extracts_hunks_with_origin_bytes() {
        let mut fixture = TestRepo::new();
        let base = fixture.commit("base", &[("a.py", "one\ntwo\nthree\n")], &[]);
        let edit = fixture.commit("edit", &[("a.py", "one\nTWO\nthree\n")], &[base]);
        fixture.tip(edit);

        let gateway = GitRepository::open(fixture.path().to_str().unwrap()).unwrap();
        let patches = gateway.diff_against_first_parent(edit).unwrap().unwrap();
        assert_eq!(patches.len(), 1);
        assert!(!patches[0].is_binary);
        assert_eq!(patches[0].hunks.len(), 1);
        let origins: Vec<char> = patches[0].hunks[0].lines.iter().map(|l| l.origin).collect();
        assert!(origins.contains(&'+'));
        assert!(origins.contains(&'-'));
    }

    #[test]
    fn history_for_path_follows_rename_across_commits() {
        let mut fixture = TestRepo::new();
        let c1 = fixture.commit_at(
            "create",
            &[("old.py", "a = 1\n")],
            &[],
            ("Alice", "alice@example.com"),
            10.0,
        );
        let c2 = fixture.commit_at(
            "rename",
            &[("new.py", "a = 1\n")],
            &[c1],
            ("Alice", "alice@example.com"),
            5.0,
        );
        let c3 = fixture.commit_at(
            "edit",
            &[("new.py", "a = 2\n")],
            &[c2],
            ("Bob", "bob@example.com"),
            1.0,
        );
        fixture.tip(c3);

        let gateway = GitRepository::open(fixture.path().to_str().unwrap()).unwrap();
        let anchor = gateway.head_commits().unwrap();
        let anchor_oid = Oid::from_str(&anchor[0].hash).unwrap();
        let until = anchor[0].committed_at;
        let since = until - Duration::days(30);

        let history = gateway
            .history_for_path(anchor_oid, "new.py", since, until)
            .unwrap();
        // The root commit that first created `old.py` has no parent to diff
        // against, so it never enters a first-parent-diff-based history walk;
        // only the rename and the later edit are counted.
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn history_for_path_counts_an_edit_before_the_rename() {
        // Regression test: a pathspec-restricted diff excludes the old-name
        // tree entry on one side, so `find_similar` never pairs it with the
        // new-name entry and the rename is never detected, silently dropping
        // this commit's churn.
        let mut fixture = TestRepo::new();
        let c1 = fixture.commit_at(
            "create",
            &[("a.py", "a = 1\n")],
            &[],
            ("Alice", "alice@example.com"),
            20.0,
        );
        let c2 = fixture.commit_at(
            "edit before rename",
            &[("a.py", "a = 2\n")],
            &[c1],
            ("Alice", "alice@example.com"),
            10.0,
        );
        let c3 = fixture.commit_at(
            "rename, no content change",
            &[("b.py", "a = 2\n")],
            &[c2],
            ("Alice", "alice@example.com"),
            5.0,
        );
        let c4 = fixture.commit_at(
            "edit after rename",
            &[("b.py", "a = 3\n")],
            &[c3],
            ("Bob", "bob@example.com"),
            1.0,
        );
        fixture.tip(c4);

        let gateway = GitRepository::open(fixture.path().to_str().unwrap()).unwrap();
        let anchor = gateway.head_commits().unwrap();
        let anchor_oid = Oid::from_str(&anchor[0].hash).unwrap();
        let until = anchor[0].committed_at;
        let since = until - Duration::days(30);

        let history = gateway
            .history_for_path(anchor_oid, "b.py", since, until)
            .unwrap();
        // c1 is a root commit and never enters the walk; c2 (pre-rename edit
        // under `a.py`), c3 (the rename), and c4 (post-rename edit) all count.
        assert_eq!(history.len(), 3);
        assert!(history.iter().any(|c| c.hash == c2.to_string()));
    }
}
