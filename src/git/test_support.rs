//! In-process Git fixture builder shared by unit and integration tests.
//!
//! Builds small repositories by writing commit trees directly via
//! `Treebuilder` rather than a working directory + index, so tests have
//! exact control over renames, deletions, and merge parents without
//! shelling out or touching a checkout.

use std::collections::BTreeMap;
use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};
use tempfile::TempDir;

/// A throwaway repository plus a running "now" anchor for time-relative fixtures.
pub struct TestRepo {
    _dir: TempDir,
    repo: Repository,
    now: i64,
}

impl TestRepo {
    /// Creates a fresh repository in a temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repo");
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_secs() as i64;
        Self {
            _dir: dir,
            repo,
            now,
        }
    }

    /// Filesystem path of the repository.
    pub fn path(&self) -> &Path {
        self.repo.path().parent().unwrap_or_else(|| self.repo.path())
    }

    /// Creates a commit whose tree is exactly `files` (a full snapshot, not
    /// a diff against the parents), authored "now", and returns its `Oid`.
    /// Does not move any branch or `HEAD`; call [`Self::tip`] for that.
    pub fn commit(&mut self, message: &str, files: &[(&str, &str)], parents: &[Oid]) -> Oid {
        self.commit_at(message, files, parents, ("Test User", "test@example.com"), 0.0)
    }

    /// Like [`Self::commit`], but authored `days_ago` days before the
    /// harness's creation time, by `author` (name, email).
    pub fn commit_at(
        &mut self,
        message: &str,
        files: &[(&str, &str)],
        parents: &[Oid],
        author: (&str, &str),
        days_ago: f64,
    ) -> Oid {
        let seconds = self.now - (days_ago * 86_400.0) as i64;
        let time = Time::new(seconds, 0);
        let sig = Signature::new(author.0, author.1, &time).expect("build signature");

        let entries: Vec<(String, &str)> =
            files.iter().map(|(p, c)| ((*p).to_string(), *c)).collect();
        let tree_oid = build_tree(&self.repo, &entries);
        let tree = self.repo.find_tree(tree_oid).expect("find written tree");

        let parent_commits: Vec<Commit<'_>> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("find parent commit"))
            .collect();
        let parent_refs: Vec<&Commit<'_>> = parent_commits.iter().collect();

        self.repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("create commit")
    }

    /// Points `refs/heads/master` and `HEAD` at `oid`.
    pub fn tip(&self, oid: Oid) {
        self.repo
            .reference("refs/heads/master", oid, true, "test tip")
            .expect("update branch ref");
        self.repo
            .set_head("refs/heads/master")
            .expect("set HEAD to master");
    }

    /// Looks up a commit by `Oid`.
    pub fn find_commit(&self, oid: Oid) -> Commit<'_> {
        self.repo.find_commit(oid).expect("find commit")
    }

    /// Direct access to the underlying repository, for assertions.
    pub fn repo(&self) -> &Repository {
        &self.repo
    }
}

fn build_tree(repo: &Repository, entries: &[(String, &str)]) -> Oid {
    let mut builder = repo.treebuilder(None).expect("new treebuilder");
    let mut dirs: BTreeMap<String, Vec<(String, &str)>> = BTreeMap::new();

    for (path, content) in entries {
        match path.split_once('/') {
            Some((dir, rest)) => dirs
                .entry(dir.to_string())
                .or_default()
                .push((rest.to_string(), content)),
            None => {
                let blob = repo.blob(content.as_bytes()).expect("write blob");
                builder
                    .insert(path, blob, 0o100_644)
                    .expect("insert blob entry");
            }
        }
    }

    for (dir, sub_entries) in dirs {
        let sub_oid = build_tree(repo, &sub_entries);
        builder
            .insert(&dir, sub_oid, 0o040_000)
            .expect("insert subtree entry");
    }

    builder.write().expect("write tree")
}
