//! Git plumbing: the repository gateway and commit conversion helpers.

pub mod commit;
pub mod repository;

#[cfg(test)]
pub mod test_support;

pub use commit::commit_ref;
pub use repository::{FilePatch, GitRepository, RawHunk, RawLine};
