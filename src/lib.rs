//! # adl-diff-miner
//!
//! Mines a local Git repository for training records that pair a historical
//! change to an Architecture Description Language (ADL) artifact with its
//! co-changed source diffs and history-derived context signals.
//!
//! The core mining engine is a single-threaded pipeline:
//!
//! ```text
//! Driver -> Repo Gateway -> Diff Normalizer -> Record Assembler -> Context Miner -> Emitter
//! ```
//!
//! Each exported module corresponds to one component of that pipeline:
//! `git` wraps the Git object database, `diff` normalizes a raw patch into
//! the record's structured form, `context` derives churn/authorship/recency
//! statistics for a set of paths, `assembler` composes one record per commit,
//! and `emit` streams records out as newline-delimited JSON.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_code)]

pub mod adl;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod context;
pub mod diff;
pub mod driver;
pub mod emit;
pub mod error;
pub mod git;
pub mod record;

pub use config::MinerConfig;
pub use error::MinerError;
pub use record::Record;

/// The current version of adl-diff-miner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
