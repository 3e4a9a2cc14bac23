//! Command-line argument parsing.

use clap::Parser;

/// Mines a Git repository for ADL-diff / code-diff / context-signal training records.
#[derive(Debug, Parser)]
#[command(name = "adl-diff-miner", version, about, long_about = None)]
pub struct MineArgs {
    /// Path to the Git working directory to mine. Falls back to `REPO_PATH`
    /// when not given; one of the two is required.
    #[arg(long)]
    pub repo: Option<String>,

    /// ADL path, matched case-insensitively. Falls back to `ADL_FILE_PATH`,
    /// then defaults to `adl.yaml`.
    #[arg(long = "adl-file")]
    pub adl_file: Option<String>,

    /// Accepted code file extensions (leading dot required). May be given
    /// space-separated or as repeated flags. Defaults to `.py`.
    #[arg(long = "code-exts", num_args = 1.., default_value = ".py")]
    pub code_exts: Vec<String>,

    /// Output path for the NDJSON stream. Falls back to
    /// `TRAINING_DATASET_PATH`; streams to stdout when neither is set.
    #[arg(long)]
    pub output: Option<String>,

    /// Look-back window, in days, for the Context Miner. Must be >= 1.
    #[arg(long = "context-days", default_value_t = 90)]
    pub context_days: u32,
}
