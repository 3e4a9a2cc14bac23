//! Configuration resolution: merges CLI flags with environment-variable
//! fallbacks and validates the result.

use std::collections::BTreeSet;
use std::env;

use crate::cli::MineArgs;
use crate::error::MinerError;

const ENV_REPO_PATH: &str = "REPO_PATH";
const ENV_ADL_FILE_PATH: &str = "ADL_FILE_PATH";
const ENV_TRAINING_DATASET_PATH: &str = "TRAINING_DATASET_PATH";

const DEFAULT_ADL_FILE: &str = "adl.yaml";
const DEFAULT_CONTEXT_DAYS: u32 = 90;

/// Fully resolved, validated configuration for one mining run.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Path to the Git working directory to mine.
    pub repo_path: String,
    /// ADL path, matched case-insensitively against pre- and post-image paths.
    pub adl_file_path: String,
    /// Lowercased, leading-dot, deduplicated set of accepted code extensions.
    pub code_exts: BTreeSet<String>,
    /// Output sink; `None` means stream to stdout.
    pub output: Option<String>,
    /// Look-back window for the Context Miner, in days. Always `>= 1`.
    pub context_days: u32,
}

impl MinerConfig {
    /// Resolves a [`MinerConfig`] from parsed CLI flags, falling back to
    /// environment variables only for flags the user left unset. An explicit
    /// flag always wins over the environment.
    pub fn resolve(args: MineArgs) -> Result<Self, MinerError> {
        let repo_path = args
            .repo
            .or_else(|| env::var(ENV_REPO_PATH).ok())
            .ok_or_else(|| MinerError::InvalidArgument("--repo is required".to_string()))?;

        let adl_file_path = args
            .adl_file
            .or_else(|| env::var(ENV_ADL_FILE_PATH).ok())
            .unwrap_or_else(|| DEFAULT_ADL_FILE.to_string());

        let output = args.output.or_else(|| env::var(ENV_TRAINING_DATASET_PATH).ok());

        if args.context_days < 1 {
            return Err(MinerError::InvalidArgument(format!(
                "--context-days must be >= 1, got {}",
                args.context_days
            )));
        }

        let code_exts = normalize_extensions(&args.code_exts);

        Ok(Self {
            repo_path,
            adl_file_path,
            code_exts,
            output,
            context_days: args.context_days,
        })
    }
}

fn normalize_extensions(exts: &[String]) -> BTreeSet<String> {
    exts.iter()
        .map(|ext| {
            let lower = ext.to_lowercase();
            if lower.starts_with('.') {
                lower
            } else {
                format!(".{lower}")
            }
        })
        .collect()
}

impl Default for MineArgs {
    fn default() -> Self {
        Self {
            repo: None,
            adl_file: None,
            code_exts: vec![".py".to_string()],
            output: None,
            context_days: DEFAULT_CONTEXT_DAYS,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_missing_dot() {
        let exts = normalize_extensions(&["PY".to_string(), ".Rs".to_string(), ".py".to_string()]);
        assert_eq!(exts.len(), 2);
        assert!(exts.contains(".py"));
        assert!(exts.contains(".rs"));
    }

    #[test]
    fn rejects_context_days_below_one() {
        let args = MineArgs {
            repo: Some("/tmp/repo".to_string()),
            context_days: 0,
            ..MineArgs::default()
        };
        let err = MinerConfig::resolve(args).unwrap_err();
        assert!(matches!(err, MinerError::InvalidArgument(_)));
    }

    #[test]
    fn missing_repo_flag_is_invalid_argument() {
        let args = MineArgs {
            repo: None,
            ..MineArgs::default()
        };
        let err = MinerConfig::resolve(args).unwrap_err();
        assert!(matches!(err, MinerError::InvalidArgument(_)));
    }
}
