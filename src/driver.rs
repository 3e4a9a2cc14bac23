//! The Driver: top-level loop over selected commits, with a deterministic
//! emission order and SIGINT handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use git2::Oid;
use tracing::{error, info};

use crate::assembler::assemble;
use crate::config::MinerConfig;
use crate::emit::Emitter;
use crate::error::MinerError;
use crate::git::GitRepository;

/// Runs one full mining pass per `config`, returning `Ok(true)` if the run
/// completed normally, or `Ok(false)` if it was cut short by SIGINT. Records
/// are always flushed before either return.
pub fn run(config: &MinerConfig) -> Result<bool, MinerError> {
    let repo = GitRepository::open(&config.repo_path)?;
    let mut emitter = Emitter::new(config.output.as_deref())?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    // Installing more than once (e.g. across repeated test runs in the same
    // process) returns an error from `ctrlc`; a production run only calls
    // `run` once, so that failure mode is deliberately ignored here.
    let _ = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    });

    let mut candidates: Vec<(Oid, chrono::DateTime<chrono::Utc>)> = Vec::new();
    for commit in repo.head_commits()? {
        if let Some(patches) = repo.diff_against_first_parent(Oid::from_str(&commit.hash)?)? {
            let touches_adl = patches.iter().any(|p| {
                crate::adl::is_adl_path(&p.path, &config.adl_file_path)
                    || p.previous_path
                        .as_deref()
                        .is_some_and(|prev| crate::adl::is_adl_path(prev, &config.adl_file_path))
            });
            if touches_adl {
                candidates.push((Oid::from_str(&commit.hash)?, commit.committed_at));
            }
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (oid, _) in candidates {
        if interrupted.load(Ordering::SeqCst) {
            info!("interrupted, stopping before next commit");
            return Ok(false);
        }

        match assemble(
            &repo,
            oid,
            &config.adl_file_path,
            &config.code_exts,
            config.context_days,
        ) {
            Ok(Some(record)) => emitter.emit(&record)?,
            Ok(None) => {}
            Err(err) => {
                error!(commit = %oid, error = %err, "failed to assemble record for commit, skipping");
            }
        }
    }

    Ok(true)
}
