use std::process::ExitCode;

use adl_diff_miner::cli::MineArgs;
use adl_diff_miner::config::MinerConfig;
use adl_diff_miner::driver;
use adl_diff_miner::error::MinerError;
use anyhow::Context;
use clap::Parser;

fn main() -> ExitCode {
    init_logging();

    let args = MineArgs::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => report(&err),
    }
}

/// Resolves configuration and runs one mining pass. Returns `Ok(false)` if
/// the run was cut short by SIGINT, matching [`driver::run`]'s contract.
fn run(args: MineArgs) -> anyhow::Result<bool> {
    let config = MinerConfig::resolve(args).context("resolving configuration")?;
    driver::run(&config).context("mining repository")
}

/// Prints `err`'s full cause chain to stderr (the teacher's `main.rs` error
/// reporting style), then exits 2 for invalid arguments, 1 otherwise.
fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {err}");
    for cause in err.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }

    let code = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<MinerError>())
        .map_or(1, |inner| {
            if matches!(inner, MinerError::InvalidArgument(_)) {
                2
            } else {
                1
            }
        });
    ExitCode::from(code)
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
