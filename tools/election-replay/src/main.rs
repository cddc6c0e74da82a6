use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod ledger;
mod scenario;

use ledger::Ledger;
use scenario::Scenario;

#[derive(Parser, Debug)]
#[command(about = "Replay election scenarios against the election state machine", author, version)]
struct Args {
    /// Directory containing scenario JSON files
    input_dir: PathBuf,
    /// Output directory for .report.json files
    output_dir: PathBuf,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Abort a scenario at its first rejected step
    #[arg(long)]
    fail_fast: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn replay_file(input: &Path, output_dir: &Path, fail_fast: bool) -> anyhow::Result<()> {
    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("bad input name"))?;
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", input.display()))?;

    let span = tracing::info_span!("scenario", name);
    let _enter = span.enter();
    let report = Ledger::replay(&scenario, fail_fast)
        .map_err(|err| anyhow::anyhow!("scenario {} failed: {}", name, err))?;

    let out = output_dir.join(format!("{name}.report.json"));
    std::fs::write(&out, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("writing {}", out.display()))?;
    info!(
        closed = report.closed,
        escrow = report.escrow,
        votes = report.votes_cast,
        "wrote {}",
        out.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    std::fs::create_dir_all(&args.output_dir)?;
    let inputs: Vec<PathBuf> = std::fs::read_dir(&args.input_dir)
        .with_context(|| format!("listing {}", args.input_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    info!(scenarios = inputs.len(), "replaying");

    inputs
        .par_iter()
        .try_for_each(|input| replay_file(input, &args.output_dir, args.fail_fast))?;
    Ok(())
}
