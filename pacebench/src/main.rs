use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pacebench::{
    wait_for_ready, Cli, Config, Reporter, RunnerHandle, Scheduler, TerminalReporter,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);

    if cli.verbose {
        eprintln!("Configuration: {:?}", config);
    }

    let variants = config.resolve_variants();
    if variants.is_empty() {
        bail!("No variants to benchmark; pass page URLs or configure [[variants]]");
    }

    // 1. Validate the sampling settings before any runner work starts
    let baseline = cli.resolve_baseline(&config)?;
    let plan = config
        .sample_plan(baseline)
        .context("Invalid sampling configuration")?;

    // 2. Prepare the runner
    eprintln!("Preparing runner...");
    let runner = match (&config.network.runner_url, &config.network.runner_bin) {
        (Some(url), _) => RunnerHandle::connect(url)?,
        (None, Some(bin)) => RunnerHandle::spawn(bin, config.network.base_port)?,
        (None, None) => bail!("No runner configured; pass --runner-url or --runner-bin"),
    };
    wait_for_ready(
        &runner,
        Duration::from_millis(config.network.runner_timeout_ms),
    )
    .await
    .context("Runner did not become ready")?;

    // 3. Sample until resolved or out of budget
    eprintln!("Sampling...");
    let runner = Arc::new(runner);
    let scheduler = Scheduler::new(variants, Arc::clone(&runner), plan).with_verbose(cli.verbose);
    let report = scheduler.run().await.context("Sampling failed")?;

    // 4. Report results
    let reporter = TerminalReporter::new();
    reporter.report(&report)?;

    // 5. Release the runner (attempt graceful shutdown, then kill)
    let _ = runner.shutdown().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    if let Ok(mut handle) = Arc::try_unwrap(runner) {
        handle.kill();
    }

    Ok(())
}
