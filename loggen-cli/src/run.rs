//! Wires configuration, sinks and shutdown signals into a pacing run.

use std::io::{self, BufWriter};
use std::time::Duration;

use anyhow::{Context, Result};
use loggen_core::{IntervalTicker, JsonLinesSink, Pacer, RunSummary, TracingSink};
use tokio::signal::unix::SignalKind;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Output};

/// Target of the final run summary, which is logged regardless of the configured level.
pub const SUMMARY_TARGET: &str = "loggen::summary";

/// Generates log lines until a termination signal arrives or the configured duration elapses.
///
/// Configuration errors are returned before anything is emitted.
pub async fn run(config: Config) -> Result<RunSummary> {
    let run_config = config.run_config().context("invalid configuration")?;
    let payloads = config.payloads().context("invalid configuration")?;

    let rate = run_config.target_rate();
    tracing::info!(
        seed = payloads.seed(),
        "generating logs at {rate} lines per second, ctrl-c to stop"
    );
    if run_config.is_saturated() {
        tracing::warn!(
            max_throughput = run_config.max_throughput(),
            "target rate exceeds what the burst cap allows per tick, throughput will be capped"
        );
    }

    let token = CancellationToken::new();
    spawn_shutdown(token.clone(), config.duration);

    let output = config.output;
    let mut pacer = Pacer::new(run_config, payloads);
    let cancel = token.clone();
    let summary = tokio::spawn(async move {
        let ticker = IntervalTicker::new(run_config.tick_interval());
        match output {
            Output::Log => pacer.run(ticker, TracingSink, &cancel).await,
            Output::Json => {
                let sink = JsonLinesSink::new(BufWriter::new(io::stdout()));
                pacer.run(ticker, sink, &cancel).await
            }
        }
    })
    .await
    .context("generator task failed")?;

    tracing::info!(
        target: SUMMARY_TARGET,
        instance_id = %summary.instance_id,
        ticks = summary.ticks,
        "{summary}"
    );
    if summary.sink_failures > 0 {
        tracing::warn!(
            failures = summary.sink_failures,
            "some lines could not be written"
        );
    }

    Ok(summary)
}

/// Cancels `token` on SIGINT, SIGTERM, SIGHUP or SIGQUIT, or once `duration` has elapsed.
fn spawn_shutdown(token: CancellationToken, duration: Option<Duration>) {
    let guard = elegant_departure::get_shutdown_guard();
    let cancel = token.clone();
    tokio::spawn(async move {
        guard.wait().await;
        tracing::info!("stopped");
        cancel.cancel();
    });

    tokio::spawn(async move {
        elegant_departure::tokio::depart()
            .on_termination()
            .on_sigint()
            .on_signal(SignalKind::hangup())
            .on_signal(SignalKind::quit())
            .await;
    });

    if let Some(duration) = duration {
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            tracing::info!(?duration, "duration elapsed");
            token.cancel();
        });
    }
}
