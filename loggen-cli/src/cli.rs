use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;

use crate::config::{Config, Output, RawRate};
use crate::{observability, run};

/// Synthetic log traffic generator.
///
/// Emits log lines at the rate given by the `LPS` environment variable until interrupted, then
/// reports the achieved throughput.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    /// target lines per second, overrides `LPS`
    #[argh(option)]
    pub lps: Option<String>,

    /// interval between pacing ticks, e.g. `10ms`
    #[argh(option)]
    pub tick_interval: Option<humantime::Duration>,

    /// maximum number of lines emitted per tick
    #[argh(option)]
    pub burst_cap: Option<u64>,

    /// stop after this duration instead of waiting for a signal, e.g. `30s`
    #[argh(option)]
    pub duration: Option<humantime::Duration>,

    /// seed for payload selection
    #[argh(option)]
    pub seed: Option<u64>,

    /// where to write generated lines: `log` or `json`
    #[argh(option)]
    pub output: Option<Output>,

    /// print the version and exit
    #[argh(switch)]
    pub version: bool,
}

impl Args {
    /// Applies command line overrides on top of the loaded configuration.
    fn apply(self, config: &mut Config) {
        if let Some(lps) = self.lps {
            config.lps = Some(RawRate::Text(lps));
        }
        if let Some(tick_interval) = self.tick_interval {
            config.tick_interval = tick_interval.into();
        }
        if let Some(burst_cap) = self.burst_cap {
            config.burst_cap = burst_cap;
        }
        if let Some(duration) = self.duration {
            config.duration = Some(duration.into());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(output) = self.output {
            config.output = output;
        }
    }
}

/// Bootstrap the runtime and execute the CLI command.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    // Special switch to just print the version and exit.
    if args.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    observability::init_tracing(&config.logging);
    tracing::debug!(?config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("main-rt")
        .enable_all()
        .build()?;

    runtime.block_on(run::run(config))?;
    Ok(())
}
