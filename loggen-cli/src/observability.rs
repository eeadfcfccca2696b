use std::env;
use std::io::{self, IsTerminal};

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{EnvFilter, Layer, prelude::*};

use crate::config::{LogFormat, Logging};
use crate::run::SUMMARY_TARGET;

/// Installs the global subscriber writing to stderr.
pub fn init_tracing(logging: &Logging) {
    let format = match logging.format {
        LogFormat::Auto if io::stderr().is_terminal() => LogFormat::Pretty,
        LogFormat::Auto => LogFormat::Simplified,
        format => format,
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .json()
            .flatten_event(true)
            .boxed(),
        LogFormat::Simplified => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_ansi(false)
            .boxed(),
        LogFormat::Pretty | LogFormat::Auto => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .compact()
            .boxed(),
    };

    let (level, env_filter) = parse_rust_log(logging.level);

    tracing_subscriber::registry()
        .with(layer.with_filter(level_filter(level)))
        .with(env_filter)
        .init();
}

/// Limits output to `level`, except for the run summary which is always shown.
fn level_filter(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(SUMMARY_TARGET, level.max(LevelFilter::INFO))
}

/// Resolves the effective level and filter directives from `RUST_LOG`.
pub fn parse_rust_log(default: LevelFilter) -> (LevelFilter, EnvFilter) {
    // Try to parse RUST_LOG as a simple level filter and apply default levels internally.
    // Otherwise, use it literally if the user knows which overrides they want to run.
    let level = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match value.parse::<Level>() {
            Ok(level) => LevelFilter::from_level(level),
            Err(_) => return (LevelFilter::TRACE, EnvFilter::new(value)),
        },
        Err(_) => default,
    };

    // This is the maximum verbosity that will be logged, we filter this down to `level`.
    let env_filter = EnvFilter::new(
        "INFO,\
        loggen::lines=TRACE,\
        loggen_cli=TRACE,\
        loggen_core=TRACE,\
        ",
    );

    (level, env_filter)
}
