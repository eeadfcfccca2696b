use tracing_subscriber::EnvFilter;

const CRATE_NAMES: &[&str] = &["loggen_core", "loggen_cli"];

/// Initialize the logger for testing.
///
/// Diagnostics of `loggen_core` and `loggen_cli` are written at all levels to the output captured
/// by the test runner. Everything else is limited to errors, which includes the generated lines
/// under the `loggen::lines` target, so that high-rate tests do not flood the test output.
///
/// # Example
///
/// ```
/// loggen_test::tracing::init();
/// ```
pub fn init() {
    let mut env_filter = EnvFilter::new("ERROR");

    // Add all internal modules with maximum log-level.
    for name in CRATE_NAMES {
        env_filter = env_filter.add_directive(format!("{name}=TRACE").parse().unwrap());
    }

    tracing_subscriber::fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_test_writer()
        .compact()
        .try_init()
        .ok();
}
