//! Configuration for the log generator.
//!
//! Configuration can be loaded from multiple sources with the following precedence (highest to
//! lowest):
//!
//! 1. Command line flags
//! 2. The `LPS` environment variable for the target rate
//! 3. Environment variables (prefixed with `LOGGEN__`)
//! 4. YAML configuration file (specified via `-c` or `--config` flag)
//! 5. Defaults
//!
//! See [`Config`] for a description of all configuration fields and their defaults.
//!
//! # Environment Variables
//!
//! Environment variables use `LOGGEN__` as a prefix and double underscores (`__`) to denote nested
//! configuration structures. For example:
//!
//! - `LPS=5000` sets the target rate
//! - `LOGGEN__BURST_CAP=20000` raises the per-tick burst cap
//! - `LOGGEN__LOGGING__FORMAT=json` switches log output to JSON
//!
//! # YAML Configuration File
//!
//! The above configuration in YAML format would look like this:
//!
//! ```yaml
//! lps: 5000
//! burst_cap: 20000
//!
//! logging:
//!   format: json
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use figment::providers::{Env, Format, Serialized, Yaml};
use loggen_core::config::{DEFAULT_BURST_CAP, DEFAULT_TICK_INTERVAL};
use loggen_core::{ConfigError, Payloads, RunConfig, TargetRate};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "LOGGEN__";

/// Environment variable holding the target rate.
pub const RATE_ENV: &str = "LPS";

/// The target rate as written by the operator.
///
/// Validation into a [`TargetRate`] is deferred to [`Config::run_config`], so that zero, negative
/// and non-numeric values all surface as a [`ConfigError`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawRate {
    /// An integer, as parsed from YAML or the environment.
    Integer(i64),
    /// A floating point number, which is never a valid rate.
    Float(f64),
    /// Anything else.
    Text(String),
}

impl RawRate {
    /// Validates the raw value.
    pub fn parse(&self) -> Result<TargetRate, ConfigError> {
        match self {
            RawRate::Integer(value) => TargetRate::try_from(*value),
            RawRate::Float(value) => Err(ConfigError::InvalidRate(value.to_string())),
            RawRate::Text(value) => value.parse(),
        }
    }
}

/// Destination of generated lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// Emit lines as `INFO` events through the configured logger.
    ///
    /// Rendering follows [`Logging::format`], so lines appear on stderr next to diagnostics.
    #[default]
    Log,

    /// Write lines as JSON objects to stdout, one per line.
    ///
    /// ```text
    /// {"timestamp":"2025-06-02T09:12:44.120318Z","level":"INFO","message":"Hello, world","counter":42,"service.instance.id":"6c1f..."}
    /// ```
    Json,
}

/// The output parse error.
#[derive(Clone, Debug)]
pub struct OutputParseError(String);

impl fmt::Display for OutputParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"error parsing "{}" as output: expected one of "log", "json""#,
            self.0
        )
    }
}

impl std::error::Error for OutputParseError {}

impl FromStr for Output {
    type Err = OutputParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("log") => Ok(Output::Log),
            s if s.eq_ignore_ascii_case("json") => Ok(Output::Json),
            s => Err(OutputParseError(s.into())),
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted. The format can be explicitly specified or
/// auto-detected based on whether output is to a TTY.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    ///
    /// ```text
    /// 2025-06-02T09:12:44.120318Z  INFO loggen::lines: Hello, world counter=42 service.instance.id=6c1f...
    /// ```
    Pretty,

    /// Simplified plain text output without colors.
    ///
    /// ```text
    /// 2025-06-02T09:12:44.120318Z  INFO loggen::lines: Hello, world counter=42 service.instance.id=6c1f...
    /// ```
    Simplified,

    /// Dump out JSON lines.
    ///
    /// ```text
    /// {"timestamp":"2025-06-02T09:12:44.120318Z","level":"INFO","message":"Hello, world","counter":42,"service.instance.id":"6c1f...","target":"loggen::lines"}
    /// ```
    Json,
}

/// The logging format parse error.
#[derive(Clone, Debug)]
pub struct FormatParseError(String);

impl fmt::Display for FormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"error parsing "{}" as format: expected one of "auto", "pretty", "simplified", "json""#,
            self.0
        )
    }
}

impl FromStr for LogFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let result = match s {
            "" => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("auto") => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            s if s.eq_ignore_ascii_case("simplified") => LogFormat::Simplified,
            s if s.eq_ignore_ascii_case("json") => LogFormat::Json,
            s => return Err(FormatParseError(s.into())),
        };

        Ok(result)
    }
}

impl std::error::Error for FormatParseError {}

mod display_fromstr {
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: std::fmt::Display,
    {
        serializer.collect_str(&value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        use serde::Deserialize;
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logging configuration.
///
/// Controls the verbosity and format of diagnostic output. Logs are always written to stderr.
///
/// Used in: [`Config::logging`]
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Logging {
    /// Minimum log level to output.
    ///
    /// Messages at or above this level will be output. Valid levels in increasing severity:
    /// TRACE, DEBUG, INFO, WARN, ERROR, OFF.
    ///
    /// Generated lines are emitted at INFO. With [`Output::Log`], raising the level above INFO
    /// silences them.
    ///
    /// The `RUST_LOG` environment variable provides more granular control per module if needed.
    ///
    /// # Default
    ///
    /// `INFO`
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__LOGGING__LEVEL`
    #[serde(with = "display_fromstr")]
    pub level: LevelFilter,

    /// Log output format.
    ///
    /// See [`LogFormat`] for available options and examples.
    ///
    /// # Default
    ///
    /// `Auto` (pretty for TTY, simplified otherwise)
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__LOGGING__FORMAT`
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Main configuration struct for the log generator.
///
/// Configuration is loaded with the following precedence (highest to lowest):
/// 1. Environment variables (`LPS` and variables prefixed with `LOGGEN__`)
/// 2. YAML configuration file (if provided via `-c` flag)
/// 3. Default values
///
/// Command line flags are applied on top by the CLI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Target rate in lines per second.
    ///
    /// Required. Must be a positive integer; anything else is rejected before a single line is
    /// emitted.
    ///
    /// # Environment Variable
    ///
    /// `LPS` or `LOGGEN__LPS`
    pub lps: Option<RawRate>,

    /// Interval between two pacing ticks.
    ///
    /// Shorter intervals spread lines more evenly over time at the cost of more wake-ups.
    ///
    /// # Default
    ///
    /// `10ms`
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__TICK_INTERVAL`
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,

    /// Maximum number of lines emitted within one tick.
    ///
    /// This bounds the work between two cancellation checks. It also caps the sustained rate at
    /// `burst_cap / tick_interval`, so targets above that are not reached.
    ///
    /// # Default
    ///
    /// `10000`
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__BURST_CAP`
    pub burst_cap: u64,

    /// Stop automatically after this duration.
    ///
    /// # Default
    ///
    /// `None` (run until interrupted)
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__DURATION`
    #[serde(default, with = "humantime_serde")]
    pub duration: Option<Duration>,

    /// Seed for payload selection.
    ///
    /// Fixing the seed makes the sequence of payloads reproducible across runs.
    ///
    /// # Default
    ///
    /// `None` (random seed)
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__SEED`
    pub seed: Option<u64>,

    /// Where generated lines are written. See [`Output`].
    ///
    /// # Default
    ///
    /// `log`
    ///
    /// # Environment Variable
    ///
    /// `LOGGEN__OUTPUT`
    pub output: Output,

    /// Payload templates to pick from, replacing the built-in set.
    ///
    /// # Example
    ///
    /// ```yaml
    /// templates:
    ///   - short
    ///   - a somewhat longer line
    /// ```
    pub templates: Option<Vec<String>>,

    /// Logging configuration. See [`Logging`].
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lps: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            burst_cap: DEFAULT_BURST_CAP,
            duration: None,
            seed: None,
            output: Output::default(),
            templates: None,
            logging: Logging::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the given YAML file and the environment.
    ///
    /// Configuration is merged in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. YAML configuration file (if provided)
    /// 3. Environment variables prefixed with `LOGGEN__`
    /// 4. The `LPS` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML configuration file cannot be read or parsed, or if
    /// environment variables contain values of the wrong shape. The target rate itself is
    /// validated by [`run_config`](Self::run_config).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[RATE_ENV]))
            .extract()?;

        Ok(config)
    }

    /// Validates the pacing parameters.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let rate = self.lps.as_ref().ok_or(ConfigError::MissingRate)?.parse()?;

        RunConfig::builder(rate)
            .tick_interval(self.tick_interval)
            .burst_cap(self.burst_cap)
            .build()
    }

    /// Creates the payload selector from the configured templates and seed.
    ///
    /// Without a configured seed, a random one is chosen. It can be read back with
    /// [`Payloads::seed`] to reproduce the run.
    pub fn payloads(&self) -> Result<Payloads, ConfigError> {
        let seed = self.seed.unwrap_or_else(rand::random);
        match &self.templates {
            Some(templates) => Payloads::with_templates(templates.clone(), seed),
            None => Ok(Payloads::new(seed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn rate_from_bare_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LPS", "250");

            let config = Config::load(None).unwrap();
            assert_eq!(config.lps, Some(RawRate::Integer(250)));
            assert_eq!(config.run_config().unwrap().target_rate().get(), 250);

            Ok(())
        });
    }

    #[test]
    fn configurable_via_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOGGEN__LPS", "100");
            jail.set_env("LOGGEN__TICK_INTERVAL", "20ms");
            jail.set_env("LOGGEN__BURST_CAP", "500");
            jail.set_env("LOGGEN__DURATION", "1m");
            jail.set_env("LOGGEN__SEED", "42");
            jail.set_env("LOGGEN__OUTPUT", "json");
            jail.set_env("LOGGEN__LOGGING__LEVEL", "debug");
            jail.set_env("LOGGEN__LOGGING__FORMAT", "json");

            let config = Config::load(None).unwrap();
            let run_config = config.run_config().unwrap();

            assert_eq!(run_config.target_rate().get(), 100);
            assert_eq!(run_config.tick_interval(), Duration::from_millis(20));
            assert_eq!(run_config.burst_cap(), 500);
            assert_eq!(config.duration, Some(Duration::from_secs(60)));
            assert_eq!(config.seed, Some(42));
            assert_eq!(config.output, Output::Json);
            assert_eq!(config.logging.level, LevelFilter::DEBUG);
            assert_eq!(config.logging.format, LogFormat::Json);

            Ok(())
        });
    }

    #[test]
    fn configurable_via_yaml() {
        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(
                br#"
            lps: 5000
            tick_interval: 5ms
            burst_cap: 20000
            templates:
              - first
              - second
            logging:
              format: simplified
            "#,
            )
            .unwrap();

        figment::Jail::expect_with(|_jail| {
            let config = Config::load(Some(tempfile.path())).unwrap();
            let run_config = config.run_config().unwrap();

            assert_eq!(run_config.target_rate().get(), 5000);
            assert_eq!(run_config.tick_interval(), Duration::from_millis(5));
            assert_eq!(run_config.burst_cap(), 20_000);
            assert_eq!(config.logging.format, LogFormat::Simplified);
            assert_eq!(config.logging.level, LevelFilter::INFO);

            let payloads = config.payloads().unwrap();
            assert_eq!(payloads.templates(), ["first", "second"]);

            Ok(())
        });
    }

    #[test]
    fn env_overrides_yaml() {
        let mut tempfile = tempfile::NamedTempFile::new().unwrap();
        tempfile
            .write_all(
                br#"
            lps: 5000
            burst_cap: 20000
            "#,
            )
            .unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("LPS", "10");
            jail.set_env("LOGGEN__BURST_CAP", "30");

            let config = Config::load(Some(tempfile.path())).unwrap();
            let run_config = config.run_config().unwrap();
            assert_eq!(run_config.target_rate().get(), 10);
            assert_eq!(run_config.burst_cap(), 30);

            Ok(())
        });
    }

    #[test]
    fn defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LPS", "1");

            let config = Config::load(None).unwrap();
            let run_config = config.run_config().unwrap();
            assert_eq!(run_config.tick_interval(), Duration::from_millis(10));
            assert_eq!(run_config.burst_cap(), 10_000);
            assert_eq!(config.duration, None);
            assert_eq!(config.output, Output::Log);

            Ok(())
        });
    }

    #[test]
    fn missing_rate() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load(None).unwrap();
            assert_eq!(config.run_config(), Err(ConfigError::MissingRate));
            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_rates() {
        for (value, expected) in [
            ("0", ConfigError::NonPositiveRate(0)),
            ("-5", ConfigError::NonPositiveRate(-5)),
            ("abc", ConfigError::InvalidRate("abc".into())),
            ("2.5", ConfigError::InvalidRate("2.5".into())),
        ] {
            figment::Jail::expect_with(|jail| {
                jail.set_env("LPS", value);

                let config = Config::load(None).unwrap();
                assert_eq!(config.run_config(), Err(expected.clone()));

                Ok(())
            });
        }
    }

    #[test]
    fn rejects_zero_burst_cap() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LPS", "100");
            jail.set_env("LOGGEN__BURST_CAP", "0");

            let config = Config::load(None).unwrap();
            assert_eq!(config.run_config(), Err(ConfigError::ZeroBurstCap));

            Ok(())
        });
    }

    #[test]
    fn seed_reproduces_payloads() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOGGEN__SEED", "1234");

            let config = Config::load(None).unwrap();
            let mut first = config.payloads().unwrap();
            let mut second = config.payloads().unwrap();
            assert_eq!(first.seed(), 1234);

            for _ in 0..50 {
                assert_eq!(first.pick(), second.pick());
            }

            Ok(())
        });
    }

    #[test]
    fn random_seed_is_reported() {
        let config = Config::default();
        let mut payloads = config.payloads().unwrap();
        let mut replay = Payloads::new(payloads.seed());

        for _ in 0..50 {
            assert_eq!(payloads.pick(), replay.pick());
        }
    }

    #[test]
    fn parse_output() {
        assert_eq!("json".parse::<Output>().unwrap(), Output::Json);
        assert_eq!("LOG".parse::<Output>().unwrap(), Output::Log);
        assert!("file".parse::<Output>().is_err());
    }
}
