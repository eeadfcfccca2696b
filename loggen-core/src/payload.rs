//! Selection of message payloads for generated records.
//!
//! Payloads are drawn uniformly from a small, fixed set of templates of varying length. This has no
//! influence on pacing; it only varies record size and content to resemble real traffic. Selection
//! is driven by a seedable RNG, so a run can be reproduced exactly.

use std::borrow::Cow;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

/// The built-in payload templates.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "Log line",
    "Hello, world",
    "This is a bit longer",
    "And this one is a much longer log line that also includes some fixed numbers like 1,000,000",
];

/// Uniform random selector over a fixed set of payload templates.
#[derive(Clone, Debug)]
pub struct Payloads {
    templates: Vec<Cow<'static, str>>,
    seed: u64,
    rng: SmallRng,
}

impl Payloads {
    /// Creates a selector over [`DEFAULT_TEMPLATES`] with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.iter().copied().map(Cow::Borrowed).collect(),
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Creates a selector over a custom set of templates.
    ///
    /// Returns [`ConfigError::NoTemplates`] if `templates` is empty.
    pub fn with_templates<I, T>(templates: I, seed: u64) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        let templates: Vec<_> = templates.into_iter().map(Into::into).collect();
        if templates.is_empty() {
            return Err(ConfigError::NoTemplates);
        }

        Ok(Self {
            templates,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// The seed this selector was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// All templates this selector picks from.
    pub fn templates(&self) -> &[Cow<'static, str>] {
        &self.templates
    }

    /// Picks the next payload.
    pub fn pick(&mut self) -> &str {
        let index = self.rng.random_range(0..self.templates.len());
        &self.templates[index]
    }
}
