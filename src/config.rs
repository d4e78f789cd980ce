//! Validator configuration

use serde::Deserialize;

use crate::constraint::MAX_SAMPLE_SIZE;

/// Configuration for table validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Maximum offending rows sampled into one error.
    pub max_samples: usize,
    /// Reject table columns the schema does not declare.
    pub strict: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_samples: MAX_SAMPLE_SIZE,
            strict: false,
        }
    }
}

impl ValidatorConfig {
    /// Default config with strict column checking.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Parses a config object. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
