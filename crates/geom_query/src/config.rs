//! Numerical tuning configuration for the query engine
//!
//! Every query entry point has a `*_with` variant taking an explicit
//! [`QueryTuning`]; the plain variants use [`QueryTuning::default`]. The
//! struct deserializes from TOML so middleware integrations can ship the
//! knobs in their config files alongside everything else.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a tuning configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but holds an unusable value
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Numeric knobs of the query engine.
///
/// The defaults are the shipped values; deviating from them trades
/// robustness against performance and should be validated per title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryTuning {
    /// Iteration cap for the convex (GJK) distance solver
    pub gjk_max_iterations: u32,

    /// Relative convergence tolerance for the convex distance solver
    pub gjk_tolerance: f32,

    /// Iteration cap for conservative-advancement sweeps
    pub sweep_max_iterations: u32,

    /// Separation below which a sweep reports contact
    pub contact_epsilon: f32,

    /// Fattening tolerance for edge-edge sweep candidates
    pub edge_fattening: f32,

    /// Denominators below this magnitude are treated as parallel
    pub parallel_epsilon: f32,

    /// Allowed deviation of |dir|^2 from 1 in ray/sweep preconditions
    pub unit_dir_epsilon: f32,
}

impl Default for QueryTuning {
    fn default() -> Self {
        Self {
            gjk_max_iterations: 32,
            gjk_tolerance: 1.0e-4,
            sweep_max_iterations: 32,
            contact_epsilon: 1.0e-4,
            edge_fattening: 1.0e-3,
            parallel_epsilon: 1.0e-6,
            unit_dir_epsilon: 1.0e-4,
        }
    }
}

impl QueryTuning {
    /// Parse a tuning configuration from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: Self = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check that every knob is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gjk_max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "gjk_max_iterations must be at least 1".to_string(),
            ));
        }
        if self.sweep_max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "sweep_max_iterations must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("gjk_tolerance", self.gjk_tolerance),
            ("contact_epsilon", self.contact_epsilon),
            ("edge_fattening", self.edge_fattening),
            ("parallel_epsilon", self.parallel_epsilon),
            ("unit_dir_epsilon", self.unit_dir_epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(QueryTuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let tuning = QueryTuning::from_toml_str("gjk_max_iterations = 64\n").unwrap();
        assert_eq!(tuning.gjk_max_iterations, 64);
        assert_eq!(
            tuning.sweep_max_iterations,
            QueryTuning::default().sweep_max_iterations
        );
    }

    #[test]
    fn test_invalid_value_rejected() {
        let result = QueryTuning::from_toml_str("gjk_tolerance = -1.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_toml_rejected() {
        assert!(matches!(
            QueryTuning::from_toml_str("gjk_max_iterations = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
