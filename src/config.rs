//! # Clinic Configuration
//!
//! Capacity, policy and distribution parameters for a single simulation run.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [clinic]
//! exam_rooms = 4
//! consult_rooms = 1
//! prob_at_risk = 0.1
//! close_time = 16.0
//!
//! [arrivals]
//! type = "exponential"
//! mean = 0.1
//!
//! [exam]
//! type = "exponential"
//! mean = 0.5
//!
//! [consult]
//! type = "uniform"
//! low = 0.25
//! high = 0.75
//!
//! [run]
//! seed = 42
//! ```
//!
//! - All times are in hours since opening.
//! - `horizon` is optional. Without it the run continues until every admitted
//!   patient has left the clinic.
//! - Every section and field falls back to a default when missing.
//!
//! ## Example: Rust Usage
//!
//! ```rust
//! use clinic_sim::config::{Config, DistributionConfig};
//! let config: Config = toml::from_str("[clinic]\nexam_rooms = 2").unwrap();
//! assert_eq!(config.clinic.exam_rooms, 2);
//! assert_eq!(config.clinic.consult_rooms, 1);
//! assert!(matches!(config.arrivals, DistributionConfig::Exponential { .. }));
//! assert!(config.validate().is_ok());
//! ```

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::random::DurationDistribution;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct: clinic capacity and policy, the three
/// distributions, and run-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub clinic: ClinicConfig,
    #[serde(default = "default_arrivals")]
    pub arrivals: DistributionConfig,
    #[serde(default = "default_exam")]
    pub exam: DistributionConfig,
    #[serde(default = "default_consult")]
    pub consult: DistributionConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clinic: ClinicConfig::default(),
            arrivals: default_arrivals(),
            exam: default_exam(),
            consult: default_consult(),
            run: RunConfig::default(),
        }
    }
}

/// Capacity and operating policy of the clinic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClinicConfig {
    #[serde(default = "default_exam_rooms")]
    pub exam_rooms: usize,
    #[serde(default = "default_consult_rooms")]
    pub consult_rooms: usize,
    /// Probability that a generated patient needs a mental-health consult.
    #[serde(default = "default_prob_at_risk")]
    pub prob_at_risk: f64,
    /// Time at which the clinic stops admitting new patients.
    #[serde(default = "default_close_time")]
    pub close_time: f64,
    /// Hard stop for the event loop. `None` drains the calendar.
    #[serde(default)]
    pub horizon: Option<f64>,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            exam_rooms: default_exam_rooms(),
            consult_rooms: default_consult_rooms(),
            prob_at_risk: default_prob_at_risk(),
            close_time: default_close_time(),
            horizon: None,
        }
    }
}

/// Run-level settings: random seed and the first patient.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub initial_patient_id: u64,
    #[serde(default)]
    pub initial_patient_at_risk: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            initial_patient_id: 0,
            initial_patient_at_risk: false,
        }
    }
}

/// Parameters of a duration distribution, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionConfig {
    Constant { value: f64 },
    Exponential { mean: f64 },
    Uniform { low: f64, high: f64 },
    Gamma { shape: f64, scale: f64 },
    LogNormal { mu: f64, sigma: f64 },
    /// Discrete distribution over `values`, with relative `weights`.
    Empirical { values: Vec<f64>, weights: Vec<f64> },
}

impl Config {
    /// Validate capacity, policy and distribution parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let clinic = &self.clinic;
        if clinic.exam_rooms == 0 {
            return Err(ConfigError::Invalid("exam_rooms must be >= 1".to_string()));
        }
        if clinic.consult_rooms == 0 {
            return Err(ConfigError::Invalid("consult_rooms must be >= 1".to_string()));
        }
        if !(0.0..=1.0).contains(&clinic.prob_at_risk) {
            return Err(ConfigError::Invalid(format!(
                "prob_at_risk must be between 0 and 1, got {}",
                clinic.prob_at_risk
            )));
        }
        if !clinic.close_time.is_finite() || clinic.close_time < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "close_time must be a finite, non-negative time, got {}",
                clinic.close_time
            )));
        }
        if let Some(horizon) = clinic.horizon {
            if !horizon.is_finite() || horizon < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "horizon must be a finite, non-negative time, got {}",
                    horizon
                )));
            }
        }
        for (name, dist) in [
            ("arrivals", &self.arrivals),
            ("exam", &self.exam),
            ("consult", &self.consult),
        ] {
            DurationDistribution::try_from(dist)
                .map_err(|e| ConfigError::Invalid(format!("[{}] {}", name, e)))?;
        }
        Ok(())
    }
}

// Default value functions
fn default_exam_rooms() -> usize { 4 }
fn default_consult_rooms() -> usize { 1 }
fn default_prob_at_risk() -> f64 { 0.1 }
fn default_close_time() -> f64 { 16.0 }
fn default_seed() -> u64 { 1 }
fn default_arrivals() -> DistributionConfig { DistributionConfig::Exponential { mean: 1.0 / 12.0 } }
fn default_exam() -> DistributionConfig { DistributionConfig::Exponential { mean: 0.25 } }
fn default_consult() -> DistributionConfig { DistributionConfig::Exponential { mean: 0.5 } }

/// Load configuration from a TOML file at the given path, then validate it.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}
