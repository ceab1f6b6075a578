// src/random.rs - Random stream and duration distributions
use rand::distr::weighted::WeightedIndex;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp, Gamma, LogNormal};
use thiserror::Error;

use crate::config::DistributionConfig;
use crate::error::SimError;

#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    #[error("constant duration must be finite and >= 0, got {0}")]
    InvalidConstant(f64),
    #[error("exponential mean must be finite and > 0, got {0}")]
    InvalidMean(f64),
    #[error("uniform bounds must satisfy 0 <= low <= high, got [{low}, {high}]")]
    InvalidBounds { low: f64, high: f64 },
    #[error("invalid {kind} parameters: {reason}")]
    InvalidParameters { kind: &'static str, reason: String },
    #[error("empirical distribution needs non-empty values with one weight each")]
    EmpiricalShape,
    #[error("empirical values must be finite and >= 0")]
    EmpiricalValue,
}

/// A validated, ready-to-sample duration distribution.
///
/// Parameters are checked on construction, but `Gamma` and `LogNormal` with
/// extreme parameters can still overflow to infinity. Draws that feed the
/// clock go through [`draw_duration`], which rejects them.
#[derive(Debug, Clone)]
pub enum DurationDistribution {
    Constant(f64),
    Exponential(Exp<f64>),
    Uniform(Uniform<f64>),
    Gamma(Gamma<f64>),
    LogNormal(LogNormal<f64>),
    Empirical {
        values: Vec<f64>,
        index: WeightedIndex<f64>,
    },
}

impl DurationDistribution {
    pub fn constant(value: f64) -> Self {
        DurationDistribution::Constant(value)
    }
}

impl TryFrom<&DistributionConfig> for DurationDistribution {
    type Error = DistributionError;

    fn try_from(config: &DistributionConfig) -> Result<Self, Self::Error> {
        match config {
            DistributionConfig::Constant { value } => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(DistributionError::InvalidConstant(*value));
                }
                Ok(DurationDistribution::Constant(*value))
            }
            DistributionConfig::Exponential { mean } => {
                if !mean.is_finite() || *mean <= 0.0 {
                    return Err(DistributionError::InvalidMean(*mean));
                }
                Exp::new(1.0 / mean)
                    .map(DurationDistribution::Exponential)
                    .map_err(|e| DistributionError::InvalidParameters {
                        kind: "exponential",
                        reason: e.to_string(),
                    })
            }
            DistributionConfig::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite()) || *low < 0.0 || low > high {
                    return Err(DistributionError::InvalidBounds {
                        low: *low,
                        high: *high,
                    });
                }
                Uniform::new_inclusive(*low, *high)
                    .map(DurationDistribution::Uniform)
                    .map_err(|e| DistributionError::InvalidParameters {
                        kind: "uniform",
                        reason: e.to_string(),
                    })
            }
            DistributionConfig::Gamma { shape, scale } => Gamma::new(*shape, *scale)
                .map(DurationDistribution::Gamma)
                .map_err(|e| DistributionError::InvalidParameters {
                    kind: "gamma",
                    reason: e.to_string(),
                }),
            DistributionConfig::LogNormal { mu, sigma } => LogNormal::new(*mu, *sigma)
                .map(DurationDistribution::LogNormal)
                .map_err(|e| DistributionError::InvalidParameters {
                    kind: "log-normal",
                    reason: e.to_string(),
                }),
            DistributionConfig::Empirical { values, weights } => {
                if values.is_empty() || values.len() != weights.len() {
                    return Err(DistributionError::EmpiricalShape);
                }
                if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(DistributionError::EmpiricalValue);
                }
                let index = WeightedIndex::new(weights.iter().copied()).map_err(|e| {
                    DistributionError::InvalidParameters {
                        kind: "empirical",
                        reason: e.to_string(),
                    }
                })?;
                Ok(DurationDistribution::Empirical {
                    values: values.clone(),
                    index,
                })
            }
        }
    }
}

impl Distribution<f64> for DurationDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            DurationDistribution::Constant(value) => *value,
            DurationDistribution::Exponential(d) => d.sample(rng),
            DurationDistribution::Uniform(d) => d.sample(rng),
            DurationDistribution::Gamma(d) => d.sample(rng),
            DurationDistribution::LogNormal(d) => d.sample(rng),
            DurationDistribution::Empirical { values, index } => values[index.sample(rng)],
        }
    }
}

/// Source of randomness consumed by the clinic.
pub trait RandomStream {
    /// A uniform draw from `[0, 1)`.
    fn uniform(&mut self) -> f64;
    /// A draw from `dist`.
    fn sample(&mut self, dist: &DurationDistribution) -> f64;
}

/// Reproducible stream backed by a seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededStream {
    rng: StdRng,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomStream for SeededStream {
    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn sample(&mut self, dist: &DurationDistribution) -> f64 {
        dist.sample(&mut self.rng)
    }
}

/// Draws a duration from `dist`, rejecting anything that cannot advance the clock.
pub fn draw_duration(
    rng: &mut dyn RandomStream,
    dist: &DurationDistribution,
) -> Result<f64, SimError> {
    let drawn = rng.sample(dist);
    if drawn.is_finite() && drawn >= 0.0 {
        Ok(drawn)
    } else {
        Err(SimError::InvalidDuration(drawn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(config: DistributionConfig) -> DurationDistribution {
        DurationDistribution::try_from(&config).unwrap()
    }

    #[test]
    fn test_constant_always_returns_value() {
        let dist = build(DistributionConfig::Constant { value: 5.0 });
        let mut stream = SeededStream::new(7);
        for _ in 0..10 {
            assert_eq!(stream.sample(&dist), 5.0);
        }
    }

    #[test]
    fn test_exponential_sample_mean_close_to_configured() {
        let dist = build(DistributionConfig::Exponential { mean: 2.0 });
        let mut stream = SeededStream::new(11);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| stream.sample(&dist)).sum();
        let mean = total / n as f64;
        assert!((mean - 2.0).abs() < 0.1, "sample mean {mean}");
    }

    #[test]
    fn test_uniform_stays_in_bounds() {
        let dist = build(DistributionConfig::Uniform { low: 1.0, high: 3.0 });
        let mut stream = SeededStream::new(3);
        for _ in 0..1000 {
            let x = stream.sample(&dist);
            assert!((1.0..=3.0).contains(&x));
        }
    }

    #[test]
    fn test_empirical_only_draws_weighted_values() {
        let dist = build(DistributionConfig::Empirical {
            values: vec![0.5, 1.0, 9.0],
            weights: vec![1.0, 1.0, 0.0],
        });
        let mut stream = SeededStream::new(5);
        for _ in 0..1000 {
            let x = stream.sample(&dist);
            assert!(x == 0.5 || x == 1.0);
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let bad = [
            DistributionConfig::Constant { value: -1.0 },
            DistributionConfig::Exponential { mean: 0.0 },
            DistributionConfig::Uniform { low: 2.0, high: 1.0 },
            DistributionConfig::Gamma { shape: -1.0, scale: 1.0 },
            DistributionConfig::LogNormal { mu: 0.0, sigma: -1.0 },
            DistributionConfig::Empirical { values: vec![], weights: vec![] },
            DistributionConfig::Empirical { values: vec![1.0], weights: vec![1.0, 2.0] },
            DistributionConfig::Empirical { values: vec![1.0], weights: vec![0.0] },
        ];
        for config in &bad {
            assert!(DurationDistribution::try_from(config).is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_overflowing_draw_is_rejected() {
        let dist = build(DistributionConfig::LogNormal { mu: 1000.0, sigma: 0.1 });
        let mut stream = SeededStream::new(1);
        let err = draw_duration(&mut stream, &dist).unwrap_err();
        assert!(matches!(err, SimError::InvalidDuration(x) if x.is_infinite()));
        assert_eq!(draw_duration(&mut stream, &DurationDistribution::constant(2.0)).unwrap(), 2.0);
    }

    #[test]
    fn test_seeded_stream_is_reproducible() {
        let mut a = SeededStream::new(99);
        let mut b = SeededStream::new(99);
        for _ in 0..100 {
            let u = a.uniform();
            assert_eq!(u, b.uniform());
            assert!((0.0..1.0).contains(&u));
        }
    }
}
