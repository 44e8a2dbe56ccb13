// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{UqError, UqResult};
use serde::{Deserialize, Serialize};

/// Marginal distribution of one uncertain input.
///
/// Each family carries what its Gauss rule and chaos polynomials need:
/// uniform maps to Legendre, Gaussian to Hermite, exponential to Laguerre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum Distribution {
    Uniform { lower: f64, upper: f64 },
    Gaussian { mean: f64, std_dev: f64 },
    Exponential { rate: f64 },
}

impl Distribution {
    pub fn validate(&self) -> UqResult<()> {
        match *self {
            Distribution::Uniform { lower, upper } => {
                if !lower.is_finite() || !upper.is_finite() {
                    return Err(UqError::InvalidParameter(format!(
                        "uniform bounds must be finite, got [{lower}, {upper}]"
                    )));
                }
                if lower >= upper {
                    return Err(UqError::InvalidParameter(format!(
                        "uniform bounds inverted: lower={lower} >= upper={upper}"
                    )));
                }
            }
            Distribution::Gaussian { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev <= 0.0 {
                    return Err(UqError::InvalidParameter(format!(
                        "gaussian requires finite mean and std_dev > 0, got mean={mean}, std_dev={std_dev}"
                    )));
                }
            }
            Distribution::Exponential { rate } => {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(UqError::InvalidParameter(format!(
                        "exponential requires finite rate > 0, got {rate}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Support of the distribution in physical units.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Distribution::Uniform { lower, upper } => (lower, upper),
            Distribution::Gaussian { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Distribution::Exponential { .. } => (0.0, f64::INFINITY),
        }
    }
}

/// One entry of the `parameters` list in a study file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterConfig {
    /// Display label, e.g. "mass". Optional in JSON.
    #[serde(default)]
    pub label: String,
    pub distribution: Distribution,
    pub quadrature_points: usize,
}

/// Truncation rule for the multi-index set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IndexRule {
    TotalOrder,
    Tensor,
    /// Hyperbolic cross `(sum alpha_i^q)^(1/q) <= p`, `0 < q <= 1`.
    Hyperbolic { q: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisConfig {
    pub rule: IndexRule,
    /// Maximum degree per dimension, in parameter order.
    pub orders: Vec<usize>,
}

/// How evaluation points are picked from the tensor quadrature grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum Subsampling {
    /// Greedy QR column pivoting on the weighted design (effective quadrature).
    #[default]
    QrPivoting,
    /// Uniform draw without replacement from a seeded generator.
    Random { seed: u64 },
}

/// Top-level sensitivity study description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    pub name: String,
    pub parameters: Vec<ParameterConfig>,
    pub basis: BasisConfig,
    pub evaluations: usize,
    #[serde(default)]
    pub subsampling: Subsampling,
}

impl StudyConfig {
    /// Load from a JSON file and validate it.
    pub fn from_file(path: &str) -> UqResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> UqResult<()> {
        if self.parameters.is_empty() {
            return Err(UqError::ConfigError(
                "study requires at least one parameter".to_string(),
            ));
        }
        for (i, p) in self.parameters.iter().enumerate() {
            p.distribution.validate()?;
            if p.quadrature_points == 0 {
                return Err(UqError::ConfigError(format!(
                    "parameter {i} requests zero quadrature points"
                )));
            }
        }
        if self.basis.orders.len() != self.parameters.len() {
            return Err(UqError::ConfigError(format!(
                "basis lists {} orders for {} parameters",
                self.basis.orders.len(),
                self.parameters.len()
            )));
        }
        if let IndexRule::Hyperbolic { q } = self.basis.rule {
            if !(q > 0.0 && q <= 1.0) {
                return Err(UqError::ConfigError(format!(
                    "hyperbolic q must lie in (0, 1], got {q}"
                )));
            }
        }
        if self.evaluations == 0 {
            return Err(UqError::ConfigError(
                "study requires at least one evaluation".to_string(),
            ));
        }
        Ok(())
    }

    /// Labels in parameter order; unlabelled inputs become `x{i}`.
    pub fn labels(&self) -> Vec<String> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.label.is_empty() {
                    format!("x{i}")
                } else {
                    p.label.clone()
                }
            })
            .collect()
    }
}
