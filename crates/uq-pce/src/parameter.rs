// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Parameter
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Uncertain inputs: a marginal distribution plus its discretization.
//!
//! Each parameter lives in two coordinate systems. Polynomials and Gauss
//! rules work in standard space (xi); the model sees physical units (x).
//!   uniform      x = lower + (xi + 1) / 2 * (upper - lower)
//!   gaussian     x = mean + std_dev * xi
//!   exponential  x = xi / rate

use uq_math::orthopoly::{GaussRule, PolyFamily};
use uq_types::config::{Distribution, ParameterConfig};
use uq_types::error::{UqError, UqResult};

/// Totally ordered identity of a parameter: family, shape and rule size.
///
/// Two parameters with equal keys produce identical Gauss grids, so the
/// key orders grid nodes independently of where a parameter sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterKey {
    family: u8,
    shape: [u64; 2],
    quadrature_points: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    distribution: Distribution,
    quadrature_points: usize,
}

impl Parameter {
    pub fn new(distribution: Distribution, quadrature_points: usize) -> UqResult<Self> {
        distribution.validate()?;
        if quadrature_points == 0 {
            return Err(UqError::InvalidParameter(
                "quadrature_points must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            distribution,
            quadrature_points,
        })
    }

    pub fn uniform(lower: f64, upper: f64, quadrature_points: usize) -> UqResult<Self> {
        Self::new(Distribution::Uniform { lower, upper }, quadrature_points)
    }

    pub fn gaussian(mean: f64, std_dev: f64, quadrature_points: usize) -> UqResult<Self> {
        Self::new(Distribution::Gaussian { mean, std_dev }, quadrature_points)
    }

    pub fn exponential(rate: f64, quadrature_points: usize) -> UqResult<Self> {
        Self::new(Distribution::Exponential { rate }, quadrature_points)
    }

    pub fn from_config(config: &ParameterConfig) -> UqResult<Self> {
        Self::new(config.distribution, config.quadrature_points)
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn quadrature_points(&self) -> usize {
        self.quadrature_points
    }

    pub fn lower(&self) -> f64 {
        self.distribution.support().0
    }

    pub fn upper(&self) -> f64 {
        self.distribution.support().1
    }

    /// Chaos family orthonormal under this parameter's standardized measure.
    pub fn family(&self) -> PolyFamily {
        match self.distribution {
            Distribution::Uniform { .. } => PolyFamily::Legendre,
            Distribution::Gaussian { .. } => PolyFamily::Hermite,
            Distribution::Exponential { .. } => PolyFamily::Laguerre,
        }
    }

    pub fn key(&self) -> ParameterKey {
        let (family, shape) = match self.distribution {
            Distribution::Uniform { lower, upper } => (0, [lower.to_bits(), upper.to_bits()]),
            Distribution::Gaussian { mean, std_dev } => (1, [mean.to_bits(), std_dev.to_bits()]),
            Distribution::Exponential { rate } => (2, [rate.to_bits(), 0]),
        };
        ParameterKey {
            family,
            shape,
            quadrature_points: self.quadrature_points,
        }
    }

    /// Gauss rule in standard coordinates with `quadrature_points` nodes.
    pub fn quadrature_rule(&self) -> GaussRule {
        self.family().gauss_rule(self.quadrature_points)
    }

    /// Gauss nodes mapped to physical units, with their probability weights.
    pub fn physical_quadrature(&self) -> (Vec<f64>, Vec<f64>) {
        let rule = self.quadrature_rule();
        let nodes = rule.nodes.iter().map(|&xi| self.to_physical(xi)).collect();
        (nodes, rule.weights)
    }

    pub fn to_physical(&self, xi: f64) -> f64 {
        match self.distribution {
            Distribution::Uniform { lower, upper } => lower + 0.5 * (xi + 1.0) * (upper - lower),
            Distribution::Gaussian { mean, std_dev } => mean + std_dev * xi,
            Distribution::Exponential { rate } => xi / rate,
        }
    }

    pub fn to_standard(&self, x: f64) -> f64 {
        match self.distribution {
            Distribution::Uniform { lower, upper } => 2.0 * (x - lower) / (upper - lower) - 1.0,
            Distribution::Gaussian { mean, std_dev } => (x - mean) / std_dev,
            Distribution::Exponential { rate } => x * rate,
        }
    }
}
