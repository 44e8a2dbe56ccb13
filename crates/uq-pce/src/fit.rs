// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Least-Squares Polynomial Fit
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Weighted least-squares polynomial chaos surrogate.

use crate::basis::Basis;
use crate::design::{Design, DesignMatrixBuilder, Model};
use crate::stats::Statistics;
use ndarray::Array1;
use tracing::debug;
use uq_math::linalg::{condition_number, lstsq_qr};
use uq_types::config::Subsampling;
use uq_types::error::{UqError, UqResult};

/// Polynomial surrogate: one coefficient per basis term.
#[derive(Debug, Clone)]
pub struct PolyFit {
    pub coefficients: Array1<f64>,
    pub basis: Basis,
    /// Weighted residual `|| W^1/2 (Psi c - y) ||`.
    pub residual_norm: f64,
    /// 2-norm condition number of the weighted design.
    pub condition_number: f64,
    pub evaluations: usize,
}

impl PolyFit {
    /// Checked fit on an evaluated design.
    pub fn try_fit(basis: Basis, design: &Design) -> UqResult<Self> {
        if design.matrix.ncols() != basis.cardinality() {
            return Err(UqError::DimensionMismatch {
                expected: basis.cardinality(),
                got: design.matrix.ncols(),
            });
        }
        if design.len() < basis.cardinality() {
            return Err(UqError::RankDeficient {
                evaluations: design.len(),
                cardinality: basis.cardinality(),
            });
        }

        let (a, b) = design.weighted_system();
        let solution = lstsq_qr(&a, &b)?;
        let condition_number = condition_number(&a);
        debug!(
            rows = a.nrows(),
            cols = a.ncols(),
            residual = solution.residual_norm,
            condition_number,
            "least-squares solve"
        );

        Ok(Self {
            coefficients: solution.coefficients,
            basis,
            residual_norm: solution.residual_norm,
            condition_number,
            evaluations: design.len(),
        })
    }

    /// Select points, evaluate `model` and fit in one go.
    pub fn fit_model<M: Model + ?Sized>(
        basis: Basis,
        model: &M,
        evaluations: usize,
        subsampling: Subsampling,
    ) -> UqResult<Self> {
        let design = DesignMatrixBuilder::new(&basis, evaluations)
            .with_subsampling(subsampling)
            .build(model)?;
        Self::try_fit(basis, &design)
    }

    /// Panicking variant of [`PolyFit::fit_model`].
    pub fn fit<M: Model + ?Sized>(basis: Basis, model: &M, evaluations: usize) -> Self {
        Self::fit_model(basis, model, evaluations, Subsampling::QrPivoting)
            .expect("polynomial fit failed")
    }

    /// Coefficient of the basis term with multi-index `alpha`, if present.
    pub fn coefficient(&self, alpha: &[usize]) -> Option<f64> {
        self.basis
            .index_set()
            .position(alpha)
            .map(|i| self.coefficients[i])
    }

    /// Checked surrogate evaluation at a physical point.
    pub fn try_predict(&self, x: &[f64]) -> UqResult<f64> {
        if !x.iter().all(|v| v.is_finite()) {
            return Err(UqError::ConfigError(
                "prediction received non-finite input values".to_string(),
            ));
        }
        let xi = self.basis.to_standard(x)?;
        Ok(self.basis.evaluate_standard(xi.view()).dot(&self.coefficients))
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        self.try_predict(x).expect("surrogate prediction failed")
    }

    /// Mean, variance, Sobol indices and higher moments of the surrogate.
    pub fn statistics(&self) -> UqResult<Statistics> {
        Statistics::from_fit(self)
    }
}
