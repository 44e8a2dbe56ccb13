// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Design Matrix
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Evaluation point selection and model evaluation.
//!
//! Candidate points are the nodes of the tensor Gauss grid built from each
//! parameter's rule. Effective-quadrature subsampling keeps the rows of the
//! weighted design `sqrt(w_j) * psi_k(xi_j)` picked by QR column pivoting.
//!
//! Ties between equally informative rows are broken by each node's
//! canonical rank, so reordering the parameters reorders the coordinates of
//! the chosen points but never changes which points are chosen.

use crate::basis::Basis;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;
use uq_math::linalg::pivoted_row_selection_by_key;
use uq_types::config::Subsampling;
use uq_types::error::{UqError, UqResult};

/// Tensor grids larger than this are refused.
pub const MAX_GRID_POINTS: usize = 1 << 22;

/// Largest dense basis matrix (rows x terms) built over candidate points.
pub const MAX_DESIGN_ENTRIES: usize = 1 << 25;

/// Black-box target: physical inputs in parameter order to a scalar.
///
/// Must be pure; evaluations run concurrently.
pub trait Model: Sync {
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl<F> Model for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Tensor-product Gauss grid in standard coordinates.
#[derive(Debug, Clone)]
pub struct TensorGrid {
    /// (n_points, n_dims)
    pub points: Array2<f64>,
    /// Product weights, summing to 1.
    pub weights: Array1<f64>,
    /// Rank of each node with its coordinates listed in parameter-key order.
    /// Nodes that differ only by a reordering of parameters share a rank.
    pub canonical_rank: Vec<usize>,
}

impl TensorGrid {
    /// Node count of the grid for `basis`, without building it.
    pub fn point_count(basis: &Basis) -> UqResult<usize> {
        basis
            .parameters()
            .iter()
            .try_fold(1usize, |acc, p| acc.checked_mul(p.quadrature_points()))
            .filter(|&n| n <= MAX_GRID_POINTS)
            .ok_or_else(|| {
                UqError::ConfigError(format!("tensor grid exceeds {MAX_GRID_POINTS} points"))
            })
    }

    /// Last dimension varies fastest.
    pub fn new(basis: &Basis) -> UqResult<Self> {
        let n_points = Self::point_count(basis)?;
        let params = basis.parameters();
        let rules: Vec<_> = params.iter().map(|p| p.quadrature_rule()).collect();
        let dims = rules.len();

        // Dimensions sorted by key; runs of equal keys are interchangeable.
        let keys: Vec<_> = params.iter().map(|p| p.key()).collect();
        let mut by_key: Vec<usize> = (0..dims).collect();
        by_key.sort_by_key(|&d| keys[d]);
        let mut runs = Vec::new();
        let mut start = 0;
        for i in 1..=dims {
            if i == dims || keys[by_key[i]] != keys[by_key[start]] {
                runs.push(start..i);
                start = i;
            }
        }

        let mut points = Array2::zeros((n_points, dims));
        let mut weights = Array1::ones(n_points);
        let mut canonical_rank = vec![0; n_points];
        let mut node = vec![0; dims];
        let mut sorted = vec![0; dims];
        for row in 0..n_points {
            let mut rem = row;
            for d in (0..dims).rev() {
                let n = rules[d].len();
                let k = rem % n;
                rem /= n;
                node[d] = k;
                points[[row, d]] = rules[d].nodes[k];
                weights[row] *= rules[d].weights[k];
            }
            for (slot, &d) in by_key.iter().enumerate() {
                sorted[slot] = node[d];
            }
            for run in &runs {
                sorted[run.clone()].sort_unstable();
            }
            canonical_rank[row] = by_key
                .iter()
                .zip(&sorted)
                .fold(0, |acc, (&d, &k)| acc * rules[d].len() + k);
        }
        Ok(Self {
            points,
            weights,
            canonical_rank,
        })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Evaluated design: selected points, their weights and model outputs.
#[derive(Debug, Clone)]
pub struct Design {
    /// Row of each point in the tensor grid (empty for user-supplied points).
    pub grid_rows: Vec<usize>,
    /// Standard coordinates, (n_evals, n_dims).
    pub points: Array2<f64>,
    /// Physical coordinates passed to the model, (n_evals, n_dims).
    pub physical: Array2<f64>,
    /// Quadrature weights renormalised to sum to 1.
    pub weights: Array1<f64>,
    /// Unweighted basis evaluations, (n_evals, cardinality).
    pub matrix: Array2<f64>,
    pub observations: Array1<f64>,
}

impl Design {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Row-scaled system `(W^1/2 Psi, W^1/2 y)` for the weighted fit.
    pub fn weighted_system(&self) -> (Array2<f64>, Array1<f64>) {
        let sqrt_w = self.weights.mapv(f64::sqrt);
        let mut a = self.matrix.clone();
        for (i, mut row) in a.rows_mut().into_iter().enumerate() {
            row *= sqrt_w[i];
        }
        let b = &self.observations * &sqrt_w;
        (a, b)
    }
}

/// Selects evaluation points for a basis and runs the model on them.
#[derive(Debug, Clone)]
pub struct DesignMatrixBuilder<'a> {
    basis: &'a Basis,
    evaluations: usize,
    subsampling: Subsampling,
}

impl<'a> DesignMatrixBuilder<'a> {
    pub fn new(basis: &'a Basis, evaluations: usize) -> Self {
        Self {
            basis,
            evaluations,
            subsampling: Subsampling::default(),
        }
    }

    pub fn with_subsampling(mut self, subsampling: Subsampling) -> Self {
        self.subsampling = subsampling;
        self
    }

    /// Size checks shared by `select` and `build`, run before allocating.
    fn check_request(&self, grid_points: usize) -> UqResult<()> {
        let cardinality = self.basis.cardinality();
        if self.evaluations < cardinality {
            return Err(UqError::RankDeficient {
                evaluations: self.evaluations,
                cardinality,
            });
        }
        if self.evaluations > grid_points {
            return Err(UqError::ConfigError(format!(
                "requested {} evaluations but the tensor grid has {} points; \
                 raise quadrature_points",
                self.evaluations, grid_points
            )));
        }
        let rows = match self.subsampling {
            Subsampling::QrPivoting => grid_points,
            Subsampling::Random { .. } => self.evaluations,
        };
        if rows.saturating_mul(cardinality) > MAX_DESIGN_ENTRIES {
            return Err(UqError::ConfigError(format!(
                "{rows} candidate points x {cardinality} basis terms exceeds \
                 {MAX_DESIGN_ENTRIES} design entries; lower the order or quadrature_points"
            )));
        }
        Ok(())
    }

    /// Pick `evaluations` rows of the tensor grid.
    ///
    /// Fails before touching the model when fewer evaluations than basis
    /// terms are requested, more than the grid holds, or the candidate
    /// matrix would exceed `MAX_DESIGN_ENTRIES`.
    pub fn select(&self, grid: &TensorGrid) -> UqResult<Vec<usize>> {
        self.check_request(grid.len())?;

        let rows = match self.subsampling {
            Subsampling::QrPivoting => {
                let mut candidates = self.basis.design_matrix(&grid.points);
                for (i, mut row) in candidates.rows_mut().into_iter().enumerate() {
                    row *= grid.weights[i].sqrt();
                }
                pivoted_row_selection_by_key(&candidates, self.evaluations, &grid.canonical_rank)?
            }
            Subsampling::Random { seed } => {
                // Draw positions in canonical order so parameter order is moot.
                let mut ordered: Vec<usize> = (0..grid.len()).collect();
                ordered.sort_by_key(|&r| (grid.canonical_rank[r], r));
                let mut rng = StdRng::seed_from_u64(seed);
                let mut rows: Vec<usize> =
                    rand::seq::index::sample(&mut rng, grid.len(), self.evaluations)
                        .into_iter()
                        .map(|pos| ordered[pos])
                        .collect();
                rows.sort_unstable();
                rows
            }
        };
        debug!(
            strategy = ?self.subsampling,
            grid_points = grid.len(),
            selected = rows.len(),
            "subsampled tensor grid"
        );
        Ok(rows)
    }

    /// Select points from the tensor grid and evaluate the model on them.
    pub fn build<M: Model + ?Sized>(&self, model: &M) -> UqResult<Design> {
        self.check_request(TensorGrid::point_count(self.basis)?)?;
        let grid = TensorGrid::new(self.basis)?;
        let rows = self.select(&grid)?;

        let dims = self.basis.dimensions();
        let mut points = Array2::zeros((rows.len(), dims));
        let mut weights = Array1::zeros(rows.len());
        for (i, &r) in rows.iter().enumerate() {
            points.row_mut(i).assign(&grid.points.row(r));
            weights[i] = grid.weights[r];
        }

        let mut design = self.evaluate_points(points, weights, model)?;
        design.grid_rows = rows;
        Ok(design)
    }

    /// Evaluate the model at caller-chosen standard-space points.
    ///
    /// Weights are renormalised; pass ones for an unweighted fit.
    pub fn evaluate_points<M: Model + ?Sized>(
        &self,
        points: Array2<f64>,
        weights: Array1<f64>,
        model: &M,
    ) -> UqResult<Design> {
        let dims = self.basis.dimensions();
        if points.ncols() != dims {
            return Err(UqError::DimensionMismatch {
                expected: dims,
                got: points.ncols(),
            });
        }
        if weights.len() != points.nrows() {
            return Err(UqError::DimensionMismatch {
                expected: points.nrows(),
                got: weights.len(),
            });
        }
        if !points.iter().all(|v| v.is_finite())
            || !weights.iter().all(|w| w.is_finite() && *w > 0.0)
        {
            return Err(UqError::ConfigError(
                "design points must be finite with positive weights".to_string(),
            ));
        }

        let params = self.basis.parameters();
        let physical = Array2::from_shape_fn(points.dim(), |(i, d)| {
            params[d].to_physical(points[[i, d]])
        });

        let inputs: Vec<Vec<f64>> = physical.rows().into_iter().map(|r| r.to_vec()).collect();
        let observations = inputs
            .par_iter()
            .enumerate()
            .map(|(index, x)| {
                let value = model.evaluate(x);
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(UqError::NonFiniteEvaluation { index, value })
                }
            })
            .collect::<UqResult<Vec<f64>>>()?;

        let total: f64 = weights.sum();
        let weights = weights / total;
        let matrix = self.basis.design_matrix(&points);

        Ok(Design {
            grid_rows: Vec::new(),
            points,
            physical,
            weights,
            matrix,
            observations: Array1::from_vec(observations),
        })
    }
}
