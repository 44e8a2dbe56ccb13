// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Sobol Statistics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Statistics read off an orthonormal polynomial expansion.
//!
//! With an orthonormal basis the ANOVA decomposition is free:
//!   mean      = c_0
//!   variance  = sum_{k>0} c_k^2
//!   S_u       = sum_{supp(alpha_k) = u} c_k^2 / variance
//! Skewness and kurtosis need the surrogate itself and are integrated on the
//! tensor Gauss grid of the basis parameters.

use crate::basis::IndexSet;
use crate::design::{TensorGrid, MAX_DESIGN_ENTRIES};
use crate::fit::PolyFit;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use uq_types::error::{UqError, UqResult};

/// Below this fraction of `mean^2 + variance` the expansion is constant.
const VARIANCE_RTOL: f64 = 1e-20;

/// Sum of all Sobol indices further than this from 1 is reported.
const SOBOL_SUM_ATOL: f64 = 1e-2;

/// Largest order accepted by the conditional moment decompositions.
const MAX_CONDITIONAL_ORDER: usize = 20;

/// Up to this many inputs every dimension set is listed, zero or not.
pub const MAX_LISTED_DIMENSIONS: usize = 12;

/// Sensitivity index of one set of input dimensions (sorted ascending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SobolIndex {
    pub dimensions: Vec<usize>,
    pub value: f64,
}

impl SobolIndex {
    pub fn order(&self) -> usize {
        self.dimensions.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub variance: f64,
    /// S_i for each input, in parameter order.
    pub first_order: Vec<f64>,
    /// Total-effect indices, in parameter order.
    pub total_order: Vec<f64>,
    /// Sobol indices in graded order; see `SobolAnalyzer::sobol_indices`.
    pub sobol: Vec<SobolIndex>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl Statistics {
    /// Variance-based statistics plus grid-integrated skewness and kurtosis.
    ///
    /// Skewness and kurtosis stay `None` when the tensor grid is too large
    /// to integrate on.
    pub fn from_fit(fit: &PolyFit) -> UqResult<Self> {
        let analyzer = SobolAnalyzer::new(&fit.coefficients, fit.basis.index_set())?;
        let mut stats = analyzer.analyze();
        match HigherMoments::from_fit(fit) {
            Ok(moments) => {
                stats.skewness = Some(moments.skewness());
                stats.kurtosis = Some(moments.kurtosis());
            }
            Err(err) => warn!(%err, "skipping skewness and kurtosis"),
        }
        Ok(stats)
    }

    /// Indices of exactly `order` interacting inputs.
    pub fn sobol_of_order(&self, order: usize) -> Vec<&SobolIndex> {
        self.sobol.iter().filter(|s| s.order() == order).collect()
    }

    /// Index of a dimension set; zero when no basis term has that support.
    pub fn sobol_index(&self, dimensions: &[usize]) -> f64 {
        let mut key = dimensions.to_vec();
        key.sort_unstable();
        self.sobol
            .iter()
            .find(|s| s.dimensions == key)
            .map_or(0.0, |s| s.value)
    }

    /// First-order indices reported as `S_i * variance * 100`.
    ///
    /// This is the "normalized" column of the published piston example and is
    /// kept verbatim for comparison with it.
    pub fn variance_scaled_indices(&self) -> Vec<f64> {
        self.first_order
            .iter()
            .map(|s| s * self.variance * 100.0)
            .collect()
    }
}

/// Variance decomposition of an orthonormal expansion.
#[derive(Debug, Clone, Copy)]
pub struct SobolAnalyzer<'a> {
    coefficients: &'a Array1<f64>,
    index_set: &'a IndexSet,
}

impl<'a> SobolAnalyzer<'a> {
    pub fn new(coefficients: &'a Array1<f64>, index_set: &'a IndexSet) -> UqResult<Self> {
        if coefficients.len() != index_set.cardinality() {
            return Err(UqError::DimensionMismatch {
                expected: index_set.cardinality(),
                got: coefficients.len(),
            });
        }
        Ok(Self {
            coefficients,
            index_set,
        })
    }

    pub fn mean(&self) -> f64 {
        self.terms()
            .filter(|(alpha, _)| alpha.iter().all(|&a| a == 0))
            .map(|(_, c)| c)
            .sum()
    }

    pub fn variance(&self) -> f64 {
        self.terms()
            .filter(|(alpha, _)| alpha.iter().any(|&a| a > 0))
            .map(|(_, c)| c * c)
            .sum()
    }

    /// Sobol indices in graded lexicographic order.
    ///
    /// Every dimension set up to the input count is listed, zero when no term
    /// has that support. Past `MAX_LISTED_DIMENSIONS` inputs only first-order
    /// sets and supports present in the basis are listed.
    pub fn sobol_indices(&self) -> Vec<SobolIndex> {
        let dims = self.index_set.dimensions();
        let max_listed = if dims <= MAX_LISTED_DIMENSIONS { dims } else { 1 };
        let mut partial: BTreeMap<(usize, Vec<usize>), f64> = BTreeMap::new();
        for order in 1..=max_listed {
            for u in combinations(dims, order) {
                partial.insert((order, u), 0.0);
            }
        }

        let variance = self.variance();
        let constant = self.is_constant(variance);
        for (alpha, c) in self.terms() {
            let support = support_of(alpha);
            if support.is_empty() {
                continue;
            }
            let share = if constant { 0.0 } else { c * c / variance };
            *partial.entry((support.len(), support)).or_insert(0.0) += share;
        }

        partial
            .into_iter()
            .map(|((_, dimensions), value)| SobolIndex { dimensions, value })
            .collect()
    }

    pub fn first_order(&self) -> Vec<f64> {
        first_from(&self.sobol_indices(), self.index_set.dimensions())
    }

    /// Total-effect index: sum of S_u over every u containing the input.
    pub fn total_order(&self) -> Vec<f64> {
        total_from(&self.sobol_indices(), self.index_set.dimensions())
    }

    /// Mean, variance and all Sobol indices; moments left unset.
    pub fn analyze(&self) -> Statistics {
        let dims = self.index_set.dimensions();
        let mean = self.mean();
        let variance = self.variance();
        let sobol = self.sobol_indices();
        let first_order = first_from(&sobol, dims);
        let total_order = total_from(&sobol, dims);

        if !self.is_constant(variance) {
            let check_sum: f64 = sobol.iter().map(|s| s.value).sum();
            if (check_sum - 1.0).abs() >= SOBOL_SUM_ATOL {
                warn!(
                    check_sum,
                    "possible discrepancy in Sobol decomposition, indices do not sum to 1"
                );
            }
        }

        Statistics {
            mean,
            variance,
            first_order,
            total_order,
            sobol,
            skewness: None,
            kurtosis: None,
        }
    }

    fn terms(&self) -> impl Iterator<Item = (&'a Vec<usize>, f64)> + '_ {
        self.index_set
            .elements()
            .iter()
            .zip(self.coefficients.iter().copied())
    }

    fn is_constant(&self, variance: f64) -> bool {
        negligible_variance(self.mean(), variance)
    }
}

fn negligible_variance(mean: f64, variance: f64) -> bool {
    variance <= VARIANCE_RTOL * (mean * mean + variance)
}

fn support_of(alpha: &[usize]) -> Vec<usize> {
    alpha
        .iter()
        .enumerate()
        .filter(|(_, a)| **a > 0)
        .map(|(d, _)| d)
        .collect()
}

fn first_from(sobol: &[SobolIndex], dims: usize) -> Vec<f64> {
    let mut first = vec![0.0; dims];
    for s in sobol {
        if let [d] = s.dimensions[..] {
            first[d] = s.value;
        }
    }
    first
}

fn total_from(sobol: &[SobolIndex], dims: usize) -> Vec<f64> {
    let mut total = vec![0.0; dims];
    for s in sobol {
        for &d in &s.dimensions {
            total[d] += s.value;
        }
    }
    total
}

/// All `r`-element subsets of `0..n`, lexicographic.
fn combinations(n: usize, r: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if r > n {
        return out;
    }
    let mut current: Vec<usize> = (0..r).collect();
    loop {
        out.push(current.clone());
        let Some(i) = (0..r).rev().find(|&i| current[i] < n - r + i) else {
            break;
        };
        current[i] += 1;
        for j in (i + 1)..r {
            current[j] = current[j - 1] + 1;
        }
    }
    out
}

/// Third and fourth central moments of the surrogate on its tensor grid.
///
/// Conditional indices split these moments by the union support of the
/// ANOVA components in each product, the way Sobol indices split variance.
#[derive(Debug, Clone)]
pub struct HigherMoments {
    /// c_k psi_k(xi_j) for every grid node j and non-constant term k.
    term_values: Array2<f64>,
    supports: Vec<Vec<usize>>,
    weights: Array1<f64>,
    dims: usize,
    mean: f64,
    variance: f64,
    third: f64,
    fourth: f64,
}

impl HigherMoments {
    /// Fails with `ConfigError` when grid nodes times basis terms exceeds
    /// `MAX_DESIGN_ENTRIES`.
    pub fn from_fit(fit: &PolyFit) -> UqResult<Self> {
        let nodes = TensorGrid::point_count(&fit.basis)?;
        let cardinality = fit.basis.cardinality();
        if nodes.saturating_mul(cardinality) > MAX_DESIGN_ENTRIES {
            return Err(UqError::ConfigError(format!(
                "{nodes} grid nodes x {cardinality} basis terms exceeds \
                 {MAX_DESIGN_ENTRIES} design entries"
            )));
        }
        let grid = TensorGrid::new(&fit.basis)?;
        let psi = fit.basis.design_matrix(&grid.points);
        Ok(Self::new(
            &psi,
            &fit.coefficients,
            fit.basis.index_set(),
            grid.weights,
        ))
    }

    /// `psi` holds basis evaluations at quadrature nodes with `weights`.
    pub fn new(
        psi: &Array2<f64>,
        coefficients: &Array1<f64>,
        index_set: &IndexSet,
        weights: Array1<f64>,
    ) -> Self {
        let keep: Vec<usize> = index_set
            .elements()
            .iter()
            .enumerate()
            .filter(|(_, alpha)| alpha.iter().any(|&a| a > 0))
            .map(|(k, _)| k)
            .collect();
        let supports = keep
            .iter()
            .map(|&k| support_of(&index_set.elements()[k]))
            .collect();
        let mut term_values = psi.select(Axis(1), &keep);
        for (col, &k) in keep.iter().enumerate() {
            term_values.column_mut(col).mapv_inplace(|v| v * coefficients[k]);
        }

        let centered = term_values.sum_axis(Axis(1));
        let third: f64 = centered
            .iter()
            .zip(weights.iter())
            .map(|(f, w)| w * f.powi(3))
            .sum();
        let fourth: f64 = centered
            .iter()
            .zip(weights.iter())
            .map(|(f, w)| w * f.powi(4))
            .sum();
        let variance: f64 = keep.iter().map(|&k| coefficients[k] * coefficients[k]).sum();
        let mean: f64 = index_set
            .elements()
            .iter()
            .zip(coefficients.iter())
            .filter(|(alpha, _)| alpha.iter().all(|&a| a == 0))
            .map(|(_, c)| *c)
            .sum();

        Self {
            term_values,
            supports,
            weights,
            dims: index_set.dimensions(),
            mean,
            variance,
            third,
            fourth,
        }
    }

    /// `E[(f - mean)^3] / variance^1.5`; zero for a constant expansion.
    pub fn skewness(&self) -> f64 {
        if self.is_constant() {
            return 0.0;
        }
        self.third / self.variance.powf(1.5)
    }

    /// `E[(f - mean)^4] / variance^2`; zero for a constant expansion.
    pub fn kurtosis(&self) -> f64 {
        if self.is_constant() {
            return 0.0;
        }
        self.fourth / (self.variance * self.variance)
    }

    /// Share of the third central moment owed to each input set of `order`.
    pub fn conditional_skewness(&self, order: usize) -> UqResult<Vec<SobolIndex>> {
        self.conditional(order, 3, self.third)
    }

    /// Share of the fourth central moment owed to each input set of `order`.
    pub fn conditional_kurtosis(&self, order: usize) -> UqResult<Vec<SobolIndex>> {
        self.conditional(order, 4, self.fourth)
    }

    fn is_constant(&self) -> bool {
        negligible_variance(self.mean, self.variance)
    }

    fn conditional(&self, order: usize, power: i32, total: f64) -> UqResult<Vec<SobolIndex>> {
        if order == 0 || order > self.dims || order > MAX_CONDITIONAL_ORDER {
            return Err(UqError::ConfigError(format!(
                "conditional index order must lie in 1..={}, got {order}",
                self.dims.min(MAX_CONDITIONAL_ORDER)
            )));
        }

        let scale = self.variance.powf(power as f64 / 2.0);
        let negligible = self.is_constant() || total.abs() <= 1e-12 * scale;

        // E[g_w^power] where g_w sums the components supported inside w.
        let mut cache: HashMap<Vec<usize>, f64> = HashMap::new();
        let mut moment_within = |w: &[usize]| -> f64 {
            if w.is_empty() {
                return 0.0;
            }
            if let Some(&m) = cache.get(w) {
                return m;
            }
            let cols: Vec<usize> = self
                .supports
                .iter()
                .enumerate()
                .filter(|(_, s)| s.iter().all(|d| w.contains(d)))
                .map(|(k, _)| k)
                .collect();
            let m: f64 = self
                .term_values
                .rows()
                .into_iter()
                .zip(self.weights.iter())
                .map(|(row, &wt)| {
                    let g: f64 = cols.iter().map(|&k| row[k]).sum();
                    wt * g.powi(power)
                })
                .sum();
            cache.insert(w.to_vec(), m);
            m
        };

        let mut out = Vec::new();
        for u in combinations(self.dims, order) {
            if negligible {
                out.push(SobolIndex {
                    dimensions: u,
                    value: 0.0,
                });
                continue;
            }
            // Moebius inversion over the subsets of u.
            let mut acc = 0.0;
            for mask in 0u32..(1u32 << order) {
                let w: Vec<usize> = (0..order)
                    .filter(|&b| mask & (1 << b) != 0)
                    .map(|b| u[b])
                    .collect();
                let sign = if (order - w.len()) % 2 == 0 { 1.0 } else { -1.0 };
                acc += sign * moment_within(&w);
            }
            out.push(SobolIndex {
                dimensions: u,
                value: acc / total,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::Basis;
    use crate::design::DesignMatrixBuilder;
    use crate::parameter::Parameter;
    use uq_types::config::IndexRule;

    fn set(dims: usize, order: usize) -> IndexSet {
        IndexSet::new(IndexRule::TotalOrder, &vec![order; dims]).unwrap()
    }

    #[test]
    fn test_mean_variance_from_coefficients() {
        // [00, 01, 10, 02, 11, 20]
        let idx = set(2, 2);
        let c = Array1::from_vec(vec![3.0, 1.0, 2.0, 0.0, 1.0, 0.0]);
        let a = SobolAnalyzer::new(&c, &idx).unwrap();
        assert_eq!(a.mean(), 3.0);
        assert_eq!(a.variance(), 6.0);

        let s = a.analyze();
        assert!((s.first_order[0] - 4.0 / 6.0).abs() < 1e-15);
        assert!((s.first_order[1] - 1.0 / 6.0).abs() < 1e-15);
        assert!((s.sobol_index(&[1, 0]) - 1.0 / 6.0).abs() < 1e-15);
        assert!((s.total_order[0] - 5.0 / 6.0).abs() < 1e-15);
        assert!((s.total_order[1] - 2.0 / 6.0).abs() < 1e-15);
        let sum: f64 = s.sobol.iter().map(|x| x.value).sum();
        assert!((sum - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_graded_sobol_listing() {
        let idx = set(3, 2);
        let c = Array1::from_shape_fn(idx.cardinality(), |k| k as f64 + 1.0);
        let s = SobolAnalyzer::new(&c, &idx).unwrap().analyze();
        let keys: Vec<Vec<usize>> = s.sobol.iter().map(|x| x.dimensions.clone()).collect();
        assert_eq!(
            keys,
            vec![
                vec![0],
                vec![1],
                vec![2],
                vec![0, 1],
                vec![0, 2],
                vec![1, 2],
                vec![0, 1, 2]
            ]
        );
        assert_eq!(s.sobol_of_order(2).len(), 3);
        // No degree-2 term touches all three inputs.
        let third = s.sobol_of_order(3);
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].value, 0.0);
    }

    #[test]
    fn test_absent_interactions_listed_as_zero() {
        // Linear in the first two of four inputs.
        let idx = IndexSet::new(IndexRule::TotalOrder, &[1, 1, 0, 0]).unwrap();
        let c = Array1::from_vec(vec![1.0, 0.5, 0.5]);
        let a = SobolAnalyzer::new(&c, &idx).unwrap();
        let s = a.analyze();
        assert_eq!(s.sobol.len(), 15);
        for order in 1..=4 {
            assert_eq!(s.sobol_of_order(order).len(), combinations(4, order).len());
        }
        assert_eq!(s.sobol_index(&[2, 3]), 0.0);
        assert_eq!(s.sobol_index(&[0, 1, 2, 3]), 0.0);
        assert!((s.sobol_index(&[0]) - 0.5).abs() < 1e-15);
        assert_eq!(a.first_order(), s.first_order);
    }

    #[test]
    fn test_wide_inputs_list_only_present_interactions() {
        let dims = MAX_LISTED_DIMENSIONS + 1;
        let idx = set(dims, 1);
        let c = Array1::from_shape_fn(idx.cardinality(), |k| k as f64);
        let s = SobolAnalyzer::new(&c, &idx).unwrap().analyze();
        assert_eq!(s.sobol.len(), dims);
        assert!(s.sobol_of_order(2).is_empty());
    }

    #[test]
    fn test_constant_expansion_has_zero_indices() {
        let idx = set(3, 2);
        let mut c = Array1::zeros(idx.cardinality());
        c[0] = 5.0;
        c[3] = 1e-17;
        let s = SobolAnalyzer::new(&c, &idx).unwrap().analyze();
        assert_eq!(s.mean, 5.0);
        assert!(s.first_order.iter().all(|v| *v == 0.0));
        assert!(s.sobol.iter().all(|v| v.value == 0.0));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let idx = set(2, 1);
        let c = Array1::zeros(5);
        assert!(matches!(
            SobolAnalyzer::new(&c, &idx),
            Err(UqError::DimensionMismatch {
                expected: 3,
                got: 5
            })
        ));
    }

    #[test]
    fn test_variance_scaled_indices() {
        let idx = set(2, 1);
        let c = Array1::from_vec(vec![0.0, 0.3, 0.4]);
        let s = SobolAnalyzer::new(&c, &idx).unwrap().analyze();
        let scaled = s.variance_scaled_indices();
        assert!((scaled[0] - 0.16 / 0.25 * 0.25 * 100.0).abs() < 1e-12);
        assert!((scaled[1] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(4, 2).len(), 6);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert_eq!(combinations(3, 1), vec![vec![0], vec![1], vec![2]]);
        assert!(combinations(2, 3).is_empty());
    }

    #[test]
    fn test_uniform_kurtosis_and_symmetry() {
        let basis = Basis::total_order(vec![Parameter::uniform(-1.0, 1.0, 4).unwrap()], 1).unwrap();
        let fit = PolyFit::fit(basis, &|x: &[f64]| x[0], 4);
        let stats = fit.statistics().unwrap();
        assert!((stats.variance - 1.0 / 3.0).abs() < 1e-12);
        assert!(stats.skewness.unwrap().abs() < 1e-12);
        assert!((stats.kurtosis.unwrap() - 1.8).abs() < 1e-10);
    }

    #[test]
    fn test_exponential_skewness_and_kurtosis() {
        let basis = Basis::total_order(vec![Parameter::exponential(2.0, 5).unwrap()], 1).unwrap();
        let fit = PolyFit::fit(basis, &|x: &[f64]| x[0], 5);
        let stats = fit.statistics().unwrap();
        assert!((stats.mean - 0.5).abs() < 1e-12);
        assert!((stats.variance - 0.25).abs() < 1e-12);
        assert!((stats.skewness.unwrap() - 2.0).abs() < 1e-9);
        assert!((stats.kurtosis.unwrap() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_conditional_moments_of_additive_model() {
        let params = vec![
            Parameter::exponential(1.0, 5).unwrap(),
            Parameter::exponential(1.0, 5).unwrap(),
        ];
        let basis = Basis::total_order(params, 1).unwrap();
        let fit = PolyFit::fit(basis, &|x: &[f64]| x[0] + x[1], 6);
        let moments = HigherMoments::from_fit(&fit).unwrap();

        let s1 = moments.conditional_skewness(1).unwrap();
        assert!((s1[0].value - 0.5).abs() < 1e-9);
        assert!((s1[1].value - 0.5).abs() < 1e-9);
        let s2 = moments.conditional_skewness(2).unwrap();
        assert!(s2[0].value.abs() < 1e-9);

        // E[(a+b)^4] = 9 + 9 + 6 for centred unit exponentials.
        let k1 = moments.conditional_kurtosis(1).unwrap();
        let k2 = moments.conditional_kurtosis(2).unwrap();
        assert!((k1[0].value - 9.0 / 24.0).abs() < 1e-9);
        assert!((k2[0].value - 6.0 / 24.0).abs() < 1e-9);
        assert_eq!(k2[0].dimensions, vec![0, 1]);
    }

    #[test]
    fn test_moments_skipped_when_grid_too_large() {
        // 5^11 nodes is past the grid cap; fit on hand-placed points instead.
        let params = (0..11)
            .map(|_| Parameter::uniform(0.0, 1.0, 5).unwrap())
            .collect();
        let basis = Basis::total_order(params, 1).unwrap();
        // Centre plus +-0.5 along each axis, in standard coordinates.
        let points = Array2::from_shape_fn((23, 11), |(i, d)| match i {
            0 => 0.0,
            i if i == d + 1 => 0.5,
            i if i == d + 12 => -0.5,
            _ => 0.0,
        });
        let design = DesignMatrixBuilder::new(&basis, 23)
            .evaluate_points(points, Array1::ones(23), &|x: &[f64]| x.iter().sum::<f64>())
            .unwrap();
        let fit = PolyFit::try_fit(basis, &design).unwrap();

        assert!(HigherMoments::from_fit(&fit).is_err());
        let stats = fit.statistics().unwrap();
        assert!((stats.mean - 5.5).abs() < 1e-9);
        assert!((stats.variance - 11.0 / 12.0).abs() < 1e-9);
        assert_eq!(stats.skewness, None);
        assert_eq!(stats.kurtosis, None);
    }

    #[test]
    fn test_conditional_order_out_of_range() {
        let basis = Basis::total_order(vec![Parameter::uniform(0.0, 1.0, 3).unwrap()], 1).unwrap();
        let fit = PolyFit::fit(basis, &|x: &[f64]| x[0], 3);
        let moments = HigherMoments::from_fit(&fit).unwrap();
        assert!(moments.conditional_skewness(0).is_err());
        assert!(moments.conditional_kurtosis(2).is_err());
    }
}
